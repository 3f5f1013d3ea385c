use crate::{Position, Source};
use std::collections::HashMap;

/// Fast line-to-offset and offset-to-line conversion using a pre-built index.
///
/// Any of `\n`, `\r\n` and `\r` ends a line. Offsets are byte offsets into
/// the indexed text, the same coordinate space `apollo-parser` spans use.
/// `character` counts UTF-16 code units, the editor convention; lines with
/// non-ASCII text keep a table of their wide characters for the conversion.
///
/// # Performance
///
/// - Build time: O(N) where N is the length of the source text
/// - Memory: O(L + W) where L is the number of lines and W the number of
///   non-ASCII characters
/// - Lookup time: O(1) for `position_to_offset` on ASCII lines, plus one step
///   per wide character on the line otherwise
/// - Lookup time: O(log L) for `offset_to_position` (binary search), plus the
///   same per-line walk
///
/// # Example
///
/// ```
/// use graphql_project::{LineIndex, Position};
///
/// let index = LineIndex::new("abc\ndef\nghi");
///
/// assert_eq!(index.position_to_offset(Position::new(2, 1)), 9);
/// assert_eq!(index.offset_to_position(9), Position::new(2, 1));
///
/// // `é` takes two bytes but one editor character
/// let index = LineIndex::new("\"José\" }");
/// assert_eq!(index.position_to_offset(Position::new(0, 6)), 7);
/// assert_eq!(index.offset_to_position(7), Position::new(0, 6));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Byte offset of the start of each line; index 0 is always 0
    line_starts: Vec<usize>,
    /// Non-ASCII characters of each line that has any, in order
    wide_chars: HashMap<usize, Vec<WideChar>>,
    /// Length of the indexed text in bytes
    len: usize,
}

/// A character whose UTF-8 and UTF-16 widths differ from one byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WideChar {
    /// Byte column within its line
    start: usize,
    len_utf8: usize,
    len_utf16: usize,
}

impl WideChar {
    const fn end(self) -> usize {
        self.start + self.len_utf8
    }

    const fn extra_bytes(self) -> usize {
        self.len_utf8 - self.len_utf16
    }
}

impl LineIndex {
    /// Build a line index from source text in a single forward scan
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        let mut wide_chars: HashMap<usize, Vec<WideChar>> = HashMap::new();
        let mut chars = text.char_indices().peekable();

        while let Some((i, ch)) = chars.next() {
            match ch {
                '\r' => {
                    if let Some(&(next, '\n')) = chars.peek() {
                        chars.next();
                        line_starts.push(next + 1);
                    } else {
                        line_starts.push(i + 1);
                    }
                }
                '\n' => line_starts.push(i + 1),
                _ if !ch.is_ascii() => {
                    let line = line_starts.len() - 1;
                    wide_chars.entry(line).or_default().push(WideChar {
                        start: i - line_starts[line],
                        len_utf8: ch.len_utf8(),
                        len_utf16: ch.len_utf16(),
                    });
                }
                _ => {}
            }
        }

        Self {
            line_starts,
            wide_chars,
            len: text.len(),
        }
    }

    /// Convert a line/character position to an offset.
    ///
    /// Positions are not validated. A character past the end of its line runs
    /// into the following lines, and a line past the last one yields an offset
    /// past the end of the text (`len + 1 + character`), which then matches
    /// nothing. Callers that need strict bounds check against [`Self::len`].
    #[must_use]
    pub fn position_to_offset(&self, position: Position) -> usize {
        match self.line_start(position.line) {
            Some(start) => start + self.byte_column(position.line, position.character),
            None => self.len + 1 + position.character,
        }
    }

    /// Convert an offset to a line/character position.
    ///
    /// Offsets past the end of the text land on the last line.
    #[must_use]
    pub fn offset_to_position(&self, offset: usize) -> Position {
        let line = match self.line_starts.binary_search(&offset) {
            // Exact match: offset is at the start of a line
            Ok(line) => line,
            // Not found: offset is somewhere within a line
            Err(line) => line.saturating_sub(1),
        };

        let column = offset - self.line_starts[line];
        Position::new(line, self.utf16_column(line, column))
    }

    /// Byte column of a UTF-16 `character` on `line`
    fn byte_column(&self, line: usize, character: usize) -> usize {
        let mut column = character;
        for wide in self.wide_chars.get(&line).into_iter().flatten() {
            if column <= wide.start {
                break;
            }
            column += wide.extra_bytes();
        }
        column
    }

    /// UTF-16 column of a byte `column` on `line`
    fn utf16_column(&self, line: usize, column: usize) -> usize {
        let mut character = column;
        for wide in self.wide_chars.get(&line).into_iter().flatten() {
            if wide.end() > column {
                break;
            }
            character -= wide.extra_bytes();
        }
        character
    }

    /// Number of lines in the indexed text
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Offset of the start of a line, `None` past the last line
    #[must_use]
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    /// Length of the indexed text in bytes
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Offset of a fragment-local position in `source`'s body.
///
/// Builds a throwaway [`LineIndex`]; keep an index around when converting
/// more than once against the same source.
#[must_use]
pub fn position_to_offset(source: &Source, position: Position) -> usize {
    LineIndex::new(&source.body).position_to_offset(position)
}

/// Fragment-local position of an offset into `source`'s body
#[must_use]
pub fn offset_to_position(source: &Source, offset: usize) -> Position {
    LineIndex::new(&source.body).offset_to_position(offset)
}
