use serde::Serialize;

/// Position in a document (0-indexed, editor convention)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    /// Line number (0-indexed)
    pub line: usize,
    /// Character within the line (0-indexed)
    pub character: usize,
}

impl Position {
    #[must_use]
    pub const fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

/// Range in a document, `start <= end`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Whether `position` lies within the range (both ends inclusive)
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position <= self.end
    }
}

/// Where an embedded GraphQL fragment starts inside its containing document.
///
/// `line` and `column` are 1-indexed and point at the first character of the
/// fragment body. `column` counts UTF-16 code units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationOffset {
    pub line: usize,
    pub column: usize,
    pub filename: Option<String>,
}

impl LocationOffset {
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self {
            line,
            column,
            filename: None,
        }
    }

    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Number of lines the fragment is shifted down in the containing document
    const fn line_shift(&self) -> usize {
        self.line.saturating_sub(1)
    }
}

/// A GraphQL source body, optionally embedded in a larger document.
///
/// Sources without a location offset are top-level documents: their own
/// coordinates are the editor's coordinates. Embedded sources translate
/// between the two with [`Source::to_container`] and [`Source::to_fragment`].
///
/// Only the line axis is shifted. The fragment's first line is assumed to sit
/// flush with column 0 of the containing document, so positions on that line
/// are off by `column - 1` when the fragment actually starts mid-line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub body: String,
    pub name: String,
    pub location_offset: Option<LocationOffset>,
}

impl Source {
    /// A top-level source
    #[must_use]
    pub fn new(body: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            name: name.into(),
            location_offset: None,
        }
    }

    /// A source embedded in another document at `location_offset`
    #[must_use]
    pub fn with_location_offset(
        body: impl Into<String>,
        name: impl Into<String>,
        location_offset: LocationOffset,
    ) -> Self {
        Self {
            body: body.into(),
            name: name.into(),
            location_offset: Some(location_offset),
        }
    }

    #[must_use]
    pub const fn is_embedded(&self) -> bool {
        self.location_offset.is_some()
    }

    /// Express a fragment-local position in the containing document
    #[must_use]
    pub fn to_container(&self, position: Position) -> Position {
        match &self.location_offset {
            None => position,
            Some(offset) => Position::new(position.line + offset.line_shift(), position.character),
        }
    }

    /// Express a containing-document position in fragment-local coordinates
    #[must_use]
    pub fn to_fragment(&self, position: Position) -> Position {
        match &self.location_offset {
            None => position,
            Some(offset) => Position::new(
                position.line.saturating_sub(offset.line_shift()),
                position.character,
            ),
        }
    }

    #[must_use]
    pub fn to_container_range(&self, range: Range) -> Range {
        if self.location_offset.is_none() {
            return range;
        }
        Range::new(self.to_container(range.start), self.to_container(range.end))
    }

    #[must_use]
    pub fn to_fragment_range(&self, range: Range) -> Range {
        if self.location_offset.is_none() {
            return range;
        }
        Range::new(self.to_fragment(range.start), self.to_fragment(range.end))
    }

    /// Whether a containing-document position falls on one of this source's lines
    #[must_use]
    pub fn contains_container_position(&self, position: Position) -> bool {
        let first_line = self.to_container(Position::default()).line;
        let last_line = first_line + line_count(&self.body) - 1;
        (first_line..=last_line).contains(&position.line)
    }
}

/// Number of lines in `text`; `\r\n`, `\n` and `\r` each end one line
fn line_count(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut count = 1;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                count += 1;
                i += 1;
            }
            b'\r' | b'\n' => count += 1,
            _ => {}
        }
        i += 1;
    }
    count
}
