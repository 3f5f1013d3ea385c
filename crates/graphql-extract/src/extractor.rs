use crate::{ExtractError, Language, LocationOffset, Result, Source};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use swc_common::comments::{CommentKind, Comments, SingleThreadedComments};
use swc_common::sync::Lrc;
use swc_common::{BytePos, FileName, SourceFile, SourceMap, Spanned};
use swc_core::ecma::ast::{EsVersion, Expr, MemberProp, TaggedTpl, Tpl};
use swc_core::ecma::parser::{parse_file_as_module, EsSyntax, Syntax, TsSyntax};
use swc_core::ecma::visit::{Visit, VisitWith};

/// Configuration for GraphQL extraction
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtractConfig {
    /// Magic comment to look for (default: "GraphQL")
    /// Matches comments like: /* GraphQL */ `query { ... }`
    pub magic_comment: String,

    /// Tag identifiers to extract (default: ["gql", "graphql"])
    /// Matches: gql`query { ... }` or graphql`query { ... }`
    pub tag_identifiers: Vec<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            magic_comment: "GraphQL".to_string(),
            tag_identifiers: vec!["gql".to_string(), "graphql".to_string()],
        }
    }
}

/// A GraphQL source found in a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedGraphQL {
    /// The GraphQL source, carrying its location in the file when embedded
    pub source: Source,

    /// The tag name used (e.g., "gql", "graphql"), if any
    pub tag_name: Option<String>,
}

/// Extract GraphQL from a file
pub fn extract_from_file(path: &Path, config: &ExtractConfig) -> Result<Vec<ExtractedGraphQL>> {
    let language = Language::from_path(path)
        .ok_or_else(|| ExtractError::UnsupportedFileType(path.to_path_buf()))?;

    let text = fs::read_to_string(path)?;
    extract_from_source(&text, &path.display().to_string(), language, config)
}

/// Extract GraphQL from source code string
///
/// Raw GraphQL yields a single top-level [`Source`]. For every other language
/// the script is parsed and each tagged (or magic-comment marked) template
/// literal becomes a [`Source`] whose location offset points at the
/// template's first character.
pub fn extract_from_source(
    text: &str,
    name: &str,
    language: Language,
    config: &ExtractConfig,
) -> Result<Vec<ExtractedGraphQL>> {
    if !language.embeds_graphql() {
        return Ok(vec![ExtractedGraphQL {
            source: Source::new(text, name),
            tag_name: None,
        }]);
    }

    let script = match language {
        Language::Vue | Language::Svelte | Language::Astro => {
            mask_outside(text, &script_regions(text, language))
        }
        _ => text.to_string(),
    };

    let extracted = extract_from_script(text, &script, name, syntax_for(language, name), config)?;
    tracing::debug!(
        file = name,
        count = extracted.len(),
        "extracted embedded GraphQL"
    );
    Ok(extracted)
}

fn syntax_for(language: Language, name: &str) -> Syntax {
    match language {
        Language::JavaScript => Syntax::Es(EsSyntax {
            jsx: true,
            ..Default::default()
        }),
        _ => Syntax::Typescript(TsSyntax {
            tsx: name.ends_with(".tsx"),
            decorators: true,
            ..Default::default()
        }),
    }
}

/// Parse `script` and collect its GraphQL templates.
///
/// `script` has the same byte layout as `text`; component files blank out
/// everything that is not script. Bodies are always sliced from `text`.
fn extract_from_script(
    text: &str,
    script: &str,
    name: &str,
    syntax: Syntax,
    config: &ExtractConfig,
) -> Result<Vec<ExtractedGraphQL>> {
    let source_map = SourceMap::default();
    let file = source_map.new_source_file(
        Lrc::new(FileName::Custom(name.to_string())),
        script.to_string(),
    );
    let comments = SingleThreadedComments::default();
    let mut recovered = Vec::new();

    let module = parse_file_as_module(
        &file,
        syntax,
        EsVersion::EsNext,
        Some(&comments as &dyn Comments),
        &mut recovered,
    )
    .map_err(|e| ExtractError::Parse {
        name: name.to_string(),
        line: line_and_column(text, byte_offset(&file, e.span().lo)).0,
        message: e.kind().msg().to_string(),
    })?;

    if !recovered.is_empty() {
        tracing::debug!(
            file = name,
            count = recovered.len(),
            "recovered from syntax errors"
        );
    }

    let mut collector = TemplateCollector {
        text,
        name,
        config,
        file: &file,
        magic_comment_ends: magic_comment_ends(&comments, &file, &config.magic_comment),
        extracted: Vec::new(),
    };
    module.visit_with(&mut collector);
    Ok(collector.extracted)
}

/// Byte offset of `pos` into the file's text
fn byte_offset(file: &SourceFile, pos: BytePos) -> usize {
    pos.0.saturating_sub(file.start_pos.0) as usize
}

/// End offsets of every block comment whose text is the magic comment
fn magic_comment_ends(
    comments: &SingleThreadedComments,
    file: &SourceFile,
    magic_comment: &str,
) -> Vec<usize> {
    let (leading, trailing) = comments.borrow_all();
    let mut ends: Vec<usize> = leading
        .values()
        .chain(trailing.values())
        .flatten()
        .filter(|comment| {
            comment.kind == CommentKind::Block && comment.text.trim() == magic_comment
        })
        .map(|comment| byte_offset(file, comment.span.hi))
        .collect();
    ends.sort_unstable();
    ends.dedup();
    ends
}

struct TemplateCollector<'a> {
    text: &'a str,
    name: &'a str,
    config: &'a ExtractConfig,
    file: &'a SourceFile,
    magic_comment_ends: Vec<usize>,
    extracted: Vec<ExtractedGraphQL>,
}

impl TemplateCollector<'_> {
    /// Whether only whitespace separates a magic comment from `open`
    fn follows_magic_comment(&self, open: usize) -> bool {
        self.magic_comment_ends.iter().any(|&end| {
            end <= open
                && self
                    .text
                    .get(end..open)
                    .is_some_and(|between| between.trim().is_empty())
        })
    }

    fn collect(&mut self, tpl: &Tpl, tag_name: Option<&str>) {
        let open = byte_offset(self.file, tpl.span.lo);
        let close = byte_offset(self.file, tpl.span.hi).saturating_sub(1);
        let body_start = open + 1;
        let (line, column) = line_and_column(self.text, body_start);

        if !tpl.exprs.is_empty() {
            tracing::debug!(
                file = self.name,
                line,
                "skipping GraphQL template with interpolations"
            );
            return;
        }

        let Some(body) = self.text.get(body_start..close) else {
            return;
        };

        let location = LocationOffset::new(line, column).with_filename(self.name);
        self.extracted.push(ExtractedGraphQL {
            source: Source::with_location_offset(body, self.name, location),
            tag_name: tag_name.map(str::to_string),
        });
    }
}

impl Visit for TemplateCollector<'_> {
    fn visit_tagged_tpl(&mut self, node: &TaggedTpl) {
        let tag = tag_identifier(&node.tag)
            .filter(|tag| self.config.tag_identifiers.iter().any(|t| t.as_str() == *tag));

        match tag {
            Some(tag) => {
                self.collect(&node.tpl, Some(tag));
                node.tag.visit_with(self);
                for expr in &node.tpl.exprs {
                    expr.visit_with(self);
                }
            }
            None => node.visit_children_with(self),
        }
    }

    fn visit_tpl(&mut self, node: &Tpl) {
        if self.follows_magic_comment(byte_offset(self.file, node.span.lo)) {
            self.collect(node, None);
        }
        node.visit_children_with(self);
    }
}

/// The identifier naming a template tag: `gql` in both `gql` and `Apollo.gql`
fn tag_identifier(tag: &Expr) -> Option<&str> {
    match tag {
        Expr::Ident(ident) => Some(&*ident.sym),
        Expr::Member(member) => match &member.prop {
            MemberProp::Ident(prop) => Some(&*prop.sym),
            _ => None,
        },
        _ => None,
    }
}

/// Byte ranges of the script parts of a component file: `<script>` element
/// contents, plus the frontmatter fence of an Astro file
fn script_regions(text: &str, language: Language) -> Vec<std::ops::Range<usize>> {
    let mut regions = Vec::new();

    if language == Language::Astro {
        if let Some(rest) = text.strip_prefix("---") {
            if let Some(end) = rest.find("\n---") {
                regions.push(3..3 + end);
            }
        }
    }

    let mut cursor = 0;
    while let Some(tag) = text[cursor..].find("<script") {
        let tag_start = cursor + tag;
        let Some(open_end) = text[tag_start..].find('>') else {
            break;
        };
        let content_start = tag_start + open_end + 1;
        let content_end = text[content_start..]
            .find("</script")
            .map_or(text.len(), |end| content_start + end);
        regions.push(content_start..content_end);
        cursor = content_end;
    }

    regions
}

/// Replace everything outside `regions` with spaces, keeping line breaks and
/// byte offsets intact
fn mask_outside(text: &str, regions: &[std::ops::Range<usize>]) -> String {
    let mut masked = String::with_capacity(text.len());
    for (offset, ch) in text.char_indices() {
        if ch == '\n' || ch == '\r' || regions.iter().any(|region| region.contains(&offset)) {
            masked.push(ch);
        } else {
            masked.extend(std::iter::repeat(' ').take(ch.len_utf8()));
        }
    }
    masked
}

/// 1-indexed line and column of a byte offset, the column counted in UTF-16
/// code units
fn line_and_column(text: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, ch)) = chars.next() {
        if i >= offset {
            break;
        }
        match ch {
            '\r' => {
                if matches!(chars.peek(), Some(&(next, '\n')) if next < offset) {
                    chars.next();
                }
                line += 1;
                column = 0;
            }
            '\n' => {
                line += 1;
                column = 0;
            }
            _ => column += ch.len_utf16(),
        }
    }

    (line, column + 1)
}
