use apollo_parser::{SyntaxKind, SyntaxNode};
use serde::Serialize;
use std::fmt;

/// A node's location as offsets into its source body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Inclusive containment: both the first offset and the end offset count
    #[must_use]
    pub const fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }
}

/// The view of a syntax tree the traversal and locator need.
///
/// Only the kind and span of a node matter; children must be strictly nested
/// in their parent's span and must not overlap each other.
pub trait SyntaxTreeNode: Clone + PartialEq {
    type Kind: Copy + Eq + fmt::Debug;

    fn kind(&self) -> Self::Kind;

    /// `None` for synthetic nodes with no location in the source
    fn span(&self) -> Option<Span>;

    /// Child nodes in document order
    fn children(&self) -> Vec<Self>;

    /// Whether this is a bare name leaf, whose parent is the interesting node
    fn is_name(&self) -> bool;
}

impl SyntaxTreeNode for SyntaxNode {
    type Kind = SyntaxKind;

    fn kind(&self) -> SyntaxKind {
        SyntaxNode::kind(self)
    }

    fn span(&self) -> Option<Span> {
        let range = self.text_range();
        Some(Span::new(range.start().into(), range.end().into()))
    }

    fn children(&self) -> Vec<Self> {
        SyntaxNode::children(self).collect()
    }

    fn is_name(&self) -> bool {
        SyntaxNode::kind(self) == SyntaxKind::NAME
    }
}
