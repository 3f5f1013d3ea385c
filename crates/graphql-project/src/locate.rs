//! Finding the innermost syntax node at an editor position, together with the
//! type context that applies there.

use crate::{
    offset_to_position, walk, LineIndex, Position, Range, SchemaIndex, Source, SyntaxTreeNode,
    TypeContext, TypeInfo, TypeInfoVisitor, VisitAction, WithTypeInfo,
};
use apollo_parser::SyntaxNode;
use std::fmt;

/// A located node and a snapshot of the type context taken when it was
/// entered
#[derive(Debug, Clone)]
pub struct NodeAtPosition<N, T> {
    pub node: N,
    pub type_info: T,
}

/// Visitor that narrows a walk down to the innermost node containing an
/// offset.
///
/// Subtrees whose span excludes the offset are never descended into. Bare
/// name leaves are not recorded; their parent is the node of interest. The
/// walk stops as soon as the recorded match is left.
pub struct NodeLocator<N, T> {
    offset: usize,
    found: Option<NodeAtPosition<N, T>>,
}

impl<N, T> NodeLocator<N, T> {
    #[must_use]
    pub const fn new(offset: usize) -> Self {
        Self {
            offset,
            found: None,
        }
    }

    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// The best match recorded so far
    #[must_use]
    pub const fn found(&self) -> Option<&NodeAtPosition<N, T>> {
        self.found.as_ref()
    }

    #[must_use]
    pub fn into_found(self) -> Option<NodeAtPosition<N, T>> {
        self.found
    }
}

impl<N: fmt::Debug, T> fmt::Debug for NodeLocator<N, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeLocator")
            .field("offset", &self.offset)
            .field("node", &self.found.as_ref().map(|found| &found.node))
            .finish()
    }
}

impl<N, T> TypeInfoVisitor<N, T> for NodeLocator<N, T>
where
    N: SyntaxTreeNode,
    T: Clone,
{
    fn enter(&mut self, node: &N, type_info: &T) -> VisitAction<N> {
        let contains = node.span().is_some_and(|span| span.contains(self.offset));
        if !contains || node.is_name() {
            return VisitAction::SkipChildren;
        }

        self.found = Some(NodeAtPosition {
            node: node.clone(),
            type_info: type_info.clone(),
        });
        VisitAction::Continue
    }

    fn leave(&mut self, node: &N, _type_info: &T) -> VisitAction<N> {
        match &self.found {
            Some(found) if found.node == *node => VisitAction::Stop,
            _ => VisitAction::Continue,
        }
    }
}

/// Find the innermost node of `root` containing `position`.
///
/// `position` is relative to the text `line_index` was built from, the same
/// text `root`'s spans point into. `type_info` is the fresh context the walk
/// starts from. Returns `None` when no node contains the position, including
/// when the position lies past the end of the text or the root has no span.
pub fn locate<N, T>(
    line_index: &LineIndex,
    position: Position,
    root: &N,
    type_info: T,
) -> Option<NodeAtPosition<N, T>>
where
    N: SyntaxTreeNode,
    T: TypeContext<N> + Clone,
{
    let offset = line_index.position_to_offset(position);
    let mut type_info = type_info;
    let mut locator = NodeLocator::new(offset);

    walk(root, &mut WithTypeInfo::new(&mut type_info, &mut locator));

    let found = locator.into_found();
    if found.is_none() {
        tracing::trace!(offset, ?position, "no node at position");
    }
    found
}

/// Find the GraphQL node at a fragment-local `position` in `source`, with the
/// type context `schema` gives it.
///
/// Editor positions in an embedding file go through
/// [`Source::to_fragment`] first.
///
/// # Example
///
/// ```
/// use apollo_parser::{cst::CstNode, Parser, SyntaxKind};
/// use graphql_project::{node_and_type_info_at_position, Position, SchemaIndex, Source};
///
/// let schema = SchemaIndex::from_schema("type Query { hello: String }");
/// let source = Source::new("{ hello }", "query.graphql");
/// let tree = Parser::new(&source.body).parse();
///
/// let found = node_and_type_info_at_position(
///     &source,
///     Position::new(0, 4),
///     tree.document().syntax(),
///     &schema,
/// )
/// .unwrap();
///
/// assert_eq!(found.node.kind(), SyntaxKind::FIELD);
/// assert_eq!(found.type_info.field_def().unwrap().name, "hello");
/// ```
#[must_use]
pub fn node_and_type_info_at_position<'a>(
    source: &Source,
    position: Position,
    root: &SyntaxNode,
    schema: &'a SchemaIndex,
) -> Option<NodeAtPosition<SyntaxNode, TypeInfo<'a>>> {
    let line_index = LineIndex::new(&source.body);
    locate(&line_index, position, root, TypeInfo::new(schema))
}

/// The range `node` covers, in the coordinates of the document containing
/// `source`. `None` for nodes without a span.
#[must_use]
pub fn range_for_node<N: SyntaxTreeNode>(source: &Source, node: &N) -> Option<Range> {
    let span = node.span()?;
    let range = Range::new(
        offset_to_position(source, span.start),
        offset_to_position(source, span.end),
    );
    Some(source.to_container_range(range))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestNode;
    use crate::LocationOffset;
    use apollo_parser::cst::CstNode;
    use apollo_parser::{Parser, SyntaxKind};

    /// Context that only counts how deep the walk is
    #[derive(Debug, Default, Clone, PartialEq, Eq)]
    struct Depth(usize);

    impl TypeContext<TestNode> for Depth {
        fn enter(&mut self, _node: &TestNode) {
            self.0 += 1;
        }

        fn leave(&mut self, _node: &TestNode) {
            self.0 -= 1;
        }
    }

    /// Records every kind it is asked to enter
    #[derive(Debug, Default, Clone)]
    struct EnteredKinds(std::rc::Rc<std::cell::RefCell<Vec<&'static str>>>);

    impl TypeContext<TestNode> for EnteredKinds {
        fn enter(&mut self, node: &TestNode) {
            self.0.borrow_mut().push(node.kind);
        }

        fn leave(&mut self, _node: &TestNode) {}
    }

    fn locate_offset<T>(root: &TestNode, offset: usize, type_info: T) -> Option<NodeAtPosition<TestNode, T>>
    where
        T: TypeContext<TestNode> + Clone,
    {
        // A single line long enough for every offset the tests use
        let text = " ".repeat(64);
        locate(&LineIndex::new(&text), Position::new(0, offset), root, type_info)
    }

    #[test]
    fn test_innermost_node_wins() {
        let root = TestNode::new("root", 0, 10).with_children(vec![TestNode::new("child", 2, 5)]);

        let found = locate_offset(&root, 3, Depth::default()).unwrap();
        assert_eq!(found.node.kind, "child");
        assert_eq!(found.type_info, Depth(2));

        let found = locate_offset(&root, 7, Depth::default()).unwrap();
        assert_eq!(found.node.kind, "root");
        assert_eq!(found.type_info, Depth(1));
    }

    #[test]
    fn test_miss_returns_none() {
        let root = TestNode::new("root", 0, 10).with_children(vec![TestNode::new("child", 2, 5)]);
        assert!(locate_offset(&root, 11, Depth::default()).is_none());
    }

    #[test]
    fn test_position_past_text_matches_nothing() {
        let root = TestNode::new("root", 0, 5);
        let line_index = LineIndex::new("abcde");

        let found = locate(&line_index, Position::new(3, 0), &root, Depth::default());
        assert!(found.is_none());
    }

    #[test]
    fn test_root_without_span() {
        let root = TestNode::synthetic("root").with_children(vec![TestNode::new("child", 0, 5)]);
        assert!(locate_offset(&root, 2, Depth::default()).is_none());
    }

    #[test]
    fn test_span_boundaries_are_inclusive() {
        let root = TestNode::new("root", 0, 10).with_children(vec![TestNode::new("child", 2, 5)]);

        assert_eq!(locate_offset(&root, 2, Depth::default()).unwrap().node.kind, "child");
        assert_eq!(locate_offset(&root, 5, Depth::default()).unwrap().node.kind, "child");
    }

    #[test]
    fn test_first_of_touching_siblings_wins() {
        let root = TestNode::new("root", 0, 10).with_children(vec![
            TestNode::new("left", 0, 5),
            TestNode::new("right", 5, 10),
        ]);

        let found = locate_offset(&root, 5, Depth::default()).unwrap();
        assert_eq!(found.node.kind, "left");
    }

    #[test]
    fn test_names_are_not_recorded() {
        let root = TestNode::new("root", 0, 10).with_children(vec![
            TestNode::new("field", 2, 8).with_children(vec![TestNode::new("name", 2, 6)]),
        ]);

        let found = locate_offset(&root, 3, Depth::default()).unwrap();
        assert_eq!(found.node.kind, "field");
    }

    #[test]
    fn test_non_containing_siblings_are_pruned() {
        let root = TestNode::new("root", 0, 30).with_children(vec![
            TestNode::new("before", 0, 9)
                .with_children(vec![TestNode::new("before_inner", 1, 8)]),
            TestNode::new("target", 10, 19)
                .with_children(vec![TestNode::new("target_inner", 12, 15)]),
            TestNode::new("after", 20, 30).with_children(vec![TestNode::new("after_inner", 21, 29)]),
        ]);
        let entered = EnteredKinds::default();
        let seen = entered.0.clone();

        let found = locate_offset(&root, 13, entered).unwrap();

        assert_eq!(found.node.kind, "target_inner");
        // Siblings are entered to test their span, never descended into, and
        // the walk stops before reaching "after"
        assert_eq!(
            *seen.borrow(),
            vec!["root", "before", "target", "target_inner"]
        );
    }

    #[test]
    fn test_locator_leaves_context_balanced_on_miss() {
        let root = TestNode::new("root", 0, 10).with_children(vec![
            TestNode::new("a", 0, 4).with_children(vec![TestNode::new("a1", 1, 2)]),
            TestNode::new("b", 6, 9),
        ]);
        let mut depth = Depth::default();
        let mut locator = NodeLocator::new(50);

        walk(&root, &mut WithTypeInfo::new(&mut depth, &mut locator));

        assert!(locator.found().is_none());
        assert_eq!(depth, Depth(0));
    }

    const SCHEMA: &str = r"
type Query {
  user(id: ID!, name: String, role: Role): User
  node: Node
}
interface Node { id: ID! }
type User implements Node { id: ID! name: String }
enum Role { ADMIN MEMBER }
";

    fn locate_in(document: &str, position: Position) -> Option<(SyntaxKind, String)> {
        let schema = SchemaIndex::from_schema(SCHEMA);
        let source = Source::new(document, "query.graphql");
        let tree = Parser::new(document).parse();

        node_and_type_info_at_position(&source, position, tree.document().syntax(), &schema).map(
            |found| {
                let info = &found.type_info;
                let context = format!(
                    "parent={} type={} field={} argument={} input={} enum={} directive={}",
                    info.parent_type().map_or("-", |t| t.name.as_str()),
                    info.current_type().map_or_else(|| "-".to_string(), ToString::to_string),
                    info.field_def().map_or("-", |f| f.name.as_str()),
                    info.argument().map_or("-", |a| a.name.as_str()),
                    info.input_type().map_or_else(|| "-".to_string(), ToString::to_string),
                    info.enum_value().map_or("-", |v| v.name.as_str()),
                    info.directive().map_or("-", |d| d.name.as_str()),
                );
                (found.node.kind(), context)
            },
        )
    }

    #[test]
    fn test_field_in_nested_selection() {
        let document = "query {\n  user(id: 1) {\n    name\n  }\n}";

        let (kind, context) = locate_in(document, Position::new(2, 6)).unwrap();
        assert_eq!(kind, SyntaxKind::FIELD);
        assert_eq!(
            context,
            "parent=User type=String field=name argument=- input=- enum=- directive=-"
        );
    }

    #[test]
    fn test_argument_and_enum_value() {
        let document = "{ user(id: 1, role: ADMIN) { id } }";

        // Inside "id" of the argument name
        let (kind, context) = locate_in(document, Position::new(0, 8)).unwrap();
        assert_eq!(kind, SyntaxKind::ARGUMENT);
        assert_eq!(
            context,
            "parent=Query type=User field=user argument=id input=ID! enum=- directive=-"
        );

        // Inside "ADMIN"
        let (kind, context) = locate_in(document, Position::new(0, 22)).unwrap();
        assert_eq!(kind, SyntaxKind::ENUM_VALUE);
        assert_eq!(
            context,
            "parent=Query type=User field=user argument=role input=Role enum=ADMIN directive=-"
        );
    }

    #[test]
    fn test_inline_fragment_and_directive() {
        let document = "{ node { ... on User @skip(if: true) { name } } }";

        // Inside "User" of the type condition
        let (kind, context) = locate_in(document, Position::new(0, 17)).unwrap();
        assert_eq!(kind, SyntaxKind::NAMED_TYPE);
        assert_eq!(
            context,
            "parent=Node type=User field=node argument=- input=- enum=- directive=-"
        );

        // Inside "skip"
        let (kind, context) = locate_in(document, Position::new(0, 23)).unwrap();
        assert_eq!(kind, SyntaxKind::DIRECTIVE);
        assert!(context.ends_with("directive=skip"), "{context}");

        // Inside "name" under the fragment
        let (kind, context) = locate_in(document, Position::new(0, 40)).unwrap();
        assert_eq!(kind, SyntaxKind::FIELD);
        assert!(context.starts_with("parent=User type=String field=name"), "{context}");
    }

    #[test]
    fn test_characters_after_non_ascii_text() {
        // Both accented letters are two bytes but one editor character
        let document = "{ user(name: \"José Müller\") { name } }";

        let (kind, context) = locate_in(document, Position::new(0, 31)).unwrap();
        assert_eq!(kind, SyntaxKind::FIELD);
        assert_eq!(
            context,
            "parent=User type=String field=name argument=- input=- enum=- directive=-"
        );

        let schema = SchemaIndex::from_schema(SCHEMA);
        let source = Source::new(document, "query.graphql");
        let tree = Parser::new(document).parse();
        let found = node_and_type_info_at_position(
            &source,
            Position::new(0, 31),
            tree.document().syntax(),
            &schema,
        )
        .unwrap();
        let range = range_for_node(&source, &found.node).unwrap();
        assert_eq!(range.start, Position::new(0, 30));
    }

    #[test]
    fn test_graphql_miss() {
        assert!(locate_in("{ user }", Position::new(4, 0)).is_none());
    }

    #[test]
    fn test_range_for_node_in_container() {
        let document = "query {\n  user(id: 1) {\n    name\n  }\n}";
        let schema = SchemaIndex::from_schema(SCHEMA);
        // Fragment embedded at line 10 of a TypeScript file
        let source = Source::with_location_offset(document, "app.ts", LocationOffset::new(10, 1));
        let tree = Parser::new(document).parse();

        let container_position = Position::new(11, 6);
        assert!(source.contains_container_position(container_position));
        let fragment_position = source.to_fragment(container_position);

        let found = node_and_type_info_at_position(
            &source,
            fragment_position,
            tree.document().syntax(),
            &schema,
        )
        .unwrap();
        assert_eq!(found.node.kind(), SyntaxKind::FIELD);

        // "name" starts at column 4 of fragment line 2, shifted down 9 lines
        let range = range_for_node(&source, &found.node).unwrap();
        assert_eq!(range.start, Position::new(11, 4));
        assert!(range.contains(container_position));
        assert!(range.end.line <= 12);
    }

    #[test]
    fn test_range_for_node_without_span() {
        let source = Source::new("{ a }", "query.graphql");
        assert!(range_for_node(&source, &TestNode::synthetic("root")).is_none());
    }
}
