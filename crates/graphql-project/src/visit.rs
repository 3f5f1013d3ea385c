//! Depth-first traversal of syntax trees, optionally keeping a type context
//! in step with the walk.
//!
//! [`walk`] drives any [`Visitor`] over a tree. [`WithTypeInfo`] wraps a
//! [`TypeInfoVisitor`] so that a [`TypeContext`] is entered before the
//! visitor sees a node and left after it, however the visitor steers the walk.
//!
//! # Example
//!
//! ```
//! use apollo_parser::{cst::CstNode, Parser, SyntaxNode};
//! use graphql_project::{walk, VisitAction, Visitor, WalkOutcome};
//!
//! struct NodeCounter(usize);
//!
//! impl Visitor<SyntaxNode> for NodeCounter {
//!     fn enter(&mut self, _node: &SyntaxNode) -> VisitAction<SyntaxNode> {
//!         self.0 += 1;
//!         VisitAction::Continue
//!     }
//! }
//!
//! let tree = Parser::new("{ hello }").parse();
//! let mut counter = NodeCounter(0);
//! let outcome = walk(tree.document().syntax(), &mut counter);
//! assert_eq!(outcome, WalkOutcome::Completed);
//! assert!(counter.0 > 1);
//! ```

use crate::SyntaxTreeNode;

/// What a visitor wants the walk to do next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisitAction<N> {
    /// Descend into the node's children as usual
    Continue,
    /// Do not visit the node's children; the node is still left afterwards
    SkipChildren,
    /// Abort the whole walk immediately
    Stop,
    /// Carry on with this node in place of the entered one
    Replace(N),
}

/// How a walk ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkOutcome {
    Completed,
    Stopped,
}

/// Callbacks for [`walk`]. Both default to [`VisitAction::Continue`].
///
/// Only `Stop` is meaningful from `leave`; every other action continues.
#[allow(unused_variables)]
pub trait Visitor<N> {
    fn enter(&mut self, node: &N) -> VisitAction<N> {
        VisitAction::Continue
    }

    fn leave(&mut self, node: &N) -> VisitAction<N> {
        VisitAction::Continue
    }
}

/// Walk `root` depth-first: `enter` before a node's children, `leave` after.
pub fn walk<N, V>(root: &N, visitor: &mut V) -> WalkOutcome
where
    N: SyntaxTreeNode,
    V: Visitor<N> + ?Sized,
{
    match walk_node(root.clone(), visitor) {
        Flow::Continue => WalkOutcome::Completed,
        Flow::Stop => WalkOutcome::Stopped,
    }
}

enum Flow {
    Continue,
    Stop,
}

fn walk_node<N, V>(node: N, visitor: &mut V) -> Flow
where
    N: SyntaxTreeNode,
    V: Visitor<N> + ?Sized,
{
    let (node, descend) = match visitor.enter(&node) {
        VisitAction::Continue => (node, true),
        VisitAction::SkipChildren => (node, false),
        VisitAction::Stop => return Flow::Stop,
        VisitAction::Replace(replacement) => (replacement, true),
    };

    if descend {
        for child in node.children() {
            if let Flow::Stop = walk_node(child, visitor) {
                return Flow::Stop;
            }
        }
    }

    match visitor.leave(&node) {
        VisitAction::Stop => Flow::Stop,
        _ => Flow::Continue,
    }
}

/// Schema-derived context that follows a traversal.
///
/// `enter` is called before a node's visitor callback and `leave` after,
/// so that between the two the context describes that node.
pub trait TypeContext<N> {
    fn enter(&mut self, node: &N);
    fn leave(&mut self, node: &N);
}

/// A [`Visitor`] that also sees the current type context
#[allow(unused_variables)]
pub trait TypeInfoVisitor<N, T> {
    fn enter(&mut self, node: &N, type_info: &T) -> VisitAction<N> {
        VisitAction::Continue
    }

    fn leave(&mut self, node: &N, type_info: &T) -> VisitAction<N> {
        VisitAction::Continue
    }
}

/// Runs a [`TypeInfoVisitor`] with its type context kept balanced.
///
/// - enter: the context enters the node, then the visitor runs. On
///   `Replace(n)` the context leaves the original and enters `n`.
/// - leave: the visitor runs, then the context leaves the node, unless the
///   visitor returned `Stop`. A stopped walk leaves the context as it was at
///   that node, so it can be read but should not be walked with again.
///
/// Any walk that is not stopped returns the context to its starting state.
pub struct WithTypeInfo<'a, T, V> {
    type_info: &'a mut T,
    visitor: &'a mut V,
}

impl<'a, T, V> WithTypeInfo<'a, T, V> {
    pub fn new(type_info: &'a mut T, visitor: &'a mut V) -> Self {
        Self { type_info, visitor }
    }
}

impl<N, T, V> Visitor<N> for WithTypeInfo<'_, T, V>
where
    T: TypeContext<N>,
    V: TypeInfoVisitor<N, T>,
{
    fn enter(&mut self, node: &N) -> VisitAction<N> {
        self.type_info.enter(node);
        let action = self.visitor.enter(node, self.type_info);
        if let VisitAction::Replace(replacement) = &action {
            self.type_info.leave(node);
            self.type_info.enter(replacement);
        }
        action
    }

    fn leave(&mut self, node: &N) -> VisitAction<N> {
        let action = self.visitor.leave(node, self.type_info);
        if !matches!(action, VisitAction::Stop) {
            self.type_info.leave(node);
        }
        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestNode;

    /// Records the path of entered kinds; `enter` pushes, `leave` pops
    #[derive(Debug, Default, Clone)]
    struct KindStack {
        stack: Vec<&'static str>,
        entered: usize,
    }

    impl TypeContext<TestNode> for KindStack {
        fn enter(&mut self, node: &TestNode) {
            self.stack.push(node.kind);
            self.entered += 1;
        }

        fn leave(&mut self, node: &TestNode) {
            let popped = self.stack.pop();
            assert_eq!(popped, Some(node.kind), "unbalanced leave");
        }
    }

    /// Scripted visitor: returns the configured action for a kind and
    /// records the context depth it observed
    #[derive(Default)]
    struct Script {
        on_enter: Vec<(&'static str, VisitAction<TestNode>)>,
        on_leave: Vec<(&'static str, VisitAction<TestNode>)>,
        entered: Vec<(&'static str, Vec<&'static str>)>,
        left: Vec<&'static str>,
    }

    impl TypeInfoVisitor<TestNode, KindStack> for Script {
        fn enter(&mut self, node: &TestNode, type_info: &KindStack) -> VisitAction<TestNode> {
            self.entered.push((node.kind, type_info.stack.clone()));
            self.on_enter
                .iter()
                .find(|(kind, _)| *kind == node.kind)
                .map_or(VisitAction::Continue, |(_, action)| action.clone())
        }

        fn leave(&mut self, node: &TestNode, _type_info: &KindStack) -> VisitAction<TestNode> {
            self.left.push(node.kind);
            self.on_leave
                .iter()
                .find(|(kind, _)| *kind == node.kind)
                .map_or(VisitAction::Continue, |(_, action)| action.clone())
        }
    }

    fn tree() -> TestNode {
        TestNode::new("doc", 0, 20).with_children(vec![
            TestNode::new("a", 0, 9).with_children(vec![
                TestNode::new("a1", 1, 3),
                TestNode::new("a2", 4, 8),
            ]),
            TestNode::new("b", 10, 20).with_children(vec![TestNode::new("b1", 11, 19)]),
        ])
    }

    #[test]
    fn test_walk_order() {
        let mut type_info = KindStack::default();
        let mut script = Script::default();

        let outcome = walk(&tree(), &mut WithTypeInfo::new(&mut type_info, &mut script));

        assert_eq!(outcome, WalkOutcome::Completed);
        let entered: Vec<_> = script.entered.iter().map(|(kind, _)| *kind).collect();
        assert_eq!(entered, vec!["doc", "a", "a1", "a2", "b", "b1"]);
        assert_eq!(script.left, vec!["a1", "a2", "a", "b1", "b", "doc"]);
    }

    #[test]
    fn test_context_is_entered_before_visitor() {
        let mut type_info = KindStack::default();
        let mut script = Script::default();

        walk(&tree(), &mut WithTypeInfo::new(&mut type_info, &mut script));

        let (kind, stack) = &script.entered[3];
        assert_eq!(*kind, "a2");
        assert_eq!(stack, &vec!["doc", "a", "a2"]);
    }

    #[test]
    fn test_completed_walk_is_balanced() {
        let mut type_info = KindStack::default();
        let mut script = Script::default();

        walk(&tree(), &mut WithTypeInfo::new(&mut type_info, &mut script));

        assert!(type_info.stack.is_empty());
        assert_eq!(type_info.entered, 6);
    }

    #[test]
    fn test_skip_children_still_leaves_node() {
        let mut type_info = KindStack::default();
        let mut script = Script {
            on_enter: vec![("a", VisitAction::SkipChildren)],
            ..Script::default()
        };

        let outcome = walk(&tree(), &mut WithTypeInfo::new(&mut type_info, &mut script));

        assert_eq!(outcome, WalkOutcome::Completed);
        let entered: Vec<_> = script.entered.iter().map(|(kind, _)| *kind).collect();
        assert_eq!(entered, vec!["doc", "a", "b", "b1"]);
        assert_eq!(script.left, vec!["a", "b1", "b", "doc"]);
        assert!(type_info.stack.is_empty());
    }

    #[test]
    fn test_stop_on_enter() {
        let mut type_info = KindStack::default();
        let mut script = Script {
            on_enter: vec![("a2", VisitAction::Stop)],
            ..Script::default()
        };

        let outcome = walk(&tree(), &mut WithTypeInfo::new(&mut type_info, &mut script));

        assert_eq!(outcome, WalkOutcome::Stopped);
        assert_eq!(script.left, vec!["a1"]);
        // The context still describes the node the walk stopped at
        assert_eq!(type_info.stack, vec!["doc", "a", "a2"]);
    }

    #[test]
    fn test_stop_on_leave_keeps_node_entered() {
        let mut type_info = KindStack::default();
        let mut script = Script {
            on_leave: vec![("a", VisitAction::Stop)],
            ..Script::default()
        };

        let outcome = walk(&tree(), &mut WithTypeInfo::new(&mut type_info, &mut script));

        assert_eq!(outcome, WalkOutcome::Stopped);
        assert_eq!(script.left, vec!["a1", "a2", "a"]);
        assert_eq!(type_info.stack, vec!["doc", "a"]);
    }

    #[test]
    fn test_replace_switches_context_and_children() {
        let replacement =
            TestNode::new("r", 0, 9).with_children(vec![TestNode::new("r1", 2, 3)]);
        let mut type_info = KindStack::default();
        let mut script = Script {
            on_enter: vec![("a", VisitAction::Replace(replacement))],
            ..Script::default()
        };

        let outcome = walk(&tree(), &mut WithTypeInfo::new(&mut type_info, &mut script));

        assert_eq!(outcome, WalkOutcome::Completed);
        let (kind, stack) = &script.entered[2];
        assert_eq!(*kind, "r1");
        assert_eq!(stack, &vec!["doc", "r", "r1"]);
        assert_eq!(script.left, vec!["r1", "r", "b1", "b", "doc"]);
        assert!(type_info.stack.is_empty());
    }

    #[test]
    fn test_plain_visitor_walk() {
        struct Kinds(Vec<&'static str>);

        impl Visitor<TestNode> for Kinds {
            fn enter(&mut self, node: &TestNode) -> VisitAction<TestNode> {
                self.0.push(node.kind);
                if node.kind == "b" {
                    VisitAction::Stop
                } else {
                    VisitAction::Continue
                }
            }
        }

        let mut kinds = Kinds(Vec::new());
        assert_eq!(walk(&tree(), &mut kinds), WalkOutcome::Stopped);
        assert_eq!(kinds.0, vec!["doc", "a", "a1", "a2", "b"]);
    }
}
