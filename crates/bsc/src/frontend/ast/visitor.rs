//! Tree traversal
//!
//! [`walk`] visits every node reachable from a start node exactly once,
//! calling [`Visitor::enter`] before a node's children and
//! [`Visitor::exit`] after them. The traversal keeps its own stack, so tree
//! depth is bounded by memory rather than the call stack.

use super::{Ast, NodeId};

/// Pre-order and post-order hooks invoked by [`walk`].
///
/// Visitors receive the tree mutably so they can populate symbol tables;
/// they must not change the tree's shape.
pub trait Visitor {
    fn enter(&mut self, ast: &mut Ast, node: NodeId, parent: Option<NodeId>) {
        let _ = (ast, node, parent);
    }

    fn exit(&mut self, ast: &mut Ast, node: NodeId, parent: Option<NodeId>) {
        let _ = (ast, node, parent);
    }
}

enum Step {
    Enter(NodeId),
    Exit(NodeId),
}

/// Walk the subtree rooted at `start`
pub fn walk<V: Visitor + ?Sized>(ast: &mut Ast, start: NodeId, visitor: &mut V) {
    let mut stack = vec![Step::Enter(start)];
    while let Some(step) = stack.pop() {
        match step {
            Step::Enter(id) => {
                let parent = ast.parent(id);
                visitor.enter(ast, id, parent);
                stack.push(Step::Exit(id));
                for child in ast.children(id).into_iter().rev() {
                    stack.push(Step::Enter(child));
                }
            }
            Step::Exit(id) => {
                let parent = ast.parent(id);
                visitor.exit(ast, id, parent);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parser::Parser;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl Visitor for Recorder {
        fn enter(&mut self, ast: &mut Ast, node: NodeId, _parent: Option<NodeId>) {
            self.events.push(format!("+{}", ast.kind(node).name()));
        }

        fn exit(&mut self, ast: &mut Ast, node: NodeId, _parent: Option<NodeId>) {
            self.events.push(format!("-{}", ast.kind(node).name()));
        }
    }

    #[test]
    fn test_pre_and_post_order() {
        let mut parsed = Parser::new("x = -1\n").unwrap().parse().unwrap();
        let mut recorder = Recorder::default();
        let root = parsed.ast.root();
        walk(&mut parsed.ast, root, &mut recorder);

        assert_eq!(
            recorder.events,
            vec![
                "+Body", "+Assignment", "+Unary", "+Literal", "-Literal", "-Unary",
                "-Assignment", "-Body",
            ]
        );
    }

    #[test]
    fn test_every_node_visited_once() {
        let source = "sub main()\n    a = [1, 2, {b: 3}]\n    print a[0].c(4)\nend sub\n";
        let mut parsed = Parser::new(source).unwrap().parse().unwrap();
        let mut recorder = Recorder::default();
        let root = parsed.ast.root();
        walk(&mut parsed.ast, root, &mut recorder);

        let entered = recorder.events.iter().filter(|e| e.starts_with('+')).count();
        assert_eq!(entered, parsed.ast.len());
    }
}
