//! Optional chaining on the left-hand side of assignments

use crate::common::{messages, DiagnosticSink, Range};
use crate::frontend::ast::{Ast, NodeId, NodeKind};
use crate::frontend::lexer::TokenKind;

/// Report at most one diagnostic for a dotted-set or indexed-set statement
/// whose target chain uses `?.`, `?[` or `?.[` anywhere.
///
/// The chain is checked from the innermost object outwards, ending with
/// the statement itself.
pub(super) fn check_assignment_target(ast: &Ast, statement: NodeId, sink: &mut DiagnosticSink) {
    let mut chain = vec![statement];
    let mut current = statement;
    while let Some(obj) = target_object(ast.kind(current)) {
        chain.push(obj);
        current = obj;
    }

    let Some(&matched) = chain.iter().rev().find(|&&id| uses_optional_chaining(ast.kind(id)))
    else {
        return;
    };

    let range = left_hand_side_range(ast, statement).or_else(|| ast.range(matched));
    sink.add(messages::no_optional_chaining_in_left_hand_side_of_assignment(), range);
}

/// Next object down the target chain
fn target_object(kind: &NodeKind) -> Option<NodeId> {
    match kind {
        NodeKind::DottedSet { obj, .. }
        | NodeKind::IndexedSet { obj, .. }
        | NodeKind::DottedGet { obj, .. }
        | NodeKind::IndexedGet { obj, .. } => Some(*obj),
        NodeKind::Call { callee, .. } | NodeKind::Callfunc { callee, .. } => Some(*callee),
        NodeKind::Grouping { expression } => Some(*expression),
        _ => None,
    }
}

fn uses_optional_chaining(kind: &NodeKind) -> bool {
    match kind {
        NodeKind::DottedGet { dot, .. } | NodeKind::DottedSet { dot, .. } => {
            dot.kind == TokenKind::QuestionDot
        }
        NodeKind::IndexedGet { question_dot, open_square, .. }
        | NodeKind::IndexedSet { question_dot, open_square, .. } => {
            question_dot.is_some() || open_square.kind == TokenKind::QuestionLeftSquare
        }
        _ => false,
    }
}

/// `obj.name` or `obj[indexes]` without the assigned value
fn left_hand_side_range(ast: &Ast, statement: NodeId) -> Option<Range> {
    match ast.kind(statement) {
        NodeKind::DottedSet { obj, dot, name, .. } => {
            Range::bounding([ast.range(*obj), Some(dot.range), Some(name.range)])
        }
        NodeKind::IndexedSet { obj, open_square, indexes, close_square, .. } => Range::bounding(
            [ast.range(*obj), Some(open_square.range)]
                .into_iter()
                .chain(indexes.iter().map(|&i| ast.range(i)))
                .chain(std::iter::once(close_square.as_ref().map(|t| t.range))),
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crate::common::messages::codes;
    use crate::common::Range;
    use crate::frontend::sema::test_util::{codes as codes_of, validate_source};
    use pretty_assertions::assert_eq;

    fn in_sub(body: &str) -> String {
        format!("sub main()\n{body}\nend sub\n")
    }

    #[test]
    fn test_safe_dot_on_target() {
        let (_, diagnostics) = validate_source(&in_sub("a?.b = 1"));
        assert_eq!(
            codes_of(&diagnostics),
            vec![codes::NO_OPTIONAL_CHAINING_IN_LEFT_HAND_SIDE_OF_ASSIGNMENT]
        );
        assert_eq!(diagnostics[0].range, Some(Range::from_coords(1, 0, 1, 4)));
    }

    #[test]
    fn test_safe_navigation_deep_in_chain() {
        let (_, diagnostics) = validate_source(&in_sub("a?.b.c.d = 1"));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].range, Some(Range::from_coords(1, 0, 1, 8)));

        let (_, diagnostics) = validate_source(&in_sub("a?[0].b = 1"));
        assert_eq!(diagnostics.len(), 1);

        let (_, diagnostics) = validate_source(&in_sub("a.b?.[0] = 1"));
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_safe_index_on_target() {
        let (_, diagnostics) = validate_source(&in_sub("list?[1] = 2"));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].range, Some(Range::from_coords(1, 0, 1, 8)));
    }

    #[test]
    fn test_plain_targets_and_safe_values() {
        let (_, diagnostics) = validate_source(&in_sub("a.b[0].c = x?.y\n    a[1] = z?[2]"));
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
    }

    #[test]
    fn test_deep_chain_does_not_recurse() {
        let chain = vec!["b"; 5000].join(".");
        let (_, diagnostics) = validate_source(&in_sub(&format!("a?.{chain} = 1")));
        assert_eq!(diagnostics.len(), 1);
    }
}
