//! `continue` and `return` checks

use crate::common::{messages, DiagnosticSink};
use crate::frontend::ast::{Ast, NodeId, NodeKind};
use crate::frontend::lexer::TokenKind;

/// Only the innermost loop is compared against the stated loop type.
/// `for each` loops count as `for`.
pub(super) fn check_continue(ast: &Ast, node: NodeId, sink: &mut DiagnosticSink) {
    let NodeKind::Continue { loop_type, .. } = ast.kind(node) else {
        return;
    };

    let Some(enclosing) = ast.find_ancestor(node, |_, kind| kind.is_loop()) else {
        sink.add(messages::illegal_continue_statement(), ast.range(node));
        return;
    };

    let expected = match ast.kind(enclosing) {
        NodeKind::While { .. } => "while",
        _ => "for",
    };
    if let Some(loop_type) = loop_type {
        if !loop_type.text.eq_ignore_ascii_case(expected) {
            sink.add(messages::expected_token(expected), Some(loop_type.range));
        }
    }
}

/// A void function (`as void`, or a `sub` without a return type) may not
/// return a value and any other function must.
pub(super) fn check_return(ast: &Ast, node: NodeId, sink: &mut DiagnosticSink) {
    let NodeKind::Return { value, .. } = ast.kind(node) else {
        return;
    };
    let Some(func) =
        ast.find_ancestor(node, |_, kind| matches!(kind, NodeKind::FunctionExpression { .. }))
    else {
        return;
    };
    let NodeKind::FunctionExpression { function_type, return_type, .. } = ast.kind(func) else {
        return;
    };

    let is_void = match return_type {
        Some(token) => token.text.eq_ignore_ascii_case("void"),
        None => function_type.kind == TokenKind::Sub,
    };
    let keyword = function_type.text.to_ascii_lowercase();

    if is_void && value.is_some() {
        sink.add(messages::void_function_may_not_return_value(&keyword), ast.range(node));
    } else if !is_void && value.is_none() {
        sink.add(messages::non_void_function_must_return_value(&keyword), ast.range(node));
    }
}

#[cfg(test)]
mod tests {
    use crate::common::messages::codes;
    use crate::common::Range;
    use crate::frontend::sema::test_util::{codes as codes_of, validate_source};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_continue_mismatched_loop_type() {
        let (_, diagnostics) =
            validate_source("sub main()\n    while true\n        continue for\n    end while\nend sub\n");
        assert_eq!(codes_of(&diagnostics), vec![codes::EXPECTED_TOKEN]);
        assert_eq!(diagnostics[0].message, "expected token 'while'");
        assert_eq!(diagnostics[0].range, Some(Range::from_coords(2, 17, 2, 20)));
    }

    #[test]
    fn test_continue_matching_loop_types() {
        let source = "sub main()\n    for i = 0 to 10 step 2\n        continue FOR\n    end for\n    for each x in y\n        continue for\n    next\n    while true\n        continue\n    end while\nend sub\n";
        let (_, diagnostics) = validate_source(source);
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
    }

    #[test]
    fn test_continue_checks_innermost_loop_only() {
        let source = "sub main()\n    while true\n        for i = 0 to 1\n            continue while\n        end for\n    end while\nend sub\n";
        let (_, diagnostics) = validate_source(source);
        assert_eq!(codes_of(&diagnostics), vec![codes::EXPECTED_TOKEN]);
        assert_eq!(diagnostics[0].message, "expected token 'for'");
    }

    #[test]
    fn test_continue_outside_loop() {
        let (_, diagnostics) = validate_source("sub main()\n    continue while\nend sub\n");
        assert_eq!(codes_of(&diagnostics), vec![codes::ILLEGAL_CONTINUE_STATEMENT]);
        assert_eq!(diagnostics[0].range, Some(Range::from_coords(1, 4, 1, 18)));
    }

    #[test]
    fn test_return_values() {
        let source = "sub a()\n    return 1\nend sub\nfunction b() as void\n    return 2\nend function\nfunction c() as integer\n    return\nend function\nfunction d()\n    return\nend function\nsub e() as integer\n    return 5\nend sub\nsub f()\n    return\nend sub\n";
        let (_, diagnostics) = validate_source(source);
        assert_eq!(
            codes_of(&diagnostics),
            vec![
                codes::VOID_FUNCTION_MAY_NOT_RETURN_VALUE,
                codes::VOID_FUNCTION_MAY_NOT_RETURN_VALUE,
                codes::NON_VOID_FUNCTION_MUST_RETURN_VALUE,
                codes::NON_VOID_FUNCTION_MUST_RETURN_VALUE,
            ]
        );
        assert_eq!(diagnostics[0].message, "void sub may not return a value");
        assert_eq!(diagnostics[1].message, "void function may not return a value");
        assert_eq!(diagnostics[0].range, Some(Range::from_coords(1, 4, 1, 12)));
    }

    #[test]
    fn test_return_uses_nearest_function() {
        let source = "function outer() as object\n    handler = sub()\n        return\n    end sub\n    return handler\nend function\n";
        let (_, diagnostics) = validate_source(source);
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
    }
}
