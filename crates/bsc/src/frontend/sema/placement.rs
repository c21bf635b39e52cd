//! Declaration placement

use crate::common::{messages, DiagnosticSink, Range};
use crate::frontend::ast::{Ast, NodeId, NodeKind};
use crate::frontend::lexer::Token;

/// Report `node` unless it sits directly in a namespace body or the root body.
///
/// The diagnostic spans the keyword through the name, or the whole
/// statement when neither has a range.
pub(super) fn check(
    ast: &Ast,
    node: NodeId,
    parent: Option<NodeId>,
    keyword: &Token,
    name_range: Option<Range>,
    sink: &mut DiagnosticSink,
) {
    if is_namespace_level(ast, parent) {
        return;
    }
    let range = Range::bounding([Some(keyword.range), name_range]).or_else(|| ast.range(node));
    sink.add(
        messages::keyword_must_be_declared_at_namespace_level(&keyword.text.to_ascii_lowercase()),
        range,
    );
}

fn is_namespace_level(ast: &Ast, parent: Option<NodeId>) -> bool {
    let Some(parent) = parent else {
        return false;
    };
    if !matches!(ast.kind(parent), NodeKind::Body { .. }) {
        return false;
    }
    match ast.parent(parent) {
        None => true,
        Some(grandparent) => matches!(ast.kind(grandparent), NodeKind::Namespace { .. }),
    }
}
