//! File-level statement rules

use crate::common::{messages, DiagnosticSink};
use crate::frontend::ast::{Ast, NodeId, NodeKind};
use crate::frontend::parser::References;
use std::collections::HashSet;

/// Flag statements at the root, or directly in any namespace body, that
/// may only appear inside a function.
pub(super) fn check_top_level_statements(ast: &Ast, sink: &mut DiagnosticSink) {
    let mut stack: Vec<NodeId> = ast.statements().iter().rev().copied().collect();

    while let Some(statement) = stack.pop() {
        match ast.kind(statement) {
            NodeKind::Namespace { body, .. } => {
                if let NodeKind::Body { statements } = ast.kind(*body) {
                    stack.extend(statements.iter().rev().copied());
                }
            }
            kind if is_allowed_at_top_level(kind) => {}
            _ => sink.add(messages::unexpected_statement_outside_function(), ast.range(statement)),
        }
    }
}

fn is_allowed_at_top_level(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Comment { .. }
            | NodeKind::Function { .. }
            | NodeKind::Class { .. }
            | NodeKind::Enum { .. }
            | NodeKind::Interface { .. }
            | NodeKind::Library { .. }
            | NodeKind::Import { .. }
            | NodeKind::Const { .. }
            | NodeKind::ConditionalCompileConst { .. }
            | NodeKind::ConditionalCompileError { .. }
            | NodeKind::ConditionalCompile { .. }
            | NodeKind::Typecast { .. }
            | NodeKind::Alias { .. }
    )
}

/// Every library and import statement must be part of the run of
/// directives (and comments) the file starts with.
pub(super) fn check_directive_order(ast: &Ast, references: &References, sink: &mut DiagnosticSink) {
    let mut leading = HashSet::new();
    for &statement in ast.statements() {
        match ast.kind(statement) {
            NodeKind::Comment { .. } => {}
            NodeKind::Library { .. } | NodeKind::Import { .. } => {
                leading.insert(statement);
            }
            _ => break,
        }
    }

    for &library in &references.library_statements {
        if !leading.contains(&library) {
            sink.add(messages::library_statement_must_be_declared_at_top_of_file(), ast.range(library));
        }
    }
    for &import in &references.import_statements {
        if !leading.contains(&import) {
            sink.add(messages::import_statement_must_be_declared_at_top_of_file(), ast.range(import));
        }
    }
}
