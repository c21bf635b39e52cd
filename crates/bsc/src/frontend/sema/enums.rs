//! Enum member checks

use crate::common::{messages, DiagnosticSink};
use crate::frontend::ast::{Ast, NodeId, NodeKind};
use std::collections::HashSet;

use super::validator::literal_of;

const INTEGER: &str = "integer";

/// Check member names for duplicates and member values against the enum's value kind
pub(super) fn validate_enum(ast: &Ast, enum_node: NodeId, sink: &mut DiagnosticSink) {
    let NodeKind::Enum { members, .. } = ast.kind(enum_node) else {
        return;
    };
    let members: Vec<NodeId> = members
        .iter()
        .copied()
        .filter(|&m| matches!(ast.kind(m), NodeKind::EnumMember { .. }))
        .collect();

    let kind = value_kind(ast, &members);
    let mut seen = HashSet::new();

    for &member in &members {
        let NodeKind::EnumMember { name, value } = ast.kind(member) else {
            continue;
        };
        let value = *value;

        if !seen.insert(name.text.to_ascii_lowercase()) {
            sink.add(messages::duplicate_identifier(&name.text), Some(name.range));
        }

        let literal = value.and_then(|v| literal_of(ast, v));
        let range = literal
            .and_then(|(_, node)| ast.range(node))
            .or_else(|| ast.range(member));
        let mismatched = match (value, literal) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(_), Some((token_kind, _))) => token_kind.literal_type_name() != kind,
        };

        if kind == INTEGER {
            if mismatched {
                sink.add(messages::enum_value_must_be_type(kind), range);
            }
        } else if value.is_none() {
            sink.add(messages::enum_value_is_required(kind), range);
        } else if mismatched {
            sink.add(messages::enum_value_must_be_type(kind), range);
        }
    }
}

/// Literal kind of the first explicit value; integer when there is none or
/// when that value is not a literal
fn value_kind(ast: &Ast, members: &[NodeId]) -> &'static str {
    members
        .iter()
        .find_map(|&m| match ast.kind(m) {
            NodeKind::EnumMember { value: Some(value), .. } => Some(*value),
            _ => None,
        })
        .and_then(|value| literal_of(ast, value))
        .map_or(INTEGER, |(kind, _)| kind.literal_type_name())
}
