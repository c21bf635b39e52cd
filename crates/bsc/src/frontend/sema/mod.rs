//! Semantic validation module
//!
//! A single walk over one file's tree fills the symbol tables of its scopes
//! and reports structural rule violations as diagnostics. Nothing here
//! resolves names; lookups belong to later, program-wide passes.

mod assignment;
mod control_flow;
mod enums;
mod placement;
mod symbol_table;
mod top_level;
mod validator;

pub use symbol_table::{SymbolEntry, SymbolTable};
pub use validator::SemanticValidator;

/// Most arguments a callfunc (`@.`) call may pass
pub const MAX_CALLFUNC_ARGUMENTS: usize = 5;

/// Most parameters a function may declare
pub const MAX_CALLABLE_PARAMETERS: usize = 32;

#[cfg(test)]
pub(crate) mod test_util {
    use crate::common::{Diagnostic, DiagnosticSink};
    use crate::frontend::ast::Ast;
    use crate::frontend::parser::Parser;

    use super::SemanticValidator;

    /// Parse and validate `source`, returning the tree and its diagnostics
    pub fn validate_source(source: &str) -> (Ast, Vec<Diagnostic>) {
        let mut parsed = Parser::new(source).unwrap().parse().unwrap();
        let mut sink = DiagnosticSink::new(0);
        SemanticValidator::new(&mut sink).validate(&mut parsed.ast, &parsed.references, false);
        (parsed.ast, sink.as_slice().to_vec())
    }

    pub fn codes(diagnostics: &[Diagnostic]) -> Vec<u32> {
        diagnostics.iter().map(|d| d.code).collect()
    }
}
