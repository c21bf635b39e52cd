//! BrighterScript front end
//!
//! The front end is responsible for:
//! 1. Lexing source code into tokens
//! 2. Parsing tokens into an arena AST
//! 3. Validating each file on its own, filling its symbol tables

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod sema;

use crate::common::{CompileResult, DiagnosticReporter};
use std::fmt::Write as _;
use tracing::debug;

pub use ast::Ast;
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{ParseResult, Parser, References};
pub use sema::{SemanticValidator, SymbolEntry, SymbolTable};

/// Configuration options passed to the front end
#[derive(Debug, Clone, Default)]
pub struct FrontendConfig {
    pub dump_tokens: bool,
    pub dump_ast: bool,
    pub dump_symbols: bool,
}

/// Where a file being compiled came from
pub struct CompileContext<'a> {
    pub filename: String,
    pub file_id: usize,
    pub reporter: &'a DiagnosticReporter,
}

impl<'a> CompileContext<'a> {
    pub fn new(filename: String, file_id: usize, reporter: &'a DiagnosticReporter) -> Self {
        Self { filename, file_id, reporter }
    }
}

/// Tokenize and parse one file, honouring the dump flags.
///
/// Lexer and parser errors are rendered through the context's reporter
/// before being returned.
pub fn parse_source(
    source: &str,
    ctx: &CompileContext,
    config: &FrontendConfig,
) -> CompileResult<ParseResult> {
    if config.dump_tokens {
        match Lexer::new(source).tokenize_all() {
            Ok(tokens) => {
                eprintln!("=== Tokens: {} ===", ctx.filename);
                for token in &tokens {
                    eprintln!("{:?} {:?} @ {}", token.kind, token.text, token.range);
                }
                eprintln!("=== End Tokens ===\n");
            }
            Err(e) => {
                ctx.reporter.report_error(ctx.file_id, &e);
                return Err(e);
            }
        }
    }

    debug!("parsing {}", ctx.filename);
    let result = Parser::new(source).and_then(Parser::parse);
    let parsed = match result {
        Ok(parsed) => parsed,
        Err(e) => {
            ctx.reporter.report_error(ctx.file_id, &e);
            return Err(e);
        }
    };
    debug!(
        nodes = parsed.ast.len(),
        libraries = parsed.references.library_statements.len(),
        imports = parsed.references.import_statements.len(),
        "parsed {}",
        ctx.filename
    );

    if config.dump_ast {
        eprintln!("=== AST: {} ===", ctx.filename);
        eprint!("{}", parsed.ast.dump());
        eprintln!("=== End AST ===\n");
    }

    Ok(parsed)
}

/// Every scope that owns a symbol table, with its entries
pub fn dump_symbols(ast: &Ast) -> String {
    let mut out = String::new();
    for (scope, table) in ast.scopes() {
        let node = ast.node(scope);
        let _ = write!(out, "{} #{}", node.kind.name(), scope.index());
        if let Some(range) = node.range {
            let _ = write!(out, " @ {}", range);
        }
        if let Some(parent) = table.parent() {
            let _ = write!(out, " (parent #{})", parent.index());
        }
        out.push('\n');
        for entry in table.entries() {
            let _ = writeln!(out, "  {}: {}", entry.name, entry.ty);
        }
    }
    out
}
