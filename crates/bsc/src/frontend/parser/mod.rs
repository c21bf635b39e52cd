//! Parser producing the arena AST

mod parser;

pub use parser::{ParseResult, Parser, References};
