//! BSC - BrighterScript compiler front end
//!
//! This library parses BrighterScript source files and runs the single-file
//! semantic validation pass over them.
//!
//! ## Architecture
//!
//! The compiler is organized into:
//! - **Frontend** (`frontend/`): lexing, parsing and per-file validation
//! - **Driver** (`driver/`): per-file state and the program orchestrator
//! - **Common** (`common/`): ranges, errors, diagnostics and their catalogue
//! - **Types** (`types/`): types recorded in symbol tables

pub mod common;
pub mod types;
pub mod frontend;
pub mod driver;

// Re-exports for convenience
pub use common::{CompileError, CompileResult, Diagnostic, DiagnosticReporter, Range, Severity};
pub use driver::{BrsFile, Program, ProgramConfig};
pub use frontend::{FrontendConfig, SemanticValidator};
