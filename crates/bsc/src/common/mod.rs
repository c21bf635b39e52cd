//! Common infrastructure shared across the front end and the driver

mod diagnostic;
mod error;
pub mod messages;
mod range;

pub use diagnostic::{Diagnostic, DiagnosticSink, DiagnosticTemplate, Severity};
pub use error::{CompileError, CompileResult, DiagnosticReporter};
pub use range::{Position, Range};
