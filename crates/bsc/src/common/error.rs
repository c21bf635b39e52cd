//! Error types and diagnostic reporting

use codespan_reporting::diagnostic::{Diagnostic as Report, Label, Severity as ReportSeverity};
use codespan_reporting::files::{Error as FilesError, Files, SimpleFile};
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{Buffer, ColorChoice, StandardStream, WriteColor};
use thiserror::Error;
use super::{Diagnostic, Position, Range, Severity};

/// Failure of the collaborators around the validator (I/O, lexing, parsing).
///
/// Rule violations found during validation are [`Diagnostic`]s, not errors.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Lexer error at {range}: {message}")]
    Lexer { message: String, range: Range },

    #[error("Parser error at {range}: {message}")]
    Parser { message: String, range: Range },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompileError {
    pub fn lexer(message: impl Into<String>, range: Range) -> Self {
        Self::Lexer {
            message: message.into(),
            range,
        }
    }

    pub fn parser(message: impl Into<String>, range: Range) -> Self {
        Self::Parser {
            message: message.into(),
            range,
        }
    }
}

pub type CompileResult<T> = Result<T, CompileError>;

/// Registered sources, addressed by file id. Unlike `SimpleFiles`, a
/// file's text can be swapped when the same path is added again.
#[derive(Default)]
struct SourceFiles {
    files: Vec<SimpleFile<String, String>>,
}

impl SourceFiles {
    fn get(&self, file_id: usize) -> Result<&SimpleFile<String, String>, FilesError> {
        self.files.get(file_id).ok_or(FilesError::FileMissing)
    }
}

impl<'a> Files<'a> for SourceFiles {
    type FileId = usize;
    type Name = String;
    type Source = &'a str;

    fn name(&'a self, file_id: usize) -> Result<String, FilesError> {
        Ok(self.get(file_id)?.name().clone())
    }

    fn source(&'a self, file_id: usize) -> Result<&'a str, FilesError> {
        Ok(self.get(file_id)?.source().as_str())
    }

    fn line_index(&'a self, file_id: usize, byte_index: usize) -> Result<usize, FilesError> {
        self.get(file_id)?.line_index((), byte_index)
    }

    fn line_range(
        &'a self,
        file_id: usize,
        line_index: usize,
    ) -> Result<std::ops::Range<usize>, FilesError> {
        self.get(file_id)?.line_range((), line_index)
    }
}

/// Diagnostic reporter for pretty error output
pub struct DiagnosticReporter {
    files: SourceFiles,
    writer: StandardStream,
    config: term::Config,
}

impl DiagnosticReporter {
    pub fn new() -> Self {
        Self::with_color(ColorChoice::Auto)
    }

    pub fn with_color(color: ColorChoice) -> Self {
        Self {
            files: SourceFiles::default(),
            writer: StandardStream::stderr(color),
            config: term::Config::default(),
        }
    }

    pub fn add_file(&mut self, name: impl Into<String>, source: impl Into<String>) -> usize {
        self.files.files.push(SimpleFile::new(name.into(), source.into()));
        self.files.files.len() - 1
    }

    /// Replace the text of an already registered file, keeping its id and name.
    /// Returns `false` for an unknown id.
    pub fn update_file(&mut self, file_id: usize, source: impl Into<String>) -> bool {
        let Some(file) = self.files.files.get_mut(file_id) else {
            return false;
        };
        *file = SimpleFile::new(file.name().clone(), source.into());
        true
    }

    pub fn file_count(&self) -> usize {
        self.files.files.len()
    }

    pub fn report_error(&self, file_id: usize, error: &CompileError) {
        let report = self.error_report(file_id, error);
        self.emit(&report);
    }

    pub fn report(&self, diagnostic: &Diagnostic) {
        let report = self.diagnostic_report(diagnostic);
        self.emit(&report);
    }

    /// Render a diagnostic without colors, as it would appear on stderr
    pub fn render(&self, diagnostic: &Diagnostic) -> String {
        let report = self.diagnostic_report(diagnostic);
        let mut buffer = Buffer::no_color();
        let _ = term::emit(&mut buffer, &self.config, &self.files, &report);
        String::from_utf8_lossy(buffer.as_slice()).into_owned()
    }

    fn emit(&self, report: &Report<usize>) {
        let mut out = self.writer.lock();
        let _ = term::emit(&mut out, &self.config, &self.files, report);
        let _ = out.reset();
    }

    fn error_report(&self, file_id: usize, error: &CompileError) -> Report<usize> {
        match error {
            CompileError::Lexer { message, range } => Report::error()
                .with_message("Lexer error")
                .with_labels(vec![
                    Label::primary(file_id, self.byte_range(file_id, *range)).with_message(message)
                ]),

            CompileError::Parser { message, range } => Report::error()
                .with_message("Syntax error")
                .with_labels(vec![
                    Label::primary(file_id, self.byte_range(file_id, *range)).with_message(message)
                ]),

            CompileError::Io(err) => {
                Report::error().with_message(format!("IO error: {}", err))
            }
        }
    }

    fn diagnostic_report(&self, diagnostic: &Diagnostic) -> Report<usize> {
        let severity = match diagnostic.severity {
            Severity::Error => ReportSeverity::Error,
            Severity::Warning => ReportSeverity::Warning,
            Severity::Information => ReportSeverity::Note,
            Severity::Hint => ReportSeverity::Help,
        };

        let mut report = Report::new(severity)
            .with_code(format!("BS{}", diagnostic.code))
            .with_message(diagnostic.message.clone());

        if let Some(range) = diagnostic.range {
            report = report.with_labels(vec![Label::primary(
                diagnostic.file_id,
                self.byte_range(diagnostic.file_id, range),
            )]);
        }
        report
    }

    /// Convert a line/column range into byte offsets using the file's line table
    fn byte_range(&self, file_id: usize, range: Range) -> std::ops::Range<usize> {
        let start = self.offset(file_id, range.start);
        let end = self.offset(file_id, range.end).max(start);
        start..end
    }

    fn offset(&self, file_id: usize, position: Position) -> usize {
        match self.files.line_range(file_id, position.line as usize) {
            Ok(line) => (line.start + position.column as usize).min(line.end),
            Err(_) => self
                .files
                .get(file_id)
                .map(|file| file.source().len())
                .unwrap_or(0),
        }
    }
}

impl Default for DiagnosticReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{DiagnosticSink, DiagnosticTemplate};

    #[test]
    fn test_render_points_at_range() {
        let mut reporter = DiagnosticReporter::with_color(ColorChoice::Never);
        let file_id = reporter.add_file("source/main.bs", "sub main()\n    a?.b = 1\nend sub\n");

        let mut sink = DiagnosticSink::new(file_id);
        sink.add(
            DiagnosticTemplate::error(1109, "no optional chaining"),
            Some(Range::from_coords(1, 4, 1, 8)),
        );

        let rendered = reporter.render(&sink.as_slice()[0]);
        assert!(rendered.contains("BS1109"), "{rendered}");
        assert!(rendered.contains("source/main.bs:2:5"), "{rendered}");
    }

    #[test]
    fn test_offset_past_end_is_clamped() {
        let mut reporter = DiagnosticReporter::with_color(ColorChoice::Never);
        let file_id = reporter.add_file("a.brs", "x = 1\n");
        let range = reporter.byte_range(file_id, Range::from_coords(0, 2, 0, 80));
        assert_eq!(range, 2..6);
    }

    #[test]
    fn test_update_file_swaps_source() {
        let mut reporter = DiagnosticReporter::with_color(ColorChoice::Never);
        let file_id = reporter.add_file("main.bs", "x = 1\n");
        assert!(reporter.update_file(file_id, "sub main()\n    a?.b = 1\nend sub\n"));
        assert!(!reporter.update_file(file_id + 1, ""));
        assert_eq!(reporter.file_count(), 1);

        let mut sink = DiagnosticSink::new(file_id);
        sink.add(
            DiagnosticTemplate::error(1109, "no optional chaining"),
            Some(Range::from_coords(1, 4, 1, 8)),
        );
        let rendered = reporter.render(&sink.as_slice()[0]);
        assert!(rendered.contains("main.bs:2:5"), "{rendered}");
        assert!(rendered.contains("a?.b = 1"), "{rendered}");
    }
}
