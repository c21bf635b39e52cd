//! Validation diagnostics and the per-file diagnostic sink

use super::Range;
use std::fmt;

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Error,
    Warning,
    Information,
    Hint,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Information => write!(f, "info"),
            Severity::Hint => write!(f, "hint"),
        }
    }
}

/// Code, message and severity of a diagnostic, without a location.
///
/// Produced by the constructors in [`messages`](super::messages) and turned
/// into a [`Diagnostic`] once a range is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticTemplate {
    pub code: u32,
    pub message: String,
    pub severity: Severity,
}

impl DiagnosticTemplate {
    pub fn error(code: u32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            severity: Severity::Error,
        }
    }
}

impl Diagnostic {
    /// Same diagnostic reported at another severity
    pub fn with_severity(self, severity: Severity) -> Self {
        Self { severity, ..self }
    }
}

/// A located diagnostic attached to one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: u32,
    pub message: String,
    pub range: Option<Range>,
    pub severity: Severity,
    pub file_id: usize,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.range {
            Some(range) => write!(
                f,
                "{} BS{} at {}: {}",
                self.severity, self.code, range.start, self.message
            ),
            None => write!(f, "{} BS{}: {}", self.severity, self.code, self.message),
        }
    }
}

/// Append-only diagnostic collection for a single file.
///
/// Insertion order is preserved and nothing is deduplicated.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticSink {
    file_id: usize,
    items: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new(file_id: usize) -> Self {
        Self {
            file_id,
            items: Vec::new(),
        }
    }

    pub fn file_id(&self) -> usize {
        self.file_id
    }

    pub fn add(&mut self, template: DiagnosticTemplate, range: Option<Range>) {
        self.items.push(Diagnostic {
            code: template.code,
            message: template.message,
            range,
            severity: template.severity,
            file_id: self.file_id,
        });
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_preserves_order_and_duplicates() {
        let mut sink = DiagnosticSink::new(3);
        let range = Range::from_coords(0, 0, 0, 1);
        sink.add(DiagnosticTemplate::error(1, "first"), Some(range));
        sink.add(DiagnosticTemplate::error(1, "first"), Some(range));
        sink.add(DiagnosticTemplate::error(2, "second"), None);

        let codes: Vec<u32> = sink.iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![1, 1, 2]);
        assert!(sink.iter().all(|d| d.file_id == 3));

        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_with_severity_keeps_the_rest() {
        let mut sink = DiagnosticSink::new(1);
        sink.add(DiagnosticTemplate::error(1110, "outside"), None);
        let warning = sink.as_slice()[0].clone().with_severity(Severity::Warning);
        assert_eq!(warning.severity, Severity::Warning);
        assert_eq!(warning.code, 1110);
        assert_eq!(warning.to_string(), "warning BS1110: outside");
    }

    #[test]
    fn test_display_without_range() {
        let mut sink = DiagnosticSink::new(0);
        sink.add(DiagnosticTemplate::error(1106, "oops"), None);
        assert_eq!(sink.as_slice()[0].to_string(), "error BS1106: oops");
    }
}
