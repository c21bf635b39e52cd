//! Compilation driver
//!
//! [`Program`] owns every parsed file, runs the single-file validation pass
//! over each of them and hands back the diagnostics left after suppression.

mod brs_file;

pub use brs_file::{BrsFile, CommentFlag};

use crate::common::{CompileResult, Diagnostic, DiagnosticReporter, Severity};
use crate::frontend::{dump_symbols, CompileContext, FrontendConfig};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Program-wide options
#[derive(Debug, Clone, Default)]
pub struct ProgramConfig {
    pub frontend: FrontendConfig,
    /// Diagnostic codes dropped from every file
    pub ignore_codes: Vec<u32>,
    /// Diagnostic codes reported as warnings instead of errors
    pub warning_codes: Vec<u32>,
}

/// The set of files being compiled together
pub struct Program {
    config: ProgramConfig,
    reporter: DiagnosticReporter,
    files: Vec<BrsFile>,
    /// Reporter id of every path ever added, so re-adding reuses it
    file_ids: HashMap<PathBuf, usize>,
}

impl Program {
    pub fn new(config: ProgramConfig) -> Self {
        Self::with_reporter(config, DiagnosticReporter::new())
    }

    pub fn with_reporter(config: ProgramConfig, reporter: DiagnosticReporter) -> Self {
        Self {
            config,
            reporter,
            files: Vec::new(),
            file_ids: HashMap::new(),
        }
    }

    pub fn config(&self) -> &ProgramConfig {
        &self.config
    }

    pub fn reporter(&self) -> &DiagnosticReporter {
        &self.reporter
    }

    pub fn files(&self) -> &[BrsFile] {
        &self.files
    }

    pub fn file(&self, path: impl AsRef<Path>) -> Option<&BrsFile> {
        let path = path.as_ref();
        self.files.iter().find(|f| f.path == path)
    }

    /// Read and parse a file from disk
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> CompileResult<&BrsFile> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)?;
        self.add_file(path, source)
    }

    /// Parse `source` as the contents of `path`.
    ///
    /// Any earlier file with the same path is dropped first. Syntax errors
    /// are rendered through the program's reporter and returned; the path
    /// then has no file until it is added again.
    pub fn add_file(&mut self, path: impl AsRef<Path>, source: String) -> CompileResult<&BrsFile> {
        let path = path.as_ref();
        let filename = path.display().to_string();
        let file_id = match self.file_ids.get(path) {
            Some(&file_id) => {
                self.reporter.update_file(file_id, source.clone());
                file_id
            }
            None => {
                let file_id = self.reporter.add_file(filename.clone(), source.clone());
                self.file_ids.insert(path.to_path_buf(), file_id);
                file_id
            }
        };
        self.files.retain(|f| f.path != path);

        let ctx = CompileContext::new(filename, file_id, &self.reporter);
        let file = BrsFile::parse(path, source, &ctx, &self.config.frontend)?;

        self.files.push(file);
        let index = self.files.len() - 1;
        Ok(&self.files[index])
    }

    /// Validate every file. Files are independent, so each pass only
    /// touches its own tree and diagnostics.
    pub fn validate(&mut self) {
        for file in &mut self.files {
            debug!("validating {}", file.path.display());
            file.validate();
            if self.config.frontend.dump_symbols {
                eprintln!("=== Symbols: {} ===", file.path.display());
                eprint!("{}", dump_symbols(&file.ast));
                eprintln!("=== End Symbols ===\n");
            }
        }
    }

    /// Diagnostics of every file in file order, minus ignored codes and
    /// lines disabled by comment flags, with warning codes downgraded
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.files
            .iter()
            .flat_map(|file| {
                file.diagnostics()
                    .iter()
                    .filter(move |d| !file.is_suppressed(d))
            })
            .filter(|d| !self.config.ignore_codes.contains(&d.code))
            .cloned()
            .map(|d| {
                if self.config.warning_codes.contains(&d.code) {
                    d.with_severity(Severity::Warning)
                } else {
                    d
                }
            })
            .collect()
    }

    /// Render diagnostics to stderr
    pub fn report(&self, diagnostics: &[Diagnostic]) {
        for diagnostic in diagnostics {
            self.reporter.report(diagnostic);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::messages::codes;
    use codespan_reporting::term::termcolor::ColorChoice;

    fn program(config: ProgramConfig) -> Program {
        Program::with_reporter(config, DiagnosticReporter::with_color(ColorChoice::Never))
    }

    #[test]
    fn test_validate_collects_per_file_diagnostics() {
        let mut program = program(ProgramConfig::default());
        program
            .add_file("source/a.bs", "sub a()\n    continue\nend sub\n".to_string())
            .unwrap();
        program
            .add_file("source/b.bs", "x = 1\n".to_string())
            .unwrap();
        program.validate();

        let diagnostics = program.diagnostics();
        let found: Vec<(usize, u32)> = diagnostics.iter().map(|d| (d.file_id, d.code)).collect();
        assert_eq!(
            found,
            vec![
                (0, codes::ILLEGAL_CONTINUE_STATEMENT),
                (1, codes::UNEXPECTED_STATEMENT_OUTSIDE_FUNCTION),
            ]
        );
    }

    #[test]
    fn test_ignore_codes() {
        let config = ProgramConfig {
            ignore_codes: vec![codes::UNEXPECTED_STATEMENT_OUTSIDE_FUNCTION],
            ..Default::default()
        };
        let mut program = program(config);
        program.add_file("main.bs", "x = 1\n".to_string()).unwrap();
        program.validate();
        assert!(program.diagnostics().is_empty());
    }

    #[test]
    fn test_warning_codes() {
        let config = ProgramConfig {
            warning_codes: vec![codes::UNEXPECTED_STATEMENT_OUTSIDE_FUNCTION],
            ..Default::default()
        };
        let mut program = program(config);
        program
            .add_file("main.bs", "x = 1\nsub main()\n    continue\nend sub\n".to_string())
            .unwrap();
        program.validate();

        let found: Vec<(u32, Severity)> = program
            .diagnostics()
            .iter()
            .map(|d| (d.code, d.severity))
            .collect();
        assert_eq!(
            found,
            vec![
                (codes::ILLEGAL_CONTINUE_STATEMENT, Severity::Error),
                (codes::UNEXPECTED_STATEMENT_OUTSIDE_FUNCTION, Severity::Warning),
            ]
        );
        assert_eq!(program.files()[0].diagnostics()[1].severity, Severity::Error);
    }

    #[test]
    fn test_comment_flags_suppress() {
        let source = "sub main()\n    ' bs:disable-next-line\n    continue\n    continue ' bs:disable-line 1105\n    continue\nend sub\n";
        let mut program = program(ProgramConfig::default());
        program.add_file("main.bs", source.to_string()).unwrap();
        program.validate();

        let lines: Vec<u32> = program
            .diagnostics()
            .iter()
            .filter_map(|d| d.range.map(|r| r.start.line))
            .collect();
        assert_eq!(lines, vec![3, 4]);
        assert_eq!(program.files()[0].diagnostics().len(), 3);
    }

    #[test]
    fn test_typedef_flag() {
        let mut program = program(ProgramConfig::default());
        let file = program
            .add_file("source/lib.d.bs", "sub a()\nend sub\nimport \"x.bs\"\n".to_string())
            .unwrap();
        assert!(file.is_typedef);
        program.validate();
        assert!(program.diagnostics().is_empty());
    }

    #[test]
    fn test_syntax_error_is_returned() {
        let mut program = program(ProgramConfig::default());
        assert!(program.add_file("bad.bs", "sub (\n".to_string()).is_err());
        assert!(program.files().is_empty());
    }

    #[test]
    fn test_re_adding_replaces_file() {
        let mut program = program(ProgramConfig::default());
        program.add_file("main.bs", "x = 1\n".to_string()).unwrap();
        program.add_file("main.bs", "sub main()\nend sub\n".to_string()).unwrap();
        program.validate();
        assert_eq!(program.files().len(), 1);
        assert_eq!(program.files()[0].file_id, 0);
        assert_eq!(program.reporter().file_count(), 1);
        assert!(program.diagnostics().is_empty());
    }

    #[test]
    fn test_failed_re_add_drops_old_file() {
        let mut program = program(ProgramConfig::default());
        program.add_file("main.bs", "sub main()\nend sub\n".to_string()).unwrap();
        assert!(program.add_file("main.bs", "sub (\n".to_string()).is_err());
        assert!(program.file("main.bs").is_none());
        assert_eq!(program.reporter().file_count(), 1);

        let file = program
            .add_file("main.bs", "sub main()\n    a?.b = 1\nend sub\n".to_string())
            .unwrap();
        assert_eq!(file.file_id, 0);
        let other = program.add_file("other.bs", "x = 1\n".to_string()).unwrap();
        assert_eq!(other.file_id, 1);
        assert_eq!(program.reporter().file_count(), 2);

        program.validate();
        let diagnostics = program.diagnostics();
        let rendered = program.reporter().render(&diagnostics[0]);
        assert!(rendered.contains("main.bs:2:5"), "{rendered}");
        assert!(rendered.contains("a?.b = 1"), "{rendered}");
    }
}
