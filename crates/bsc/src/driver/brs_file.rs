//! Per-file compilation state

use crate::common::{CompileResult, Diagnostic, DiagnosticSink};
use crate::frontend::{
    parse_source, Ast, CompileContext, FrontendConfig, References, SemanticValidator, Token,
    TokenKind,
};
use std::path::{Path, PathBuf};
use tracing::trace;

const NEXT_LINE: &str = "bs:disable-next-line";
const SAME_LINE: &str = "bs:disable-line";

/// Suppression requested by a `bs:disable-line` or `bs:disable-next-line` comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentFlag {
    /// 0-based line the flag applies to
    pub affected_line: u32,
    /// Suppressed codes; `None` suppresses everything
    pub codes: Option<Vec<u32>>,
}

impl CommentFlag {
    /// Parse a comment token, returning `None` for ordinary comments
    pub fn from_comment(token: &Token) -> Option<Self> {
        let text = comment_body(&token.text).trim();
        let line = token.range.start.line;
        let (rest, affected_line) = if let Some(rest) = strip_prefix_ignore_case(text, NEXT_LINE) {
            (rest, line + 1)
        } else if let Some(rest) = strip_prefix_ignore_case(text, SAME_LINE) {
            (rest, line)
        } else {
            return None;
        };

        let rest = match rest.strip_prefix(':') {
            Some(rest) => rest,
            None if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest,
            None => return None,
        };

        let codes: Vec<u32> = rest
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|part| !part.is_empty())
            .filter_map(parse_code)
            .collect();

        Some(Self {
            affected_line,
            codes: if codes.is_empty() { None } else { Some(codes) },
        })
    }

    pub fn suppresses(&self, diagnostic: &Diagnostic) -> bool {
        let Some(range) = diagnostic.range else {
            return false;
        };
        if range.start.line != self.affected_line {
            return false;
        }
        match &self.codes {
            None => true,
            Some(codes) => codes.contains(&diagnostic.code),
        }
    }
}

fn comment_body(text: &str) -> &str {
    text.strip_prefix('\'')
        .or_else(|| strip_prefix_ignore_case(text, "rem"))
        .unwrap_or(text)
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &text[prefix.len()..])
}

/// `1106` or `BS1106`
fn parse_code(part: &str) -> Option<u32> {
    let digits = strip_prefix_ignore_case(part, "bs").unwrap_or(part);
    digits.parse().ok()
}

/// One parsed source file and its diagnostics
pub struct BrsFile {
    pub path: PathBuf,
    pub source: String,
    pub file_id: usize,
    pub tokens: Vec<Token>,
    pub ast: Ast,
    pub references: References,
    /// Type declaration file (`.d.bs`)
    pub is_typedef: bool,
    diagnostics: DiagnosticSink,
    comment_flags: Vec<CommentFlag>,
}

impl BrsFile {
    /// Parse `ctx`'s file, reporting syntax errors through its reporter
    pub fn parse(
        path: impl AsRef<Path>,
        source: String,
        ctx: &CompileContext,
        config: &FrontendConfig,
    ) -> CompileResult<Self> {
        let path = path.as_ref().to_path_buf();
        let parsed = parse_source(&source, ctx, config)?;

        let comment_flags: Vec<CommentFlag> = parsed
            .tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Comment)
            .filter_map(CommentFlag::from_comment)
            .collect();
        trace!(flags = comment_flags.len(), "comment flags in {}", path.display());

        let is_typedef = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.to_ascii_lowercase().ends_with(".d.bs"));

        Ok(Self {
            path,
            source,
            file_id: ctx.file_id,
            tokens: parsed.tokens,
            ast: parsed.ast,
            references: parsed.references,
            is_typedef,
            diagnostics: DiagnosticSink::new(ctx.file_id),
            comment_flags,
        })
    }

    /// Run the single-file validation pass, replacing earlier results
    pub fn validate(&mut self) {
        SemanticValidator::new(&mut self.diagnostics).validate(
            &mut self.ast,
            &self.references,
            self.is_typedef,
        );
    }

    /// Everything the last validation produced, before suppression
    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.diagnostics.as_slice()
    }

    pub fn comment_flags(&self) -> &[CommentFlag] {
        &self.comment_flags
    }

    pub fn is_suppressed(&self, diagnostic: &Diagnostic) -> bool {
        self.comment_flags.iter().any(|flag| flag.suppresses(diagnostic))
    }
}
