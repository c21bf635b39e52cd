//! Lexer implementation using logos

use super::token::{Token, TokenKind};
use crate::common::{CompileError, CompileResult, Position, Range};
use logos::Logos;

/// Lexer for BrighterScript source code
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
    /// Byte offset of the first character of every line
    line_starts: Vec<usize>,
    at_eof: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code
    pub fn new(source: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            inner: TokenKind::lexer(source),
            line_starts,
            at_eof: false,
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> CompileResult<Token> {
        if self.at_eof {
            let end = self.position(self.inner.source().len());
            return Ok(Token::new(TokenKind::Eof, "", Range::new(end, end)));
        }

        match self.inner.next() {
            Some(Ok(kind)) => {
                let span = self.inner.span();
                Ok(Token::new(kind, self.inner.slice(), self.range(span)))
            }
            Some(Err(())) => {
                let span = self.inner.span();
                let slice = self.inner.slice();
                let message = if slice.starts_with('"') {
                    "unterminated string literal".to_string()
                } else {
                    format!("unexpected character '{}'", slice)
                };
                Err(CompileError::lexer(message, self.range(span)))
            }
            None => {
                self.at_eof = true;
                let end = self.position(self.inner.source().len());
                Ok(Token::new(TokenKind::Eof, "", Range::new(end, end)))
            }
        }
    }

    /// Tokenize the entire source and return all tokens, ending with `Eof`
    pub fn tokenize_all(mut self) -> CompileResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    /// Get the source being lexed
    pub fn source(&self) -> &'a str {
        self.inner.source()
    }

    fn range(&self, span: std::ops::Range<usize>) -> Range {
        Range::new(self.position(span.start), self.position(span.end))
    }

    fn position(&self, offset: usize) -> Position {
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        Position::new(line as u32, (offset - self.line_starts[line]) as u32)
    }
}
