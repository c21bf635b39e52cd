//! Recursive descent parser for BrighterScript
//!
//! Statements are separated by newlines or `:`. Block terminators accept both
//! the two-word (`end sub`) and, where the language has one, the one-word
//! (`endsub`) spelling. There is no error recovery: the first syntax error
//! ends the parse.

use crate::common::{CompileError, CompileResult, Range};
use crate::frontend::ast::{Ast, InterfaceParam, NodeId, NodeKind};
use crate::frontend::lexer::{Lexer, Token, TokenKind};

/// Library and import statements found anywhere in a file
#[derive(Debug, Clone, Default)]
pub struct References {
    pub library_statements: Vec<NodeId>,
    pub import_statements: Vec<NodeId>,
}

/// Everything the parser hands to the rest of the front end
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub ast: Ast,
    pub references: References,
    pub tokens: Vec<Token>,
}

/// Recursive descent parser
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    ast: Ast,
    references: References,
}

impl Parser {
    /// Tokenize `source` and prepare to parse it
    pub fn new(source: &str) -> CompileResult<Self> {
        let tokens = Lexer::new(source).tokenize_all()?;
        Ok(Self {
            tokens,
            pos: 0,
            ast: Ast::new(),
            references: References::default(),
        })
    }

    /// Parse a complete file
    pub fn parse(mut self) -> CompileResult<ParseResult> {
        let statements = self.parse_statements(|_| false)?;
        let range = Range::bounding(statements.iter().map(|&s| self.ast.range(s)));
        let root = self.ast.root();
        self.ast.replace(root, NodeKind::Body { statements }, range);

        Ok(ParseResult {
            ast: self.ast,
            references: self.references,
            tokens: self.tokens,
        })
    }

    // =========================================================================
    // Helper methods
    // =========================================================================

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_kind(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map_or(TokenKind::Eof, |t| t.kind)
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn match_token(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    fn expect(&mut self, kind: TokenKind) -> CompileResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("expected {}, found {}", kind, self.current().kind)))
        }
    }

    fn expect_identifier(&mut self, what: &str) -> CompileResult<Token> {
        if self.check(TokenKind::Identifier) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("expected {}, found {}", what, self.current().kind)))
        }
    }

    /// Identifier, or a keyword used as a name (property names, `sub new()`)
    fn expect_identifier_like(&mut self, what: &str) -> CompileResult<Token> {
        let kind = self.current().kind;
        if kind == TokenKind::Identifier || kind.is_keyword() {
            let mut token = self.advance();
            token.kind = TokenKind::Identifier;
            Ok(token)
        } else {
            Err(self.error(format!("expected {}, found {}", what, kind)))
        }
    }

    fn error(&self, message: impl Into<String>) -> CompileError {
        CompileError::parser(message, self.current().range)
    }

    fn range_of(&self, id: NodeId) -> Option<Range> {
        self.ast.range(id)
    }

    fn skip_separators(&mut self) {
        while matches!(self.current().kind, TokenKind::Newline | TokenKind::Colon) {
            self.advance();
        }
    }

    /// Newlines and comments inside brackets are insignificant
    fn skip_newlines(&mut self) {
        while matches!(self.current().kind, TokenKind::Newline | TokenKind::Comment) {
            self.advance();
        }
    }

    fn at_line_end(&self) -> bool {
        matches!(
            self.current().kind,
            TokenKind::Newline | TokenKind::Comment | TokenKind::Eof
        )
    }

    /// Where an optional trailing expression (`return`, `print`) stops
    fn at_expression_end(&self) -> bool {
        matches!(
            self.current().kind,
            TokenKind::Newline
                | TokenKind::Colon
                | TokenKind::Comment
                | TokenKind::Eof
                | TokenKind::Else
        )
    }

    /// `end <kind>` or the single-word form
    fn check_end(&self, kind: TokenKind, single: Option<TokenKind>) -> bool {
        (self.check(TokenKind::End) && self.peek_kind(1) == kind)
            || single.is_some_and(|s| self.check(s))
    }

    fn expect_end(
        &mut self,
        kind: TokenKind,
        single: Option<TokenKind>,
        what: &str,
    ) -> CompileResult<Range> {
        if let Some(s) = single {
            if let Some(token) = self.match_token(s) {
                return Ok(token.range);
            }
        }
        if self.check(TokenKind::End) && self.peek_kind(1) == kind {
            let end = self.advance();
            let keyword = self.advance();
            return Ok(end.range.merge(keyword.range));
        }
        Err(self.error(format!("expected '{}', found {}", what, self.current().kind)))
    }

    fn check_end_for(&self) -> bool {
        self.check_end(TokenKind::For, Some(TokenKind::EndFor)) || self.check(TokenKind::Next)
    }

    fn expect_end_for(&mut self) -> CompileResult<Range> {
        if let Some(next) = self.match_token(TokenKind::Next) {
            let counter = self.match_token(TokenKind::Identifier);
            return Ok(next.range.merge(counter.map_or(next.range, |t| t.range)));
        }
        self.expect_end(TokenKind::For, Some(TokenKind::EndFor), "end for")
    }

    fn check_hash_end(&self) -> bool {
        self.check(TokenKind::HashEndIf)
            || (self.check(TokenKind::HashEnd) && self.peek_kind(1) == TokenKind::If)
    }

    /// Type after `as`: a (possibly dotted) name folded into one token
    fn parse_type_token(&mut self) -> CompileResult<Token> {
        let mut token = self.expect_identifier_like("type name")?;
        while self.check(TokenKind::Dot) {
            self.advance();
            let part = self.expect_identifier_like("type name")?;
            token.text = format!("{}.{}", token.text, part.text);
            token.range = token.range.merge(part.range);
        }
        Ok(token)
    }

    // =========================================================================
    // Statement lists
    // =========================================================================

    fn parse_statements<F>(&mut self, is_end: F) -> CompileResult<Vec<NodeId>>
    where
        F: Fn(&Self) -> bool,
    {
        let mut statements = Vec::new();
        loop {
            self.skip_separators();
            if self.check(TokenKind::Eof) || is_end(&*self) {
                break;
            }
            statements.push(self.parse_statement()?);
            if !matches!(
                self.current().kind,
                TokenKind::Newline | TokenKind::Colon | TokenKind::Comment | TokenKind::Eof
            ) {
                return Err(self.error(format!(
                    "expected newline or ':' after statement, found {}",
                    self.current().kind
                )));
            }
        }
        Ok(statements)
    }

    fn parse_block<F>(&mut self, is_end: F) -> CompileResult<NodeId>
    where
        F: Fn(&Self) -> bool,
    {
        let statements = self.parse_statements(is_end)?;
        let range = Range::bounding(statements.iter().map(|&s| self.range_of(s)));
        Ok(self.ast.alloc(NodeKind::Body { statements }, range))
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_statement(&mut self) -> CompileResult<NodeId> {
        match self.current().kind {
            TokenKind::Comment => {
                let comment = self.advance();
                let range = comment.range;
                Ok(self.ast.alloc(NodeKind::Comment { comment }, Some(range)))
            }
            TokenKind::Sub | TokenKind::Function if self.peek_kind(1) == TokenKind::Identifier => {
                self.parse_function_declaration()
            }
            TokenKind::Namespace => self.parse_namespace(),
            TokenKind::Class => self.parse_class(),
            TokenKind::Interface => self.parse_interface(),
            TokenKind::Enum => self.parse_enum(),
            TokenKind::Const => self.parse_const(),
            TokenKind::Import | TokenKind::Library => self.parse_directive(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Exit => {
                let exit = self.advance();
                let loop_type = self.match_loop_type();
                let range = Range::bounding([Some(exit.range), loop_type.as_ref().map(|t| t.range)]);
                Ok(self.ast.alloc(NodeKind::ExitLoop { exit, loop_type }, range))
            }
            TokenKind::Continue => {
                let continue_token = self.advance();
                let loop_type = self.match_loop_type();
                let range = Range::bounding([
                    Some(continue_token.range),
                    loop_type.as_ref().map(|t| t.range),
                ]);
                Ok(self.ast.alloc(NodeKind::Continue { continue_token, loop_type }, range))
            }
            TokenKind::Return => {
                let return_token = self.advance();
                let value = if self.at_expression_end() {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                let range = Range::bounding([
                    Some(return_token.range),
                    value.and_then(|v| self.range_of(v)),
                ]);
                Ok(self.ast.alloc(NodeKind::Return { return_token, value }, range))
            }
            TokenKind::Dim => self.parse_dim(),
            TokenKind::Try => self.parse_try(),
            TokenKind::Throw => {
                let throw = self.advance();
                let expression = self.parse_expression()?;
                let range = Range::bounding([Some(throw.range), self.range_of(expression)]);
                Ok(self.ast.alloc(NodeKind::Throw { throw, expression }, range))
            }
            TokenKind::Print | TokenKind::Question => self.parse_print(),
            TokenKind::Stop => {
                let stop = self.advance();
                let range = stop.range;
                Ok(self.ast.alloc(NodeKind::Stop { stop }, Some(range)))
            }
            TokenKind::End
                if matches!(
                    self.peek_kind(1),
                    TokenKind::Newline | TokenKind::Colon | TokenKind::Comment | TokenKind::Eof
                ) =>
            {
                let end = self.advance();
                let range = end.range;
                Ok(self.ast.alloc(NodeKind::End { end }, Some(range)))
            }
            TokenKind::HashConst => {
                let hash_const = self.advance();
                let name = self.expect_identifier("constant name")?;
                self.expect(TokenKind::Equal)?;
                let value = self.parse_expression()?;
                let range = Range::bounding([Some(hash_const.range), self.range_of(value)]);
                Ok(self.ast.alloc(
                    NodeKind::ConditionalCompileConst { hash_const, name, value },
                    range,
                ))
            }
            TokenKind::HashIf => self.parse_conditional_compile(),
            TokenKind::HashError => {
                let token = self.advance();
                let range = token.range;
                Ok(self.ast.alloc(NodeKind::ConditionalCompileError { token }, Some(range)))
            }
            TokenKind::Typecast => {
                let typecast = self.advance();
                let expression = self.parse_expression()?;
                self.expect(TokenKind::As)?;
                let type_token = self.parse_type_token()?;
                let range = typecast.range.merge(type_token.range);
                Ok(self.ast.alloc(
                    NodeKind::Typecast { typecast, expression, type_token },
                    Some(range),
                ))
            }
            TokenKind::Alias => {
                let alias = self.advance();
                let name = self.expect_identifier("alias name")?;
                self.expect(TokenKind::Equal)?;
                let value = self.parse_expression()?;
                let range = Range::bounding([Some(alias.range), self.range_of(value)]);
                Ok(self.ast.alloc(NodeKind::Alias { alias, name, value }, range))
            }
            TokenKind::End
            | TokenKind::EndSub
            | TokenKind::EndFunction
            | TokenKind::EndIf
            | TokenKind::EndWhile
            | TokenKind::EndFor
            | TokenKind::Next
            | TokenKind::Else
            | TokenKind::Catch => Err(self.error(format!(
                "unexpected '{}'",
                self.current().text
            ))),
            _ => self.parse_expression_statement(),
        }
    }

    fn match_loop_type(&mut self) -> Option<Token> {
        if matches!(self.current().kind, TokenKind::While | TokenKind::For) {
            Some(self.advance())
        } else {
            None
        }
    }

    fn parse_expression_statement(&mut self) -> CompileResult<NodeId> {
        let expr = self.parse_postfix()?;
        let kind = self.current().kind;

        if kind == TokenKind::Equal || kind.is_compound_assignment() {
            let operator = self.advance();
            let value = self.parse_expression()?;
            return self.make_assignment(expr, operator, value);
        }

        if matches!(kind, TokenKind::PlusPlus | TokenKind::MinusMinus) {
            let operator = self.advance();
            let range = Range::bounding([self.range_of(expr), Some(operator.range)]);
            return Ok(self.ast.alloc(NodeKind::Increment { value: expr, operator }, range));
        }

        let range = self.range_of(expr);
        Ok(self.ast.alloc(NodeKind::ExpressionStatement { expression: expr }, range))
    }

    /// Turn the already parsed target expression into an assignment statement
    fn make_assignment(
        &mut self,
        target: NodeId,
        operator: Token,
        value: NodeId,
    ) -> CompileResult<NodeId> {
        let range = Range::bounding([self.range_of(target), self.range_of(value)]);
        let kind = match self.ast.kind(target).clone() {
            NodeKind::Variable { name } => NodeKind::Assignment { name, operator, value },
            NodeKind::DottedGet { obj, dot, name } => NodeKind::DottedSet {
                obj,
                dot,
                name,
                operator,
                value,
            },
            NodeKind::IndexedGet { obj, question_dot, open_square, indexes, close_square } => {
                NodeKind::IndexedSet {
                    obj,
                    question_dot,
                    open_square,
                    indexes,
                    close_square,
                    operator,
                    value,
                }
            }
            _ => {
                return Err(CompileError::parser(
                    "invalid assignment target",
                    self.range_of(target).unwrap_or(operator.range),
                ));
            }
        };
        self.ast.replace(target, kind, range);
        Ok(target)
    }

    fn parse_print(&mut self) -> CompileResult<NodeId> {
        let print = self.advance();
        let mut expressions = Vec::new();
        while !self.at_expression_end() {
            if matches!(self.current().kind, TokenKind::Semicolon | TokenKind::Comma) {
                self.advance();
                continue;
            }
            expressions.push(self.parse_expression()?);
        }
        let range = Range::bounding(
            std::iter::once(Some(print.range)).chain(expressions.iter().map(|&e| self.range_of(e))),
        );
        Ok(self.ast.alloc(NodeKind::Print { print, expressions }, range))
    }

    fn parse_dim(&mut self) -> CompileResult<NodeId> {
        let dim = self.advance();
        let identifier = self.expect_identifier("array name")?;
        self.expect(TokenKind::LeftSquare)?;
        let mut dimensions = Vec::new();
        loop {
            dimensions.push(self.parse_expression()?);
            if self.match_token(TokenKind::Comma).is_none() {
                break;
            }
        }
        let close = self.expect(TokenKind::RightSquare)?;
        let range = dim.range.merge(close.range);
        Ok(self.ast.alloc(
            NodeKind::Dim { dim, identifier: Some(identifier), dimensions },
            Some(range),
        ))
    }

    fn parse_directive(&mut self) -> CompileResult<NodeId> {
        let keyword = self.advance();
        let file_path = self.match_token(TokenKind::StringLiteral);
        let range = Range::bounding([Some(keyword.range), file_path.as_ref().map(|t| t.range)]);

        if keyword.kind == TokenKind::Library {
            let id = self.ast.alloc(NodeKind::Library { library: keyword, file_path }, range);
            self.references.library_statements.push(id);
            Ok(id)
        } else {
            let id = self.ast.alloc(NodeKind::Import { import: keyword, file_path }, range);
            self.references.import_statements.push(id);
            Ok(id)
        }
    }

    fn parse_const(&mut self) -> CompileResult<NodeId> {
        let const_token = self.advance();
        let name = self.expect_identifier("constant name")?;
        self.expect(TokenKind::Equal)?;
        let value = self.parse_expression()?;
        let range = Range::bounding([Some(const_token.range), self.range_of(value)]);
        Ok(self.ast.alloc(NodeKind::Const { const_token, name, value }, range))
    }

    // =========================================================================
    // Control flow
    // =========================================================================

    fn parse_if(&mut self) -> CompileResult<NodeId> {
        let if_token = self.advance();
        let condition = self.parse_expression()?;
        self.match_token(TokenKind::Then);

        if self.at_line_end() {
            let node = self.parse_if_block(if_token, condition)?;
            let end = self.expect_end(TokenKind::If, Some(TokenKind::EndIf), "end if")?;
            self.ast.extend_range(node, Some(end));
            Ok(node)
        } else {
            self.parse_if_inline(if_token, condition)
        }
    }

    fn parse_if_block(&mut self, if_token: Token, condition: NodeId) -> CompileResult<NodeId> {
        let then_branch = self.parse_block(|p| {
            p.check(TokenKind::Else) || p.check_end(TokenKind::If, Some(TokenKind::EndIf))
        })?;

        let else_branch = if self.match_token(TokenKind::Else).is_some() {
            if let Some(nested_if) = self.match_token(TokenKind::If) {
                let nested_condition = self.parse_expression()?;
                self.match_token(TokenKind::Then);
                Some(self.parse_if_block(nested_if, nested_condition)?)
            } else {
                Some(self.parse_block(|p| p.check_end(TokenKind::If, Some(TokenKind::EndIf)))?)
            }
        } else {
            None
        };

        let range = Range::bounding([
            Some(if_token.range),
            self.range_of(condition),
            self.range_of(then_branch),
            else_branch.and_then(|e| self.range_of(e)),
        ]);
        Ok(self.ast.alloc(
            NodeKind::If { if_token, condition, then_branch, else_branch },
            range,
        ))
    }

    /// `if cond then stmt [else stmt]` on one line
    fn parse_if_inline(&mut self, if_token: Token, condition: NodeId) -> CompileResult<NodeId> {
        let then_branch = self.parse_inline_body()?;

        let else_branch = if self.match_token(TokenKind::Else).is_some() {
            if let Some(nested_if) = self.match_token(TokenKind::If) {
                let nested_condition = self.parse_expression()?;
                self.match_token(TokenKind::Then);
                Some(self.parse_if_inline(nested_if, nested_condition)?)
            } else {
                Some(self.parse_inline_body()?)
            }
        } else {
            None
        };

        let range = Range::bounding([
            Some(if_token.range),
            self.range_of(then_branch),
            else_branch.and_then(|e| self.range_of(e)),
        ]);
        Ok(self.ast.alloc(
            NodeKind::If { if_token, condition, then_branch, else_branch },
            range,
        ))
    }

    fn parse_inline_body(&mut self) -> CompileResult<NodeId> {
        let mut statements = vec![self.parse_statement()?];
        while self.check(TokenKind::Colon) {
            self.advance();
            if self.at_expression_end() {
                break;
            }
            statements.push(self.parse_statement()?);
        }
        let range = Range::bounding(statements.iter().map(|&s| self.range_of(s)));
        Ok(self.ast.alloc(NodeKind::Body { statements }, range))
    }

    fn parse_while(&mut self) -> CompileResult<NodeId> {
        let while_token = self.advance();
        let condition = self.parse_expression()?;
        let body = self.parse_block(|p| p.check_end(TokenKind::While, Some(TokenKind::EndWhile)))?;
        let end = self.expect_end(TokenKind::While, Some(TokenKind::EndWhile), "end while")?;
        let range = while_token.range.merge(end);
        Ok(self.ast.alloc(NodeKind::While { while_token, condition, body }, Some(range)))
    }

    fn parse_for(&mut self) -> CompileResult<NodeId> {
        let for_token = self.advance();

        if let Some(each) = self.match_token(TokenKind::Each) {
            let for_each = Token::new(
                TokenKind::ForEach,
                format!("{} {}", for_token.text, each.text),
                for_token.range.merge(each.range),
            );
            let item = self.expect_identifier("loop variable")?;
            self.expect(TokenKind::In)?;
            let target = self.parse_expression()?;
            let body = self.parse_block(Self::check_end_for)?;
            let end = self.expect_end_for()?;
            let range = for_each.range.merge(end);
            return Ok(self.ast.alloc(
                NodeKind::ForEach { for_each, item, target, body },
                Some(range),
            ));
        }

        let name = self.expect_identifier("loop counter")?;
        let operator = self.expect(TokenKind::Equal)?;
        let start = self.parse_expression()?;
        let counter_range = Range::bounding([Some(name.range), self.range_of(start)]);
        let counter = self.ast.alloc(
            NodeKind::Assignment { name, operator, value: start },
            counter_range,
        );

        self.expect(TokenKind::To)?;
        let final_value = self.parse_expression()?;
        let step = if self.match_token(TokenKind::Step).is_some() {
            Some(self.parse_expression()?)
        } else {
            None
        };

        let body = self.parse_block(Self::check_end_for)?;
        let end = self.expect_end_for()?;
        let range = for_token.range.merge(end);
        Ok(self.ast.alloc(
            NodeKind::For { for_token, counter, final_value, step, body },
            Some(range),
        ))
    }

    fn parse_try(&mut self) -> CompileResult<NodeId> {
        let try_token = self.advance();
        let try_branch = self.parse_block(|p| {
            p.check(TokenKind::Catch) || p.check_end(TokenKind::Try, None)
        })?;

        let catch = if let Some(catch_token) = self.match_token(TokenKind::Catch) {
            let exception_variable = self.match_token(TokenKind::Identifier);
            let body = self.parse_block(|p| p.check_end(TokenKind::Try, None))?;
            let range = Range::bounding([
                Some(catch_token.range),
                exception_variable.as_ref().map(|t| t.range),
                self.range_of(body),
            ]);
            Some(self.ast.alloc(
                NodeKind::Catch { catch_token, exception_variable, body },
                range,
            ))
        } else {
            None
        };

        let end = self.expect_end(TokenKind::Try, None, "end try")?;
        let range = try_token.range.merge(end);
        Ok(self.ast.alloc(NodeKind::Try { try_token, try_branch, catch }, Some(range)))
    }

    fn parse_conditional_compile(&mut self) -> CompileResult<NodeId> {
        let node = self.parse_conditional_compile_block()?;
        let end = if let Some(token) = self.match_token(TokenKind::HashEndIf) {
            token.range
        } else if self.check_hash_end() {
            let hash_end = self.advance();
            let if_token = self.advance();
            hash_end.range.merge(if_token.range)
        } else {
            return Err(self.error(format!("expected '#end if', found {}", self.current().kind)));
        };
        self.ast.extend_range(node, Some(end));
        Ok(node)
    }

    fn parse_conditional_compile_block(&mut self) -> CompileResult<NodeId> {
        let hash_if = self.advance();
        let condition = self.parse_expression()?;
        let then_branch =
            self.parse_block(|p| p.check(TokenKind::HashElse) || p.check_hash_end())?;

        let else_branch = if self.match_token(TokenKind::HashElse).is_some() {
            if self.check(TokenKind::If) {
                Some(self.parse_conditional_compile_block()?)
            } else {
                Some(self.parse_block(Self::check_hash_end)?)
            }
        } else {
            None
        };

        let range = Range::bounding([
            Some(hash_if.range),
            self.range_of(then_branch),
            else_branch.and_then(|e| self.range_of(e)),
        ]);
        Ok(self.ast.alloc(
            NodeKind::ConditionalCompile { hash_if, condition, then_branch, else_branch },
            range,
        ))
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn parse_function_declaration(&mut self) -> CompileResult<NodeId> {
        let function_type = self.advance();
        let start = function_type.range;
        let name = self.expect_identifier("function name")?;
        let func = self.parse_function_rest(function_type)?;
        let range = Range::bounding([Some(start), self.range_of(func)]);
        Ok(self.ast.alloc(NodeKind::Function { name, func }, range))
    }

    /// Parameters, return type, body and terminator of a `sub`/`function`
    /// whose keyword (and name, if any) were already consumed
    fn parse_function_rest(&mut self, function_type: Token) -> CompileResult<NodeId> {
        self.expect(TokenKind::LeftParen)?;
        let mut params = Vec::new();
        self.skip_newlines();
        while !self.check(TokenKind::RightParen) {
            params.push(self.parse_parameter()?);
            self.skip_newlines();
            if self.match_token(TokenKind::Comma).is_none() {
                break;
            }
            self.skip_newlines();
        }
        self.expect(TokenKind::RightParen)?;

        let return_type = if self.match_token(TokenKind::As).is_some() {
            Some(self.parse_type_token()?)
        } else {
            None
        };

        let (end_kind, end_single, what) = if function_type.kind == TokenKind::Sub {
            (TokenKind::Sub, TokenKind::EndSub, "end sub")
        } else {
            (TokenKind::Function, TokenKind::EndFunction, "end function")
        };
        let body = self.parse_block(|p| p.check_end(end_kind, Some(end_single)))?;
        let end = self.expect_end(end_kind, Some(end_single), what)?;

        let range = function_type.range.merge(end);
        Ok(self.ast.alloc(
            NodeKind::FunctionExpression { function_type, params, return_type, body },
            Some(range),
        ))
    }

    fn parse_parameter(&mut self) -> CompileResult<NodeId> {
        let name = self.expect_identifier("parameter name")?;
        let default_value = if self.match_token(TokenKind::Equal).is_some() {
            Some(self.parse_expression()?)
        } else {
            None
        };
        let type_token = if self.match_token(TokenKind::As).is_some() {
            Some(self.parse_type_token()?)
        } else {
            None
        };
        let range = Range::bounding([
            Some(name.range),
            default_value.and_then(|d| self.range_of(d)),
            type_token.as_ref().map(|t| t.range),
        ]);
        Ok(self.ast.alloc(
            NodeKind::FunctionParameter { name, default_value, type_token },
            range,
        ))
    }

    fn parse_namespace(&mut self) -> CompileResult<NodeId> {
        let keyword = self.advance();

        let first = self.expect_identifier("namespace name")?;
        let first_range = first.range;
        let mut name_expression = self.ast.alloc(NodeKind::Variable { name: first }, Some(first_range));
        while self.check(TokenKind::Dot) {
            let dot = self.advance();
            let name = self.expect_identifier_like("namespace name")?;
            let range = Range::bounding([self.range_of(name_expression), Some(name.range)]);
            name_expression = self.ast.alloc(
                NodeKind::DottedGet { obj: name_expression, dot, name },
                range,
            );
        }

        let body = self.parse_block(|p| p.check_end(TokenKind::Namespace, None))?;
        let end = self.expect_end(TokenKind::Namespace, None, "end namespace")?;
        let range = keyword.range.merge(end);
        Ok(self.ast.alloc(
            NodeKind::Namespace { keyword, name_expression, body },
            Some(range),
        ))
    }

    fn parse_class(&mut self) -> CompileResult<NodeId> {
        let class_keyword = self.advance();
        let name = self.expect_identifier("class name")?;
        let parent_class = if self.match_token(TokenKind::Extends).is_some() {
            Some(self.parse_type_token()?)
        } else {
            None
        };

        let mut members = Vec::new();
        loop {
            self.skip_separators();
            if self.check(TokenKind::Eof) || self.check_end(TokenKind::Class, None) {
                break;
            }
            members.push(self.parse_class_member()?);
        }
        let end = self.expect_end(TokenKind::Class, None, "end class")?;

        let range = class_keyword.range.merge(end);
        Ok(self.ast.alloc(
            NodeKind::Class { class_keyword, name, parent_class, members },
            Some(range),
        ))
    }

    fn parse_class_member(&mut self) -> CompileResult<NodeId> {
        if self.check(TokenKind::Comment) {
            let comment = self.advance();
            let range = comment.range;
            return Ok(self.ast.alloc(NodeKind::Comment { comment }, Some(range)));
        }

        let access = if matches!(
            self.current().kind,
            TokenKind::Public | TokenKind::Protected | TokenKind::Private
        ) {
            Some(self.advance())
        } else {
            None
        };
        let override_token = self.match_token(TokenKind::Override);
        let start = access
            .as_ref()
            .or(override_token.as_ref())
            .map(|t| t.range);

        if matches!(self.current().kind, TokenKind::Sub | TokenKind::Function) {
            let function_type = self.advance();
            let function_range = function_type.range;
            let name = self.expect_identifier_like("method name")?;
            let func = self.parse_function_rest(function_type)?;
            let range = Range::bounding([start, Some(function_range), self.range_of(func)]);
            return Ok(self.ast.alloc(
                NodeKind::Method { access, override_token, name, func },
                range,
            ));
        }

        let name = self.expect_identifier_like("field name")?;
        let type_token = if self.match_token(TokenKind::As).is_some() {
            Some(self.parse_type_token()?)
        } else {
            None
        };
        let initial_value = if self.match_token(TokenKind::Equal).is_some() {
            Some(self.parse_expression()?)
        } else {
            None
        };
        let range = Range::bounding([
            start,
            Some(name.range),
            type_token.as_ref().map(|t| t.range),
            initial_value.and_then(|v| self.range_of(v)),
        ]);
        Ok(self.ast.alloc(
            NodeKind::Field { access, name, type_token, initial_value },
            range,
        ))
    }

    fn parse_interface(&mut self) -> CompileResult<NodeId> {
        let keyword = self.advance();
        let name = self.expect_identifier("interface name")?;
        let parent_interface = if self.match_token(TokenKind::Extends).is_some() {
            Some(self.parse_type_token()?)
        } else {
            None
        };

        let mut members = Vec::new();
        loop {
            self.skip_separators();
            if self.check(TokenKind::Eof) || self.check_end(TokenKind::Interface, None) {
                break;
            }
            members.push(self.parse_interface_member()?);
        }
        let end = self.expect_end(TokenKind::Interface, None, "end interface")?;

        let range = keyword.range.merge(end);
        Ok(self.ast.alloc(
            NodeKind::Interface { keyword, name, parent_interface, members },
            Some(range),
        ))
    }

    fn parse_interface_member(&mut self) -> CompileResult<NodeId> {
        if self.check(TokenKind::Comment) {
            let comment = self.advance();
            let range = comment.range;
            return Ok(self.ast.alloc(NodeKind::Comment { comment }, Some(range)));
        }

        if matches!(self.current().kind, TokenKind::Sub | TokenKind::Function) {
            let function_type = self.advance();
            let name = self.expect_identifier_like("method name")?;
            self.expect(TokenKind::LeftParen)?;
            let mut params = Vec::new();
            while !self.check(TokenKind::RightParen) {
                let param_name = self.expect_identifier("parameter name")?;
                let type_token = if self.match_token(TokenKind::As).is_some() {
                    Some(self.parse_type_token()?)
                } else {
                    None
                };
                params.push(InterfaceParam { name: param_name, type_token });
                if self.match_token(TokenKind::Comma).is_none() {
                    break;
                }
            }
            let close = self.expect(TokenKind::RightParen)?;
            let return_type = if self.match_token(TokenKind::As).is_some() {
                Some(self.parse_type_token()?)
            } else {
                None
            };
            let range = function_type
                .range
                .merge(return_type.as_ref().map_or(close.range, |t| t.range));
            return Ok(self.ast.alloc(
                NodeKind::InterfaceMethod { function_type, name, params, return_type },
                Some(range),
            ));
        }

        let name = self.expect_identifier_like("interface member name")?;
        let type_token = if self.match_token(TokenKind::As).is_some() {
            Some(self.parse_type_token()?)
        } else {
            None
        };
        let range = name.range.merge(type_token.as_ref().map_or(name.range, |t| t.range));
        Ok(self.ast.alloc(NodeKind::InterfaceField { name, type_token }, Some(range)))
    }

    fn parse_enum(&mut self) -> CompileResult<NodeId> {
        let enum_token = self.advance();
        let name = self.expect_identifier("enum name")?;

        let mut members = Vec::new();
        loop {
            self.skip_separators();
            if self.check(TokenKind::Eof) || self.check_end(TokenKind::Enum, None) {
                break;
            }
            if self.check(TokenKind::Comment) {
                let comment = self.advance();
                let range = comment.range;
                members.push(self.ast.alloc(NodeKind::Comment { comment }, Some(range)));
                continue;
            }
            let member_name = self.expect_identifier_like("enum member name")?;
            let value = if self.match_token(TokenKind::Equal).is_some() {
                Some(self.parse_expression()?)
            } else {
                None
            };
            let range = Range::bounding([
                Some(member_name.range),
                value.and_then(|v| self.range_of(v)),
            ]);
            members.push(self.ast.alloc(NodeKind::EnumMember { name: member_name, value }, range));
        }
        let end = self.expect_end(TokenKind::Enum, None, "end enum")?;

        let range = enum_token.range.merge(end);
        Ok(self.ast.alloc(NodeKind::Enum { enum_token, name, members }, Some(range)))
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    pub(crate) fn parse_expression(&mut self) -> CompileResult<NodeId> {
        self.parse_or()
    }

    fn binary(&mut self, left: NodeId, operator: Token, right: NodeId) -> NodeId {
        let range = Range::bounding([self.range_of(left), self.range_of(right)]);
        self.ast.alloc(NodeKind::Binary { left, operator, right }, range)
    }

    fn parse_or(&mut self) -> CompileResult<NodeId> {
        let mut left = self.parse_and()?;
        while let Some(operator) = self.match_token(TokenKind::Or) {
            let right = self.parse_and()?;
            left = self.binary(left, operator, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> CompileResult<NodeId> {
        let mut left = self.parse_not()?;
        while let Some(operator) = self.match_token(TokenKind::And) {
            let right = self.parse_not()?;
            left = self.binary(left, operator, right);
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> CompileResult<NodeId> {
        if let Some(operator) = self.match_token(TokenKind::Not) {
            let right = self.parse_not()?;
            let range = Range::bounding([Some(operator.range), self.range_of(right)]);
            return Ok(self.ast.alloc(NodeKind::Unary { operator, right }, range));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> CompileResult<NodeId> {
        let mut left = self.parse_shift()?;
        while matches!(
            self.current().kind,
            TokenKind::Equal
                | TokenKind::LessGreater
                | TokenKind::Less
                | TokenKind::Greater
                | TokenKind::LessEqual
                | TokenKind::GreaterEqual
        ) {
            let operator = self.advance();
            let right = self.parse_shift()?;
            left = self.binary(left, operator, right);
        }
        Ok(left)
    }

    fn parse_shift(&mut self) -> CompileResult<NodeId> {
        let mut left = self.parse_additive()?;
        while matches!(self.current().kind, TokenKind::LeftShift | TokenKind::RightShift) {
            let operator = self.advance();
            let right = self.parse_additive()?;
            left = self.binary(left, operator, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> CompileResult<NodeId> {
        let mut left = self.parse_multiplicative()?;
        while matches!(self.current().kind, TokenKind::Plus | TokenKind::Minus) {
            let operator = self.advance();
            let right = self.parse_multiplicative()?;
            left = self.binary(left, operator, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> CompileResult<NodeId> {
        let mut left = self.parse_exponent()?;
        while matches!(
            self.current().kind,
            TokenKind::Star | TokenKind::Slash | TokenKind::Backslash | TokenKind::Mod
        ) {
            let operator = self.advance();
            let right = self.parse_exponent()?;
            left = self.binary(left, operator, right);
        }
        Ok(left)
    }

    fn parse_exponent(&mut self) -> CompileResult<NodeId> {
        let mut left = self.parse_unary()?;
        while let Some(operator) = self.match_token(TokenKind::Caret) {
            let right = self.parse_unary()?;
            left = self.binary(left, operator, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> CompileResult<NodeId> {
        if matches!(self.current().kind, TokenKind::Minus | TokenKind::Plus) {
            let operator = self.advance();
            let right = self.parse_unary()?;
            let range = Range::bounding([Some(operator.range), self.range_of(right)]);
            return Ok(self.ast.alloc(NodeKind::Unary { operator, right }, range));
        }
        self.parse_postfix()
    }

    /// Primary expression followed by any number of `.x`, `?.x`, `[i]`,
    /// `?[i]`, `(args)` and `@.method(args)` accessors
    fn parse_postfix(&mut self) -> CompileResult<NodeId> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.current().kind {
                TokenKind::Dot | TokenKind::QuestionDot => {
                    let dot = self.advance();
                    if dot.kind == TokenKind::QuestionDot && self.check(TokenKind::LeftSquare) {
                        let open_square = self.advance();
                        expr = self.parse_index_rest(expr, Some(dot), open_square)?;
                        continue;
                    }
                    let name = self.expect_identifier_like("property name")?;
                    let range = Range::bounding([self.range_of(expr), Some(name.range)]);
                    expr = self.ast.alloc(NodeKind::DottedGet { obj: expr, dot, name }, range);
                }
                TokenKind::LeftSquare | TokenKind::QuestionLeftSquare => {
                    let open_square = self.advance();
                    expr = self.parse_index_rest(expr, None, open_square)?;
                }
                TokenKind::LeftParen => {
                    self.advance();
                    let (args, close) = self.parse_arguments()?;
                    let range = Range::bounding([self.range_of(expr), Some(close.range)]);
                    expr = self.ast.alloc(NodeKind::Call { callee: expr, args }, range);
                }
                TokenKind::Callfunc => {
                    let operator = self.advance();
                    let method_name = self.expect_identifier_like("method name")?;
                    self.expect(TokenKind::LeftParen)?;
                    let (args, close) = self.parse_arguments()?;
                    let range = Range::bounding([self.range_of(expr), Some(close.range)]);
                    expr = self.ast.alloc(
                        NodeKind::Callfunc { callee: expr, operator, method_name, args },
                        range,
                    );
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn parse_index_rest(
        &mut self,
        obj: NodeId,
        question_dot: Option<Token>,
        open_square: Token,
    ) -> CompileResult<NodeId> {
        let mut indexes = Vec::new();
        self.skip_newlines();
        loop {
            indexes.push(self.parse_expression()?);
            self.skip_newlines();
            if self.match_token(TokenKind::Comma).is_none() {
                break;
            }
            self.skip_newlines();
        }
        let close_square = self.expect(TokenKind::RightSquare)?;
        let range = Range::bounding([self.range_of(obj), Some(close_square.range)]);
        Ok(self.ast.alloc(
            NodeKind::IndexedGet {
                obj,
                question_dot,
                open_square,
                indexes,
                close_square: Some(close_square),
            },
            range,
        ))
    }

    /// Arguments after an already consumed `(`, up to and including `)`
    fn parse_arguments(&mut self) -> CompileResult<(Vec<NodeId>, Token)> {
        let mut args = Vec::new();
        self.skip_newlines();
        while !self.check(TokenKind::RightParen) {
            args.push(self.parse_expression()?);
            self.skip_newlines();
            if self.match_token(TokenKind::Comma).is_none() {
                break;
            }
            self.skip_newlines();
        }
        let close = self.expect(TokenKind::RightParen)?;
        Ok((args, close))
    }

    fn parse_primary(&mut self) -> CompileResult<NodeId> {
        let kind = self.current().kind;
        match kind {
            _ if kind.is_literal() => {
                let token = self.advance();
                let range = token.range;
                Ok(self.ast.alloc(NodeKind::Literal { token }, Some(range)))
            }
            TokenKind::Identifier => {
                let name = self.advance();
                let range = name.range;
                Ok(self.ast.alloc(NodeKind::Variable { name }, Some(range)))
            }
            TokenKind::LeftParen => {
                let open = self.advance();
                self.skip_newlines();
                let expression = self.parse_expression()?;
                self.skip_newlines();
                let close = self.expect(TokenKind::RightParen)?;
                Ok(self.ast.alloc(
                    NodeKind::Grouping { expression },
                    Some(open.range.merge(close.range)),
                ))
            }
            TokenKind::LeftSquare => {
                let open = self.advance();
                let mut elements = Vec::new();
                self.skip_newlines();
                while !self.check(TokenKind::RightSquare) {
                    elements.push(self.parse_expression()?);
                    self.skip_newlines();
                    self.match_token(TokenKind::Comma);
                    self.skip_newlines();
                }
                let close = self.expect(TokenKind::RightSquare)?;
                Ok(self.ast.alloc(
                    NodeKind::ArrayLiteral { elements },
                    Some(open.range.merge(close.range)),
                ))
            }
            TokenKind::LeftCurly => self.parse_aa_literal(),
            TokenKind::Sub | TokenKind::Function => {
                let function_type = self.advance();
                self.parse_function_rest(function_type)
            }
            TokenKind::New => {
                let new_token = self.advance();
                let first = self.expect_identifier("class name")?;
                let first_range = first.range;
                let mut callee = self.ast.alloc(NodeKind::Variable { name: first }, Some(first_range));
                while self.check(TokenKind::Dot) {
                    let dot = self.advance();
                    let name = self.expect_identifier_like("class name")?;
                    let range = Range::bounding([self.range_of(callee), Some(name.range)]);
                    callee = self.ast.alloc(NodeKind::DottedGet { obj: callee, dot, name }, range);
                }
                self.expect(TokenKind::LeftParen)?;
                let (args, close) = self.parse_arguments()?;
                let call_range = Range::bounding([self.range_of(callee), Some(close.range)]);
                let call = self.ast.alloc(NodeKind::Call { callee, args }, call_range);
                let range = new_token.range.merge(close.range);
                Ok(self.ast.alloc(NodeKind::New { new_token, call }, Some(range)))
            }
            _ => Err(self.error(format!("expected expression, found {}", kind))),
        }
    }

    fn parse_aa_literal(&mut self) -> CompileResult<NodeId> {
        let open = self.advance();
        let mut members = Vec::new();
        self.skip_newlines();
        while !self.check(TokenKind::RightCurly) {
            let key = if self.check(TokenKind::StringLiteral) {
                self.advance()
            } else {
                self.expect_identifier_like("key")?
            };
            self.expect(TokenKind::Colon)?;
            self.skip_newlines();
            let value = self.parse_expression()?;
            let range = Range::bounding([Some(key.range), self.range_of(value)]);
            members.push(self.ast.alloc(NodeKind::AAMember { key, value }, range));
            self.skip_newlines();
            self.match_token(TokenKind::Comma);
            self.skip_newlines();
        }
        let close = self.expect(TokenKind::RightCurly)?;
        Ok(self.ast.alloc(
            NodeKind::AALiteral { members },
            Some(open.range.merge(close.range)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> ParseResult {
        Parser::new(source).unwrap().parse().unwrap()
    }

    fn first_statement(result: &ParseResult) -> &NodeKind {
        result.ast.kind(result.ast.statements()[0])
    }

    #[test]
    fn test_parse_simple_function() {
        let result = parse("sub main()\n    print \"hello\"\nend sub\n");

        assert_eq!(result.ast.statements().len(), 1);
        if let NodeKind::Function { name, func } = first_statement(&result) {
            assert_eq!(name.text, "main");
            assert!(matches!(
                result.ast.kind(*func),
                NodeKind::FunctionExpression { return_type: None, .. }
            ));
        } else {
            panic!("expected function declaration");
        }
    }

    #[test]
    fn test_parse_single_word_terminators() {
        let source = "function f(a as integer, b = 2) as integer\n    if a > b then\n        return a\n    endif\n    while false\n    endwhile\n    return b\nendfunction\n";
        let result = parse(source);
        assert_eq!(result.ast.statements().len(), 1);
    }

    #[test]
    fn test_parse_assignment_forms() {
        let result = parse("sub main()\n    a = 1\n    a.b = 2\n    a[0] = 3\n    a += 1\n    a++\nend sub\n");
        let NodeKind::Function { func, .. } = first_statement(&result) else {
            panic!("expected function declaration");
        };
        let NodeKind::FunctionExpression { body, .. } = result.ast.kind(*func) else {
            panic!("expected function expression");
        };
        let names: Vec<&str> = result
            .ast
            .children(*body)
            .into_iter()
            .map(|s| result.ast.kind(s).name())
            .collect();
        assert_eq!(
            names,
            vec!["Assignment", "DottedSet", "IndexedSet", "Assignment", "Increment"]
        );
    }

    #[test]
    fn test_parent_links() {
        let result = parse("namespace Alpha\n    sub go()\n        x = [1, {a: 2}]\n    end sub\nend namespace\n");
        let ast = &result.ast;
        assert_eq!(ast.parent(ast.root()), None);

        let mut reached = 1;
        let mut stack = vec![ast.root()];
        while let Some(id) = stack.pop() {
            for child in ast.children(id) {
                assert_eq!(ast.parent(child), Some(id));
                reached += 1;
                stack.push(child);
            }
        }
        assert_eq!(reached, ast.len());
    }

    #[test]
    fn test_parse_optional_chaining() {
        let result = parse("a?.b = 1\n");
        let NodeKind::DottedSet { dot, name, .. } = first_statement(&result) else {
            panic!("expected dotted set");
        };
        assert_eq!(dot.kind, TokenKind::QuestionDot);
        assert_eq!(name.text, "b");

        let result = parse("a?[0] = 1\n");
        let NodeKind::IndexedSet { open_square, .. } = first_statement(&result) else {
            panic!("expected indexed set");
        };
        assert_eq!(open_square.kind, TokenKind::QuestionLeftSquare);
    }

    #[test]
    fn test_parse_for_each_token() {
        let result = parse("for each item in list\n    print item\nend for\n");
        let NodeKind::ForEach { for_each, item, .. } = first_statement(&result) else {
            panic!("expected for each");
        };
        assert_eq!(for_each.kind, TokenKind::ForEach);
        assert_eq!(item.text, "item");
    }

    #[test]
    fn test_parse_else_if_chain() {
        let source = "if a then\n    x = 1\nelse if b then\n    x = 2\nelse\n    x = 3\nend if\n";
        let result = parse(source);
        let NodeKind::If { else_branch: Some(else_branch), .. } = first_statement(&result) else {
            panic!("expected if with else");
        };
        assert!(matches!(
            result.ast.kind(*else_branch),
            NodeKind::If { else_branch: Some(_), .. }
        ));
    }

    #[test]
    fn test_parse_inline_if() {
        let result = parse("sub f()\n    if x then return else y = 1\nend sub\n");
        assert_eq!(result.ast.statements().len(), 1);
    }

    #[test]
    fn test_parse_class_and_interface() {
        let source = "class Dog extends Animal\n    public name as string = \"rex\"\n    override sub new()\n    end sub\n    function bark() as string\n        return \"woof\"\n    end function\nend class\ninterface Named\n    name as string\n    function getName(prefix as string) as string\nend interface\n";
        let result = parse(source);
        let NodeKind::Class { members, parent_class, .. } = first_statement(&result) else {
            panic!("expected class");
        };
        assert_eq!(parent_class.as_ref().map(|t| t.text.as_str()), Some("Animal"));
        assert_eq!(members.len(), 3);
        assert!(matches!(result.ast.kind(result.ast.statements()[1]), NodeKind::Interface { .. }));
    }

    #[test]
    fn test_references_collected_at_any_depth() {
        let source = "library \"v30/bslCore.brs\"\nimport \"a.bs\"\nnamespace N\n    import \"b.bs\"\nend namespace\n";
        let result = parse(source);
        assert_eq!(result.references.library_statements.len(), 1);
        assert_eq!(result.references.import_statements.len(), 2);
    }

    #[test]
    fn test_parse_callfunc_and_new() {
        let result = parse("sub f()\n    node@.run(1, 2)\n    d = new Alpha.Dog(\"rex\")\nend sub\n");
        assert_eq!(result.ast.statements().len(), 1);
    }

    #[test]
    fn test_parse_conditional_compile() {
        let source = "#const DEBUG = true\n#if DEBUG\nsub a()\nend sub\n#else\n#error no debug\n#end if\n";
        let result = parse(source);
        assert_eq!(result.ast.statements().len(), 2);
        assert!(matches!(
            result.ast.kind(result.ast.statements()[1]),
            NodeKind::ConditionalCompile { else_branch: Some(_), .. }
        ));
    }

    #[test]
    fn test_syntax_error() {
        let err = Parser::new("sub main(\n").unwrap().parse().unwrap_err();
        assert!(matches!(err, CompileError::Parser { .. }));
    }

    #[test]
    fn test_missing_terminator() {
        let err = Parser::new("while true\n    x = 1\n").unwrap().parse().unwrap_err();
        assert!(err.to_string().contains("end while"), "{err}");
    }
}
