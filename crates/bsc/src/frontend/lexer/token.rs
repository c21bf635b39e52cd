//! Token definitions using logos

use crate::common::Range;
use logos::Logos;
use std::fmt;

/// A token with its kind, source text and location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub range: Range,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, range: Range) -> Self {
        Self {
            kind,
            text: text.into(),
            range,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

/// Token kinds. Keywords are matched case-insensitively.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\f]+")]
pub enum TokenKind {
    // Keywords - Declarations
    #[token("sub", ignore(ascii_case))]
    Sub,
    #[token("function", ignore(ascii_case))]
    Function,
    #[token("namespace", ignore(ascii_case))]
    Namespace,
    #[token("class", ignore(ascii_case))]
    Class,
    #[token("extends", ignore(ascii_case))]
    Extends,
    #[token("interface", ignore(ascii_case))]
    Interface,
    #[token("enum", ignore(ascii_case))]
    Enum,
    #[token("const", ignore(ascii_case))]
    Const,
    #[token("import", ignore(ascii_case))]
    Import,
    #[token("library", ignore(ascii_case))]
    Library,
    #[token("public", ignore(ascii_case))]
    Public,
    #[token("protected", ignore(ascii_case))]
    Protected,
    #[token("private", ignore(ascii_case))]
    Private,
    #[token("override", ignore(ascii_case))]
    Override,
    #[token("typecast", ignore(ascii_case))]
    Typecast,
    #[token("alias", ignore(ascii_case))]
    Alias,
    #[token("as", ignore(ascii_case))]
    As,
    #[token("dim", ignore(ascii_case))]
    Dim,
    #[token("new", ignore(ascii_case))]
    New,

    // Keywords - Control Flow
    #[token("if", ignore(ascii_case))]
    If,
    #[token("then", ignore(ascii_case))]
    Then,
    #[token("else", ignore(ascii_case))]
    Else,
    #[token("while", ignore(ascii_case))]
    While,
    #[token("for", ignore(ascii_case))]
    For,
    #[token("each", ignore(ascii_case))]
    Each,
    #[token("in", ignore(ascii_case))]
    In,
    #[token("to", ignore(ascii_case))]
    To,
    #[token("step", ignore(ascii_case))]
    Step,
    #[token("next", ignore(ascii_case))]
    Next,
    #[token("exit", ignore(ascii_case))]
    Exit,
    #[token("continue", ignore(ascii_case))]
    Continue,
    #[token("return", ignore(ascii_case))]
    Return,
    #[token("try", ignore(ascii_case))]
    Try,
    #[token("catch", ignore(ascii_case))]
    Catch,
    #[token("throw", ignore(ascii_case))]
    Throw,
    #[token("print", ignore(ascii_case))]
    Print,
    #[token("stop", ignore(ascii_case))]
    Stop,

    // Block terminators. `end` also stands alone as a statement.
    #[token("end", ignore(ascii_case))]
    End,
    #[token("endsub", ignore(ascii_case))]
    EndSub,
    #[token("endfunction", ignore(ascii_case))]
    EndFunction,
    #[token("endif", ignore(ascii_case))]
    EndIf,
    #[token("endwhile", ignore(ascii_case))]
    EndWhile,
    #[token("endfor", ignore(ascii_case))]
    EndFor,

    // Operators spelled as words
    #[token("and", ignore(ascii_case))]
    And,
    #[token("or", ignore(ascii_case))]
    Or,
    #[token("not", ignore(ascii_case))]
    Not,
    #[token("mod", ignore(ascii_case))]
    Mod,

    // Literals
    #[token("true", ignore(ascii_case))]
    True,
    #[token("false", ignore(ascii_case))]
    False,
    #[token("invalid", ignore(ascii_case))]
    Invalid,
    #[regex(r#""([^"\r\n]|"")*""#)]
    StringLiteral,
    #[regex(r"[0-9]+")]
    #[regex(r"&[hH][0-9a-fA-F]+")]
    IntegerLiteral,
    #[regex(r"[0-9]+&")]
    #[regex(r"&[hH][0-9a-fA-F]+&")]
    LongIntegerLiteral,
    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?!?")]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?!?")]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+!?")]
    #[regex(r"[0-9]+!")]
    FloatLiteral,
    #[regex(r"[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?#")]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?#")]
    DoubleLiteral,

    // Identifiers, with an optional type designator suffix
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*[$%!#&]?")]
    Identifier,

    // Comments
    #[regex(r"'[^\r\n]*")]
    #[regex(r"[rR][eE][mM]([ \t][^\r\n]*)?")]
    Comment,

    // Conditional compilation
    #[token("#const", ignore(ascii_case))]
    HashConst,
    #[token("#if", ignore(ascii_case))]
    HashIf,
    #[token("#else", ignore(ascii_case))]
    HashElse,
    #[token("#end", ignore(ascii_case))]
    HashEnd,
    #[token("#endif", ignore(ascii_case))]
    HashEndIf,
    #[regex(r"#[eE][rR][rR][oO][rR][^\r\n]*")]
    HashError,

    // Multi-character operators
    #[token("?.")]
    QuestionDot,
    #[token("?[")]
    QuestionLeftSquare,
    #[token("@.")]
    Callfunc,
    #[token("<>")]
    LessGreater,
    #[token("<=")]
    LessEqual,
    #[token(">=")]
    GreaterEqual,
    #[token("<<=")]
    LeftShiftEqual,
    #[token(">>=")]
    RightShiftEqual,
    #[token("<<")]
    LeftShift,
    #[token(">>")]
    RightShift,
    #[token("+=")]
    PlusEqual,
    #[token("-=")]
    MinusEqual,
    #[token("*=")]
    StarEqual,
    #[token("/=")]
    SlashEqual,
    #[token("\\=")]
    BackslashEqual,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,

    // Single-character operators
    #[token("=")]
    Equal,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("\\")]
    Backslash,
    #[token("^")]
    Caret,
    #[token("?")]
    Question,
    #[token("@")]
    At,

    // Delimiters
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("[")]
    LeftSquare,
    #[token("]")]
    RightSquare,
    #[token("{")]
    LeftCurly,
    #[token("}")]
    RightCurly,

    // Punctuation
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[regex(r"\r?\n")]
    Newline,

    // Produced by the parser when it folds `for each` into one token
    ForEach,

    // Special
    Eof,
}

impl TokenKind {
    /// Words that can still be used as property names after `.`
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::Sub
                | TokenKind::Function
                | TokenKind::Namespace
                | TokenKind::Class
                | TokenKind::Extends
                | TokenKind::Interface
                | TokenKind::Enum
                | TokenKind::Const
                | TokenKind::Import
                | TokenKind::Library
                | TokenKind::Public
                | TokenKind::Protected
                | TokenKind::Private
                | TokenKind::Override
                | TokenKind::Typecast
                | TokenKind::Alias
                | TokenKind::As
                | TokenKind::Dim
                | TokenKind::New
                | TokenKind::If
                | TokenKind::Then
                | TokenKind::Else
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Each
                | TokenKind::In
                | TokenKind::To
                | TokenKind::Step
                | TokenKind::Next
                | TokenKind::Exit
                | TokenKind::Continue
                | TokenKind::Return
                | TokenKind::Try
                | TokenKind::Catch
                | TokenKind::Throw
                | TokenKind::Print
                | TokenKind::Stop
                | TokenKind::End
                | TokenKind::EndSub
                | TokenKind::EndFunction
                | TokenKind::EndIf
                | TokenKind::EndWhile
                | TokenKind::EndFor
                | TokenKind::And
                | TokenKind::Or
                | TokenKind::Not
                | TokenKind::Mod
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Invalid
        )
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::StringLiteral
                | TokenKind::IntegerLiteral
                | TokenKind::LongIntegerLiteral
                | TokenKind::FloatLiteral
                | TokenKind::DoubleLiteral
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Invalid
        )
    }

    /// Operators that turn an assignment into a compound assignment
    pub fn is_compound_assignment(self) -> bool {
        matches!(
            self,
            TokenKind::PlusEqual
                | TokenKind::MinusEqual
                | TokenKind::StarEqual
                | TokenKind::SlashEqual
                | TokenKind::BackslashEqual
                | TokenKind::LeftShiftEqual
                | TokenKind::RightShiftEqual
        )
    }

    /// Short lowercase name of a literal kind, as used in enum diagnostics
    pub fn literal_type_name(self) -> &'static str {
        match self {
            TokenKind::StringLiteral => "string",
            TokenKind::IntegerLiteral => "integer",
            TokenKind::LongIntegerLiteral => "longinteger",
            TokenKind::FloatLiteral => "float",
            TokenKind::DoubleLiteral => "double",
            TokenKind::True | TokenKind::False => "boolean",
            TokenKind::Invalid => "invalid",
            _ => "dynamic",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Sub => write!(f, "sub"),
            TokenKind::Function => write!(f, "function"),
            TokenKind::Namespace => write!(f, "namespace"),
            TokenKind::Class => write!(f, "class"),
            TokenKind::Extends => write!(f, "extends"),
            TokenKind::Interface => write!(f, "interface"),
            TokenKind::Enum => write!(f, "enum"),
            TokenKind::Const => write!(f, "const"),
            TokenKind::Import => write!(f, "import"),
            TokenKind::Library => write!(f, "library"),
            TokenKind::Public => write!(f, "public"),
            TokenKind::Protected => write!(f, "protected"),
            TokenKind::Private => write!(f, "private"),
            TokenKind::Override => write!(f, "override"),
            TokenKind::Typecast => write!(f, "typecast"),
            TokenKind::Alias => write!(f, "alias"),
            TokenKind::As => write!(f, "as"),
            TokenKind::Dim => write!(f, "dim"),
            TokenKind::New => write!(f, "new"),
            TokenKind::If => write!(f, "if"),
            TokenKind::Then => write!(f, "then"),
            TokenKind::Else => write!(f, "else"),
            TokenKind::While => write!(f, "while"),
            TokenKind::For => write!(f, "for"),
            TokenKind::Each => write!(f, "each"),
            TokenKind::In => write!(f, "in"),
            TokenKind::To => write!(f, "to"),
            TokenKind::Step => write!(f, "step"),
            TokenKind::Next => write!(f, "next"),
            TokenKind::Exit => write!(f, "exit"),
            TokenKind::Continue => write!(f, "continue"),
            TokenKind::Return => write!(f, "return"),
            TokenKind::Try => write!(f, "try"),
            TokenKind::Catch => write!(f, "catch"),
            TokenKind::Throw => write!(f, "throw"),
            TokenKind::Print => write!(f, "print"),
            TokenKind::Stop => write!(f, "stop"),
            TokenKind::End => write!(f, "end"),
            TokenKind::EndSub => write!(f, "endsub"),
            TokenKind::EndFunction => write!(f, "endfunction"),
            TokenKind::EndIf => write!(f, "endif"),
            TokenKind::EndWhile => write!(f, "endwhile"),
            TokenKind::EndFor => write!(f, "endfor"),
            TokenKind::And => write!(f, "and"),
            TokenKind::Or => write!(f, "or"),
            TokenKind::Not => write!(f, "not"),
            TokenKind::Mod => write!(f, "mod"),
            TokenKind::True => write!(f, "true"),
            TokenKind::False => write!(f, "false"),
            TokenKind::Invalid => write!(f, "invalid"),
            TokenKind::StringLiteral => write!(f, "string literal"),
            TokenKind::IntegerLiteral => write!(f, "integer literal"),
            TokenKind::LongIntegerLiteral => write!(f, "longinteger literal"),
            TokenKind::FloatLiteral => write!(f, "float literal"),
            TokenKind::DoubleLiteral => write!(f, "double literal"),
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::Comment => write!(f, "comment"),
            TokenKind::HashConst => write!(f, "#const"),
            TokenKind::HashIf => write!(f, "#if"),
            TokenKind::HashElse => write!(f, "#else"),
            TokenKind::HashEnd => write!(f, "#end"),
            TokenKind::HashEndIf => write!(f, "#endif"),
            TokenKind::HashError => write!(f, "#error"),
            TokenKind::QuestionDot => write!(f, "?."),
            TokenKind::QuestionLeftSquare => write!(f, "?["),
            TokenKind::Callfunc => write!(f, "@."),
            TokenKind::LessGreater => write!(f, "<>"),
            TokenKind::LessEqual => write!(f, "<="),
            TokenKind::GreaterEqual => write!(f, ">="),
            TokenKind::LeftShiftEqual => write!(f, "<<="),
            TokenKind::RightShiftEqual => write!(f, ">>="),
            TokenKind::LeftShift => write!(f, "<<"),
            TokenKind::RightShift => write!(f, ">>"),
            TokenKind::PlusEqual => write!(f, "+="),
            TokenKind::MinusEqual => write!(f, "-="),
            TokenKind::StarEqual => write!(f, "*="),
            TokenKind::SlashEqual => write!(f, "/="),
            TokenKind::BackslashEqual => write!(f, "\\="),
            TokenKind::PlusPlus => write!(f, "++"),
            TokenKind::MinusMinus => write!(f, "--"),
            TokenKind::Equal => write!(f, "="),
            TokenKind::Less => write!(f, "<"),
            TokenKind::Greater => write!(f, ">"),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Slash => write!(f, "/"),
            TokenKind::Backslash => write!(f, "\\"),
            TokenKind::Caret => write!(f, "^"),
            TokenKind::Question => write!(f, "?"),
            TokenKind::At => write!(f, "@"),
            TokenKind::LeftParen => write!(f, "("),
            TokenKind::RightParen => write!(f, ")"),
            TokenKind::LeftSquare => write!(f, "["),
            TokenKind::RightSquare => write!(f, "]"),
            TokenKind::LeftCurly => write!(f, "{{"),
            TokenKind::RightCurly => write!(f, "}}"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Dot => write!(f, "."),
            TokenKind::Colon => write!(f, ":"),
            TokenKind::Semicolon => write!(f, ";"),
            TokenKind::Newline => write!(f, "newline"),
            TokenKind::ForEach => write!(f, "for each"),
            TokenKind::Eof => write!(f, "EOF"),
        }
    }
}
