use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::Span;

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("return", TokenKind::Return);
        map.insert("if", TokenKind::If);
        map.insert("else", TokenKind::Else);
        map.insert("while", TokenKind::While);
        map.insert("range", TokenKind::Range);
        map.insert("each", TokenKind::Each);
        map.insert("func", TokenKind::Func);
        map.insert("echo", TokenKind::Echo);
        map.insert("in", TokenKind::In);
        map.insert("to", TokenKind::To);
        map.insert("by", TokenKind::By);
        map.insert("halt", TokenKind::Halt);
        map.insert("skip", TokenKind::Skip);
        map.insert("int", TokenKind::Int);
        map.insert("float", TokenKind::Float);
        map.insert("bool", TokenKind::Bool);
        map.insert("str", TokenKind::Str);
        map.insert("infer", TokenKind::Infer);
        map.insert("void", TokenKind::Void);
        map.insert("template", TokenKind::Template);
        map.insert("entity", TokenKind::Entity);
        map.insert("true", TokenKind::BooleanLiteral);
        map.insert("false", TokenKind::BooleanLiteral);
        map.insert("null", TokenKind::NullLiteral);
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    IntegerLiteral,
    FloatLiteral,
    StringLiteral,
    BooleanLiteral,
    NullLiteral,
    Identifier,

    OpenBracket,
    CloseBracket,
    OpenCurly,
    CloseCurly,
    OpenParen,
    CloseParen,

    Assignment, // =
    Equals,     // ==
    Not,        // !
    NotEquals,  // !=

    Less,
    LessEquals,
    Greater,
    GreaterEquals,

    Or,
    And,

    Dot,
    Semicolon,
    Colon,
    Comma,
    Arrow,       // >>
    ReturnArrow, // ->

    PlusPlus,
    MinusMinus,
    PlusEquals,
    MinusEquals,
    SlashEquals,
    StarEquals,

    Plus,
    Dash,
    Slash,
    Star,

    // Reserved
    Return,
    If,
    Else,
    While,
    Range,
    Each,
    Func,
    Echo,
    In,
    To,
    By,
    Halt,
    Skip,
    Int,
    Float,
    Bool,
    Str,
    Infer,
    Void,
    Template,
    Entity,
}

impl TokenKind {
    /// Keywords that name a primitive variable type.
    pub fn is_primitive_type(&self) -> bool {
        matches!(
            self,
            TokenKind::Int | TokenKind::Float | TokenKind::Bool | TokenKind::Str | TokenKind::Infer
        )
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_one_of_many(&[
            TokenKind::StringLiteral,
            TokenKind::Identifier,
            TokenKind::IntegerLiteral,
            TokenKind::FloatLiteral,
            TokenKind::BooleanLiteral,
        ]) {
            write!(
                f,
                "{}:{} {} ({:?})",
                self.span.start.line, self.span.start.column, self.kind, self.value
            )
        } else {
            write!(
                f,
                "{}:{} {}",
                self.span.start.line, self.span.start.column, self.kind
            )
        }
    }
}

impl Token {
    pub fn is_one_of_many(&self, tokens: &[TokenKind]) -> bool {
        tokens.contains(&self.kind)
    }
}
