use std::rc::Rc;

use regex::Regex;
use tracing::trace;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position, Span, MK_DEFAULT_HANDLER, MK_TOKEN,
};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

pub type RegexHandler = fn(&mut Lexer, &Regex) -> Result<(), Error>;

/// A pattern anchored at the current position and the handler run when it matches.
#[derive(Clone)]
pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

impl RegexPattern {
    fn new(pattern: &str, handler: RegexHandler) -> Result<Self, regex::Error> {
        Ok(RegexPattern {
            regex: Regex::new(pattern)?,
            handler,
        })
    }
}

/// Patterns in priority order: the first one matching at the current
/// position wins, so longer operators precede their prefixes.
fn default_patterns() -> Result<Vec<RegexPattern>, regex::Error> {
    Ok(vec![
        RegexPattern::new(r"^\s+", skip_handler)?,
        RegexPattern::new(r"^//[^\n]*", skip_handler)?,
        RegexPattern::new(r"(?s)^/\*.*?\*/", skip_handler)?,
        RegexPattern::new(r"^/\*", unterminated_comment_handler)?,
        RegexPattern::new(r"^[a-zA-Z_][a-zA-Z0-9_]*", symbol_handler)?,
        RegexPattern::new(r"^[0-9]+(\.[0-9]+)?", number_handler)?,
        RegexPattern::new(r#"(?s)^"(?:[^"\\]|\\.)*""#, string_handler)?,
        RegexPattern::new(r"(?s)^'(?:[^'\\]|\\.)*'", string_handler)?,
        RegexPattern::new(r#"^["']"#, unterminated_string_handler)?,
        RegexPattern::new(r"^>>", MK_DEFAULT_HANDLER!(TokenKind::Arrow, ">>"))?,
        RegexPattern::new(r"^->", MK_DEFAULT_HANDLER!(TokenKind::ReturnArrow, "->"))?,
        RegexPattern::new(r"^==", MK_DEFAULT_HANDLER!(TokenKind::Equals, "=="))?,
        RegexPattern::new(r"^!=", MK_DEFAULT_HANDLER!(TokenKind::NotEquals, "!="))?,
        RegexPattern::new(r"^<=", MK_DEFAULT_HANDLER!(TokenKind::LessEquals, "<="))?,
        RegexPattern::new(r"^>=", MK_DEFAULT_HANDLER!(TokenKind::GreaterEquals, ">="))?,
        RegexPattern::new(r"^&&", MK_DEFAULT_HANDLER!(TokenKind::And, "&&"))?,
        RegexPattern::new(r"^\|\|", MK_DEFAULT_HANDLER!(TokenKind::Or, "||"))?,
        RegexPattern::new(r"^\+\+", MK_DEFAULT_HANDLER!(TokenKind::PlusPlus, "++"))?,
        RegexPattern::new(r"^--", MK_DEFAULT_HANDLER!(TokenKind::MinusMinus, "--"))?,
        RegexPattern::new(r"^\+=", MK_DEFAULT_HANDLER!(TokenKind::PlusEquals, "+="))?,
        RegexPattern::new(r"^-=", MK_DEFAULT_HANDLER!(TokenKind::MinusEquals, "-="))?,
        RegexPattern::new(r"^\*=", MK_DEFAULT_HANDLER!(TokenKind::StarEquals, "*="))?,
        RegexPattern::new(r"^/=", MK_DEFAULT_HANDLER!(TokenKind::SlashEquals, "/="))?,
        RegexPattern::new(r"^\[", MK_DEFAULT_HANDLER!(TokenKind::OpenBracket, "["))?,
        RegexPattern::new(r"^\]", MK_DEFAULT_HANDLER!(TokenKind::CloseBracket, "]"))?,
        RegexPattern::new(r"^\{", MK_DEFAULT_HANDLER!(TokenKind::OpenCurly, "{"))?,
        RegexPattern::new(r"^\}", MK_DEFAULT_HANDLER!(TokenKind::CloseCurly, "}"))?,
        RegexPattern::new(r"^\(", MK_DEFAULT_HANDLER!(TokenKind::OpenParen, "("))?,
        RegexPattern::new(r"^\)", MK_DEFAULT_HANDLER!(TokenKind::CloseParen, ")"))?,
        RegexPattern::new(r"^\.", MK_DEFAULT_HANDLER!(TokenKind::Dot, "."))?,
        RegexPattern::new(r"^,", MK_DEFAULT_HANDLER!(TokenKind::Comma, ","))?,
        RegexPattern::new(r"^;", MK_DEFAULT_HANDLER!(TokenKind::Semicolon, ";"))?,
        RegexPattern::new(r"^:", MK_DEFAULT_HANDLER!(TokenKind::Colon, ":"))?,
        RegexPattern::new(r"^=", MK_DEFAULT_HANDLER!(TokenKind::Assignment, "="))?,
        RegexPattern::new(r"^!", MK_DEFAULT_HANDLER!(TokenKind::Not, "!"))?,
        RegexPattern::new(r"^<", MK_DEFAULT_HANDLER!(TokenKind::Less, "<"))?,
        RegexPattern::new(r"^>", MK_DEFAULT_HANDLER!(TokenKind::Greater, ">"))?,
        RegexPattern::new(r"^\+", MK_DEFAULT_HANDLER!(TokenKind::Plus, "+"))?,
        RegexPattern::new(r"^-", MK_DEFAULT_HANDLER!(TokenKind::Dash, "-"))?,
        RegexPattern::new(r"^\*", MK_DEFAULT_HANDLER!(TokenKind::Star, "*"))?,
        RegexPattern::new(r"^/", MK_DEFAULT_HANDLER!(TokenKind::Slash, "/"))?,
    ])
}

lazy_static::lazy_static! {
    static ref PATTERNS: Result<Vec<RegexPattern>, regex::Error> = default_patterns();
}

pub struct Lexer {
    tokens: Vec<Token>,
    source: String,
    pos: usize,
    line: u32,
    column: u32,
    file: Rc<String>,
}

impl Lexer {
    pub fn new(source: String, file: Option<String>) -> Lexer {
        let file_name = if let Some(file) = file {
            Rc::new(file)
        } else {
            Rc::new(String::from("shell"))
        };

        Lexer {
            tokens: vec![],
            source,
            pos: 0,
            line: 1,
            column: 1,
            file: file_name,
        }
    }

    /// Moves forward `n` bytes, updating line and column for every character passed.
    pub fn advance_n(&mut self, n: usize) {
        let end = (self.pos + n).min(self.source.len());
        for ch in self.source[self.pos..end].chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.pos = end;
    }

    pub fn push(&mut self, token: Token) {
        trace!(kind = %token.kind, value = %token.value, line = token.span.start.line, "token");
        self.tokens.push(token);
    }

    pub fn position(&self) -> Position {
        Position::new(self.pos as u32, self.line, self.column, Rc::clone(&self.file))
    }

    pub fn at(&self) -> char {
        self.remainder().chars().next().unwrap_or('\0')
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn matched<'a>(&'a self, regex: &Regex) -> &'a str {
        regex
            .find(self.remainder())
            .map(|m| m.as_str())
            .unwrap_or("")
    }
}

fn skip_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let length = lexer.matched(regex).len();
    lexer.advance_n(length);
    Ok(())
}

fn number_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex).to_string();
    let kind = if matched.contains('.') {
        TokenKind::FloatLiteral
    } else {
        TokenKind::IntegerLiteral
    };

    let start = lexer.position();
    lexer.advance_n(matched.len());
    let end = lexer.position();
    lexer.push(MK_TOKEN!(kind, matched, Span { start, end }));
    Ok(())
}

fn string_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex).to_string();
    let raw = &matched[1..matched.len() - 1];

    let mut result = String::new();
    let mut chars = raw.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }

        match chars.peek() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('0') => result.push('\0'),
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some('\'') => result.push('\''),
            Some(other) => {
                // Unknown escapes keep their backslash
                result.push('\\');
                result.push(*other);
            }
            None => {
                result.push('\\');
                continue;
            }
        }
        chars.next();
    }

    let start = lexer.position();
    lexer.advance_n(matched.len());
    let end = lexer.position();
    lexer.push(MK_TOKEN!(TokenKind::StringLiteral, result, Span { start, end }));
    Ok(())
}

fn unterminated_string_handler(lexer: &mut Lexer, _regex: &Regex) -> Result<(), Error> {
    Err(Error::new(ErrorImpl::UnterminatedString, lexer.position()))
}

fn unterminated_comment_handler(lexer: &mut Lexer, _regex: &Regex) -> Result<(), Error> {
    Err(Error::new(ErrorImpl::UnterminatedComment, lexer.position()))
}

fn symbol_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let value = lexer.matched(regex).to_string();
    let kind = RESERVED_LOOKUP
        .get(value.as_str())
        .copied()
        .unwrap_or(TokenKind::Identifier);

    let start = lexer.position();
    lexer.advance_n(value.len());
    let end = lexer.position();
    lexer.push(MK_TOKEN!(kind, value, Span { start, end }));
    Ok(())
}

/// Converts source text into tokens, always terminated by an `EOF` token.
///
/// # Arguments
///
/// * `source` - The program text
/// * `file` - File name recorded in every position, `shell` when absent
///
/// # Returns
///
/// The token stream, or the first lexical error.
pub fn tokenize(source: String, file: Option<String>) -> Result<Vec<Token>, Error> {
    let mut lex = Lexer::new(source, file);

    let patterns = match PATTERNS.as_ref() {
        Ok(patterns) => patterns,
        Err(_) => {
            return Err(Error::new(
                ErrorImpl::UnrecognisedToken {
                    token: lex.at().to_string(),
                },
                lex.position(),
            ))
        }
    };

    while !lex.at_eof() {
        let matched = patterns
            .iter()
            .find(|pattern| pattern.regex.is_match(lex.remainder()));

        match matched {
            Some(pattern) => (pattern.handler)(&mut lex, &pattern.regex)?,
            None => {
                return Err(Error::new(
                    ErrorImpl::UnrecognisedToken {
                        token: lex.at().to_string(),
                    },
                    lex.position(),
                ));
            }
        }
    }

    let end = lex.position();
    lex.push(MK_TOKEN!(
        TokenKind::EOF,
        String::from("EOF"),
        Span {
            start: end.clone(),
            end
        }
    ));
    Ok(lex.tokens)
}
