//! Syntax check for binding condition expressions.
//!
//! Conditions use a subset of the Common Expression Language: literals,
//! identifiers, member access, indexing, function and method calls, list and
//! map literals, unary `!` and `-`, the binary operators
//! `|| && == != < <= > >= in + - * / %`, and the `?:` conditional.
//! Only syntax is checked; nothing is evaluated.

use thiserror::Error;

/// Deepest nesting accepted before an expression is rejected.
const MAX_NESTING: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionError {
    #[error("condition expression is empty")]
    Empty,

    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("unterminated string literal starting at position {pos}")]
    UnterminatedString { pos: usize },

    #[error("malformed number at position {pos}")]
    MalformedNumber { pos: usize },

    #[error("expected {expected} at position {pos}")]
    Expected { expected: &'static str, pos: usize },

    #[error("unexpected end of expression, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("expression nested deeper than {MAX_NESTING} levels")]
    TooDeep,
}

/// Check that `expr` is a syntactically valid condition.
///
/// # Errors
///
/// Returns [`ConditionError`] describing the first syntax error found.
pub fn check_condition(expr: &str) -> Result<(), ConditionError> {
    let tokens = lex(expr)?;
    if tokens.is_empty() {
        return Err(ConditionError::Empty);
    }

    let mut parser = Parser {
        tokens: &tokens,
        idx: 0,
        depth: 0,
    };
    parser.expr()?;

    match parser.peek() {
        None => Ok(()),
        Some(tok) => Err(ConditionError::Expected {
            expected: "end of expression",
            pos: tok.pos,
        }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Ident,
    Literal,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Question,
    Dot,
    Not,
    Minus,
    /// Binary operator with its precedence.
    Binary(u8),
}

#[derive(Debug, Clone, Copy)]
struct Token {
    kind: Kind,
    pos: usize,
}

const PREC_OR: u8 = 1;
const PREC_AND: u8 = 2;
const PREC_REL: u8 = 3;
const PREC_ADD: u8 = 4;
const PREC_MUL: u8 = 5;

fn lex(input: &str) -> Result<Vec<Token>, ConditionError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        let next = chars.peek().map(|&(_, c)| c);
        let kind = match ch {
            c if c.is_whitespace() => continue,
            '(' => Kind::LParen,
            ')' => Kind::RParen,
            '[' => Kind::LBracket,
            ']' => Kind::RBracket,
            '{' => Kind::LBrace,
            '}' => Kind::RBrace,
            ',' => Kind::Comma,
            ':' => Kind::Colon,
            '?' => Kind::Question,
            '.' if !next.is_some_and(|c| c.is_ascii_digit()) => Kind::Dot,
            '-' => Kind::Minus,
            '+' => Kind::Binary(PREC_ADD),
            '*' | '/' | '%' => Kind::Binary(PREC_MUL),
            '!' | '=' | '<' | '>' => {
                if next == Some('=') {
                    chars.next();
                    Kind::Binary(PREC_REL)
                } else if ch == '!' {
                    Kind::Not
                } else if ch == '=' {
                    return Err(ConditionError::UnexpectedChar { ch, pos });
                } else {
                    Kind::Binary(PREC_REL)
                }
            }
            '&' | '|' => {
                if next != Some(ch) {
                    return Err(ConditionError::UnexpectedChar { ch, pos });
                }
                chars.next();
                if ch == '&' {
                    Kind::Binary(PREC_AND)
                } else {
                    Kind::Binary(PREC_OR)
                }
            }
            '"' | '\'' => {
                skip_string(&mut chars, ch, pos)?;
                Kind::Literal
            }
            c if c.is_ascii_digit() || c == '.' => {
                skip_number(&mut chars, c, pos)?;
                Kind::Literal
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let end = skip_ident(&mut chars, pos + c.len_utf8());
                let word = &input[pos..end];

                // Raw and bytes string prefixes.
                if matches!(word, "r" | "R" | "b" | "B" | "rb" | "br" | "RB" | "BR")
                    && let Some(&(_, quote @ ('"' | '\''))) = chars.peek()
                {
                    chars.next();
                    skip_string(&mut chars, quote, pos)?;
                    Kind::Literal
                } else {
                    match word {
                        "true" | "false" | "null" => Kind::Literal,
                        "in" => Kind::Binary(PREC_REL),
                        _ => Kind::Ident,
                    }
                }
            }
            _ => return Err(ConditionError::UnexpectedChar { ch, pos }),
        };
        tokens.push(Token { kind, pos });
    }

    Ok(tokens)
}

type Chars<'a> = std::iter::Peekable<std::str::CharIndices<'a>>;

fn skip_ident(chars: &mut Chars<'_>, mut end: usize) -> usize {
    while let Some(&(pos, c)) = chars.peek() {
        if !(c.is_ascii_alphanumeric() || c == '_') {
            break;
        }
        end = pos + c.len_utf8();
        chars.next();
    }
    end
}

fn skip_string(chars: &mut Chars<'_>, quote: char, start: usize) -> Result<(), ConditionError> {
    let mut escaped = false;
    for (_, c) in chars.by_ref() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '\n' => break,
            c if c == quote => return Ok(()),
            _ => {}
        }
    }
    Err(ConditionError::UnterminatedString { pos: start })
}

fn skip_number(chars: &mut Chars<'_>, first: char, start: usize) -> Result<(), ConditionError> {
    let malformed = ConditionError::MalformedNumber { pos: start };

    if first == '0' && chars.peek().is_some_and(|&(_, c)| c == 'x' || c == 'X') {
        chars.next();
        let mut digits = 0;
        while chars.next_if(|&(_, c)| c.is_ascii_hexdigit()).is_some() {
            digits += 1;
        }
        if digits == 0 {
            return Err(malformed);
        }
        chars.next_if(|&(_, c)| c == 'u' || c == 'U');
        return end_of_number(chars, malformed);
    }

    let mut seen_dot = first == '.';
    let mut seen_exp = false;
    while let Some(&(_, c)) = chars.peek() {
        match c {
            '0'..='9' => {}
            '.' if !seen_dot && !seen_exp => seen_dot = true,
            'e' | 'E' if !seen_exp => {
                seen_exp = true;
                chars.next();
                chars.next_if(|&(_, c)| c == '+' || c == '-');
                if chars.next_if(|&(_, c)| c.is_ascii_digit()).is_none() {
                    return Err(malformed);
                }
                continue;
            }
            _ => break,
        }
        chars.next();
    }

    if !seen_dot && !seen_exp {
        chars.next_if(|&(_, c)| c == 'u' || c == 'U');
    }
    end_of_number(chars, malformed)
}

fn end_of_number(chars: &mut Chars<'_>, malformed: ConditionError) -> Result<(), ConditionError> {
    match chars.peek() {
        Some(&(_, c)) if c.is_ascii_alphanumeric() || c == '_' || c == '.' => Err(malformed),
        _ => Ok(()),
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    idx: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.idx).copied()
    }

    fn peek_kind(&self) -> Option<Kind> {
        self.peek().map(|t| t.kind)
    }

    fn advance(&mut self) {
        self.idx += 1;
    }

    fn eat(&mut self, kind: Kind) -> bool {
        if self.peek_kind() == Some(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: Kind, expected: &'static str) -> Result<(), ConditionError> {
        match self.peek() {
            Some(tok) if tok.kind == kind => {
                self.advance();
                Ok(())
            }
            Some(tok) => Err(ConditionError::Expected {
                expected,
                pos: tok.pos,
            }),
            None => Err(ConditionError::UnexpectedEnd { expected }),
        }
    }

    fn enter(&mut self) -> Result<(), ConditionError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(ConditionError::TooDeep);
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// `binary ('?' expr ':' expr)?`
    fn expr(&mut self) -> Result<(), ConditionError> {
        self.enter()?;
        self.binary(PREC_OR)?;
        if self.eat(Kind::Question) {
            self.expr()?;
            self.expect(Kind::Colon, "':'")?;
            self.expr()?;
        }
        self.leave();
        Ok(())
    }

    /// Precedence climbing over the binary operators.
    fn binary(&mut self, min_prec: u8) -> Result<(), ConditionError> {
        self.unary()?;
        loop {
            let prec = match self.peek_kind() {
                Some(Kind::Binary(prec)) => prec,
                Some(Kind::Minus) => PREC_ADD,
                _ => break,
            };
            if prec < min_prec {
                break;
            }
            self.advance();
            self.binary(prec + 1)?;
        }
        Ok(())
    }

    fn unary(&mut self) -> Result<(), ConditionError> {
        while matches!(self.peek_kind(), Some(Kind::Not | Kind::Minus)) {
            self.advance();
        }
        self.member()
    }

    /// `primary ('.' IDENT call? | '[' expr ']')*`
    fn member(&mut self) -> Result<(), ConditionError> {
        self.primary()?;
        loop {
            if self.eat(Kind::Dot) {
                self.expect(Kind::Ident, "field name")?;
                if self.eat(Kind::LParen) {
                    self.sequence(Kind::RParen, "')'", Self::expr)?;
                }
            } else if self.eat(Kind::LBracket) {
                self.expr()?;
                self.expect(Kind::RBracket, "']'")?;
            } else {
                return Ok(());
            }
        }
    }

    fn primary(&mut self) -> Result<(), ConditionError> {
        let Some(tok) = self.peek() else {
            return Err(ConditionError::UnexpectedEnd {
                expected: "operand",
            });
        };
        self.advance();

        match tok.kind {
            Kind::Literal => Ok(()),
            Kind::Ident => {
                if self.eat(Kind::LParen) {
                    self.sequence(Kind::RParen, "')'", Self::expr)?;
                }
                Ok(())
            }
            Kind::Dot => self.expect(Kind::Ident, "identifier"),
            Kind::LParen => {
                self.expr()?;
                self.expect(Kind::RParen, "')'")
            }
            Kind::LBracket => self.sequence(Kind::RBracket, "']'", Self::expr),
            Kind::LBrace => self.sequence(Kind::RBrace, "'}'", Self::map_entry),
            _ => Err(ConditionError::Expected {
                expected: "operand",
                pos: tok.pos,
            }),
        }
    }

    fn map_entry(&mut self) -> Result<(), ConditionError> {
        self.expr()?;
        self.expect(Kind::Colon, "':'")?;
        self.expr()
    }

    /// Comma-separated items up to `close`, trailing comma allowed.
    fn sequence(
        &mut self,
        close: Kind,
        expected: &'static str,
        item: fn(&mut Self) -> Result<(), ConditionError>,
    ) -> Result<(), ConditionError> {
        self.enter()?;
        while !self.eat(close) {
            item(self)?;
            if !self.eat(Kind::Comma) {
                self.expect(close, expected)?;
                break;
            }
        }
        self.leave();
        Ok(())
    }
}
