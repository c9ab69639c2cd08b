use super::token::{Pos, Token, TokenKind};
use crate::error::Error;
use std::iter::Peekable;
use std::str::CharIndices;

pub struct Lexer<'a> {
    code: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(code: &'a str) -> Self {
        Self { code }
    }

    pub fn parse(self) -> Result<Vec<Token>, Error> {
        let mut tokens = Vec::new();
        for (idx, line) in self.code.lines().enumerate() {
            LineLexer::new(line, idx + 1).parse(&mut tokens)?;
        }
        tracing::debug!("lexed {} tokens", tokens.len());
        Ok(tokens)
    }
}

/// Tokenize a whole source text
pub fn lex(code: &str) -> Result<Vec<Token>, Error> {
    Lexer::new(code).parse()
}

pub struct LineLexer<'a> {
    line: &'a str,
    iter: Peekable<CharIndices<'a>>,
    row: usize,
}

impl<'a> LineLexer<'a> {
    pub fn new(line: &'a str, row: usize) -> Self {
        Self {
            line,
            iter: line.char_indices().peekable(),
            row,
        }
    }
}

// ----------------------------------------------------------------------------
// Helpers
// ----------------------------------------------------------------------------

impl<'a> LineLexer<'a> {
    fn peek_nth(&self, n: usize) -> Option<(usize, char)> {
        self.iter.clone().nth(n)
    }
    fn consume(&mut self) -> Option<(usize, char)> {
        self.iter.next()
    }
    fn offset(&mut self) -> usize {
        self.iter.peek().map_or(self.line.len(), |(idx, _)| *idx)
    }
}

// ----------------------------------------------------------------------------
// Parser
// ----------------------------------------------------------------------------

impl<'a> LineLexer<'a> {
    /// Append the tokens of this line to `tokens`.
    /// The tokens already lexed decide whether `-` starts a negative literal.
    pub fn parse(mut self, tokens: &mut Vec<Token>) -> Result<(), Error> {
        while let Some((idx, ch0)) = self.peek_nth(0) {
            // 0. Skip whitespaces
            if ch0.is_whitespace() {
                self.consume();
                continue;
            }

            let pos = Pos::new(self.row, idx + 1);
            let next = self.peek_nth(1).map(|(_, ch)| ch);

            // 1. Comment runs to the end of line
            if ch0 == '/' && next == Some('/') {
                break;
            }

            // 2. Negative number literal
            let after_operand =
                tokens.last().is_some_and(|tok| tok.ends_operand()) && !closes_cast(tokens);
            if ch0 == '-' && next.is_some_and(|ch| ch.is_ascii_digit()) && !after_operand {
                self.consume();
                let token = self.parse_number(idx, pos, true)?;
                tokens.push(token);
                continue;
            }

            // 3. Double character token
            if let Some(ch1) = next {
                if let Some(kind) = double_char_token(ch0, ch1) {
                    self.consume();
                    self.consume();
                    tokens.push(Token::new(kind, pos, &self.line[idx..idx + 2]));
                    continue;
                }
            }

            // 4. Single character token
            if let Some(kind) = single_char_token(ch0) {
                self.consume();
                tokens.push(Token::new(kind, pos, ch0.to_string()));
                continue;
            }

            // 5. Number literal
            if ch0.is_ascii_digit() {
                let token = self.parse_number(idx, pos, false)?;
                tokens.push(token);
                continue;
            }

            // 6. String literal
            if ch0 == '"' {
                let token = self.parse_text(idx, pos)?;
                tokens.push(token);
                continue;
            }

            // 7. Identifier or keyword
            if ch0.is_ascii_alphabetic() || ch0 == '_' {
                let token = self.parse_word(idx, pos);
                tokens.push(token);
                continue;
            }

            return Err(Error::UnknownCharacter(ch0, pos));
        }
        Ok(())
    }

    fn parse_word(&mut self, start: usize, pos: Pos) -> Token {
        while self
            .iter
            .next_if(|(_, ch)| matches!(ch, '_' | '0'..='9' | 'a'..='z' | 'A'..='Z'))
            .is_some()
        {}
        let end = self.offset();
        let lexeme = &self.line[start..end];
        let kind = keyword(lexeme).unwrap_or_else(|| TokenKind::Ident(lexeme.to_string()));
        Token::new(kind, pos, lexeme)
    }

    // Text: "hoge\nfuga"
    fn parse_text(&mut self, start: usize, pos: Pos) -> Result<Token, Error> {
        self.consume();

        let mut lexeme = String::new();
        let mut escape = false;
        while let Some((idx, ch)) = self.consume() {
            if escape {
                match ch {
                    '\\' => lexeme.push('\\'),
                    '"' => lexeme.push('"'),
                    'n' => lexeme.push('\n'),
                    't' => lexeme.push('\t'),
                    '0' => lexeme.push('\0'),
                    ch => return Err(Error::UnknownCharacter(ch, Pos::new(self.row, idx + 1))),
                }
                escape = false;
            } else {
                match ch {
                    '"' => {
                        let raw = &self.line[start..idx + 1];
                        return Ok(Token::new(TokenKind::Text(lexeme), pos, raw));
                    }
                    '\\' => escape = true,
                    ch => lexeme.push(ch),
                }
            }
        }
        Err(Error::UnterminatedString(pos))
    }

    /// `start` is the offset of the first character, including a leading '-'
    fn parse_number(&mut self, start: usize, pos: Pos, negative: bool) -> Result<Token, Error> {
        let (_, ch0) = self.consume().ok_or(Error::UnexpectedEOF)?;
        let hex = ch0 == '0' && matches!(self.iter.peek(), Some((_, 'x' | 'X')));
        if hex {
            self.consume();
            while self
                .iter
                .next_if(|(_, ch)| matches!(ch, '_' | '0'..='9' | 'a'..='f' | 'A'..='F'))
                .is_some()
            {}
        } else {
            while self
                .iter
                .next_if(|(_, ch)| matches!(ch, '_' | '0'..='9'))
                .is_some()
            {}
        }
        let end = self.offset();
        let lexeme = &self.line[start..end];
        let digits = lexeme.trim_start_matches('-').replace('_', "");
        let value = if hex {
            u64::from_str_radix(&digits[2..], 16)
        } else {
            digits.parse::<u64>()
        };
        match value {
            Ok(num) => Ok(Token::new(TokenKind::Number(num, negative), pos, lexeme)),
            Err(_) => Err(Error::InvalidNumber(lexeme.to_string(), pos)),
        }
    }
}

/// The tokens end with `( type )` that is not a call; type is a keyword with optional `*`s
fn closes_cast(tokens: &[Token]) -> bool {
    use TokenKind::*;
    let mut rev = tokens.iter().rev();
    if !rev.next().is_some_and(|tok| tok.kind == RParen) {
        return false;
    }
    let mut rev = rev.skip_while(|tok| tok.kind == Star);
    if !rev
        .next()
        .is_some_and(|tok| matches!(tok.kind, KwVoid | KwBool | KwU8 | KwU16 | KwI8 | KwI16))
    {
        return false;
    }
    let mut rev = rev.skip_while(|tok| tok.kind == Star);
    rev.next().is_some_and(|tok| tok.kind == LParen)
        && !rev.next().is_some_and(|tok| matches!(tok.kind, Ident(_)))
}

fn double_char_token(ch0: char, ch1: char) -> Option<TokenKind> {
    match (ch0, ch1) {
        ('=', '=') => Some(TokenKind::EqualEqual),
        ('!', '=') => Some(TokenKind::ExclEqual),
        ('<', '=') => Some(TokenKind::LAngleEqual),
        ('>', '=') => Some(TokenKind::RAngleEqual),
        ('&', '&') => Some(TokenKind::AmpAmp),
        ('|', '|') => Some(TokenKind::PipePipe),
        ('-', '>') => Some(TokenKind::Arrow),
        _ => None,
    }
}

fn single_char_token(ch: char) -> Option<TokenKind> {
    match ch {
        '=' => Some(TokenKind::Equal),
        '+' => Some(TokenKind::Plus),
        '-' => Some(TokenKind::Minus),
        '*' => Some(TokenKind::Star),
        '&' => Some(TokenKind::Ampasand),
        ':' => Some(TokenKind::Colon),
        ';' => Some(TokenKind::Semicolon),
        ',' => Some(TokenKind::Comma),
        '(' => Some(TokenKind::LParen),
        ')' => Some(TokenKind::RParen),
        '{' => Some(TokenKind::LCurly),
        '}' => Some(TokenKind::RCurly),
        '<' => Some(TokenKind::LAngle),
        '>' => Some(TokenKind::RAngle),
        _ => None,
    }
}

fn keyword(s: &str) -> Option<TokenKind> {
    match s {
        "void" => Some(TokenKind::KwVoid),
        "bool" => Some(TokenKind::KwBool),
        "u8" => Some(TokenKind::KwU8),
        "u16" => Some(TokenKind::KwU16),
        "i8" => Some(TokenKind::KwI8),
        "i16" => Some(TokenKind::KwI16),
        "if" => Some(TokenKind::KwIf),
        "else" => Some(TokenKind::KwElse),
        "while" => Some(TokenKind::KwWhile),
        "return" => Some(TokenKind::KwReturn),
        "break" => Some(TokenKind::KwBreak),
        "continue" => Some(TokenKind::KwContinue),
        "true" => Some(TokenKind::KwTrue),
        "false" => Some(TokenKind::KwFalse),
        "null" => Some(TokenKind::KwNull),
        _ => None,
    }
}
