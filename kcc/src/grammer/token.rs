use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: Pos,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, pos: Pos, text: impl Into<String>) -> Self {
        Token {
            kind,
            pos,
            text: text.into(),
        }
    }

    /// True if this token can be the last token of an operand
    pub fn ends_operand(&self) -> bool {
        use TokenKind::*;
        matches!(
            self.kind,
            Ident(_) | Number(..) | Text(_) | RParen | KwTrue | KwFalse | KwNull
        )
    }

    /// True if this token can be the first token of an operand
    pub fn starts_operand(&self) -> bool {
        use TokenKind::*;
        matches!(
            self.kind,
            Ident(_) | Number(..) | Text(_) | KwTrue | KwFalse | KwNull | Star | Ampasand
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Double character tokens
    EqualEqual,  // '=='
    ExclEqual,   // '!='
    RAngleEqual, // '>='
    LAngleEqual, // '<='
    AmpAmp,      // '&&'
    PipePipe,    // '||'
    Arrow,       // '->'

    // Single character tokens
    Equal,     // '='
    Plus,      // '+'
    Minus,     // '-'
    Star,      // '*'
    Ampasand,  // '&'
    Colon,     // ':'
    Semicolon, // ';'
    Comma,     // ','
    LParen,    // '('
    RParen,    // ')'
    LCurly,    // '{'
    RCurly,    // '}'
    LAngle,    // '<'
    RAngle,    // '>'

    // Keywords
    KwVoid,     // "void"
    KwBool,     // "bool"
    KwU8,       // "u8"
    KwU16,      // "u16"
    KwI8,       // "i8"
    KwI16,      // "i16"
    KwIf,       // "if"
    KwElse,     // "else"
    KwWhile,    // "while"
    KwReturn,   // "return"
    KwBreak,    // "break"
    KwContinue, // "continue"
    KwTrue,     // "true"
    KwFalse,    // "false"
    KwNull,     // "null"

    // Identifier
    Ident(String),

    // Literals
    Number(u64, bool), // magnitude, negative
    Text(String),
}

/// 1-based source position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pos {
    pub line: usize,
    pub col: usize,
}

impl Pos {
    pub fn new(line: usize, col: usize) -> Self {
        Pos { line, col }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}
