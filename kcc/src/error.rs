use crate::grammer::token::{Pos, Token, TokenKind};
use color_print::cformat;
use std::fmt;
use thiserror::Error;

// Token information without lifetime
#[derive(Debug, Clone, PartialEq)]
pub struct TokenInfo {
    pub kind: TokenKind,
    pub text: String,
    pub pos: Pos,
}

impl fmt::Display for TokenInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` at {}", self.text, self.pos)
    }
}

impl From<Token> for TokenInfo {
    fn from(token: Token) -> Self {
        TokenInfo {
            kind: token.kind,
            text: token.text,
            pos: token.pos,
        }
    }
}

impl From<&Token> for TokenInfo {
    fn from(token: &Token) -> Self {
        TokenInfo {
            kind: token.kind.clone(),
            text: token.text.clone(),
            pos: token.pos,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lexical,
    Syntax,
    Type,
    Unsupported,
    Internal,
}

// Unified error type for KCC
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // Lexical errors
    #[error("Unknown character: {0:?}")]
    UnknownCharacter(char, Pos),

    #[error("Invalid number literal: {0}")]
    InvalidNumber(String, Pos),

    #[error("Unterminated string literal")]
    UnterminatedString(Pos),

    // Syntax errors
    #[error("Unexpected end of file")]
    UnexpectedEOF,

    #[error("Unexpected token: {0}")]
    UnexpectedToken(TokenInfo),

    #[error("Expected {0}, found {1}")]
    Expected(&'static str, TokenInfo),

    #[error("Unclosed parenthesis")]
    UnclosedParen(Pos),

    #[error("Empty parenthesized expression")]
    EmptyParen(Pos),

    #[error("Missing operand before {0}")]
    MissingOperand(TokenInfo),

    // Type errors
    #[error("Undeclared identifier: {0}")]
    UndeclaredIdentifier(String, Pos),

    #[error("Variable `{0}` is used before assignment")]
    Uninitialized(String, Pos),

    #[error("Cannot implicitly cast {0} to {1}")]
    ImplicitPointerCast(String, String, Pos),

    #[error("Literal {0} does not fit in {1}")]
    DataLoss(String, String, Pos),

    #[error("Implicit narrowing from {0} to {1}")]
    ImplicitNarrowing(String, String, Pos),

    #[error("Signedness mismatch: {0} and {1}")]
    SignMismatch(String, String, Pos),

    #[error("{0} is not an arithmetic type")]
    NotAlgebraic(String, Pos),

    #[error("Cannot cast {0} to {1}")]
    PointerCastMismatch(String, String, Pos),

    #[error("Literal {0} is too wide for any integer type")]
    LiteralOverflow(String, Pos),

    #[error("Left side of assignment is not a variable")]
    InvalidAssignTarget(Pos),

    #[error("Declaration of `{0}` used as a value")]
    DeclarationAsValue(String, Pos),

    #[error("Return does not match function type {0}")]
    ReturnMismatch(String, Pos),

    // Parsed but not lowered
    #[error("{0} cannot be lowered yet")]
    Unsupported(&'static str, Pos),

    // Internal errors
    #[error("Cannot attach a node under a sealed subtree")]
    SealedCollision,

    #[error("Child slot is already occupied")]
    SlotOccupied,

    #[error("Internal error: {0}")]
    Internal(&'static str),

    #[error("IR: {0}")]
    Ir(#[from] kir::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        use Error::*;
        match self {
            UnknownCharacter(..) | InvalidNumber(..) | UnterminatedString(..) => ErrorKind::Lexical,
            UnexpectedEOF
            | UnexpectedToken(..)
            | Expected(..)
            | UnclosedParen(..)
            | EmptyParen(..)
            | MissingOperand(..) => ErrorKind::Syntax,
            UndeclaredIdentifier(..)
            | Uninitialized(..)
            | ImplicitPointerCast(..)
            | DataLoss(..)
            | ImplicitNarrowing(..)
            | SignMismatch(..)
            | NotAlgebraic(..)
            | PointerCastMismatch(..)
            | LiteralOverflow(..)
            | InvalidAssignTarget(..)
            | DeclarationAsValue(..)
            | ReturnMismatch(..) => ErrorKind::Type,
            Unsupported(..) => ErrorKind::Unsupported,
            Io(..) | Yaml(..) | SealedCollision | SlotOccupied | Internal(..) | Ir(..) => {
                ErrorKind::Internal
            }
        }
    }

    /// Source position the error points at, if any
    pub fn pos(&self) -> Option<Pos> {
        use Error::*;
        match self {
            UnknownCharacter(_, pos)
            | InvalidNumber(_, pos)
            | UnterminatedString(pos)
            | UnclosedParen(pos)
            | EmptyParen(pos)
            | UndeclaredIdentifier(_, pos)
            | Uninitialized(_, pos)
            | ImplicitPointerCast(_, _, pos)
            | DataLoss(_, _, pos)
            | ImplicitNarrowing(_, _, pos)
            | SignMismatch(_, _, pos)
            | NotAlgebraic(_, pos)
            | PointerCastMismatch(_, _, pos)
            | LiteralOverflow(_, pos)
            | InvalidAssignTarget(pos)
            | DeclarationAsValue(_, pos)
            | ReturnMismatch(_, pos)
            | Unsupported(_, pos) => Some(*pos),
            UnexpectedToken(info) | Expected(_, info) | MissingOperand(info) => Some(info.pos),
            UnexpectedEOF | Io(..) | Yaml(..) | SealedCollision | SlotOccupied | Internal(..)
            | Ir(..) => None,
        }
    }

    /// Render a diagnostic with the offending source line and a caret
    pub fn diag(&self, file: &str, source: &str, color: bool) -> String {
        let Some(pos) = self.pos() else {
            return if color {
                cformat!("<red,bold>error</>: {}\n     <blue>--></> <underline>{}</>\n", self, file)
            } else {
                format!("error: {}\n     --> {}\n", self, file)
            };
        };

        let line = source.lines().nth(pos.line.saturating_sub(1)).unwrap_or("");
        let caret = format!("{}^", " ".repeat(pos.col.saturating_sub(1)));
        if color {
            let mut out = String::new();
            out += &cformat!("<red,bold>error</>: {}\n", self);
            out += &cformat!("     <blue>--></> <underline>{}:{}</>\n", file, pos);
            out += &cformat!("      <blue>|</>\n");
            out += &cformat!(" <blue>{:>4} |</> {}\n", pos.line, line);
            out += &cformat!("      <blue>|</> <red,bold>{}</>\n", caret);
            out
        } else {
            let mut out = String::new();
            out += &format!("error: {}\n", self);
            out += &format!("     --> {}:{}\n", file, pos);
            out += "      |\n";
            out += &format!(" {:>4} | {}\n", pos.line, line);
            out += &format!("      | {}\n", caret);
            out
        }
    }

    /// Print diagnostic to stderr
    pub fn print_diag(&self, file: &str, source: &str, color: bool) {
        eprint!("{}", self.diag(file, source, color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        let pos = Pos::new(1, 1);
        assert_eq!(Error::UnknownCharacter('$', pos).kind(), ErrorKind::Lexical);
        assert_eq!(Error::UnexpectedEOF.kind(), ErrorKind::Syntax);
        assert_eq!(Error::InvalidAssignTarget(pos).kind(), ErrorKind::Type);
        assert_eq!(Error::Unsupported("while", pos).kind(), ErrorKind::Unsupported);
        assert_eq!(Error::SlotOccupied.kind(), ErrorKind::Internal);
    }

    #[test]
    fn plain_diag() {
        let err = Error::UnknownCharacter('$', Pos::new(2, 5));
        let text = err.diag("main.kc", "u8 a;\nu8 $b;\n", false);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "error: Unknown character: '$'");
        assert_eq!(lines[1], "     --> main.kc:2:5");
        assert_eq!(lines[3], "    2 | u8 $b;");
        assert_eq!(lines[4], "      |     ^");
    }
}
