use crate::grammer::token::{Pos, Token, TokenKind};
use crate::grammer::typedesc::TypeDescriptor;
use kir::Reg;

/// Signed value of an integer literal token
pub fn number(token: &Token) -> Option<i128> {
    match token.kind {
        TokenKind::Number(mag, true) => Some(-(mag as i128)),
        TokenKind::Number(mag, false) => Some(mag as i128),
        _ => None,
    }
}

/// Where a value lives before it is given a register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Integer literal, not yet defined
    Literal,
    /// Result of an instruction
    Stack,
    /// Current binding of a variable
    Named,
    /// Variable declared on the left of `=`
    Pending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedValue<'a> {
    pub ty: TypeDescriptor<'a>,
    pub loc: Location,
    pub token: Option<&'a Token>,
    pub reg: Option<Reg>,
}

impl<'a> TypedValue<'a> {
    pub fn literal(ty: TypeDescriptor<'a>, token: &'a Token) -> Self {
        TypedValue {
            ty,
            loc: Location::Literal,
            token: Some(token),
            reg: None,
        }
    }

    pub fn stack(ty: TypeDescriptor<'a>, reg: Reg, token: Option<&'a Token>) -> Self {
        TypedValue {
            ty,
            loc: Location::Stack,
            token,
            reg: Some(reg),
        }
    }

    pub fn named(ty: TypeDescriptor<'a>, reg: Reg, token: &'a Token) -> Self {
        TypedValue {
            ty,
            loc: Location::Named,
            token: Some(token),
            reg: Some(reg),
        }
    }

    pub fn is_literal(&self) -> bool {
        self.loc == Location::Literal
    }

    /// Signed value of a literal
    pub fn literal_value(&self) -> Option<i128> {
        if !self.is_literal() {
            return None;
        }
        self.token.and_then(number)
    }

    pub fn pos(&self) -> Pos {
        self.token.map(|t| t.pos).unwrap_or_default()
    }

    pub fn text(&self) -> String {
        self.token.map(|t| t.text.clone()).unwrap_or_default()
    }

    /// Same value seen as another type
    pub fn relabel(self, ty: TypeDescriptor<'a>) -> Self {
        TypedValue { ty, ..self }
    }
}
