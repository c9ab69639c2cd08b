use super::parsercore::Parser;
use super::token::{Token, TokenKind::*};
use crate::error::Error;
use crate::{expect, repeat};
use itertools::Itertools;
use kir::{ty::PTR_WIDTH_BYTES, IrType};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor<'a> {
    pub base: BaseType<'a>,
    pub ptr: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BaseType<'a> {
    Void,
    Bool,
    U8,
    U16,
    I8,
    I16,
    Func(Box<FuncType<'a>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncType<'a> {
    pub params: Vec<(&'a Token, TypeDescriptor<'a>)>,
    pub ret: TypeDescriptor<'a>,
}

impl<'a> TypeDescriptor<'a> {
    pub fn new(base: BaseType<'a>, ptr: usize) -> Self {
        TypeDescriptor { base, ptr }
    }

    pub fn scalar(base: BaseType<'a>) -> Self {
        TypeDescriptor { base, ptr: 0 }
    }

    pub fn is_pointer(&self) -> bool {
        self.ptr > 0
    }

    pub fn is_void(&self) -> bool {
        self.ptr == 0 && self.base == BaseType::Void
    }

    /// Size in bytes
    pub fn width(&self) -> usize {
        if self.is_pointer() {
            return PTR_WIDTH_BYTES;
        }
        match self.base {
            BaseType::Void | BaseType::Func(_) => 0,
            BaseType::Bool | BaseType::U8 | BaseType::I8 => 1,
            BaseType::U16 | BaseType::I16 => 2,
        }
    }

    pub fn signed(&self) -> bool {
        !self.is_pointer() && matches!(self.base, BaseType::I8 | BaseType::I16)
    }

    /// Integers and pointers take part in arithmetic
    pub fn algebraic(&self) -> bool {
        self.is_pointer()
            || matches!(
                self.base,
                BaseType::U8 | BaseType::U16 | BaseType::I8 | BaseType::I16
            )
    }

    /// Value range of a non-pointer integer type
    pub fn range(&self) -> Option<(i64, i64)> {
        if self.is_pointer() {
            return None;
        }
        match self.base {
            BaseType::U8 => Some((0, u8::MAX as i64)),
            BaseType::U16 => Some((0, u16::MAX as i64)),
            BaseType::I8 => Some((i8::MIN as i64, i8::MAX as i64)),
            BaseType::I16 => Some((i16::MIN as i64, i16::MAX as i64)),
            _ => None,
        }
    }

    pub fn ir_type(&self) -> IrType {
        if self.is_pointer() {
            return IrType::Ptr;
        }
        match self.base {
            BaseType::Void | BaseType::Func(_) => IrType::I0,
            BaseType::Bool | BaseType::U8 | BaseType::I8 => IrType::I8,
            BaseType::U16 | BaseType::I16 => IrType::I16,
        }
    }

    /// Structural equality; parameter names do not matter
    pub fn same(&self, other: &TypeDescriptor<'a>) -> bool {
        if self.ptr != other.ptr {
            return false;
        }
        match (&self.base, &other.base) {
            (BaseType::Func(a), BaseType::Func(b)) => {
                a.ret.same(&b.ret)
                    && a.params.len() == b.params.len()
                    && a.params
                        .iter()
                        .zip(&b.params)
                        .all(|((_, x), (_, y))| x.same(y))
            }
            (BaseType::Func(_), _) | (_, BaseType::Func(_)) => false,
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for TypeDescriptor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stars = "*".repeat(self.ptr);
        match &self.base {
            BaseType::Void => write!(f, "void{}", stars),
            BaseType::Bool => write!(f, "bool{}", stars),
            BaseType::U8 => write!(f, "u8{}", stars),
            BaseType::U16 => write!(f, "u16{}", stars),
            BaseType::I8 => write!(f, "i8{}", stars),
            BaseType::I16 => write!(f, "i16{}", stars),
            BaseType::Func(func) => {
                let params = func
                    .params
                    .iter()
                    .map(|(name, ty)| format!("{}: {}", name.text, ty))
                    .join(", ");
                write!(f, "{}({}) -> {}", stars, params, func.ret)
            }
        }
    }
}

/// Parse a type starting at `index`; returns the type and the index after it
pub fn parse_type_at<'a>(
    tokens: &'a [Token],
    index: usize,
) -> Result<(TypeDescriptor<'a>, usize), Error> {
    let mut parser = Parser::at(tokens, index);
    let ty = parser.parse_type()?;
    Ok((ty, parser.position()))
}

impl<'a> Parser<'a> {
    /// type = { "*" } base { "*" }
    ///
    /// On failure the cursor is left where it was.
    pub fn parse_type(&mut self) -> Result<TypeDescriptor<'a>, Error> {
        let save = self.position();
        let result = self.parse_type_inner();
        if result.is_err() {
            self.restore(save);
        }
        result
    }

    fn parse_type_inner(&mut self) -> Result<TypeDescriptor<'a>, Error> {
        let mut ptr = 0;
        while self.consume_if(|t| t.kind == Star).is_some() {
            ptr += 1;
        }
        let base = self.parse_base_type()?;
        while self.consume_if(|t| t.kind == Star).is_some() {
            ptr += 1;
        }
        Ok(TypeDescriptor::new(base, ptr))
    }

    /// base = "void" | "bool" | "u8" | "u16" | "i8" | "i16" | func-type
    fn parse_base_type(&mut self) -> Result<BaseType<'a>, Error> {
        let token = self.peek().ok_or(Error::UnexpectedEOF)?;
        let base = match token.kind {
            KwVoid => BaseType::Void,
            KwBool => BaseType::Bool,
            KwU8 => BaseType::U8,
            KwU16 => BaseType::U16,
            KwI8 => BaseType::I8,
            KwI16 => BaseType::I16,

            // func-type = "(" [ param { "," param } ] ")" "->" type
            LParen => {
                expect!(self, LParen)?;
                let params = repeat!(self, self.parse_param(), Comma, RParen);
                expect!(self, RParen, "`)`")?;
                expect!(self, Arrow, "`->`")?;
                let ret = self.parse_type_inner()?;
                return Ok(BaseType::Func(Box::new(FuncType { params, ret })));
            }

            _ => return Err(Error::Expected("type", token.into())),
        };
        self.next();
        Ok(base)
    }

    /// param = ident ":" type
    fn parse_param(&mut self) -> Result<(&'a Token, TypeDescriptor<'a>), Error> {
        let name = expect!(self, Ident(_), "parameter name")?;
        expect!(self, Colon, "`:`")?;
        let ty = self.parse_type_inner()?;
        Ok((name, ty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammer::lexer::lex;

    #[test]
    fn type_facts() {
        let u16t = TypeDescriptor::scalar(BaseType::U16);
        assert_eq!(u16t.width(), 2);
        assert!(!u16t.signed());
        assert!(u16t.algebraic());
        assert_eq!(u16t.ir_type(), IrType::I16);

        let bool_t = TypeDescriptor::scalar(BaseType::Bool);
        assert!(!bool_t.algebraic());
        assert_eq!(bool_t.ir_type(), IrType::I8);

        let ptr = TypeDescriptor::new(BaseType::I8, 1);
        assert!(ptr.algebraic());
        assert!(!ptr.signed());
        assert_eq!(ptr.width(), 2);
        assert_eq!(ptr.ir_type(), IrType::Ptr);
        assert_eq!(ptr.range(), None);
    }

    #[test]
    fn failure_restores_cursor() {
        let tokens = lex("(a: u8, b) -> u16").unwrap();
        let mut parser = Parser::new(&tokens);
        assert!(parser.parse_type().is_err());
        assert_eq!(parser.position(), 0);
    }

    #[test]
    fn same_ignores_param_names() {
        let a = lex("(x: u8) -> u16").unwrap();
        let b = lex("(y: u8) -> u16").unwrap();
        let (ta, _) = parse_type_at(&a, 0).unwrap();
        let (tb, _) = parse_type_at(&b, 0).unwrap();
        assert!(ta.same(&tb));
        assert_ne!(ta, tb);
        assert_eq!(ta.to_string(), "(x: u8) -> u16");
    }
}
