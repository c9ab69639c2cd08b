use super::ast::{Ast, BinaryOp, NodeId, NodeKind, Side};
use super::parsercore::Parser;
use super::token::{Pos, Token, TokenKind, TokenKind::*};
use super::typedesc::TypeDescriptor;
use crate::error::{Error, TokenInfo};
use crate::{check, expect, optional};

/// How an expression ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum End {
    /// `;`, consumed
    Semicolon,
    /// unmatched `)`, consumed; the tree is sealed
    Close,
    /// `,`, left in place
    Comma,
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Window {
    Top,
    Paren(Pos),
    Args(Pos),
}

fn binary_op(kind: &TokenKind) -> Option<BinaryOp> {
    match kind {
        Plus => Some(BinaryOp::Add),
        Minus => Some(BinaryOp::Sub),
        Star => Some(BinaryOp::Mul),
        Equal => Some(BinaryOp::Assign),
        AmpAmp => Some(BinaryOp::LogicAnd),
        PipePipe => Some(BinaryOp::LogicOr),
        EqualEqual => Some(BinaryOp::CmpEq),
        ExclEqual => Some(BinaryOp::CmpNeq),
        LAngle => Some(BinaryOp::CmpLt),
        RAngle => Some(BinaryOp::CmpGt),
        LAngleEqual => Some(BinaryOp::CmpLe),
        RAngleEqual => Some(BinaryOp::CmpGe),
        _ => None,
    }
}

fn starts_type(token: &Token) -> bool {
    matches!(
        token.kind,
        KwVoid | KwBool | KwU8 | KwU16 | KwI8 | KwI16 | Star | LParen
    )
}

/// A finished leaf either stands for a value or still waits for one
fn is_value<'a>(ast: &Ast<'a>, leaf: NodeId<'a>) -> bool {
    let node = &ast[leaf];
    node.sealed || !(matches!(node.kind, NodeKind::Binary(_)) || node.kind.is_prefix())
}

impl<'a> Parser<'a> {
    /// Assemble one expression into `ast`.
    /// Returns the root (None for an empty expression) and what ended it.
    pub fn parse_expr(&mut self, ast: &mut Ast<'a>) -> Result<(Option<NodeId<'a>>, End), Error> {
        self.parse_window(ast, Window::Top)
    }

    fn parse_window(
        &mut self,
        ast: &mut Ast<'a>,
        window: Window,
    ) -> Result<(Option<NodeId<'a>>, End), Error> {
        let mut root: Option<NodeId<'a>> = None;
        let mut want_operand = true;

        loop {
            let Some(token) = self.peek() else {
                return match window {
                    Window::Top => Ok((root, End::Eof)),
                    Window::Paren(open) | Window::Args(open) => Err(Error::UnclosedParen(open)),
                };
            };

            // Terminators
            if matches!(token.kind, Semicolon | RParen | Comma) {
                if want_operand && root.is_some() {
                    return Err(Error::MissingOperand(token.into()));
                }
                return match (&token.kind, window) {
                    (Semicolon, Window::Top) => {
                        self.next();
                        Ok((root, End::Semicolon))
                    }
                    (Semicolon, Window::Paren(open) | Window::Args(open)) => {
                        Err(Error::UnclosedParen(open))
                    }
                    (Comma, Window::Paren(_)) => Err(Error::UnexpectedToken(token.into())),
                    (Comma, _) => Ok((root, End::Comma)),
                    _ => {
                        self.next();
                        match (root, window) {
                            (Some(root), Window::Top | Window::Paren(_)) => ast.seal(root),
                            _ => {}
                        }
                        Ok((root, End::Close))
                    }
                };
            }

            let leaf = if want_operand {
                self.parse_operand(ast, token)?
            } else {
                self.parse_operator(ast, token)?
            };
            want_operand = !is_value(ast, leaf);
            root = Some(ast.insert(root, leaf)?);
        }
    }

    fn parse_operator(&mut self, ast: &mut Ast<'a>, token: &'a Token) -> Result<NodeId<'a>, Error> {
        // `*` only multiplies right after an identifier, a number or `)`
        if token.kind == Star
            && !self
                .prev()
                .is_some_and(|prev| matches!(prev.kind, Ident(_) | Number(..) | RParen))
        {
            return Err(Error::UnexpectedToken(token.into()));
        }
        let op = binary_op(&token.kind).ok_or_else(|| Error::UnexpectedToken(token.into()))?;
        self.next();
        Ok(ast.alloc(NodeKind::Binary(op), Some(token)))
    }

    fn parse_operand(&mut self, ast: &mut Ast<'a>, token: &'a Token) -> Result<NodeId<'a>, Error> {
        // VarDecl: type ident
        if starts_type(token) {
            if let Some((ty, name)) = self.try_declaration() {
                return Ok(ast.alloc(NodeKind::VarDecl(ty, name), Some(token)));
            }
        }

        let kind = match &token.kind {
            Number(..) => NodeKind::Number(token),
            Text(_) => NodeKind::String(token),
            KwTrue => NodeKind::True,
            KwFalse => NodeKind::False,
            KwNull => NodeKind::Null,
            Ident(_) if matches!(self.peek_nth(1).map(|t| &t.kind), Some(LParen)) => {
                return self.parse_call(ast, token);
            }
            Ident(_) => NodeKind::Var(token),
            Star => NodeKind::Deref,
            Ampasand => NodeKind::Ref,
            LParen => {
                if let Some(ty) = self.try_cast() {
                    return Ok(ast.alloc(NodeKind::Cast(ty), Some(token)));
                }
                return self.parse_paren(ast);
            }
            _ => return Err(Error::UnexpectedToken(token.into())),
        };
        self.next();
        Ok(ast.alloc(kind, Some(token)))
    }

    fn try_declaration(&mut self) -> Option<(TypeDescriptor<'a>, &'a Token)> {
        let save = self.position();
        if let Ok(ty) = self.parse_type() {
            if let Some(name) = optional!(self, Ident(_)) {
                return Some((ty, name));
            }
        }
        self.restore(save);
        None
    }

    /// "(" type ")" followed by a value or another "("
    fn try_cast(&mut self) -> Option<TypeDescriptor<'a>> {
        let save = self.position();
        self.next();
        if let Ok(ty) = self.parse_type() {
            if optional!(self, RParen).is_some()
                && self.check_if(|t| t.starts_operand() || t.kind == LParen)
            {
                return Some(ty);
            }
        }
        self.restore(save);
        None
    }

    /// Parenthesized sub-expression, sealed
    fn parse_paren(&mut self, ast: &mut Ast<'a>) -> Result<NodeId<'a>, Error> {
        let open = expect!(self, LParen)?;
        match self.parse_window(ast, Window::Paren(open.pos))? {
            (Some(inner), End::Close) => Ok(inner),
            (None, End::Close) => Err(Error::EmptyParen(open.pos)),
            _ => Err(Error::UnclosedParen(open.pos)),
        }
    }

    /// ident "(" [ expr { "," expr } ] ")"
    fn parse_call(&mut self, ast: &mut Ast<'a>, name: &'a Token) -> Result<NodeId<'a>, Error> {
        expect!(self, Ident(_))?;
        let open = expect!(self, LParen)?;
        let call = ast.alloc(NodeKind::FuncCall(name), Some(name));
        if optional!(self, RParen).is_some() {
            return Ok(call);
        }

        let mut args = None;
        loop {
            let (arg, end) = self.parse_window(ast, Window::Args(open.pos))?;
            let Some(arg) = arg else {
                let at = if end == End::Comma { self.peek() } else { self.prev() };
                let at: TokenInfo = at.ok_or(Error::UnexpectedEOF)?.into();
                return Err(Error::Expected("argument", at));
            };
            args = Some(match args {
                None => arg,
                Some(prev) => ast.branch(NodeKind::Comma, None, Some(prev), Some(arg)),
            });
            match end {
                End::Comma => {
                    expect!(self, Comma)?;
                }
                End::Close => break,
                _ => return Err(Error::UnclosedParen(open.pos)),
            }
        }
        ast.link(call, Side::Left, args);
        Ok(call)
    }

    /// Expression that must end with `;`
    pub fn parse_expr_stmt(&mut self, ast: &mut Ast<'a>) -> Result<Option<NodeId<'a>>, Error> {
        match self.parse_expr(ast)? {
            (root, End::Semicolon) => Ok(root),
            (_, End::Eof) => Err(Error::UnexpectedEOF),
            (_, End::Close) => Err(self.unexpected_prev()),
            (_, End::Comma) => {
                let token = expect!(self, Comma)?;
                Err(Error::UnexpectedToken(token.into()))
            }
        }
    }

    /// Expression inside a `(` that the caller already consumed
    pub fn parse_cond(&mut self, ast: &mut Ast<'a>, open: Pos) -> Result<NodeId<'a>, Error> {
        match self.parse_expr(ast)? {
            (Some(root), End::Close) => Ok(root),
            (None, End::Close) => Err(Error::EmptyParen(open)),
            (_, End::Semicolon) => Err(Error::UnclosedParen(open)),
            (_, End::Eof) => Err(Error::UnclosedParen(open)),
            (_, End::Comma) => {
                let token = expect!(self, Comma)?;
                Err(Error::UnexpectedToken(token.into()))
            }
        }
    }

    fn unexpected_prev(&self) -> Error {
        match self.prev() {
            Some(token) => Error::UnexpectedToken(token.into()),
            None => Error::UnexpectedEOF,
        }
    }

    /// True when the next tokens read `type ident (`
    pub fn at_function(&self) -> bool {
        let mut probe = self.clone();
        if !check!(probe, KwVoid | KwBool | KwU8 | KwU16 | KwI8 | KwI16 | Star) {
            return false;
        }
        probe.parse_type().is_ok()
            && optional!(probe, Ident(_)).is_some()
            && check!(probe, LParen)
    }
}
