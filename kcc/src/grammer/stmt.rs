use super::ast::{Ast, NodeId, NodeKind};
use super::parsercore::Parser;
use super::token::{Token, TokenKind::*};
use super::typedesc::{BaseType, FuncType, TypeDescriptor};
use crate::error::Error;
use crate::{check, expect, optional, repeat};

/// Parsed source file
#[derive(Debug, Default)]
pub struct Program<'a> {
    /// One tree per function, rooted at its Function node
    pub functions: Vec<Ast<'a>>,
    /// Statements outside any function, in source order
    pub toplevel: Ast<'a>,
}

impl<'a> Parser<'a> {
    /// program = { function | stmt }
    pub fn parse_program(&mut self) -> Result<Program<'a>, Error> {
        let mut program = Program::default();
        while !self.is_eof() {
            if self.at_function() {
                let func = self.parse_function()?;
                program.functions.push(func);
            } else {
                let ast = &mut program.toplevel;
                let stmt = self.parse_stmt(ast)?;
                let prev = ast.root;
                ast.root = sequence(ast, prev, stmt);
            }
        }
        tracing::debug!(
            functions = program.functions.len(),
            toplevel = program.toplevel.root.is_some(),
            "parsed program"
        );
        Ok(program)
    }

    /// function = type ident "(" [ type ident { "," type ident } ] ")" block
    pub fn parse_function(&mut self) -> Result<Ast<'a>, Error> {
        let mut ast = Ast::new();
        let ret = self.parse_type()?;
        let name = expect!(self, Ident(_), "function name")?;
        expect!(self, LParen, "`(`")?;
        let params = repeat!(self, self.parse_func_param(), Comma, RParen);
        expect!(self, RParen, "`)`")?;
        let body = self.parse_block(&mut ast)?;

        let ty = TypeDescriptor::scalar(BaseType::Func(Box::new(FuncType { params, ret })));
        let func = ast.branch(NodeKind::Function(name, ty), Some(name), body, None);
        ast.root = Some(func);
        tracing::debug!(name = %name.text, nodes = ast.len(), "parsed function");
        Ok(ast)
    }

    fn parse_func_param(&mut self) -> Result<(&'a Token, TypeDescriptor<'a>), Error> {
        let ty = self.parse_type()?;
        let name = expect!(self, Ident(_), "parameter name")?;
        Ok((name, ty))
    }

    /// block = "{" { stmt } "}"
    pub fn parse_block(&mut self, ast: &mut Ast<'a>) -> Result<Option<NodeId<'a>>, Error> {
        expect!(self, LCurly, "`{`")?;
        let mut seq = None;
        while !check!(self, RCurly) {
            if self.is_eof() {
                return Err(Error::UnexpectedEOF);
            }
            let stmt = self.parse_stmt(ast)?;
            seq = sequence(ast, seq, stmt);
        }
        expect!(self, RCurly)?;
        Ok(seq)
    }

    pub fn parse_stmt(&mut self, ast: &mut Ast<'a>) -> Result<Option<NodeId<'a>>, Error> {
        let token = self.peek().ok_or(Error::UnexpectedEOF)?;
        match token.kind {
            // "return" [ expr ] ";"
            KwReturn => {
                self.next();
                let value = if optional!(self, Semicolon).is_some() {
                    None
                } else {
                    self.parse_expr_stmt(ast)?
                };
                Ok(Some(ast.branch(NodeKind::Return, Some(token), value, None)))
            }

            // "if" "(" expr ")" body [ "else" body ]
            KwIf => {
                self.next();
                let open = expect!(self, LParen, "`(`")?;
                let cond = self.parse_cond(ast, open.pos)?;
                let then = self.parse_stmt(ast)?;
                let other = optional!(self, KwElse, self.parse_stmt(ast)?).flatten();
                let branch = ast.branch(NodeKind::Branch, None, then, other);
                Ok(Some(ast.branch(NodeKind::If, Some(token), Some(cond), Some(branch))))
            }

            // "while" "(" expr ")" body
            KwWhile => {
                self.next();
                let open = expect!(self, LParen, "`(`")?;
                let cond = self.parse_cond(ast, open.pos)?;
                let body = self.parse_stmt(ast)?;
                Ok(Some(ast.branch(NodeKind::While, Some(token), Some(cond), body)))
            }

            KwBreak | KwContinue => {
                self.next();
                expect!(self, Semicolon, "`;`")?;
                let kind = if token.kind == KwBreak {
                    NodeKind::Break
                } else {
                    NodeKind::Continue
                };
                Ok(Some(ast.alloc(kind, Some(token))))
            }

            LCurly => self.parse_block(ast),

            _ => self.parse_expr_stmt(ast),
        }
    }
}

/// Fold `next` after `prev` under an ExpSeq node
fn sequence<'a>(
    ast: &mut Ast<'a>,
    prev: Option<NodeId<'a>>,
    next: Option<NodeId<'a>>,
) -> Option<NodeId<'a>> {
    match (prev, next) {
        (Some(prev), Some(next)) => {
            Some(ast.branch(NodeKind::ExpSeq, None, Some(prev), Some(next)))
        }
        (prev, None) => prev,
        (None, next) => next,
    }
}
