mod cast;
mod value;

pub use cast::{fits, infer_literal_type};
pub use value::{number, Location, TypedValue};

use crate::error::Error;
use crate::grammer::ast::{Ast, BinaryOp, NodeId, NodeKind};
use crate::grammer::stmt::Program;
use crate::grammer::token::{Pos, Token};
use crate::grammer::typedesc::{BaseType, TypeDescriptor};
use kir::{IrFunction, IrLog, Reg};
use tracing::{debug, trace};

/// Name of the unit holding statements outside any function
pub const TOPLEVEL: &str = "toplevel";

#[derive(Debug, Clone)]
pub struct Variable<'a> {
    pub name: &'a Token,
    pub ty: TypeDescriptor<'a>,
    /// Absent until first assignment
    pub reg: Option<Reg>,
}

/// Lowering context of one function or of the top-level unit
#[derive(Debug)]
pub struct Lowerer<'a> {
    log: IrLog,
    vars: Vec<Variable<'a>>,
    ret: TypeDescriptor<'a>,
}

impl Default for Lowerer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

fn node_pos<'a>(ast: &Ast<'a>, id: NodeId<'a>) -> Pos {
    ast[id].token.map(|t| t.pos).unwrap_or_default()
}

impl<'a> Lowerer<'a> {
    pub fn new() -> Self {
        Self::with_return(TypeDescriptor::scalar(BaseType::Void))
    }

    pub fn with_return(ret: TypeDescriptor<'a>) -> Self {
        Lowerer {
            log: IrLog::new(),
            vars: Vec::new(),
            ret,
        }
    }

    pub fn log(&self) -> &IrLog {
        &self.log
    }

    pub fn into_log(self) -> IrLog {
        self.log
    }

    /// Most recent declaration of `name`
    pub fn lookup(&self, name: &str) -> Option<&Variable<'a>> {
        self.vars.iter().rev().find(|var| var.name.text == name)
    }

    fn lookup_mut(&mut self, name: &str) -> Option<&mut Variable<'a>> {
        self.vars.iter_mut().rev().find(|var| var.name.text == name)
    }

    pub fn declare(&mut self, name: &'a Token, ty: TypeDescriptor<'a>, reg: Option<Reg>) {
        debug!(name = %name.text, ty = %ty, "declare");
        self.vars.push(Variable { name, ty, reg });
    }

    /// Register an incoming parameter
    pub fn param(&mut self, name: &'a Token, ty: TypeDescriptor<'a>) -> Reg {
        let reg = self.log.param(ty.ir_type());
        self.declare(name, ty, Some(reg));
        reg
    }

    fn traced(&self, reg: Reg) -> Reg {
        if let Some(inst) = self.log.last() {
            trace!(%inst, "emit");
        }
        reg
    }

    /// Give a value its register; literals are defined here, exactly once
    pub fn materialize(&mut self, value: TypedValue<'a>) -> Result<(TypedValue<'a>, Reg), Error> {
        if let Some(reg) = value.reg {
            return Ok((value, reg));
        }
        match value.loc {
            Location::Literal => {
                let literal = value
                    .literal_value()
                    .ok_or(Error::Internal("literal without a number"))?;
                let reg = self.log.push_define(value.ty.ir_type(), literal as i64);
                self.traced(reg);
                let value = TypedValue::stack(value.ty, reg, value.token);
                Ok((value, reg))
            }
            Location::Pending => Err(Error::DeclarationAsValue(value.text(), value.pos())),
            Location::Stack | Location::Named => {
                Err(Error::Uninitialized(value.text(), value.pos()))
            }
        }
    }

    /// Lower a statement tree; the value of the last expression is returned
    pub fn lower_stmt(
        &mut self,
        ast: &Ast<'a>,
        id: NodeId<'a>,
    ) -> Result<Option<TypedValue<'a>>, Error> {
        let node = &ast[id];
        match &node.kind {
            NodeKind::ExpSeq => {
                if let Some(left) = node.left {
                    self.lower_stmt(ast, left)?;
                }
                match node.right {
                    Some(right) => self.lower_stmt(ast, right),
                    None => Ok(None),
                }
            }
            NodeKind::VarDecl(ty, name) => {
                debug!(stmt = "VarDecl", pos = %node_pos(ast, id), "lower");
                self.declare(*name, ty.clone(), None);
                Ok(None)
            }
            NodeKind::Return => {
                debug!(stmt = "Return", pos = %node_pos(ast, id), "lower");
                self.lower_return(ast, id)?;
                Ok(None)
            }
            kind => {
                debug!(stmt = kind.name(), pos = %node_pos(ast, id), "lower");
                self.lower_expr(ast, id, None).map(Some)
            }
        }
    }

    fn lower_return(&mut self, ast: &Ast<'a>, id: NodeId<'a>) -> Result<(), Error> {
        let pos = node_pos(ast, id);
        let ret = self.ret.clone();
        match (ast[id].left, ret.is_void()) {
            (None, true) => Ok(()),
            (Some(value), false) => {
                let value = self.lower_expr(ast, value, Some(&ret))?;
                let value = self.implicit_cast(value, &ret)?;
                self.materialize(value)?;
                Ok(())
            }
            _ => Err(Error::ReturnMismatch(ret.to_string(), pos)),
        }
    }

    /// Lower an expression; `hint` is the type the context expects
    pub fn lower_expr(
        &mut self,
        ast: &Ast<'a>,
        id: NodeId<'a>,
        hint: Option<&TypeDescriptor<'a>>,
    ) -> Result<TypedValue<'a>, Error> {
        let node = &ast[id];
        let pos = node_pos(ast, id);
        match &node.kind {
            NodeKind::Number(token) => {
                let value = number(token).ok_or(Error::Internal("number without a value"))?;
                let ty = match hint {
                    Some(hint) if !hint.is_pointer() && fits(value, hint) => hint.clone(),
                    _ => infer_literal_type(value, &token.text, token.pos)?,
                };
                Ok(TypedValue::literal(ty, *token))
            }

            NodeKind::Var(token) => {
                let var = self
                    .lookup(&token.text)
                    .ok_or_else(|| Error::UndeclaredIdentifier(token.text.clone(), token.pos))?;
                let reg = var
                    .reg
                    .ok_or_else(|| Error::Uninitialized(token.text.clone(), token.pos))?;
                Ok(TypedValue::named(var.ty.clone(), reg, *token))
            }

            NodeKind::True | NodeKind::False => {
                let bit = i64::from(matches!(node.kind, NodeKind::True));
                let ty = TypeDescriptor::scalar(BaseType::Bool);
                let reg = self.log.push_define(ty.ir_type(), bit);
                self.traced(reg);
                Ok(TypedValue::stack(ty, reg, node.token))
            }

            NodeKind::VarDecl(_, name) => {
                Err(Error::DeclarationAsValue(name.text.clone(), name.pos))
            }

            NodeKind::Binary(op @ (BinaryOp::Add | BinaryOp::Mul)) => {
                let (left, right) = match (node.left, node.right) {
                    (Some(left), Some(right)) => (left, right),
                    _ => return Err(Error::Internal("binary operator without operands")),
                };
                let lhs = self.lower_expr(ast, left, hint)?;
                let rhs = self.lower_expr(ast, right, hint)?;
                let (lhs, rhs) = self.unify(lhs, rhs)?;
                let (lhs, lreg) = self.materialize(lhs)?;
                let (_, rreg) = self.materialize(rhs)?;
                let reg = match op {
                    BinaryOp::Add => self.log.push_add(lreg, rreg)?,
                    _ => self.log.push_mul(lreg, rreg)?,
                };
                self.traced(reg);
                Ok(TypedValue::stack(lhs.ty, reg, node.token))
            }

            NodeKind::Binary(BinaryOp::Assign) => self.lower_assign(ast, id),

            NodeKind::Cast(target) => {
                let operand = node.right.ok_or(Error::Internal("cast without operand"))?;
                let value = self.lower_expr(ast, operand, None)?;
                self.explicit_cast(value, target)
            }

            NodeKind::ExpSeq | NodeKind::Return => self
                .lower_stmt(ast, id)?
                .ok_or(Error::Unsupported("statement used as a value", pos)),

            kind @ (NodeKind::Binary(_)
            | NodeKind::Ref
            | NodeKind::Deref
            | NodeKind::String(_)
            | NodeKind::FuncCall(_)
            | NodeKind::Comma
            | NodeKind::Function(..)
            | NodeKind::Branch
            | NodeKind::If
            | NodeKind::While
            | NodeKind::Break
            | NodeKind::Continue
            | NodeKind::Null) => Err(Error::Unsupported(kind.name(), pos)),
        }
    }

    fn lower_assign(&mut self, ast: &Ast<'a>, id: NodeId<'a>) -> Result<TypedValue<'a>, Error> {
        let node = &ast[id];
        let pos = node_pos(ast, id);
        let (target, source) = match (node.left, node.right) {
            (Some(left), Some(right)) => (left, right),
            _ => return Err(Error::Internal("assignment without operands")),
        };

        match &ast[target].kind {
            // Pending declaration: bind the name to the right side
            NodeKind::VarDecl(ty, name) => {
                let value = self.lower_expr(ast, source, Some(ty))?;
                let value = self.implicit_cast(value, ty)?;
                let reg = if value.loc == Location::Named {
                    let (_, src) = self.materialize(value)?;
                    let reg = self.log.push_copy(src)?;
                    self.traced(reg)
                } else {
                    self.materialize(value)?.1
                };
                self.declare(*name, ty.clone(), Some(reg));
                Ok(TypedValue::named(ty.clone(), reg, *name))
            }

            // Existing variable: copy and rebind
            NodeKind::Var(name) => {
                let ty = match self.lookup(&name.text) {
                    Some(var) => var.ty.clone(),
                    None => return Err(Error::UndeclaredIdentifier(name.text.clone(), name.pos)),
                };
                let value = self.lower_expr(ast, source, Some(&ty))?;
                let value = self.implicit_cast(value, &ty)?;
                let (_, src) = self.materialize(value)?;
                let reg = self.log.push_copy(src)?;
                self.traced(reg);
                if let Some(var) = self.lookup_mut(&name.text) {
                    var.reg = Some(reg);
                }
                Ok(TypedValue::named(ty, reg, *name))
            }

            _ => Err(Error::InvalidAssignTarget(pos)),
        }
    }
}

/// Lower one function tree (rooted at its Function node)
pub fn lower_function(ast: &Ast) -> Result<IrFunction, Error> {
    let root = ast.root.ok_or(Error::UnexpectedEOF)?;
    let node = &ast[root];
    let NodeKind::Function(name, ty) = &node.kind else {
        return Err(Error::Unsupported(node.kind.name(), node_pos(ast, root)));
    };
    let BaseType::Func(func) = &ty.base else {
        return Err(Error::NotAlgebraic(ty.to_string(), name.pos));
    };

    debug!(name = %name.text, "lower function");
    let mut lowerer = Lowerer::with_return(func.ret.clone());
    let params = func
        .params
        .iter()
        .map(|(pname, pty)| lowerer.param(*pname, pty.clone()))
        .collect();
    if let Some(body) = node.left {
        lowerer.lower_stmt(ast, body)?;
    }
    Ok(IrFunction::new(name.text.clone(), params, lowerer.into_log()))
}

/// Lower the statements outside any function
pub fn lower_toplevel(ast: &Ast) -> Result<IrFunction, Error> {
    let mut lowerer = Lowerer::new();
    if let Some(root) = ast.root {
        lowerer.lower_stmt(ast, root)?;
    }
    Ok(IrFunction::new(TOPLEVEL, Vec::new(), lowerer.into_log()))
}

/// Lower every function, then the top-level unit if it has statements
pub fn lower_program(program: &Program) -> Result<Vec<IrFunction>, Error> {
    let mut units = program
        .functions
        .iter()
        .map(lower_function)
        .collect::<Result<Vec<_>, _>>()?;
    if program.toplevel.root.is_some() {
        units.push(lower_toplevel(&program.toplevel)?);
    }
    Ok(units)
}
