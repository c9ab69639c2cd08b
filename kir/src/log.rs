use crate::{
    error::Error,
    inst::{Inst, Op, Reg},
    ty::IrType,
};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Append-only instruction log of one lowering context.
///
/// Every register is produced exactly once, either by an instruction or as an
/// incoming parameter, and is recorded in `regs` together with its type.
#[derive(Debug, Clone, Serialize)]
pub struct IrLog {
    insts: Vec<Inst>,
    regs: IndexMap<Reg, IrType>,
    #[serde(skip)]
    next: u32,
}

impl Default for IrLog {
    fn default() -> Self {
        Self::new()
    }
}

impl IrLog {
    pub fn new() -> Self {
        Self {
            insts: Vec::new(),
            regs: IndexMap::new(),
            next: 1,
        }
    }

    fn alloc(&mut self, ty: IrType) -> Reg {
        let reg = Reg(self.next);
        self.next += 1;
        self.regs.insert(reg, ty);
        reg
    }

    fn push(&mut self, ty: IrType, op: Op) -> Reg {
        let dst = self.alloc(ty);
        self.insts.push(Inst { dst, ty, op });
        dst
    }

    fn typed(&self, reg: Reg) -> Result<IrType, Error> {
        self.type_of(reg).ok_or(Error::UnknownRegister(reg))
    }

    fn same_typed(&self, lhs: Reg, rhs: Reg) -> Result<IrType, Error> {
        let lty = self.typed(lhs)?;
        let rty = self.typed(rhs)?;
        if lty != rty {
            return Err(Error::OperandMismatch(lhs, lty, rhs, rty));
        }
        Ok(lty)
    }

    /// Register an incoming value that has no defining instruction
    pub fn param(&mut self, ty: IrType) -> Reg {
        self.alloc(ty)
    }

    pub fn push_define(&mut self, ty: IrType, value: i64) -> Reg {
        self.push(ty, Op::Define { value })
    }

    pub fn push_add(&mut self, lhs: Reg, rhs: Reg) -> Result<Reg, Error> {
        let ty = self.same_typed(lhs, rhs)?;
        Ok(self.push(ty, Op::Add { lhs, rhs }))
    }

    pub fn push_mul(&mut self, lhs: Reg, rhs: Reg) -> Result<Reg, Error> {
        let ty = self.same_typed(lhs, rhs)?;
        Ok(self.push(ty, Op::Mul { lhs, rhs }))
    }

    pub fn push_copy(&mut self, src: Reg) -> Result<Reg, Error> {
        let ty = self.typed(src)?;
        Ok(self.push(ty, Op::Copy { src }))
    }

    pub fn push_extend(&mut self, src: Reg, ty: IrType, signed: bool) -> Result<Reg, Error> {
        let from = self.typed(src)?;
        if ty.width() <= from.width() {
            return Err(Error::InvalidExtend(src, from, ty));
        }
        Ok(self.push(ty, Op::Extend { src, signed }))
    }

    pub fn push_trunc(&mut self, src: Reg, ty: IrType) -> Result<Reg, Error> {
        let from = self.typed(src)?;
        if ty.width() >= from.width() {
            return Err(Error::InvalidTrunc(src, from, ty));
        }
        Ok(self.push(ty, Op::Trunc { src }))
    }

    pub fn type_of(&self, reg: Reg) -> Option<IrType> {
        self.regs.get(&reg).copied()
    }

    pub fn insts(&self) -> &[Inst] {
        &self.insts
    }

    pub fn last(&self) -> Option<&Inst> {
        self.insts.last()
    }


    pub fn len(&self) -> usize {
        self.insts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }

    pub fn cformat(&self) -> String {
        self.insts
            .iter()
            .map(|inst| format!("  {}\n", inst.cformat()))
            .collect()
    }
}

impl fmt::Display for IrLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for inst in &self.insts {
            writeln!(f, "{}", inst)?;
        }
        Ok(())
    }
}
