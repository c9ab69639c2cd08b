use crate::ty::IrType;
use color_print::cformat;
use serde::Serialize;
use std::fmt;

/// Write-once virtual register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Reg(pub u32);

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Op {
    Define { value: i64 },
    Add { lhs: Reg, rhs: Reg },
    Mul { lhs: Reg, rhs: Reg },
    Copy { src: Reg },
    Extend { src: Reg, signed: bool },
    Trunc { src: Reg },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inst {
    pub dst: Reg,
    pub ty: IrType,
    #[serde(flatten)]
    pub op: Op,
}

impl Inst {
    /// Registers read by this instruction
    pub fn operands(&self) -> Vec<Reg> {
        match &self.op {
            Op::Define { .. } => vec![],
            Op::Add { lhs, rhs } | Op::Mul { lhs, rhs } => vec![*lhs, *rhs],
            Op::Copy { src } | Op::Extend { src, .. } | Op::Trunc { src } => vec![*src],
        }
    }

    pub fn cformat(&self) -> String {
        let head = cformat!("<b>{}</> <g>{}</> =", self.dst, self.ty);
        match &self.op {
            Op::Define { value } => cformat!("{} <y>{}</>", head, value),
            Op::Add { lhs, rhs } => cformat!("{} <r>add</> {} {}", head, lhs, rhs),
            Op::Mul { lhs, rhs } => cformat!("{} <r>mul</> {} {}", head, lhs, rhs),
            Op::Copy { src } => cformat!("{} {}", head, src),
            Op::Extend { src, signed: true } => cformat!("{} <r>sextend</> {}", head, src),
            Op::Extend { src, signed: false } => cformat!("{} <r>uextend</> {}", head, src),
            Op::Trunc { src } => cformat!("{} <r>trunc</> {}", head, src),
        }
    }
}

impl fmt::Display for Inst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} = ", self.dst, self.ty)?;
        match &self.op {
            Op::Define { value } => write!(f, "{}", value),
            Op::Add { lhs, rhs } => write!(f, "add {} {}", lhs, rhs),
            Op::Mul { lhs, rhs } => write!(f, "mul {} {}", lhs, rhs),
            Op::Copy { src } => write!(f, "{}", src),
            Op::Extend { src, signed: true } => write!(f, "sextend {}", src),
            Op::Extend { src, signed: false } => write!(f, "uextend {}", src),
            Op::Trunc { src } => write!(f, "trunc {}", src),
        }
    }
}
