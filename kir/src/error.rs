use crate::{inst::Reg, ty::IrType};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Unknown register: {0}")]
    UnknownRegister(Reg),

    #[error("Operand type mismatch: {0} is {1} but {2} is {3}")]
    OperandMismatch(Reg, IrType, Reg, IrType),

    #[error("Cannot extend {0} from {1} to {2}")]
    InvalidExtend(Reg, IrType, IrType),

    #[error("Cannot truncate {0} from {1} to {2}")]
    InvalidTrunc(Reg, IrType, IrType),
}
