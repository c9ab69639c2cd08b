mod error;
pub mod func;
pub mod inst;
pub mod log;
pub mod ty;

pub use error::Error;
pub use func::IrFunction;
pub use inst::{Inst, Op, Reg};
pub use log::IrLog;
pub use ty::IrType;
