use serde::Serialize;
use strum::Display;

/// Width of a pointer value in bytes
pub const PTR_WIDTH_BYTES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum IrType {
    I0,
    I8,
    I16,
    Ptr,
}

impl IrType {
    /// Width in bytes
    pub fn width(&self) -> usize {
        match self {
            IrType::I0 => 0,
            IrType::I8 => 1,
            IrType::I16 => 2,
            IrType::Ptr => PTR_WIDTH_BYTES,
        }
    }
}

#[test]
fn test() {
    assert_eq!(IrType::I16.to_string(), "i16");
    assert_eq!(IrType::Ptr.to_string(), "ptr");
    assert_eq!(IrType::I0.width(), 0);
    assert_eq!(IrType::Ptr.width(), IrType::I16.width());
}
