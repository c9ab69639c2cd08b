use crate::{inst::Reg, log::IrLog};
use color_print::cformat;
use serde::Serialize;
use std::fmt;

/// Lowered body of one function (or of the top-level statement unit)
#[derive(Debug, Clone, Serialize)]
pub struct IrFunction {
    pub name: String,
    pub params: Vec<Reg>,
    pub log: IrLog,
}

impl IrFunction {
    pub fn new(name: impl Into<String>, params: Vec<Reg>, log: IrLog) -> Self {
        Self {
            name: name.into(),
            params,
            log,
        }
    }

    fn signature(&self) -> String {
        self.params
            .iter()
            .map(|reg| match self.log.type_of(*reg) {
                Some(ty) => format!("{} {}", reg, ty),
                None => reg.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn cformat(&self) -> String {
        let mut result = cformat!("<green>{}</green>({}):\n", self.name, self.signature());
        result.push_str(&self.log.cformat());
        result
    }
}

impl fmt::Display for IrFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}({}):", self.name, self.signature())?;
        for inst in self.log.insts() {
            writeln!(f, "  {}", inst)?;
        }
        Ok(())
    }
}
