mod config;
pub mod error;
pub mod grammer;
pub mod lower;

pub use config::Config;
pub use error::{Error, ErrorKind};
pub use grammer::lexer::{lex, Lexer};
pub use grammer::parsercore::Parser;
pub use grammer::typedesc::parse_type_at;
pub use lower::{lower_function, lower_program, lower_toplevel, Lowerer};

use kir::IrFunction;

/// Lex, parse and lower a whole source text
pub fn compile(source: &str) -> Result<Vec<IrFunction>, Error> {
    let tokens = lex(source)?;
    let program = Parser::new(&tokens).parse_program()?;
    lower_program(&program)
}
