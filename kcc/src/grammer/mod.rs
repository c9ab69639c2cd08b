pub mod ast;
pub mod expr;
pub mod lexer;
pub mod parsercore;
pub mod stmt;
pub mod token;
pub mod typedesc;
