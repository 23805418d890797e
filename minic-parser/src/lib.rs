//! Front end of the MiniC compiler: lexer, parser, syntax tree and tree traversal.

pub mod ast;
pub mod flatten;
pub mod lexer;
pub mod parser;
pub mod visitor;
