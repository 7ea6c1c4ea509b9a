// Lox Language Library
//
// Scanner, parser and tree-walking runtime for Lox, a small dynamically
// typed language with closures and classes.

pub mod ast;
pub mod callable;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod runner;
pub mod value;

// Re-export commonly used items
pub use ast::{Expr, FunctionDecl, LiteralValue, Program, Stmt};
pub use callable::{Callable, LoxClass, LoxFunction, LoxInstance, NativeFunction};
pub use environment::Environment;
pub use error::{Diagnostics, ErrorKind, LoxError, Reporter, Span};
pub use evaluator::{Evaluator, Flow};
pub use lexer::{Lexer, Literal, Token, TokenType};
pub use parser::{ParseError, Parser};
pub use value::Value;

// Re-export main functions
pub use repl::{start as start_repl, start_with as start_repl_with};
pub use runner::{parse_source, run, run_file, RunOutcome};
