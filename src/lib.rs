// cmm Language Interpreter Library
//
// Tree-walking interpreter for cmm, a small newline-terminated C-like
// language with integers only. Source text goes through the lexer, the Pratt
// parser and the evaluator; the driver writes the final value to a file.

// Public modules
pub mod ast;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod runner;
pub mod value;

// Re-export commonly used items
pub use ast::{BlockStatement, Expression, Identifier, InfixOp, Program, Statement};
pub use error::{CmmError, Diagnostic, Span};
pub use evaluator::{Environment, Evaluator};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{parse, Parser, Precedence};
pub use value::{is_truthy, Value};

// Re-export main functions
pub use runner::{interpret, interpret_source, run, run_batch};
