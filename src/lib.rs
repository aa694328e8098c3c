pub mod asth;
pub mod binds;
pub mod builtin;
pub mod config;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod function;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod stack;
pub mod token_type;
pub mod value;

pub use config::Config;
pub use error::{ErrorKind, ParseError, RuntimeError};
pub use evaluator::{Evaluator, Signal};
pub use lexer::{scan, Lexer};
pub use output::Output;
pub use parser::Parser;
pub use value::Value;
