pub mod parser;

pub use parser::{parse_expression, parse_program, Parser, MAX_NESTING_DEPTH};
