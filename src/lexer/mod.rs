pub mod lexer;
pub mod token;

pub use lexer::{lex, Lexer};
pub use token::{Token, TokenKind};
