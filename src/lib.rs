pub mod ast;
pub mod codegen;
pub mod config;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod span;

use tracing::debug;

// 对外公开的核心类型/函数（给 CLI、测试、以及其它调用方使用）。
pub use codegen::CodeGenerator;
pub use config::Options;
pub use error::{CompileResult, Error, LexErrorKind};
pub use lexer::{lex, Lexer, Token, TokenKind};
pub use parser::{parse_expression, parse_program, Parser, MAX_NESTING_DEPTH};
pub use span::Span;

/// 编译入口：C 子集源码 -> Python 源码（默认选项）。
///
/// 要么得到完整的输出，要么得到第一个错误，不会有半成品。
pub fn compile(src: &str) -> CompileResult<String> {
    compile_with(src, &Options::default())
}

/// 带选项的编译入口：Lexer -> Parser -> AST -> CodeGenerator。
///
/// 每次调用都构造新的 Lexer/Parser/CodeGenerator，调用之间不共享状态。
pub fn compile_with(src: &str, options: &Options) -> CompileResult<String> {
    let func = parse_program(src)?;
    debug!(
        function = %func.name,
        statements = func.body.stmts.len(),
        "parsed program"
    );
    Ok(codegen::generate(&func, options))
}
