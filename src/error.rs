use crate::span::Span;
use thiserror::Error;

/// `compile` 以及各阶段统一使用的 Result 别名。
pub type CompileResult<T> = Result<T, Error>;

/// 编译器统一错误类型。
///
/// 只有两类错误，都是致命的：遇到第一个错误立即返回，不做恢复。
/// - `Lexical`：扫描到无法归类的字符（包括未闭合的字符串）。
/// - `Syntax`：当前 token 与语法规则期望的不一致。
///
/// `Display` 的输出末尾总带着 `line N, column A-B`，给人看，也方便调用方解析。
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[error("lexical error: {kind} at {span}")]
    Lexical { kind: LexErrorKind, span: Span },

    #[error("syntax error: expected {expected}, found {found} at {span}")]
    Syntax {
        /// 语法规则期望的 token 描述，例如 `')'`
        expected: String,
        /// 实际遇到的 token 描述，例如 `';'`、`identifier 'x'`
        found: String,
        span: Span,
    },
}

/// 词法错误的具体种类。
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LexErrorKind {
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),

    #[error("unterminated string literal")]
    UnterminatedString,

    /// 整数必须能放进 i64，浮点数必须是有限值
    #[error("number literal out of range (integers are limited to 64 bits, floats must be finite)")]
    InvalidNumber,
}

impl Error {
    pub fn lexical(kind: LexErrorKind, span: Span) -> Self {
        Error::Lexical { kind, span }
    }

    pub fn syntax(expected: impl Into<String>, found: impl Into<String>, span: Span) -> Self {
        Error::Syntax {
            expected: expected.into(),
            found: found.into(),
            span,
        }
    }

    /// 机器可读的错误码（便于测试断言、分类统计）。
    pub fn code(&self) -> &'static str {
        match self {
            Error::Lexical { kind, .. } => match kind {
                LexErrorKind::UnexpectedChar(_) => "UnexpectedChar",
                LexErrorKind::UnterminatedString => "UnterminatedString",
                LexErrorKind::InvalidNumber => "InvalidNumber",
            },
            Error::Syntax { .. } => "UnexpectedToken",
        }
    }

    /// 错误发生的位置。
    pub fn span(&self) -> Span {
        match self {
            Error::Lexical { span, .. } | Error::Syntax { span, .. } => *span,
        }
    }

    pub fn is_lexical(&self) -> bool {
        matches!(self, Error::Lexical { .. })
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, Error::Syntax { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexical_display_has_location() {
        let err = Error::lexical(
            LexErrorKind::UnexpectedChar('@'),
            Span::new_with_line_col(5, 6, 1, 6, 1, 7),
        );
        assert_eq!(
            err.to_string(),
            "lexical error: unexpected character '@' at line 1, column 6-6"
        );
        assert_eq!(err.code(), "UnexpectedChar");
        assert!(err.is_lexical());
    }

    #[test]
    fn syntax_display_names_expected_and_found() {
        let err = Error::syntax("')'", "';'", Span::new_with_line_col(9, 10, 2, 4, 2, 5));
        assert_eq!(
            err.to_string(),
            "syntax error: expected ')', found ';' at line 2, column 4-4"
        );
        assert_eq!(err.code(), "UnexpectedToken");
        assert_eq!(err.span().start, 9);
        assert!(err.is_syntax());
    }
}
