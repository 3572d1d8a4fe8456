use std::fmt;

use crate::span::Span;

/// 一个 Token = 词法分析后的最小“语法积木”。
///
/// 例子：`x = 10;`
/// 会被切成：Ident("x"), Assign, Int(10), Semicolon
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    /// Token 的类别（携带值的类别把值直接放在枚举里）
    pub kind: TokenKind,
    /// Token 在源代码中的位置
    pub span: Span,
}

/// Token 的种类枚举。
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    // ---------- 关键字 ----------
    KwIf,
    KwElse,
    KwWhile,
    KwInt,
    KwFloat,
    KwVoid,
    /// 词法上识别，但语法里没有 return 语句
    KwReturn,
    KwPrintf,
    /// 词法上识别，但语法里没有输入语句
    KwScanf,

    // ---------- 语义性 Token（携带值） ----------
    /// 标识符：例如 `abc`、`x1`、`_tmp`
    Ident(String),
    /// 整数字面量
    Int(i64),
    /// 浮点字面量：`1.5`、`2.`
    Float(f64),
    /// 字符串字面量（`\n`、`\t` 已经转换成控制字符）
    Str(String),

    // ---------- 分隔符 ----------
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Semicolon,

    // ---------- 运算符 ----------
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    Assign,
    EqEq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,

    Not,
    AndAnd,
    OrOr,

    /// 输入结束
    Eof,
}

impl TokenKind {
    /// 关键字表：标识符扫描完之后在这里分类。
    pub fn keyword(ident: &str) -> Option<TokenKind> {
        let kind = match ident {
            "if" => TokenKind::KwIf,
            "else" => TokenKind::KwElse,
            "while" => TokenKind::KwWhile,
            "int" => TokenKind::KwInt,
            "float" => TokenKind::KwFloat,
            "void" => TokenKind::KwVoid,
            "return" => TokenKind::KwReturn,
            "printf" => TokenKind::KwPrintf,
            "scanf" => TokenKind::KwScanf,
            _ => return None,
        };
        Some(kind)
    }

    /// 只比较“种类”，忽略携带的值。
    ///
    /// Parser 用它来判断 `expect(TokenKind::Ident(..))` 一类的期望。
    pub fn same_kind(&self, other: &TokenKind) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// 不带值的“种类名”，用于 SyntaxError 的 expected 部分。
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::KwIf => "'if'",
            TokenKind::KwElse => "'else'",
            TokenKind::KwWhile => "'while'",
            TokenKind::KwInt => "'int'",
            TokenKind::KwFloat => "'float'",
            TokenKind::KwVoid => "'void'",
            TokenKind::KwReturn => "'return'",
            TokenKind::KwPrintf => "'printf'",
            TokenKind::KwScanf => "'scanf'",
            TokenKind::Ident(_) => "identifier",
            TokenKind::Int(_) => "integer literal",
            TokenKind::Float(_) => "float literal",
            TokenKind::Str(_) => "string literal",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::Comma => "','",
            TokenKind::Semicolon => "';'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::Assign => "'='",
            TokenKind::EqEq => "'=='",
            TokenKind::NotEq => "'!='",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::LtEq => "'<='",
            TokenKind::GtEq => "'>='",
            TokenKind::Not => "'!'",
            TokenKind::AndAnd => "'&&'",
            TokenKind::OrOr => "'||'",
            TokenKind::Eof => "end of input",
        }
    }
}

/// 带值的描述，用于 SyntaxError 的 found 部分：`identifier 'x'`、`integer literal 10`。
impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident(name) => write!(f, "identifier '{name}'"),
            TokenKind::Int(n) => write!(f, "integer literal {n}"),
            TokenKind::Float(x) => write!(f, "float literal {x:?}"),
            TokenKind::Str(s) => write!(f, "string literal {s:?}"),
            other => f.write_str(other.describe()),
        }
    }
}
