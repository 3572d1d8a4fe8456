use crate::error::{CompileResult, Error, LexErrorKind};
use crate::lexer::token::{Token, TokenKind};
use crate::span::Span;

/// 便捷入口：把整个源代码切成一串 Token，最后一个一定是 `Eof`。
///
/// Parser 并不使用它（Parser 按需拉取 token），这里主要给测试和工具用。
pub fn lex(src: &str) -> CompileResult<Vec<Token>> {
    let mut lexer = Lexer::new(src);
    let mut tokens = Vec::new();
    loop {
        let tok = lexer.next_token()?;
        let done = tok.kind == TokenKind::Eof;
        tokens.push(tok);
        if done {
            return Ok(tokens);
        }
    }
}

/// 词法分析器：拉取式（pull-based），每次调用 `next_token` 产出一个 Token。
///
/// 这里用 `byte_pos` 保存当前位置的 byte offset（UTF-8），
/// 同时维护 `line/col` 方便报错定位。除扫描位置外不保存任何状态。
pub struct Lexer<'a> {
    src: &'a str,
    byte_pos: usize,
    line: usize,
    col: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            byte_pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// 产出下一个 Token。到达输入末尾后一直返回 `Eof`。
    ///
    /// 每次调用的规则顺序：
    /// 1. 跳过空白
    /// 2. 跳过 `//` 单行注释
    /// 3. 数字 -> 整数或浮点
    /// 4. 字母（Unicode）或 `_` -> 标识符/关键字
    /// 5. `"` -> 字符串
    /// 6. 运算符/分隔符（最长匹配）
    /// 7. 其它字符 -> LexicalError
    pub fn next_token(&mut self) -> CompileResult<Token> {
        self.skip_ws_and_comments();

        let start_pos = self.mark();
        let ch = match self.peek_char() {
            Some(ch) => ch,
            None => {
                return Ok(Token {
                    kind: TokenKind::Eof,
                    span: self.span_from(start_pos),
                })
            }
        };

        let kind = match ch {
            c if c.is_ascii_digit() => self.lex_number()?,
            c if is_ident_start(c) => self.lex_ident_or_keyword(),
            '"' => self.lex_string()?,
            _ => self.lex_operator(ch, start_pos)?,
        };

        Ok(Token {
            kind,
            span: self.span_from(start_pos),
        })
    }

    /// 运算符与分隔符。两字符运算符优先于它们的单字符前缀。
    fn lex_operator(&mut self, ch: char, start_pos: Mark) -> CompileResult<TokenKind> {
        self.bump_char();
        let kind = match ch {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '=' if self.try_bump('=') => TokenKind::EqEq,
            '=' => TokenKind::Assign,
            '!' if self.try_bump('=') => TokenKind::NotEq,
            '!' => TokenKind::Not,
            '<' if self.try_bump('=') => TokenKind::LtEq,
            '<' => TokenKind::Lt,
            '>' if self.try_bump('=') => TokenKind::GtEq,
            '>' => TokenKind::Gt,
            // 单独的 `&` / `|` 在子集中是非法字符
            '&' if self.try_bump('&') => TokenKind::AndAnd,
            '|' if self.try_bump('|') => TokenKind::OrOr,
            other => {
                return Err(Error::lexical(
                    LexErrorKind::UnexpectedChar(other),
                    self.span_from(start_pos),
                ))
            }
        };
        Ok(kind)
    }

    /// 跳过空白与 `//` 注释（注释一直到行尾或输入结束）。
    fn skip_ws_and_comments(&mut self) {
        loop {
            while let Some(ch) = self.peek_char() {
                if ch.is_whitespace() {
                    self.bump_char();
                } else {
                    break;
                }
            }

            if self.peek_is("//") {
                while let Some(ch) = self.peek_char() {
                    if ch == '\n' {
                        break;
                    }
                    self.bump_char();
                }
                continue;
            }

            break;
        }
    }

    /// 读取数字。
    ///
    /// 先吃掉最长的数字串；如果紧跟着 `.`，把 `.` 和后面的数字一起读成浮点，
    /// 所以 `2.` 也是合法的浮点字面量。
    fn lex_number(&mut self) -> CompileResult<TokenKind> {
        let start = self.mark();
        self.bump_while(|c| c.is_ascii_digit());

        if self.try_bump('.') {
            self.bump_while(|c| c.is_ascii_digit());
            let text = &self.src[start.offset..self.byte_pos];
            // 形如 `12.` / `12.34`，f64 的 FromStr 都能接受
            return match text.parse::<f64>() {
                Ok(x) if x.is_finite() => Ok(TokenKind::Float(x)),
                _ => Err(Error::lexical(
                    LexErrorKind::InvalidNumber,
                    self.span_from(start),
                )),
            };
        }

        let text = &self.src[start.offset..self.byte_pos];
        text.parse::<i64>()
            .map(TokenKind::Int)
            .map_err(|_| Error::lexical(LexErrorKind::InvalidNumber, self.span_from(start)))
    }

    /// 读取双引号字符串：`"..."`。
    ///
    /// 转义：`\n`、`\t` 变成控制字符，其它 `\c` 原样得到 `c`。
    /// 输入在闭合引号之前结束，报 `UnterminatedString`。
    fn lex_string(&mut self) -> CompileResult<TokenKind> {
        let start = self.mark();
        self.bump_char(); // 开头的 `"`

        let mut out = String::new();
        while let Some(ch) = self.bump_char() {
            match ch {
                '"' => return Ok(TokenKind::Str(out)),
                '\\' => match self.bump_char() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(other) => out.push(other),
                    None => break,
                },
                c => out.push(c),
            }
        }

        Err(Error::lexical(
            LexErrorKind::UnterminatedString,
            self.span_from(start),
        ))
    }

    /// 读取标识符，并在此处做“关键字识别”。
    fn lex_ident_or_keyword(&mut self) -> TokenKind {
        let start = self.byte_pos;
        self.bump_while(is_ident_continue);
        let text = &self.src[start..self.byte_pos];
        TokenKind::keyword(text).unwrap_or_else(|| TokenKind::Ident(text.to_string()))
    }

    /// 查看当前字符（不消费）。
    fn peek_char(&self) -> Option<char> {
        self.src[self.byte_pos..].chars().next()
    }

    /// 消费一个字符，并同步更新 byte offset 与 line/col。
    fn bump_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.byte_pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn bump_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(ch) = self.peek_char() {
            if !pred(ch) {
                break;
            }
            self.bump_char();
        }
    }

    /// 如果下一个字符等于 expected，就消费它并返回 true；否则不动并返回 false。
    fn try_bump(&mut self, expected: char) -> bool {
        match self.peek_char() {
            Some(ch) if ch == expected => {
                self.bump_char();
                true
            }
            _ => false,
        }
    }

    fn peek_is(&self, s: &str) -> bool {
        self.src[self.byte_pos..].starts_with(s)
    }

    /// 从 `start` 到当前扫描指针的 span（end 是开区间）。
    fn span_from(&self, start: Mark) -> Span {
        Span::new_with_line_col(
            start.offset,
            self.byte_pos,
            start.line,
            start.col,
            self.line,
            self.col,
        )
    }

    /// 记录当前扫描指针的位置（byte offset + line/col）。
    fn mark(&self) -> Mark {
        Mark {
            offset: self.byte_pos,
            line: self.line,
            col: self.col,
        }
    }
}

/// 记录 Lexer 扫描指针的位置（内部使用）。
#[derive(Clone, Copy)]
struct Mark {
    offset: usize,
    line: usize,
    col: usize,
}

/// 标识符首字符规则：字母或 `_`。字母按 Unicode 算，`café` 也是合法名字。
fn is_ident_start(ch: char) -> bool {
    ch == '_' || ch.is_alphabetic()
}

/// 标识符后续字符规则：字母/数字/`_`。
fn is_ident_continue(ch: char) -> bool {
    ch == '_' || ch.is_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eof_is_sticky() {
        let mut lexer = Lexer::new("x");
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Ident("x".into()));
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn eof_span_points_past_last_char() {
        let mut lexer = Lexer::new("ab\n");
        let _ = lexer.next_token().unwrap();
        let eof = lexer.next_token().unwrap();
        assert_eq!(eof.span.start, 3);
        assert_eq!(eof.span.start_line, 2);
        assert_eq!(eof.span.start_col, 1);
    }

    #[test]
    fn non_ascii_digit_does_not_start_a_number() {
        let mut lexer = Lexer::new("x٣");
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Ident("x٣".into()));
        let err = Lexer::new("٣x").next_token().unwrap_err();
        assert_eq!(err.code(), "UnexpectedChar");
    }

    #[test]
    fn comment_at_end_of_input() {
        let mut lexer = Lexer::new("x // trailing");
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Ident(_)));
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
    }
}
