use tracing::trace;

use crate::ast::{
    Assignment, BinaryExpr, BinaryOp, Compound, Expr, FunctionDecl, IfStmt, Number,
    NumberLiteral, PrintStmt, Stmt, TypeSpec, UnaryExpr, UnaryOp, VarDecl, Variable, WhileStmt,
};
use crate::error::{CompileResult, Error};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::span::Span;

/// 表达式和语句允许的最大嵌套层数。
///
/// 括号、一元运算、二元运算链、`{...}` 以及 if/while 分支体各算一层。
/// 超过之后报 SyntaxError，而不是让递归把栈撑爆；
/// 代码生成和析构同样按 AST 深度递归，所以这个上限也保护了它们。
pub const MAX_NESTING_DEPTH: usize = 128;

/// 解析器入口：把源代码解析为 FunctionDecl AST。
pub fn parse_program(src: &str) -> CompileResult<FunctionDecl> {
    Parser::new(src)?.parse()
}

/// 只解析一个表达式（后面必须紧跟输入结束）。给工具和测试用。
pub fn parse_expression(src: &str) -> CompileResult<Expr> {
    let mut parser = Parser::new(src)?;
    let expr = parser.parse_expr()?;
    parser.expect(TokenKind::Eof)?;
    Ok(expr)
}

/// 递归下降解析器。
///
/// - 自己持有一个 Lexer，按需一个一个地拉 token，不预先切分整个输入。
/// - `current` 是唯一的 lookahead（“当前 token”）。
/// - `bump()` 表示“吃掉当前 token”，并从 Lexer 拉下一个。
/// - 每条产生式对应一个 `parse_*` 方法。
/// - 任何不匹配都立刻返回 SyntaxError，不做恢复，也不产出半棵树。
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    /// 上一个被吃掉的 token 的 span，用来计算 AST 节点的结束位置
    prev_span: Span,
    /// 当前嵌套层数，见 [`MAX_NESTING_DEPTH`]
    depth: usize,
}

impl<'a> Parser<'a> {
    /// 创建解析器并预读第一个 token（这一步就可能产生 LexicalError）。
    pub fn new(src: &'a str) -> CompileResult<Self> {
        let mut lexer = Lexer::new(src);
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            prev_span: Span::default(),
            depth: 0,
        })
    }

    /// program : function_decl EOF
    pub fn parse(mut self) -> CompileResult<FunctionDecl> {
        let func = self.parse_function_decl()?;
        self.expect(TokenKind::Eof)?;
        Ok(func)
    }

    /// function_decl : type_spec ID '(' ')' compound
    fn parse_function_decl(&mut self) -> CompileResult<FunctionDecl> {
        let start = self.current.span;
        let return_type = self.parse_type_spec()?;
        let (name, _) = self.expect_ident()?;
        self.expect(TokenKind::LParen)?;
        self.expect(TokenKind::RParen)?;
        let body = self.parse_compound()?;
        Ok(FunctionDecl {
            return_type,
            name,
            span: start.merge(body.span),
            body,
        })
    }

    /// type_spec : 'int' | 'float' | 'void'
    fn parse_type_spec(&mut self) -> CompileResult<TypeSpec> {
        let ty = match self.current.kind {
            TokenKind::KwInt => TypeSpec::Int,
            TokenKind::KwFloat => TypeSpec::Float,
            TokenKind::KwVoid => TypeSpec::Void,
            _ => return Err(self.unexpected("type specifier")),
        };
        self.bump()?;
        Ok(ty)
    }

    /// compound : '{' statement_list '}'
    fn parse_compound(&mut self) -> CompileResult<Compound> {
        self.nested(|p| {
            let open = p.expect(TokenKind::LBrace)?;
            let stmts = p.parse_statement_list()?;
            let close = p.expect(TokenKind::RBrace)?;
            Ok(Compound {
                stmts,
                span: open.span.merge(close.span),
            })
        })
    }

    /// 读语句直到 `}`。
    ///
    /// 分隔符规则：
    /// - if / while / `{...}` 之后不需要、也不消费 `;`
    /// - 其它语句（包括空语句）之后必须是 `;`，除非紧跟着 `}`
    fn parse_statement_list(&mut self) -> CompileResult<Vec<Stmt>> {
        let mut stmts = Vec::new();

        while !self.at(&TokenKind::RBrace) {
            let stmt = self.parse_statement()?;
            let is_block = matches!(
                stmt,
                Some(Stmt::If(_)) | Some(Stmt::While(_)) | Some(Stmt::Compound(_))
            );
            if !is_block {
                self.parse_separator(stmt.is_some())?;
            }
            stmts.extend(stmt);
        }

        Ok(stmts)
    }

    /// 普通语句或空语句之后的分隔符：有 `;` 就吃掉，紧跟 `}` 时可以省略。
    ///
    /// 空语句后面既不是 `;` 也不是 `}`，说明当前 token 根本不能开始一条语句
    /// （比如 `return`），这时报 "expected statement"。
    fn parse_separator(&mut self, after_statement: bool) -> CompileResult<()> {
        if self.at(&TokenKind::Semicolon) {
            self.bump()?;
            return Ok(());
        }
        if self.at(&TokenKind::RBrace) {
            return Ok(());
        }
        let expected = if after_statement {
            TokenKind::Semicolon.describe()
        } else {
            "statement"
        };
        Err(self.unexpected(expected))
    }

    /// 解析单条语句。返回 `None` 表示空语句（不吃任何 token）。
    fn parse_statement(&mut self) -> CompileResult<Option<Stmt>> {
        let stmt = match self.current.kind {
            TokenKind::LBrace => Stmt::Compound(self.parse_compound()?),
            TokenKind::KwInt | TokenKind::KwFloat | TokenKind::KwVoid => {
                Stmt::VarDecl(self.parse_declaration()?)
            }
            TokenKind::Ident(_) => Stmt::Assign(self.parse_assignment()?),
            TokenKind::KwIf => Stmt::If(self.parse_if()?),
            TokenKind::KwWhile => Stmt::While(self.parse_while()?),
            TokenKind::KwPrintf => Stmt::Print(self.parse_printf()?),
            _ => return Ok(None),
        };
        Ok(Some(stmt))
    }

    /// if / while 的分支体。
    ///
    /// 分支体是普通语句时，和语句列表里一样：后面的 `;` 被吃掉，
    /// 紧跟 `}` 时可以省略。于是 `if (c) x = 1; else x = 2;`
    /// 和 `{ if (c) x = 1 }` 都能解析。
    /// 空分支体（`if (c) ;`）得到一个空的 Compound。
    fn parse_body(&mut self) -> CompileResult<Stmt> {
        let start = self.current.span;
        self.nested(|p| match p.parse_statement()? {
            Some(stmt @ (Stmt::Compound(_) | Stmt::If(_) | Stmt::While(_))) => Ok(stmt),
            other => {
                p.parse_separator(other.is_some())?;
                Ok(other.unwrap_or(Stmt::Compound(Compound {
                    stmts: Vec::new(),
                    span: start,
                })))
            }
        })
    }

    /// declaration : type_spec ID
    fn parse_declaration(&mut self) -> CompileResult<VarDecl> {
        let start = self.current.span;
        let declared_type = self.parse_type_spec()?;
        let (name, name_span) = self.expect_ident()?;
        Ok(VarDecl {
            name,
            declared_type,
            span: start.merge(name_span),
        })
    }

    /// assignment : ID '=' expr
    fn parse_assignment(&mut self) -> CompileResult<Assignment> {
        let target = self.parse_variable()?;
        self.expect(TokenKind::Assign)?;
        let value = self.parse_expr()?;
        Ok(Assignment {
            span: target.span.merge(value.span()),
            target,
            value,
        })
    }

    /// if : 'if' '(' condition ')' body ('else' body)?
    fn parse_if(&mut self) -> CompileResult<IfStmt> {
        let start = self.expect(TokenKind::KwIf)?.span;
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_condition()?;
        self.expect(TokenKind::RParen)?;
        let then_branch = Box::new(self.parse_body()?);

        let else_branch = if self.at(&TokenKind::KwElse) {
            self.bump()?;
            Some(Box::new(self.parse_body()?))
        } else {
            None
        };

        Ok(IfStmt {
            cond,
            then_branch,
            else_branch,
            span: start.merge(self.prev_span),
        })
    }

    /// while : 'while' '(' condition ')' body
    fn parse_while(&mut self) -> CompileResult<WhileStmt> {
        let start = self.expect(TokenKind::KwWhile)?.span;
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_condition()?;
        self.expect(TokenKind::RParen)?;
        let body = Box::new(self.parse_body()?);
        Ok(WhileStmt {
            cond,
            body,
            span: start.merge(self.prev_span),
        })
    }

    /// printf : 'printf' '(' STRING (',' expr)* ')'
    fn parse_printf(&mut self) -> CompileResult<PrintStmt> {
        let start = self.expect(TokenKind::KwPrintf)?.span;
        self.expect(TokenKind::LParen)?;

        let format = match &self.current.kind {
            TokenKind::Str(s) => s.clone(),
            _ => return Err(self.unexpected("string literal")),
        };
        self.bump()?;

        let mut args = Vec::new();
        while self.at(&TokenKind::Comma) {
            self.bump()?;
            args.push(self.parse_expr()?);
        }

        let close = self.expect(TokenKind::RParen)?;
        Ok(PrintStmt {
            format,
            args,
            span: start.merge(close.span),
        })
    }

    /// condition : expr ('==' | '!=' | '<' | '>' | '<=' | '>=') expr
    ///
    /// 只允许一次比较；`&&` / `||` 虽然能被 Lexer 识别，但这里不接受。
    fn parse_condition(&mut self) -> CompileResult<Expr> {
        let left = self.parse_expr()?;
        let op = match comparison_op(&self.current.kind) {
            Some(op) => op,
            None => return Err(self.unexpected("comparison operator")),
        };
        self.bump()?;
        let right = self.parse_expr()?;
        Ok(binary(op, left, right))
    }

    /// expr : term (('+' | '-') term)*
    ///
    /// 优先级靠调用层次表达：expr -> term -> factor，
    /// 循环构造保证左结合：`1-2-3` = `(1-2)-3`。
    fn parse_expr(&mut self) -> CompileResult<Expr> {
        let base = self.depth;
        let mut node = self.parse_term()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.bump()?;
            // 左结合链每多一个运算符，AST 就深一层
            self.enter_nesting()?;
            let rhs = self.parse_term()?;
            node = binary(op, node, rhs);
        }
        self.depth = base;
        Ok(node)
    }

    /// term : factor (('*' | '/' | '%') factor)*
    fn parse_term(&mut self) -> CompileResult<Expr> {
        let base = self.depth;
        let mut node = self.parse_factor()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.bump()?;
            self.enter_nesting()?;
            let rhs = self.parse_factor()?;
            node = binary(op, node, rhs);
        }
        self.depth = base;
        Ok(node)
    }

    /// factor : ('+' | '-') factor | INT | FLOAT | '(' expr ')' | ID
    ///
    /// 一元运算先递归到 factor 自己，所以一元比任何二元运算都绑得紧：
    /// `-5 + 3` = `(-5) + 3`。
    fn parse_factor(&mut self) -> CompileResult<Expr> {
        let start = self.current.span;
        match self.current.kind {
            TokenKind::Plus | TokenKind::Minus => {
                let op = if self.current.kind == TokenKind::Plus {
                    UnaryOp::Plus
                } else {
                    UnaryOp::Neg
                };
                self.bump()?;
                let operand = self.nested(|p| p.parse_factor())?;
                Ok(Expr::Unary(UnaryExpr {
                    op,
                    span: start.merge(operand.span()),
                    expr: Box::new(operand),
                }))
            }
            TokenKind::Int(n) => {
                self.bump()?;
                Ok(Expr::Number(NumberLiteral {
                    value: Number::Int(n),
                    span: start,
                }))
            }
            TokenKind::Float(x) => {
                self.bump()?;
                Ok(Expr::Number(NumberLiteral {
                    value: Number::Float(x),
                    span: start,
                }))
            }
            TokenKind::LParen => self.nested(|p| {
                p.bump()?;
                let inner = p.parse_expr()?;
                p.expect(TokenKind::RParen)?;
                Ok(inner)
            }),
            TokenKind::Ident(_) => Ok(Expr::Variable(self.parse_variable()?)),
            _ => Err(self.unexpected("expression")),
        }
    }

    fn parse_variable(&mut self) -> CompileResult<Variable> {
        let (name, span) = self.expect_ident()?;
        Ok(Variable { name, span })
    }

    /// 在多一层嵌套里运行 `f`，返回后恢复层数。
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> CompileResult<T>) -> CompileResult<T> {
        self.enter_nesting()?;
        let result = f(self);
        self.leave_nesting();
        result
    }

    /// 嵌套层数加一；超过 [`MAX_NESTING_DEPTH`] 时报错，错误位置是当前 token。
    fn enter_nesting(&mut self) -> CompileResult<()> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.unexpected(&format!(
                "at most {MAX_NESTING_DEPTH} levels of nesting"
            )));
        }
        self.depth += 1;
        Ok(())
    }

    fn leave_nesting(&mut self) {
        debug_assert!(self.depth > 0, "leave_nesting without enter_nesting");
        self.depth = self.depth.saturating_sub(1);
    }

    /// 期望当前 token 是标识符，返回名字和位置。
    fn expect_ident(&mut self) -> CompileResult<(String, Span)> {
        match &self.current.kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                let tok = self.bump()?;
                Ok((name, tok.span))
            }
            _ => Err(self.unexpected(TokenKind::Ident(String::new()).describe())),
        }
    }

    /// 期望当前 token 属于 `kind` 这一类（忽略携带的值），吃掉并返回它。
    fn expect(&mut self, kind: TokenKind) -> CompileResult<Token> {
        if self.at(&kind) {
            self.bump()
        } else {
            Err(self.unexpected(kind.describe()))
        }
    }

    fn at(&self, kind: &TokenKind) -> bool {
        self.current.kind.same_kind(kind)
    }

    /// 吃掉当前 token，从 Lexer 拉下一个；返回被吃掉的那个。
    fn bump(&mut self) -> CompileResult<Token> {
        let next = self.lexer.next_token()?;
        let tok = std::mem::replace(&mut self.current, next);
        trace!(
            token = %tok.kind,
            line = tok.span.start_line,
            col = tok.span.start_col,
            "consume token"
        );
        self.prev_span = tok.span;
        Ok(tok)
    }

    /// 构造一个定位到“当前 token”的 SyntaxError。
    fn unexpected(&self, expected: &str) -> Error {
        Error::syntax(expected, self.current.kind.to_string(), self.current.span)
    }
}

fn comparison_op(kind: &TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::EqEq => BinaryOp::EqEq,
        TokenKind::NotEq => BinaryOp::NotEq,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::LtEq => BinaryOp::LtEq,
        TokenKind::GtEq => BinaryOp::GtEq,
        _ => return None,
    };
    Some(op)
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary(BinaryExpr {
        op,
        span: left.span().merge(right.span()),
        left: Box::new(left),
        right: Box::new(right),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_span_covers_operands() {
        let expr = parse_expression("a + bc").unwrap();
        let span = expr.span();
        assert_eq!(span.start, 0);
        assert_eq!(span.end, 6);
    }

    #[test]
    fn unary_span_starts_at_operator() {
        let expr = parse_expression("  -x").unwrap();
        assert_eq!(expr.span().start, 2);
        assert_eq!(expr.span().end, 4);
    }

    #[test]
    fn nesting_depth_is_restored_after_each_production() {
        let mut parser = Parser::new("((a)) + -(-b) * c - d").unwrap();
        parser.parse_expr().unwrap();
        assert_eq!(parser.depth, 0);
    }

    #[test]
    fn nesting_limit_counts_operator_chains() {
        let src = vec!["x"; MAX_NESTING_DEPTH + 2].join(" + ");
        let err = parse_expression(&src).unwrap_err();
        assert!(err.is_syntax());
    }

    #[test]
    fn function_span_covers_whole_program() {
        let src = "void main() { }";
        let func = parse_program(src).unwrap();
        assert_eq!(func.span.start, 0);
        assert_eq!(func.span.end, src.len());
    }
}
