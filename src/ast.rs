use crate::span::Span;

/// 整个程序的 AST：恰好一个无参函数。
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDecl {
    pub return_type: TypeSpec,
    pub name: String,
    pub body: Compound,
    pub span: Span,
}

/// 类型说明符。目标语言是动态类型，类型只在解析阶段占位。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeSpec {
    Int,
    Float,
    Void,
}

/// 代码块：`{ stmt* }`。空语句不会出现在 `stmts` 里。
#[derive(Clone, Debug, PartialEq)]
pub struct Compound {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// 语句（Statement）枚举。
#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    /// 嵌套代码块：`{ ... }`
    Compound(Compound),
    /// 变量声明：`int x;`（没有初始值）
    VarDecl(VarDecl),
    /// 赋值：`x = expr;`
    Assign(Assignment),
    If(IfStmt),
    While(WhileStmt),
    /// 输出：`printf("...", args...);`
    Print(PrintStmt),
}

#[derive(Clone, Debug, PartialEq)]
pub struct VarDecl {
    pub name: String,
    pub declared_type: TypeSpec,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    /// 左值只能是一个裸标识符
    pub target: Variable,
    pub value: Expr,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IfStmt {
    /// 恰好一个比较表达式
    pub cond: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: Box<Stmt>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PrintStmt {
    /// 格式串（转义已由 Lexer 处理）
    pub format: String,
    pub args: Vec<Expr>,
    pub span: Span,
}

/// 表达式（Expression）枚举。表达式只产生值，不会包含语句。
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Number(NumberLiteral),
    Variable(Variable),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Number(n) => n.span,
            Expr::Variable(v) => v.span,
            Expr::Unary(u) => u.span,
            Expr::Binary(b) => b.span,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NumberLiteral {
    pub value: Number,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Variable {
    pub name: String,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub expr: Box<Expr>,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Neg,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub span: Span,
}

/// 二元运算符：只有算术与比较，源语言语法里没有逻辑运算。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    EqEq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
}

impl BinaryOp {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::EqEq
                | BinaryOp::NotEq
                | BinaryOp::Lt
                | BinaryOp::Gt
                | BinaryOp::LtEq
                | BinaryOp::GtEq
        )
    }
}
