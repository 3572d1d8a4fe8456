use tracing::debug;

use crate::ast::{
    BinaryOp, Compound, Expr, FunctionDecl, IfStmt, Number, PrintStmt, Stmt, UnaryOp, WhileStmt,
};
use crate::config::Options;

/// CodeGen 的对外入口：把 AST（FunctionDecl）生成 Python 源码字符串。
///
/// 这里的输出是字符串，是否写入文件由 CLI（main.rs）负责。
pub fn generate(func: &FunctionDecl, options: &Options) -> String {
    CodeGenerator::new(options).generate(func)
}

/// 树遍历代码生成器。
///
/// 唯一跨调用的状态是输出缓冲区 `lines` 和缩进深度 `depth`：
/// 进入嵌套块之前 +1，出来之后 -1。`generate` 开头会重置两者，
/// 所以同一个实例可以重复使用。
pub struct CodeGenerator<'o> {
    options: &'o Options,
    lines: Vec<String>,
    depth: usize,
}

impl<'o> CodeGenerator<'o> {
    pub fn new(options: &'o Options) -> Self {
        Self {
            options,
            lines: Vec::new(),
            depth: 0,
        }
    }

    /// 生成完整 Python 程序。
    ///
    /// 输出格式（默认选项）：
    /// ```text
    /// # Generated Python code
    /// import sys
    ///
    /// def main():
    ///     <stmt1>
    ///     <stmt2>
    ///
    /// if __name__ == "__main__":
    ///     main()
    /// ```
    pub fn generate(&mut self, func: &FunctionDecl) -> String {
        self.lines.clear();
        self.depth = 0;

        if self.options.emit_header {
            self.write("# Generated Python code");
            self.write("import sys");
            self.write("");
        }

        self.gen_function(func);

        if func.name == self.options.entry_point {
            self.write("");
            self.write("if __name__ == \"__main__\":");
            self.indented(|g| g.write(&format!("{}()", func.name)));
        }

        debug!(lines = self.lines.len(), "generated python source");

        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }

    fn gen_function(&mut self, func: &FunctionDecl) {
        self.write(&format!("def {}():", func.name));
        self.gen_block(|g| g.gen_compound(&func.body));
    }

    /// 语句分发：封闭枚举 + 穷尽 match，新增 AST 变体时这里会编译失败。
    fn gen_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Compound(c) => self.gen_compound(c),
            Stmt::VarDecl(v) => {
                // 目标语言是动态类型：丢掉声明类型，用 None 表示“尚未赋值”
                self.write(&format!("{} = None", v.name));
            }
            Stmt::Assign(a) => {
                let value = self.gen_expr(&a.value);
                self.write(&format!("{} = {value}", a.target.name));
            }
            Stmt::If(i) => self.gen_if(i),
            Stmt::While(w) => self.gen_while(w),
            Stmt::Print(p) => self.gen_print(p),
        }
    }

    /// 嵌套 `{...}` 在 Python 里没有对应物，直接把里面的语句平铺到当前层。
    fn gen_compound(&mut self, compound: &Compound) {
        for stmt in &compound.stmts {
            self.gen_stmt(stmt);
        }
    }

    fn gen_if(&mut self, stmt: &IfStmt) {
        let cond = self.gen_expr(&stmt.cond);
        self.write(&format!("if {cond}:"));
        self.gen_block(|g| g.gen_stmt(&stmt.then_branch));

        if let Some(else_branch) = &stmt.else_branch {
            self.write("else:");
            self.gen_block(|g| g.gen_stmt(else_branch));
        }
    }

    fn gen_while(&mut self, stmt: &WhileStmt) {
        let cond = self.gen_expr(&stmt.cond);
        self.write(&format!("while {cond}:"));
        self.gen_block(|g| g.gen_stmt(&stmt.body));
    }

    /// printf -> print(..., end="")
    ///
    /// - 有参数：`print("fmt" % (a, b), end="")`（单个参数写成 `(a,)`），用 Python 的 `%` 格式化，
    ///   格式说明符原样保留。
    /// - 无参数：`print("fmt", end="")`，C 里的 `%%` 折叠成 `%`。
    ///
    /// `end=""` 是因为 C 的 printf 不会自己补换行。
    fn gen_print(&mut self, stmt: &PrintStmt) {
        if stmt.args.is_empty() {
            let text = py_string_literal(&stmt.format.replace("%%", "%"));
            self.write(&format!("print({text}, end=\"\")"));
            return;
        }

        let args: Vec<String> = stmt.args.iter().map(|a| self.gen_expr(a)).collect();
        let tuple = if args.len() == 1 {
            format!("({},)", args[0])
        } else {
            format!("({})", args.join(", "))
        };
        let text = py_string_literal(&stmt.format);
        self.write(&format!("print({text} % {tuple}, end=\"\")"));
    }

    /// 生成表达式。二元运算一律加括号，所以输出的结合方式与 AST 完全一致。
    fn gen_expr(&self, expr: &Expr) -> String {
        match expr {
            Expr::Number(n) => match n.value {
                Number::Int(i) => i.to_string(),
                // `{:?}` 总带小数点或指数：1.0、0.5、1e20
                Number::Float(x) => format!("{x:?}"),
            },
            Expr::Variable(v) => v.name.clone(),
            Expr::Unary(u) => {
                let op = match u.op {
                    UnaryOp::Plus => "+",
                    UnaryOp::Neg => "-",
                };
                format!("{op}{}", self.gen_expr(&u.expr))
            }
            Expr::Binary(b) => {
                let left = self.gen_expr(&b.left);
                let right = self.gen_expr(&b.right);
                format!("({left} {} {right})", self.binary_op(b.op))
            }
        }
    }

    fn binary_op(&self, op: BinaryOp) -> &'static str {
        match op {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div if self.options.floor_division => "//",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::EqEq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::LtEq => "<=",
            BinaryOp::GtEq => ">=",
        }
    }

    /// 缩进一层生成块体；块体什么都没写出来时补一个 `pass`。
    fn gen_block(&mut self, body: impl FnOnce(&mut Self)) {
        self.indented(|g| {
            let before = g.lines.len();
            body(g);
            if g.lines.len() == before {
                g.write("pass");
            }
        });
    }

    fn indented(&mut self, body: impl FnOnce(&mut Self)) {
        self.depth += 1;
        body(self);
        self.depth -= 1;
    }

    fn write(&mut self, text: &str) {
        if text.is_empty() {
            self.lines.push(String::new());
            return;
        }
        let indent = " ".repeat(self.depth * self.options.indent_width);
        self.lines.push(format!("{indent}{text}"));
    }
}

/// 把字符串内容写成 Python 双引号字符串字面量。
///
/// 换行等控制字符一律写成转义序列，保证生成的行数与字面量内容无关。
fn py_string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_literal_escapes_quotes_and_newlines() {
        assert_eq!(py_string_literal("a\"b\\c\n"), "\"a\\\"b\\\\c\\n\"");
        assert_eq!(py_string_literal("%d\t%f"), "\"%d\\t%f\"");
    }

    #[test]
    fn generator_resets_between_runs() {
        let options = Options::default();
        let mut generator = CodeGenerator::new(&options);
        let a = crate::parse_program("void main() { if (x > 0) { x = 1; } }").unwrap();
        let b = crate::parse_program("void other() { y = 2; }").unwrap();

        let first = generator.generate(&a);
        let _ = generator.generate(&b);
        assert_eq!(generator.generate(&a), first);
        assert_eq!(generator.generate(&b), generate(&b, &options));
    }

    #[test]
    fn string_literal_escapes_other_control_chars() {
        assert_eq!(py_string_literal("\u{7}"), "\"\\x07\"");
    }
}
