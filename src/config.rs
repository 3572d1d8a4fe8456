/// 代码生成的可调选项。
///
/// 默认值与 `compile` 的行为一致；CLI 的命令行参数会映射到这里。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    /// 每一级缩进的空格数
    pub indent_width: usize,
    /// 与这个名字相同的函数会在末尾追加 `if __name__ == "__main__":` 调用
    pub entry_point: String,
    /// 把 `/` 生成为 Python 的 `//`（整除）。默认关闭，运算符一对一映射
    pub floor_division: bool,
    /// 是否输出文件头（`# Generated Python code` + `import sys`）
    pub emit_header: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            indent_width: 4,
            entry_point: "main".to_string(),
            floor_division: false,
            emit_header: true,
        }
    }
}
