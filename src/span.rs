use std::fmt;

/// 源码中的一个“区间位置”。
///
/// - `start/end`：byte offset（按 UTF-8 字节计数），更适合做切片/定位。
/// - `*_line/*_col`：行列号（从 1 开始），更适合给人看的报错信息。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Span {
    /// 起始 byte offset（包含）
    pub start: usize,
    /// 结束 byte offset（不包含）
    pub end: usize,
    /// 起始行号（从 1 开始）
    pub start_line: usize,
    /// 起始列号（从 1 开始）
    pub start_col: usize,
    /// 结束行号（从 1 开始）
    pub end_line: usize,
    /// 结束列号（从 1 开始，不包含）
    pub end_col: usize,
}

impl Default for Span {
    fn default() -> Self {
        Self {
            start: 0,
            end: 0,
            start_line: 1,
            start_col: 1,
            end_line: 1,
            end_col: 1,
        }
    }
}

impl Span {
    /// 同时设置 byte offset 与行列信息。
    pub fn new_with_line_col(
        start: usize,
        end: usize,
        start_line: usize,
        start_col: usize,
        end_line: usize,
        end_col: usize,
    ) -> Self {
        Self {
            start,
            end,
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// 覆盖 `self` 与 `other` 的最小区间（用于给 AST 节点计算 span）。
    pub fn merge(self, other: Span) -> Span {
        let (first, last) = if self.start <= other.start {
            (self, other)
        } else {
            (other, self)
        };
        let end_side = if last.end >= first.end { last } else { first };
        Span {
            start: first.start,
            end: end_side.end,
            start_line: first.start_line,
            start_col: first.start_col,
            end_line: end_side.end_line,
            end_col: end_side.end_col,
        }
    }

    /// 起始行上的最后一列（闭区间）。
    ///
    /// 空 span（例如 EOF）或跨行 span 都退化为起始列。
    pub fn last_col(&self) -> usize {
        if self.end_line == self.start_line && self.end_col > self.start_col {
            self.end_col - 1
        } else {
            self.start_col
        }
    }
}

impl fmt::Display for Span {
    /// 固定格式 `line N, column A-B`，方便编辑器一类的调用方解析并高亮。
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, column {}-{}",
            self.start_line,
            self.start_col,
            self.last_col()
        )
    }
}
