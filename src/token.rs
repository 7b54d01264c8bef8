//! Filter查询语言的Token定义
//!
//! 查询不会逐词切分。顶层扫描器只识别分隔两个片段的连接词 (`AND` / `OR`),
//! 片段本身以原始文本交给对应的Domain处理。

use std::fmt;

/// 连接两个查询片段的连接词
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conjunction {
    And, // "AND"
    Or,  // "OR"
}

impl Conjunction {
    /// 扫描器按此顺序尝试关键字
    pub const ALL: [Conjunction; 2] = [Conjunction::And, Conjunction::Or];

    pub fn keyword(self) -> &'static str {
        match self {
            Conjunction::And => "AND",
            Conjunction::Or => "OR",
        }
    }
}

impl fmt::Display for Conjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// 按连接词切分得到的一个查询片段
///
/// `text` 已去除首尾空白。`conjunction` 是片段之后的连接词, 最后一个片段为 `None`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub conjunction: Option<Conjunction>,
    pub span: Span,
}

/// 源文本中的区间
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// 起始字节偏移
    pub start: usize,
    /// 结束字节偏移
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}
