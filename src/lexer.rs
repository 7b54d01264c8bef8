//! Filter查询的连接词扫描器
//!
//! 扫描器只遍历一次输入, 产出顶层 `AND` / `OR` 之间的片段。
//! 关键字不区分大小写, 且只按完整单词匹配。单引号或双引号会暂停关键字匹配,
//! 直到再次出现相同的引号; 不支持转义, 所以 `"say \"hi\""` 在第二个 `"` 处结束。

use crate::token::{Conjunction, Segment, Span};

pub struct Segments<'a> {
    input: &'a str,
    /// 下一个片段的起始位置（字节索引）
    position: usize,
    finished: bool,
}

impl<'a> Segments<'a> {
    pub fn new(input: &'a str) -> Self {
        Segments {
            input,
            position: 0,
            finished: false,
        }
    }

    /// 返回从字节 `at` 开始的连接词
    fn conjunction_at(&self, at: usize) -> Option<Conjunction> {
        let bytes = self.input.as_bytes();
        if at > 0 && is_word_byte(bytes[at - 1]) {
            return None;
        }
        Conjunction::ALL.into_iter().find(|conjunction| {
            let keyword = conjunction.keyword().as_bytes();
            let end = at + keyword.len();
            end <= bytes.len()
                && bytes[at..end].eq_ignore_ascii_case(keyword)
                && bytes.get(end).map_or(true, |b| !is_word_byte(*b))
        })
    }

    /// 由 `input[start..end]` 构造片段, 去除空白, span指向去除后的文本
    fn segment(&self, start: usize, end: usize, conjunction: Option<Conjunction>) -> Segment<'a> {
        let raw = &self.input[start..end];
        let leading = raw.len() - raw.trim_start().len();
        let text = raw.trim();
        let text_start = start + leading;
        Segment {
            text,
            conjunction,
            span: Span::new(text_start, text_start + text.len()),
        }
    }
}

/// 可以构成单词的字节。非ASCII字节也算, 所以 `ändern` 不会匹配 `AND`
fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let start = self.position;
        let bytes = self.input.as_bytes();
        let mut in_string: Option<u8> = None;
        let mut i = start;

        while i < bytes.len() {
            let b = bytes[i];
            if let Some(quote) = in_string {
                if b == quote {
                    in_string = None;
                }
                i += 1;
                continue;
            }
            if b == b'\'' || b == b'"' {
                in_string = Some(b);
                i += 1;
                continue;
            }
            if let Some(conjunction) = self.conjunction_at(i) {
                self.position = i + conjunction.keyword().len();
                return Some(self.segment(start, i, Some(conjunction)));
            }
            i += 1;
        }

        self.finished = true;
        Some(self.segment(start, bytes.len(), None))
    }
}

/// 在第一个顶层连接词处切分 `query`
///
/// 返回 `(left, conjunction, right)`; 没有更多连接词时 `conjunction` 和 `right` 为 `None`。
pub fn split_query_at_next_conjunction(query: &str) -> (&str, Option<Conjunction>, Option<&str>) {
    let mut segments = Segments::new(query);
    match segments.next() {
        Some(Segment { text, conjunction: Some(conjunction), .. }) => {
            let right = query[segments.position..].trim();
            (text, Some(conjunction), Some(right))
        }
        Some(segment) => (segment.text, None, None),
        None => (query.trim(), None, None),
    }
}

/// `query` 最右边的片段, 即用户正在输入的部分
pub fn last_query_part(query: &str) -> &str {
    Segments::new(query)
        .last()
        .map(|segment| segment.text)
        .unwrap_or("")
}
