//! [`FilterAttribute`](crate::filter::FilterAttribute) 把子查询交给的值类型

mod boolean;
mod numeric;
mod status;
mod text;
mod time_range;

pub use boolean::BooleanFilter;
pub use numeric::NumericFilter;
pub use status::{StatusFilter, StatusKind};
pub use text::TextFilter;
pub use time_range::TimeRangeSpecifier;

use std::fmt;

use crate::ast::Node;

/// 解析并补全属性token之后的查询部分
///
/// 调用方须先检查 [`is_valid_query`](FilterType::is_valid_query);
/// 对会被拒绝的输入, `create_tree_node` 返回 `None`。
pub trait FilterType: fmt::Debug + Send + Sync {
    /// 按提示顺序排列的运算符token
    fn operators(&self) -> Vec<&str>;

    fn proposals(&self, query: &str) -> Vec<String>;

    fn is_valid_query(&self, query: &str) -> bool;

    fn create_tree_node(&self, query: &str, field: &str) -> Option<Node>;
}

/// 去除首尾空白, 以及开头和结尾各一个引号
pub(crate) fn unquote(value: &str) -> &str {
    let value = value.trim();
    let is_quote = |c: char| c == '\'' || c == '"';
    let value = value.strip_prefix(is_quote).unwrap_or(value);
    value.strip_suffix(is_quote).unwrap_or(value)
}
