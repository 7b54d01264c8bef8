use crate::ast::{Node, Operator};
use crate::filter::proposer::{mark_difference, matching_operator, starts_with, strip_prefix};

use super::{FilterType, TimeRangeSpecifier};

/// 标志位查询, 例如 `Is Flapping` 或 `Is Not Handled Since 1 hour`
///
/// 每个标志列对应一个标签。匹配到的标签所对应的列作为条件字段,
/// 与 `1`（肯定运算符）或 `0`（否定运算符）比较。
#[derive(Debug, Clone)]
pub struct BooleanFilter {
    /// `(列, 标签)` 对
    fields: Vec<(String, String)>,
    positive: String,
    negative: String,
    /// 可选的时间范围后缀及其作用的列
    time: Option<(TimeRangeSpecifier, String)>,
}

impl BooleanFilter {
    pub fn new<K, L>(fields: impl IntoIterator<Item = (K, L)>) -> Self
    where
        K: Into<String>,
        L: Into<String>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|(column, label)| (column.into(), label.into()))
                .collect(),
            positive: "Is".to_string(),
            negative: "Is Not".to_string(),
            time: None,
        }
    }

    /// 允许标志之后跟时间范围, 与 `time_field` 比较
    pub fn with_time_field(mut self, time_field: impl Into<String>) -> Self {
        self.time = Some((TimeRangeSpecifier::new(), time_field.into()));
        self
    }

    pub fn with_operators(mut self, positive: impl Into<String>, negative: impl Into<String>) -> Self {
        self.positive = positive.into();
        self.negative = negative.into();
        self
    }

    /// 把 `query` 解析为 `(列, 1|0, 剩余文本)`
    fn field_value_for_query<'q>(&self, query: &'q str) -> Option<(&str, i64, &'q str)> {
        let operator = matching_operator(query, [self.positive.as_str(), self.negative.as_str()])?;
        let value = if operator == self.negative { 0 } else { 1 };
        let rest = strip_prefix(query, operator)?;
        self.fields.iter().find_map(|(column, label)| {
            strip_prefix(rest, label).map(|sub_query| (column.as_str(), value, sub_query))
        })
    }

    fn field_proposals(&self, query: &str) -> Vec<String> {
        let mut proposals = Vec::new();
        for (_, label) in &self.fields {
            if let Some(sub_query) = strip_prefix(query, label) {
                if let Some((time, _)) = &self.time {
                    proposals.extend(time.proposals(sub_query));
                }
            } else if starts_with(label, query) {
                proposals.push(mark_difference(label, query));
            }
        }
        proposals
    }
}

impl FilterType for BooleanFilter {
    fn operators(&self) -> Vec<&str> {
        vec![self.positive.as_str(), self.negative.as_str()]
    }

    fn proposals(&self, query: &str) -> Vec<String> {
        if query.is_empty() {
            return self.operators().into_iter().map(String::from).collect();
        }
        let mut proposals = Vec::new();
        for operator in self.operators() {
            if operator.eq_ignore_ascii_case(query) {
                proposals.extend(self.fields.iter().map(|(_, label)| label.clone()));
            } else if starts_with(operator, query) {
                proposals.push(mark_difference(operator, query));
            } else if let Some(rest) = strip_prefix(query, operator) {
                proposals.extend(self.field_proposals(rest));
            }
        }
        proposals
    }

    fn is_valid_query(&self, query: &str) -> bool {
        match self.field_value_for_query(query) {
            None => false,
            Some((_, _, "")) => true,
            Some((_, _, sub_query)) => match &self.time {
                Some((time, _)) => time.is_valid_query(sub_query),
                None => false,
            },
        }
    }

    fn create_tree_node(&self, query: &str, _field: &str) -> Option<Node> {
        if !self.is_valid_query(query) {
            return None;
        }
        let (column, value, sub_query) = self.field_value_for_query(query)?;
        let node = Node::predicate(column, Operator::Equals, value);
        match &self.time {
            Some((time, time_field)) if !sub_query.is_empty() => {
                let time_node = time.create_tree_node(sub_query, time_field)?;
                Some(Node::and(time_node, node))
            }
            _ => Some(node),
        }
    }
}
