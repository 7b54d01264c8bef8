use crate::ast::{Node, Operator};
use crate::filter::proposer::{mark_difference, matching_operator, starts_with, strip_prefix};
use crate::timespec;

use super::FilterType;

const TIME_EXAMPLES: [&str; 7] = [
    "\"5 minutes\"",
    "\"30 minutes\"",
    "\"1 hour\"",
    "\"6 hours\"",
    "\"1 day\"",
    "\"yesterday\"",
    "\"last Monday\"",
];

/// 时间比较, 例如 `Since "1 hour"` 或 `Older Than 2 days`
///
/// 以数字开头的值是相对时间: 加上强制指定的符号, 或由运算符决定的符号
/// (`>=` 为 `-`, 其余为 `+`)。
#[derive(Debug, Clone)]
pub struct TimeRangeSpecifier {
    operators: Vec<(String, Operator)>,
    forced_prefix: Option<char>,
}

impl Default for TimeRangeSpecifier {
    fn default() -> Self {
        Self {
            operators: vec![
                ("Since".to_string(), Operator::GreaterEq),
                ("Before".to_string(), Operator::LessEq),
            ],
            forced_prefix: None,
        }
    }
}

impl TimeRangeSpecifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// 替换运算符token
    pub fn with_operators<S: Into<String>>(mut self, operators: impl IntoIterator<Item = (S, Operator)>) -> Self {
        self.operators = operators
            .into_iter()
            .map(|(token, operator)| (token.into(), operator))
            .collect();
        self
    }

    /// 相对时间总是指向过去
    pub fn force_past(mut self) -> Self {
        self.forced_prefix = Some('-');
        self
    }

    /// 相对时间总是指向将来
    pub fn force_future(mut self) -> Self {
        self.forced_prefix = Some('+');
        self
    }

    pub fn time_examples() -> &'static [&'static str] {
        &TIME_EXAMPLES
    }

    fn operator_and_time_string(&self, query: &str) -> Option<(Operator, String)> {
        let token = matching_operator(query, self.operators.iter().map(|(token, _)| token.as_str()))?;
        let operator = self
            .operators
            .iter()
            .find(|(candidate, _)| candidate == token)
            .map(|(_, operator)| *operator)?;
        let value = strip_prefix(query, token)?.trim_matches(|c| c == '\'' || c == '"');
        if value.is_empty() {
            return None;
        }

        let value = if value.starts_with(|c: char| c.is_ascii_digit()) {
            let prefix = self.forced_prefix.unwrap_or(match operator {
                Operator::GreaterEq => '-',
                _ => '+',
            });
            format!("{}{}", prefix, value)
        } else {
            value.to_string()
        };

        if !timespec::is_valid(&value) {
            return None;
        }
        Some((operator, value))
    }
}

impl FilterType for TimeRangeSpecifier {
    fn operators(&self) -> Vec<&str> {
        self.operators.iter().map(|(token, _)| token.as_str()).collect()
    }

    fn proposals(&self, query: &str) -> Vec<String> {
        if query.is_empty() {
            return self.operators().into_iter().map(String::from).collect();
        }
        let mut proposals = Vec::new();
        for (operator, _) in &self.operators {
            if let Some(rest) = strip_prefix(query, operator) {
                if rest.is_empty() {
                    proposals.extend(TIME_EXAMPLES.iter().map(|example| example.to_string()));
                }
            } else if starts_with(operator, query) {
                proposals.push(mark_difference(operator, query));
            }
        }
        proposals
    }

    fn is_valid_query(&self, query: &str) -> bool {
        self.operator_and_time_string(query).is_some()
    }

    fn create_tree_node(&self, query: &str, field: &str) -> Option<Node> {
        let (operator, value) = self.operator_and_time_string(query)?;
        Some(Node::time(field, operator, value))
    }
}
