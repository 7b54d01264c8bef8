use crate::ast::{Node, Operator};
use crate::filter::proposer::{mark_difference, matching_operator, starts_with, strip_prefix};

use super::{unquote, FilterType};

/// 运算符token及其对应的比较运算
const OPERATORS: [(&str, Operator); 9] = [
    ("Is", Operator::Equals),
    ("Is Not", Operator::NotEquals),
    ("Starts With", Operator::Equals),
    ("Ends With", Operator::Equals),
    ("Contains", Operator::Equals),
    ("=", Operator::Equals),
    ("!=", Operator::NotEquals),
    ("Like", Operator::Equals),
    ("Matches", Operator::Equals),
];

/// 文本比较, 例如 `Starts With 'web'`
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFilter;

impl TextFilter {
    pub fn new() -> Self {
        TextFilter
    }

    /// 把 `query` 拆成运算符token和规范化后的值。运算符后没有内容时值为 `None`
    fn operator_and_value(&self, query: &str) -> Option<(&'static str, Option<String>)> {
        let operator = matching_operator(query, OPERATORS.iter().map(|(token, _)| *token))?;
        let rest = strip_prefix(query, operator)?;
        if rest.is_empty() {
            return Some((operator, None));
        }
        let value = unquote(rest);
        let value = match operator.to_ascii_lowercase().as_str() {
            "starts with" => format!("{}*", value),
            "ends with" => format!("*{}", value),
            "contains" | "matches" => format!("*{}*", value),
            _ => value.to_string(),
        };
        Some((operator, Some(value)))
    }

    fn value_hint(operator: &str) -> &'static str {
        match operator.to_ascii_lowercase().as_str() {
            "starts with" => "value...",
            "ends with" => "...value",
            "contains" | "matches" | "like" => "...value...",
            _ => "value",
        }
    }
}

fn resolve(token: &str) -> Operator {
    OPERATORS
        .iter()
        .find(|(candidate, _)| *candidate == token)
        .map(|(_, operator)| *operator)
        .unwrap_or(Operator::Equals)
}

impl FilterType for TextFilter {
    fn operators(&self) -> Vec<&str> {
        OPERATORS.iter().map(|(token, _)| *token).collect()
    }

    fn proposals(&self, query: &str) -> Vec<String> {
        if query.is_empty() {
            return self.operators().into_iter().map(String::from).collect();
        }
        let mut proposals = Vec::new();
        for (operator, _) in OPERATORS {
            if operator.eq_ignore_ascii_case(query) {
                proposals.push(format!("'{}'", Self::value_hint(operator)));
            } else if starts_with(operator, query) {
                proposals.push(mark_difference(operator, query));
            }
        }
        proposals
    }

    fn is_valid_query(&self, query: &str) -> bool {
        matches!(self.operator_and_value(query), Some((_, Some(_))))
    }

    fn create_tree_node(&self, query: &str, field: &str) -> Option<Node> {
        let (operator, value) = self.operator_and_value(query)?;
        Some(Node::predicate(field, resolve(operator), value?))
    }
}
