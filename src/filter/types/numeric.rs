use crate::ast::{Node, Operator, Value};
use crate::filter::proposer::{mark_difference, matching_operator, starts_with, strip_prefix};

use super::{unquote, FilterType};

const OPERATORS: [(&str, Operator); 8] = [
    ("Is", Operator::Equals),
    ("Is Not", Operator::NotEquals),
    ("=", Operator::Equals),
    ("!=", Operator::NotEquals),
    (">", Operator::Greater),
    ("<", Operator::Less),
    (">=", Operator::GreaterEq),
    ("<=", Operator::LessEq),
];

/// 数值比较, 例如 `> 5` 或 `Is Not 2.5`
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericFilter;

impl NumericFilter {
    pub fn new() -> Self {
        NumericFilter
    }

    fn operator_and_value(&self, query: &str) -> Option<(Operator, Value)> {
        let token = matching_operator(query, OPERATORS.iter().map(|(token, _)| *token))?;
        let operator = OPERATORS
            .iter()
            .find(|(candidate, _)| *candidate == token)
            .map(|(_, operator)| *operator)?;
        let raw = unquote(strip_prefix(query, token)?);
        let value = if let Ok(n) = raw.parse::<i64>() {
            Value::Integer(n)
        } else {
            let n = raw.parse::<f64>().ok().filter(|n| n.is_finite())?;
            Value::Float(n)
        };
        Some((operator, value))
    }
}

impl FilterType for NumericFilter {
    fn operators(&self) -> Vec<&str> {
        OPERATORS.iter().map(|(token, _)| *token).collect()
    }

    fn proposals(&self, query: &str) -> Vec<String> {
        if query.is_empty() {
            return self.operators().into_iter().map(String::from).collect();
        }
        OPERATORS
            .iter()
            .filter(|(token, _)| starts_with(token, query) && !token.eq_ignore_ascii_case(query))
            .map(|(token, _)| mark_difference(token, query))
            .collect()
    }

    fn is_valid_query(&self, query: &str) -> bool {
        self.operator_and_value(query).is_some()
    }

    fn create_tree_node(&self, query: &str, field: &str) -> Option<Node> {
        let (operator, value) = self.operator_and_value(query)?;
        Some(Node::predicate(field, operator, value))
    }
}
