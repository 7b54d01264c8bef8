use crate::ast::{Node, Operator};
use crate::filter::proposer::{mark_difference, matching_operator, starts_with, strip_prefix};

use super::{FilterType, TimeRangeSpecifier};

const OPERATORS: [(&str, Operator); 4] = [
    ("Is", Operator::Equals),
    ("=", Operator::Equals),
    ("!=", Operator::NotEquals),
    ("Is Not", Operator::NotEquals),
];

const HOST_STATES: [(&str, i64); 4] = [("Up", 0), ("Down", 1), ("Unreachable", 2), ("Pending", 99)];

const SERVICE_STATES: [(&str, i64); 5] = [
    ("Ok", 0),
    ("Warning", 1),
    ("Critical", 2),
    ("Unknown", 3),
    ("Pending", 99),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Host,
    Service,
}

impl StatusKind {
    fn states(self) -> &'static [(&'static str, i64)] {
        match self {
            StatusKind::Host => &HOST_STATES,
            StatusKind::Service => &SERVICE_STATES,
        }
    }

    /// 保存最近一次状态变化时间的列
    pub fn last_state_change_field(self) -> &'static str {
        match self {
            StatusKind::Host => "host_last_state_change",
            StatusKind::Service => "service_last_state_change",
        }
    }
}

/// 监控状态查询, 例如 `Is Down` 或 `!= Ok Since 1 hour`
///
/// 时间范围后缀与最近一次状态变化时间比较。
#[derive(Debug, Clone)]
pub struct StatusFilter {
    kind: StatusKind,
    time: TimeRangeSpecifier,
}

impl StatusFilter {
    pub fn for_host() -> Self {
        Self {
            kind: StatusKind::Host,
            time: TimeRangeSpecifier::new(),
        }
    }

    pub fn for_service() -> Self {
        Self {
            kind: StatusKind::Service,
            time: TimeRangeSpecifier::new(),
        }
    }

    pub fn kind(&self) -> StatusKind {
        self.kind
    }

    /// 把 `query` 解析为 `(运算符, 状态码, 时间范围文本)`
    fn operator_value<'q>(&self, query: &'q str) -> Option<(Operator, i64, &'q str)> {
        let token = matching_operator(query, OPERATORS.iter().map(|(token, _)| *token))?;
        let operator = OPERATORS
            .iter()
            .find(|(candidate, _)| *candidate == token)
            .map(|(_, operator)| *operator)?;
        let rest = strip_prefix(query, token)?;
        let (code, time_spec) = self
            .kind
            .states()
            .iter()
            .find_map(|(state, code)| strip_prefix(rest, state).map(|time_spec| (*code, time_spec)))?;
        if !time_spec.is_empty() && !self.time.is_valid_query(time_spec) {
            return None;
        }
        Some((operator, code, time_spec))
    }

    fn value_proposals(&self, query: &str) -> Vec<String> {
        let states = self.kind.states();
        if query.is_empty() {
            return states.iter().map(|(state, _)| state.to_string()).collect();
        }
        let mut proposals = Vec::new();
        for (state, _) in states {
            if let Some(time_spec) = strip_prefix(query, state) {
                proposals.extend(self.time.proposals(time_spec));
            } else if starts_with(state, query) {
                proposals.push(mark_difference(state, query));
            }
        }
        proposals
    }
}

impl FilterType for StatusFilter {
    fn operators(&self) -> Vec<&str> {
        OPERATORS.iter().map(|(token, _)| *token).collect()
    }

    fn proposals(&self, query: &str) -> Vec<String> {
        if query.is_empty() {
            return self.operators().into_iter().map(String::from).collect();
        }
        let mut proposals: Vec<String> = OPERATORS
            .iter()
            .filter(|(token, _)| starts_with(token, query) && token.len() > query.len())
            .map(|(token, _)| mark_difference(token, query))
            .collect();
        if let Some(token) = matching_operator(query, OPERATORS.iter().map(|(token, _)| *token)) {
            if let Some(rest) = strip_prefix(query, token) {
                proposals.extend(self.value_proposals(rest));
            }
        }
        proposals
    }

    fn is_valid_query(&self, query: &str) -> bool {
        self.operator_value(query).is_some()
    }

    fn create_tree_node(&self, query: &str, field: &str) -> Option<Node> {
        let (operator, code, time_spec) = self.operator_value(query)?;
        let node = Node::predicate(field, operator, code);
        if time_spec.is_empty() {
            return Some(node);
        }
        let time_node = self
            .time
            .create_tree_node(time_spec, self.kind.last_state_change_field())?;
        Some(Node::and(node, time_node))
    }
}
