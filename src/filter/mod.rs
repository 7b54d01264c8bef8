//! 自由文本Filter引擎: 把 `host name = "web*" AND service state != ok` 转换为查询 [`Tree`],
//! 并为未完成的输入提供补全提示。
//!
//! [`Filter`] 持有有序的 [`Domain`] 列表。两个顶层连接词之间的每个片段先交给
//! 标签匹配的第一个Domain（或默认Domain）, 再交给该Domain中第一个接受它的属性。
//! 没有被接受的片段不进入查询树, 通过 [`ParsedFilter::ignored_query_parts`] 返回。

pub mod attribute;
pub mod domain;
pub mod proposer;
pub mod registry;
pub mod types;

pub use attribute::FilterAttribute;
pub use domain::Domain;

use tracing::debug;

use crate::ast::Tree;
use crate::lexer::{last_query_part, Segments};
use crate::token::Conjunction;
use proposer::{dedup, mark_difference, starts_with};

/// 一次Filter查询的解析结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFilter {
    tree: Tree,
    ignored_query_parts: Vec<String>,
}

impl ParsedFilter {
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn into_tree(self) -> Tree {
        self.tree
    }

    /// 无法解析的片段, 按输入顺序
    pub fn ignored_query_parts(&self) -> &[String] {
        &self.ignored_query_parts
    }
}

/// 不可变的Filter定义, 可以在线程间共享
#[derive(Debug)]
pub struct Filter {
    domains: Vec<Domain>,
    default_domain: Option<usize>,
}

#[derive(Debug, Default)]
pub struct FilterBuilder {
    domains: Vec<Domain>,
    default_domain: Option<usize>,
}

impl FilterBuilder {
    pub fn domain(mut self, domain: Domain) -> Self {
        self.domains.push(domain);
        self
    }

    /// 添加 `domain`, 没有标签匹配时使用它
    pub fn default_domain(mut self, domain: Domain) -> Self {
        self.default_domain = Some(self.domains.len());
        self.domains.push(domain);
        self
    }

    pub fn build(self) -> Filter {
        Filter {
            domains: self.domains,
            default_domain: self.default_domain,
        }
    }
}

impl Filter {
    pub fn builder() -> FilterBuilder {
        FilterBuilder::default()
    }

    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }

    /// 显式指定的默认Domain, 否则为第一个添加的
    pub fn default_domain(&self) -> Option<&Domain> {
        match self.default_domain {
            Some(index) => self.domains.get(index),
            None => self.domains.first(),
        }
    }

    pub fn domains_for_query(&self, query: &str) -> Vec<&Domain> {
        self.domains
            .iter()
            .filter(|domain| domain.handles_query(query))
            .collect()
    }

    /// 第一个处理 `query` 的Domain, 找不到时使用默认Domain
    pub fn first_domain_for_query(&self, query: &str) -> Option<&Domain> {
        self.domains
            .iter()
            .find(|domain| domain.handles_query(query))
            .or_else(|| self.default_domain())
    }

    /// `query` 最后一个未完成片段的补全提示
    pub fn proposals_for_query(&self, query: &str) -> Vec<String> {
        let query = last_query_part(query);
        let mut proposals: Vec<String> = self
            .domains_for_query(query)
            .into_iter()
            .flat_map(|domain| domain.proposals(query))
            .collect();

        if proposals.is_empty() {
            if let Some(default_domain) = self.default_domain() {
                proposals.extend(
                    self.domains
                        .iter()
                        .filter(|domain| query.is_empty() || starts_with(domain.label(), query))
                        .map(|domain| mark_difference(domain.label(), query)),
                );
                proposals.extend(default_domain.proposals(query));
            }
        }
        dedup(proposals)
    }

    /// 尽力把 `query` 解析为查询树
    pub fn create_query_tree_for_filter(&self, query: &str) -> ParsedFilter {
        let mut parsed = ParsedFilter::default();
        // 最后一个被接受片段之后的连接词
        let mut pending: Option<Conjunction> = None;

        for segment in Segments::new(query) {
            if segment.text.is_empty() {
                continue;
            }
            let node = self
                .first_domain_for_query(segment.text)
                .and_then(|domain| domain.convert_to_tree_node(segment.text));
            match node {
                Some(node) => {
                    parsed.tree.insert(node, pending.unwrap_or(Conjunction::And));
                    pending = segment.conjunction;
                }
                None => {
                    debug!(segment = segment.text, "ignoring unparseable filter segment");
                    parsed.ignored_query_parts.push(segment.text.to_string());
                }
            }
        }
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Node, Operator};
    use crate::filter::types::{StatusFilter, TextFilter};

    fn host() -> Domain {
        Domain::new("host")
            .register_attribute(
                FilterAttribute::new(TextFilter::new())
                    .with_attributes(["name"])
                    .with_field("host_name"),
            )
            .register_attribute(FilterAttribute::new(StatusFilter::for_host()).with_field("host_state"))
    }

    fn service() -> Domain {
        Domain::new("service")
            .register_attribute(
                FilterAttribute::new(TextFilter::new())
                    .with_attributes(["name"])
                    .with_field("service_description"),
            )
            .register_attribute(
                FilterAttribute::new(StatusFilter::for_service())
                    .with_attributes(["state"])
                    .with_field("service_state"),
            )
    }

    fn filter() -> Filter {
        Filter::builder().domain(host()).domain(service()).build()
    }

    #[test]
    fn test_first_added_domain_is_default() {
        let filter = filter();
        assert_eq!(filter.first_domain_for_query("bogus").map(Domain::label), Some("host"));
        assert_eq!(
            filter.first_domain_for_query("service name = x").map(Domain::label),
            Some("service")
        );
    }

    #[test]
    fn test_explicit_default_domain() {
        let filter = Filter::builder().domain(host()).default_domain(service()).build();
        assert_eq!(filter.first_domain_for_query("bogus").map(Domain::label), Some("service"));
    }

    #[test]
    fn test_tree_for_filter() {
        let parsed = filter()
            .create_query_tree_for_filter(r#"host name = "web*" AND service state != ok"#);
        assert!(parsed.ignored_query_parts().is_empty());
        assert_eq!(
            parsed.tree().root(),
            Some(&Node::and(
                Node::predicate("host_name", Operator::Equals, "web*"),
                Node::predicate("service_state", Operator::NotEquals, 0),
            ))
        );
    }

    #[test]
    fn test_ignored_parts_are_per_call() {
        let filter = filter();
        let first = filter.create_query_tree_for_filter("host name = a AND gibberish");
        assert_eq!(first.ignored_query_parts(), ["gibberish"]);

        let second = filter.create_query_tree_for_filter("host name = a");
        assert!(second.ignored_query_parts().is_empty());
    }

    #[test]
    fn test_ignored_segment_keeps_previous_conjunction() {
        let parsed = filter().create_query_tree_for_filter("host name = a OR nonsense AND host is down");
        assert_eq!(parsed.ignored_query_parts(), ["nonsense"]);
        assert_eq!(parsed.tree().to_string(), "(host_name = a OR host_state = 1)");
    }

    #[test]
    fn test_empty_input() {
        let parsed = filter().create_query_tree_for_filter("");
        assert!(parsed.tree().is_empty());
        assert!(parsed.ignored_query_parts().is_empty());
    }

    #[test]
    fn test_no_domains_ignores_everything() {
        let parsed = Filter::builder().build().create_query_tree_for_filter("host name = a");
        assert!(parsed.tree().is_empty());
        assert_eq!(parsed.ignored_query_parts(), ["host name = a"]);
    }

    #[test]
    fn test_proposals_for_domain_label() {
        let filter = filter();
        assert_eq!(filter.proposals_for_query("host name = a AND service"), filter.domains()[1].proposals(""));
    }

    #[test]
    fn test_proposals_fall_back_to_labels_and_default() {
        let filter = filter();
        let proposals = filter.proposals_for_query("ser");
        assert_eq!(proposals, vec!["{ser}vice"]);

        let proposals = filter.proposals_for_query("");
        assert_eq!(&proposals[..3], ["host", "service", "name"]);
    }
}
