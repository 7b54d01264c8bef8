use crate::ast::Node;
use crate::filter::attribute::FilterAttribute;
use crate::filter::proposer::{starts_with, strip_prefix};

/// 带标签的一组属性, 例如关于 `Host` 可以查询的所有内容
#[derive(Debug)]
pub struct Domain {
    label: String,
    attributes: Vec<FilterAttribute>,
}

impl Domain {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into().trim().to_string(),
            attributes: Vec::new(),
        }
    }

    /// 按注册顺序尝试属性
    pub fn register_attribute(mut self, attribute: FilterAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn attributes(&self) -> &[FilterAttribute] {
        &self.attributes
    }

    /// `query` 是否以该Domain的标签开头
    pub fn handles_query(&self, query: &str) -> bool {
        starts_with(query.trim(), &self.label)
    }

    /// 去掉开头标签后的 `query`
    fn strip_label<'q>(&self, query: &'q str) -> &'q str {
        let query = query.trim();
        strip_prefix(query, &self.label).unwrap_or(query)
    }

    pub fn proposals(&self, query: &str) -> Vec<String> {
        let query = self.strip_label(query);
        self.attributes
            .iter()
            .flat_map(|attribute| attribute.proposals(query))
            .collect()
    }

    /// 用第一个接受 `query` 的属性把它转换为树节点
    pub fn convert_to_tree_node(&self, query: &str) -> Option<Node> {
        let query = self.strip_label(query);
        self.attributes
            .iter()
            .find(|attribute| attribute.is_valid_query(query))
            .and_then(|attribute| attribute.convert_to_tree_node(query))
    }
}
