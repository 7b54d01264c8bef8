use crate::ast::Node;
use crate::filter::proposer::{mark_difference, starts_with, strip_prefix};
use crate::filter::types::FilterType;

/// 把 `Name`、`Hostname` 这类查询词映射到一个列, 并把剩余查询交给它的 [`FilterType`]
///
/// 没有查询词的属性接受所有查询, 由类型自己判断。
#[derive(Debug)]
pub struct FilterAttribute {
    field: Option<String>,
    attributes: Vec<String>,
    filter_type: Box<dyn FilterType>,
}

impl FilterAttribute {
    pub fn new(filter_type: impl FilterType + 'static) -> Self {
        Self {
            field: None,
            attributes: Vec::new(),
            filter_type: Box::new(filter_type),
        }
    }

    /// 添加该属性响应的查询词。在 [`with_field`](Self::with_field) 设置字段之前, 第一个词兼作字段名
    pub fn with_attributes<S: AsRef<str>>(mut self, attributes: impl IntoIterator<Item = S>) -> Self {
        for attribute in attributes {
            let attribute = attribute.as_ref().trim().to_string();
            if self.field.is_none() {
                self.field = Some(attribute.clone());
            }
            self.attributes.push(attribute);
        }
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn field(&self) -> &str {
        self.field.as_deref().unwrap_or("")
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn filter_type(&self) -> &dyn FilterType {
        self.filter_type.as_ref()
    }

    /// `query` 开头的第一个属性词
    pub fn matching_attribute(&self, query: &str) -> Option<&str> {
        let query = query.trim();
        self.attributes
            .iter()
            .map(String::as_str)
            .find(|attribute| starts_with(query, attribute))
    }

    pub fn query_has_supported_attribute(&self, query: &str) -> bool {
        self.matching_attribute(query).is_some()
    }

    /// 去掉属性词后的查询; 需要属性词却没有时返回 `None`
    fn sub_query<'q>(&self, query: &'q str) -> Option<&'q str> {
        let query = query.trim();
        match self.matching_attribute(query) {
            Some(attribute) => strip_prefix(query, attribute),
            None if self.attributes.is_empty() => Some(query),
            None => None,
        }
    }

    pub fn proposals(&self, query: &str) -> Vec<String> {
        let query = query.trim();
        match self.sub_query(query) {
            Some(sub_query) => self.filter_type.proposals(sub_query),
            None => self.attribute_proposals(query),
        }
    }

    /// 属性词本身的补全
    pub fn attribute_proposals(&self, query: &str) -> Vec<String> {
        if query.is_empty() {
            return match self.attributes.first() {
                Some(first) => vec![first.clone()],
                None => self.filter_type.proposals(query),
            };
        }
        self.attributes
            .iter()
            .find(|attribute| starts_with(attribute, query))
            .map(|attribute| vec![mark_difference(attribute, query)])
            .unwrap_or_default()
    }

    pub fn is_valid_query(&self, query: &str) -> bool {
        self.sub_query(query)
            .is_some_and(|sub_query| self.filter_type.is_valid_query(sub_query))
    }

    pub fn convert_to_tree_node(&self, query: &str) -> Option<Node> {
        if !self.is_valid_query(query) {
            return None;
        }
        let sub_query = self.sub_query(query)?;
        self.filter_type.create_tree_node(sub_query, self.field())
    }
}
