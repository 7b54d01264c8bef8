//! SQL编译器, 使用sea-query把查询树编译为SQL

use crate::ast::{Node, NodeContext, Operator, Predicate, Tree, Value as TreeValue};
use crate::timespec;
use sea_query::{Asterisk, Expr, Iden, PostgresQueryBuilder, SelectStatement, SimpleExpr, Value};
use std::collections::HashMap;
use thiserror::Error;

/// SQL优化配置
#[derive(Debug, Clone)]
pub struct OptimizationConfig {
    /// 同一字段的OR等值条件达到此数量时转换为IN子句
    pub max_or_conditions_for_in: usize,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            max_or_conditions_for_in: 5,
        }
    }
}

/// sea-query使用的表名标识
#[derive(Debug, Clone)]
pub struct TableName(pub String);

impl Iden for TableName {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        let _ = s.write_str(&self.0);
    }
}

/// 映射后的数据库列名
#[derive(Debug, Clone)]
pub struct ColumnName(pub String);

impl Iden for ColumnName {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        let _ = s.write_str(&self.0);
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("no column mapped for filter field `{0}`")]
    UnknownField(String),
    #[error("filter is empty")]
    EmptyTree,
}

/// 编译时应用的优化
#[derive(Debug, Clone, PartialEq)]
pub enum Optimization {
    OrToIn { field: String, value_count: usize },
}

/// 编译结果, 包含SQL和应用的优化
#[derive(Debug)]
pub struct CompileResult {
    pub sql: String,
    pub optimizations: Vec<Optimization>,
}

/// 把查询树编译为 `SELECT * FROM <table> WHERE ...`
pub struct SqlCompiler {
    config: OptimizationConfig,
    /// Filter字段到列名的映射
    column_mapping: HashMap<String, String>,
    /// 严格模式: 映射中不存在的字段报错, 而不是原样使用
    strict: bool,
}

impl Default for SqlCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlCompiler {
    pub fn new() -> Self {
        Self {
            config: OptimizationConfig::default(),
            column_mapping: HashMap::new(),
            strict: false,
        }
    }

    pub fn with_config(config: OptimizationConfig) -> Self {
        Self {
            config,
            ..Self::new()
        }
    }

    /// 设置字段到列名的映射
    pub fn set_column_mapping(&mut self, mapping: HashMap<String, String>) {
        self.column_mapping = mapping;
    }

    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    /// 获取字段对应的实际列名
    fn get_column_name(&self, field: &str) -> Result<ColumnName, CompileError> {
        match self.column_mapping.get(field) {
            Some(column) => Ok(ColumnName(column.clone())),
            None if self.strict => Err(CompileError::UnknownField(field.to_string())),
            None => Ok(ColumnName(field.to_string())),
        }
    }

    /// 把查询树编译为优化后的SQL
    pub fn compile(&self, tree: &Tree, table: &str) -> Result<CompileResult, CompileError> {
        let root = tree.root().ok_or(CompileError::EmptyTree)?;
        let mut optimizations = Vec::new();

        let mut select = SelectStatement::new();
        select.from(TableName(table.to_string()));
        select.column(Asterisk);

        let condition = self.compile_node(root, &mut optimizations)?;
        select.and_where(condition);

        let sql = select.to_string(PostgresQueryBuilder);

        Ok(CompileResult { sql, optimizations })
    }

    fn compile_node(&self, node: &Node, optimizations: &mut Vec<Optimization>) -> Result<SimpleExpr, CompileError> {
        let expr = match node {
            Node::Predicate(predicate) => self.compile_predicate(predicate)?,
            Node::And(left, right) => {
                let left_expr = self.compile_node(left, optimizations)?;
                let right_expr = self.compile_node(right, optimizations)?;
                left_expr.and(right_expr)
            }
            Node::Or(left, right) => {
                // 同一字段的等值OR链转换为IN
                if let Some((in_expr, opt)) = self.try_optimize_or_to_in(node)? {
                    optimizations.push(opt);
                    in_expr
                } else {
                    let left_expr = self.compile_node(left, optimizations)?;
                    let right_expr = self.compile_node(right, optimizations)?;
                    left_expr.or(right_expr)
                }
            }
        };
        Ok(expr)
    }

    /// 尝试把同一字段的OR等值链优化为IN子句
    fn try_optimize_or_to_in(&self, node: &Node) -> Result<Option<(SimpleExpr, Optimization)>, CompileError> {
        let mut predicates = Vec::new();
        if !collect_equalities(node, &mut predicates) {
            return Ok(None);
        }
        let field = match predicates.first() {
            Some(first) => first.field.as_str(),
            None => return Ok(None),
        };
        if predicates.len() < self.config.max_or_conditions_for_in
            || predicates.iter().any(|p| p.field != field)
        {
            return Ok(None);
        }

        let in_values: Vec<Value> = predicates.iter().map(|p| self.literal_to_value(p)).collect();
        let in_expr = Expr::col(self.get_column_name(field)?).is_in(in_values);
        let optimization = Optimization::OrToIn {
            field: field.to_string(),
            value_count: predicates.len(),
        };
        Ok(Some((in_expr, optimization)))
    }

    /// 编译单个比较。含 `*` 的文本值转换为LIKE模式
    fn compile_predicate(&self, predicate: &Predicate) -> Result<SimpleExpr, CompileError> {
        let col = Expr::col(self.get_column_name(&predicate.field)?);

        if let (NodeContext::Plain, TreeValue::String(s)) = (predicate.context, &predicate.value) {
            if s.contains('*') {
                let pattern = like_pattern(s);
                return Ok(match predicate.operator {
                    Operator::NotEquals => col.not_like(pattern),
                    _ => col.like(pattern),
                });
            }
        }

        let val = self.literal_to_value(predicate);
        let expr = match predicate.operator {
            Operator::Equals => col.eq(val),
            Operator::NotEquals => col.ne(val),
            Operator::Greater => col.gt(val),
            Operator::Less => col.lt(val),
            Operator::GreaterEq => col.gte(val),
            Operator::LessEq => col.lte(val),
        };
        Ok(expr)
    }

    /// 把条件值转换为sea-query的Value, 时间表达式解析为时间戳
    fn literal_to_value(&self, predicate: &Predicate) -> Value {
        match (&predicate.value, predicate.context) {
            (TreeValue::String(s), NodeContext::TimeString) => match timespec::resolve_now(s) {
                Some(at) => Value::String(Some(Box::new(at.format("%Y-%m-%d %H:%M:%S").to_string()))),
                None => Value::String(Some(Box::new(s.clone()))),
            },
            (TreeValue::String(s), NodeContext::Plain) => Value::String(Some(Box::new(s.clone()))),
            (TreeValue::Integer(n), _) => Value::BigInt(Some(*n)),
            (TreeValue::Float(n), _) => Value::Double(Some(*n)),
        }
    }
}

/// 收集只由普通等值条件组成的OR链
fn collect_equalities<'a>(node: &'a Node, out: &mut Vec<&'a Predicate>) -> bool {
    match node {
        Node::Predicate(p) if p.operator == Operator::Equals && p.context == NodeContext::Plain => {
            if matches!(&p.value, TreeValue::String(s) if s.contains('*')) {
                return false;
            }
            out.push(p);
            true
        }
        Node::Or(left, right) => collect_equalities(left, out) && collect_equalities(right, out),
        _ => false,
    }
}

/// 通配符转LIKE: 只有 `*` 是通配符, LIKE的 `%`、`_` 和转义字符都按字面匹配
fn like_pattern(glob: &str) -> String {
    glob.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
        .replace('*', "%")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::registry::monitoring_filter;
    use crate::token::Conjunction;

    fn create_test_compiler() -> SqlCompiler {
        let mut compiler = SqlCompiler::new();
        let mut mapping = HashMap::new();
        mapping.insert("host_name".to_string(), "name".to_string());
        mapping.insert("host_state".to_string(), "state".to_string());
        compiler.set_column_mapping(mapping);
        compiler
    }

    #[test]
    fn test_simple_filter_compilation() {
        let compiler = create_test_compiler();
        let tree = Tree::from(Node::predicate("host_state", Operator::NotEquals, 0));

        let result = compiler.compile(&tree, "hosts").unwrap();
        assert_eq!(result.sql, r#"SELECT * FROM "hosts" WHERE "state" <> 0"#);
        assert!(result.optimizations.is_empty());
    }

    #[test]
    fn test_glob_becomes_like() {
        let compiler = create_test_compiler();
        let parsed = monitoring_filter().create_query_tree_for_filter("Host Name Starts With web");

        let result = compiler.compile(parsed.tree(), "hosts").unwrap();
        assert!(result.sql.contains(r#""name" LIKE 'web%'"#), "{}", result.sql);
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("web*"), "web%");
        assert_eq!(like_pattern("web_1*"), "web\\_1%");
        assert_eq!(like_pattern("*100%*"), "%100\\%%");
        assert_eq!(like_pattern(r"a\b*"), r"a\\b%");
    }

    #[test]
    fn test_or_to_in_optimization() {
        let mut config = OptimizationConfig::default();
        config.max_or_conditions_for_in = 2;
        let compiler = SqlCompiler::with_config(config);

        let mut tree = Tree::new();
        for state in ["Open", "Pending", "Review"] {
            tree.insert(Node::predicate("status", Operator::Equals, state), Conjunction::Or);
        }

        let result = compiler.compile(&tree, "tickets").unwrap();

        assert_eq!(result.optimizations.len(), 1);
        match &result.optimizations[0] {
            Optimization::OrToIn { field, value_count } => {
                assert_eq!(field, "status");
                assert_eq!(*value_count, 3);
            }
        }
        assert!(result.sql.contains("IN ('Open', 'Pending', 'Review')"), "{}", result.sql);
    }

    #[test]
    fn test_mixed_fields_are_not_collapsed() {
        let mut config = OptimizationConfig::default();
        config.max_or_conditions_for_in = 2;
        let compiler = SqlCompiler::with_config(config);

        let tree = Tree::from(Node::or(
            Node::predicate("a", Operator::Equals, 1),
            Node::predicate("b", Operator::Equals, 2),
        ));
        let result = compiler.compile(&tree, "t").unwrap();
        assert!(result.optimizations.is_empty());
        assert!(result.sql.contains(" OR "));
    }

    #[test]
    fn test_time_strings_are_resolved() {
        let compiler = create_test_compiler();
        let tree = Tree::from(Node::time("last_check", Operator::GreaterEq, "-1 day"));

        let result = compiler.compile(&tree, "hosts").unwrap();
        assert!(result.sql.contains(r#""last_check" >= '"#));
        assert!(!result.sql.contains("-1 day"));
    }

    #[test]
    fn test_errors() {
        let compiler = create_test_compiler();
        assert_eq!(compiler.compile(&Tree::new(), "hosts").unwrap_err(), CompileError::EmptyTree);

        let mut strict = create_test_compiler();
        strict.set_strict(true);
        let tree = Tree::from(Node::predicate("service_state", Operator::Equals, 2));
        assert_eq!(
            strict.compile(&tree, "hosts").unwrap_err(),
            CompileError::UnknownField("service_state".to_string())
        );
    }
}
