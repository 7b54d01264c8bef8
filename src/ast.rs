//! Filter引擎生成的查询树

use std::fmt;

use crate::token::Conjunction;

/// 叶子条件的比较运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equals,    // =
    NotEquals, // !=
    Greater,   // >
    Less,      // <
    GreaterEq, // >=
    LessEq,    // <=
}

impl Operator {
    /// 按长度从长到短排列, 扫描时取第一个匹配即可
    pub const BY_LENGTH: [Operator; 6] = [
        Operator::NotEquals,
        Operator::GreaterEq,
        Operator::LessEq,
        Operator::Equals,
        Operator::Greater,
        Operator::Less,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Equals => "=",
            Operator::NotEquals => "!=",
            Operator::Greater => ">",
            Operator::Less => "<",
            Operator::GreaterEq => ">=",
            Operator::LessEq => "<=",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Operator> {
        Self::BY_LENGTH.into_iter().find(|op| op.symbol() == symbol)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// 后端如何解释条件的值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeContext {
    #[default]
    Plain,
    /// 值是相对或绝对时间表达式, 例如 `-1 day`
    TimeString,
}

/// 字面量值
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

/// 单个 `field <op> value` 比较, 查询树的叶子节点
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: String,
    pub operator: Operator,
    pub value: Value,
    pub context: NodeContext,
}

/// 查询树节点
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// 叶子比较
    Predicate(Predicate),
    /// 逻辑与运算 (AND)
    And(Box<Node>, Box<Node>),
    /// 逻辑或运算 (OR)
    Or(Box<Node>, Box<Node>),
}

impl Node {
    pub fn predicate(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Node {
        Node::Predicate(Predicate {
            field: field.into(),
            operator,
            value: value.into(),
            context: NodeContext::Plain,
        })
    }

    /// 值为时间表达式的条件
    pub fn time(field: impl Into<String>, operator: Operator, value: impl Into<String>) -> Node {
        Node::Predicate(Predicate {
            field: field.into(),
            operator,
            value: Value::String(value.into()),
            context: NodeContext::TimeString,
        })
    }

    pub fn and(left: Node, right: Node) -> Node {
        Node::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Node, right: Node) -> Node {
        Node::Or(Box::new(left), Box::new(right))
    }

    pub fn join(conjunction: Conjunction, left: Node, right: Node) -> Node {
        match conjunction {
            Conjunction::And => Node::and(left, right),
            Conjunction::Or => Node::or(left, right),
        }
    }

    /// 按从左到右顺序返回所有叶子条件
    pub fn predicates(&self) -> Vec<&Predicate> {
        let mut out = Vec::new();
        self.collect_predicates(&mut out);
        out
    }

    fn collect_predicates<'a>(&'a self, out: &mut Vec<&'a Predicate>) {
        match self {
            Node::Predicate(p) => out.push(p),
            Node::And(left, right) | Node::Or(left, right) => {
                left.collect_predicates(out);
                right.collect_predicates(out);
            }
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Predicate(p) => write!(f, "{} {} {}", p.field, p.operator, p.value),
            Node::And(left, right) => write!(f, "({} AND {})", left, right),
            Node::Or(left, right) => write!(f, "({} OR {})", left, right),
        }
    }
}

/// 解析后的Filter。连接词没有优先级: 每次插入都包住现有的根节点,
/// 所以 `a AND b OR c` 等价于 `(a AND b) OR c`。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tree {
    root: Option<Node>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    pub fn into_root(self) -> Option<Node> {
        self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// 用 `conjunction` 把 `node` 接到当前根节点右侧。第一个节点忽略连接词。
    pub fn insert(&mut self, node: Node, conjunction: Conjunction) {
        self.root = Some(match self.root.take() {
            None => node,
            Some(root) => Node::join(conjunction, root, node),
        });
    }

    pub fn predicates(&self) -> Vec<&Predicate> {
        self.root.as_ref().map(Node::predicates).unwrap_or_default()
    }
}

impl From<Node> for Tree {
    fn from(node: Node) -> Self {
        Tree { root: Some(node) }
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.root {
            Some(root) => write!(f, "{}", root),
            None => Ok(()),
        }
    }
}
