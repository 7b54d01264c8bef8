//! 查询树的URL查询字符串形式: `host_name=web%2A&host_state!=0|host_state=2`
//!
//! 叶子为 `field<op>value`, 两侧都做表单编码; `&` 表示AND, `|` 表示OR。
//! 编码不包含分组, 因此只有左结合的树才能原样往返。

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::ast::{Node, Operator, Tree, Value};
use crate::token::Conjunction;

/// 表单编码中不转义的字符
const FORM: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

fn encode(text: &str) -> String {
    utf8_percent_encode(text, FORM).to_string().replace("%20", "+")
}

fn decode(text: &str) -> String {
    percent_decode_str(&text.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Predicate(p) => {
            out.push_str(&encode(&p.field));
            out.push_str(p.operator.symbol());
            out.push_str(&encode(&p.value.to_string()));
        }
        Node::And(left, right) => {
            write_node(left, out);
            out.push('&');
            write_node(right, out);
        }
        Node::Or(left, right) => {
            write_node(left, out);
            out.push('|');
            write_node(right, out);
        }
    }
}

pub fn to_url(tree: &Tree) -> String {
    let mut out = String::new();
    if let Some(root) = tree.root() {
        write_node(root, &mut out);
    }
    out
}

/// `term` 中第一个比较符号的位置和运算符
fn find_operator(term: &str) -> Option<(usize, Operator)> {
    term.char_indices().find_map(|(i, _)| {
        Operator::BY_LENGTH
            .into_iter()
            .find(|op| term[i..].starts_with(op.symbol()))
            .map(|op| (i, op))
    })
}

/// 按 `&` / `|` 切分, 每一项带上其后的分隔符
fn terms(query: &str) -> Vec<(&str, Option<Conjunction>)> {
    let mut out = Vec::new();
    let mut start = 0;
    for (i, c) in query.char_indices() {
        let conjunction = match c {
            '&' => Conjunction::And,
            '|' => Conjunction::Or,
            _ => continue,
        };
        out.push((&query[start..i], Some(conjunction)));
        start = i + 1;
    }
    out.push((&query[start..], None));
    out
}

/// 把查询字符串解析回查询树
///
/// 没有值的项会被丢弃。紧跟在叶子后的裸值沿用该叶子的字段和运算符,
/// 所以 `state=1|2` 等价于 `state=1|state=2`。
pub fn parse_url(query: &str) -> Tree {
    let mut tree = Tree::new();
    let mut pending: Option<Conjunction> = None;
    let mut previous: Option<(String, Operator)> = None;

    for (term, conjunction) in terms(query) {
        let leaf = match find_operator(term) {
            Some((at, operator)) => {
                let field = decode(&term[..at]);
                let value = decode(&term[at + operator.symbol().len()..]);
                (!field.is_empty() && !value.is_empty()).then_some((field, operator, value))
            }
            None if !term.is_empty() => previous
                .take()
                .map(|(field, operator)| (field, operator, decode(term))),
            None => None,
        };

        match leaf {
            Some((field, operator, value)) => {
                tree.insert(
                    Node::predicate(field.clone(), operator, Value::String(value)),
                    pending.unwrap_or(Conjunction::And),
                );
                pending = conjunction;
                previous = Some((field, operator));
            }
            None => previous = None,
        }
    }
    tree
}
