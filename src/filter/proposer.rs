//! 生成补全提示的公共函数
//!
//! 这里的前缀比较都是ASCII不区分大小写。只有ASCII字母可能大小写不同,
//! 所以匹配到的前缀总是落在字符边界上, 可以安全地切掉。

/// 不区分大小写的 `haystack.starts_with(prefix)`
pub fn starts_with(haystack: &str, prefix: &str) -> bool {
    haystack.len() >= prefix.len()
        && haystack.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// 不区分大小写的 `strip_prefix`, 并去除剩余部分的空白
pub fn strip_prefix<'a>(haystack: &'a str, prefix: &str) -> Option<&'a str> {
    if starts_with(haystack, prefix) {
        Some(haystack[prefix.len()..].trim())
    } else {
        None
    }
}

/// 用 `{}` 包住 `candidate` 中用户已输入的部分
///
/// `mark_difference("host", "ho")` 得到 `{ho}st`。没有输入, 或候选项不以输入开头时原样返回。
pub fn mark_difference(candidate: &str, typed: &str) -> String {
    if typed.is_empty() || !starts_with(candidate, typed) {
        return candidate.to_string();
    }
    let (matched, rest) = candidate.split_at(typed.len());
    format!("{{{}}}{}", matched, rest)
}

/// `query` 开头的最长运算符token
pub fn matching_operator<'a, I>(query: &str, operators: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    operators
        .into_iter()
        .filter(|operator| starts_with(query, operator))
        .max_by_key(|operator| operator.len())
}

/// 去除重复的提示, 保留第一次出现的
pub fn dedup(proposals: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    proposals
        .into_iter()
        .filter(|proposal| seen.insert(proposal.clone()))
        .collect()
}
