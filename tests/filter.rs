use std::collections::HashMap;

use monitoring_dispatcher::ast::{Node, NodeContext, Operator};
use monitoring_dispatcher::filter::registry::monitoring_filter;
use monitoring_dispatcher::lexer::split_query_at_next_conjunction;
use monitoring_dispatcher::sql_compiler::SqlCompiler;
use monitoring_dispatcher::token::Conjunction;
use monitoring_dispatcher::url_filter::{parse_url, to_url};

#[test]
fn quoted_conjunction_stays_in_its_segment() {
    let (left, conjunction, right) = split_query_at_next_conjunction(r#"host name = "foo AND bar" AND state = ok"#);
    assert_eq!(left, r#"host name = "foo AND bar""#);
    assert_eq!(conjunction, Some(Conjunction::And));
    assert_eq!(right, Some("state = ok"));
}

#[test]
fn query_to_url_and_back() {
    let filter = monitoring_filter();
    let parsed = filter.create_query_tree_for_filter("Host Name Starts With web AND Service Is Critical");
    assert!(parsed.ignored_query_parts().is_empty());

    let url = to_url(parsed.tree());
    assert_eq!(url, "host_name=web%2A&service_state=2");

    let back = parse_url(&url);
    let fields: Vec<_> = back.predicates().iter().map(|p| p.field.as_str()).collect();
    assert_eq!(fields, ["host_name", "service_state"]);
}

#[test]
fn query_to_sql() {
    let filter = monitoring_filter();
    let parsed = filter.create_query_tree_for_filter("Host Name Contains db OR Host Is Down AND nonsense");
    assert_eq!(parsed.ignored_query_parts(), ["nonsense"]);

    let mut compiler = SqlCompiler::new();
    compiler.set_column_mapping(HashMap::from([
        ("host_name".to_string(), "name".to_string()),
        ("host_state".to_string(), "state".to_string()),
    ]));
    let result = compiler.compile(parsed.tree(), "hosts").unwrap();
    assert!(result.sql.starts_with(r#"SELECT * FROM "hosts" WHERE "#), "{}", result.sql);
    assert!(result.sql.contains(r#""name" LIKE '%db%'"#), "{}", result.sql);
    assert!(result.sql.contains(r#" OR "state" = 1"#), "{}", result.sql);
}

#[test]
fn status_with_time_suffix() {
    let parsed = monitoring_filter().create_query_tree_for_filter("Service Is Critical Since 1 hour");
    match parsed.tree().root() {
        Some(Node::And(state, time)) => {
            assert_eq!(**state, Node::predicate("service_state", Operator::Equals, 2));
            match &**time {
                Node::Predicate(p) => {
                    assert_eq!(p.field, "service_last_state_change");
                    assert_eq!(p.operator, Operator::GreaterEq);
                    assert_eq!(p.context, NodeContext::TimeString);
                }
                other => panic!("expected a time predicate, got {:?}", other),
            }
        }
        other => panic!("expected AND node, got {:?}", other),
    }
}

#[test]
fn filter_is_shareable_between_threads() {
    let filter = std::sync::Arc::new(monitoring_filter());
    let handles: Vec<_> = ["Host Is Down", "Service Is Ok AND gibberish"]
        .into_iter()
        .map(|query| {
            let filter = filter.clone();
            std::thread::spawn(move || filter.create_query_tree_for_filter(query).ignored_query_parts().len())
        })
        .collect();
    let ignored: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(ignored, [0, 1]);
}
