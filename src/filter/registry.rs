//! 监控Domain: 主机和服务可以查询的内容

use crate::ast::Operator;
use crate::filter::types::{BooleanFilter, StatusFilter, TextFilter, TimeRangeSpecifier};
use crate::filter::{Domain, Filter, FilterAttribute};

/// `Until` / `After`, 总是指向将来
pub fn next_check_filter_type() -> TimeRangeSpecifier {
    TimeRangeSpecifier::new()
        .with_operators([("Until", Operator::LessEq), ("After", Operator::GreaterEq)])
        .force_future()
}

/// `Older Than` / `Newer Than`, 总是指向过去
pub fn last_check_filter_type() -> TimeRangeSpecifier {
    TimeRangeSpecifier::new()
        .with_operators([
            ("Older Than", Operator::LessEq),
            ("Is Older Than", Operator::LessEq),
            ("Newer Than", Operator::GreaterEq),
            ("Is Newer Than", Operator::GreaterEq),
        ])
        .force_past()
}

pub fn host_filter() -> Domain {
    Domain::new("Host")
        .register_attribute(
            FilterAttribute::new(TextFilter::new())
                .with_attributes(["Hostname", "Host", "Name"])
                .with_field("host_name"),
        )
        .register_attribute(FilterAttribute::new(StatusFilter::for_host()).with_field("host_state"))
        .register_attribute(FilterAttribute::new(BooleanFilter::new([
            ("host_is_flapping", "Flapping"),
            ("host_problem", "In Problem State"),
            ("host_notifications_enabled", "Sending Notifications"),
            ("host_active_checks_enabled", "Active"),
            ("host_passive_checks_enabled", "Accepting Passive Checks"),
            ("host_handled", "Handled"),
            ("host_in_downtime", "In Downtime"),
        ])))
        .register_attribute(
            FilterAttribute::new(last_check_filter_type())
                .with_attributes(["Last Check", "Check"])
                .with_field("host_last_check"),
        )
        .register_attribute(
            FilterAttribute::new(next_check_filter_type())
                .with_attributes(["Next Check"])
                .with_field("host_next_check"),
        )
}

pub fn service_filter() -> Domain {
    Domain::new("Service")
        .register_attribute(
            FilterAttribute::new(TextFilter::new())
                .with_attributes(["Servicename", "Name"])
                .with_field("service_description"),
        )
        .register_attribute(FilterAttribute::new(StatusFilter::for_service()).with_field("service_state"))
        .register_attribute(
            FilterAttribute::new(StatusFilter::for_host())
                .with_attributes(["Host"])
                .with_field("host_state"),
        )
        .register_attribute(FilterAttribute::new(BooleanFilter::new([
            ("service_is_flapping", "Flapping"),
            ("service_problem", "In Problem State"),
            ("service_notifications_enabled", "Sending Notifications"),
            ("service_active_checks_enabled", "Active"),
            ("service_passive_checks_enabled", "Accepting Passive Checks"),
            ("service_handled", "Handled"),
            ("service_in_downtime", "In Downtime"),
            ("host_in_downtime", "In Host Downtime"),
        ])))
        .register_attribute(
            FilterAttribute::new(last_check_filter_type())
                .with_attributes(["Last Check", "Check"])
                .with_field("service_last_check"),
        )
        .register_attribute(
            FilterAttribute::new(next_check_filter_type())
                .with_attributes(["Next Check"])
                .with_field("service_next_check"),
        )
        .register_attribute(
            FilterAttribute::new(TextFilter::new())
                .with_attributes(["Hostname", "Host"])
                .with_field("host_name"),
        )
}

/// 主机和服务, 默认为主机
pub fn monitoring_filter() -> Filter {
    Filter::builder()
        .domain(host_filter())
        .domain(service_filter())
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Node, NodeContext};

    fn leaf_fields(query: &str) -> Vec<String> {
        let parsed = monitoring_filter().create_query_tree_for_filter(query);
        assert!(parsed.ignored_query_parts().is_empty(), "{:?}", parsed.ignored_query_parts());
        parsed.tree().predicates().iter().map(|p| p.field.clone()).collect()
    }

    #[test]
    fn test_host_queries() {
        assert_eq!(leaf_fields("Host Name = web"), ["host_name"]);
        assert_eq!(leaf_fields("Host Hostname Starts With web"), ["host_name"]);
        assert_eq!(leaf_fields("Host Is Down"), ["host_state"]);
        assert_eq!(leaf_fields("Host Is Not Handled"), ["host_handled"]);
        assert_eq!(leaf_fields("Host Last Check Older Than 5 minutes"), ["host_last_check"]);
        assert_eq!(leaf_fields("Host Next Check Until 1 hour"), ["host_next_check"]);
    }

    #[test]
    fn test_service_queries() {
        assert_eq!(leaf_fields("Service Name Contains http"), ["service_description"]);
        assert_eq!(leaf_fields("Service Is Critical"), ["service_state"]);
        assert_eq!(leaf_fields("Service Host Is Down"), ["host_state"]);
        assert_eq!(leaf_fields("Service Host = web"), ["host_name"]);
        assert_eq!(leaf_fields("Service Is In Host Downtime"), ["host_in_downtime"]);
    }

    #[test]
    fn test_host_is_the_default_domain() {
        assert_eq!(leaf_fields("Is Up"), ["host_state"]);
    }

    #[test]
    fn test_forced_time_direction() {
        let parsed = monitoring_filter().create_query_tree_for_filter("Host Next Check After 2 hours");
        match parsed.tree().root() {
            Some(Node::Predicate(p)) => {
                assert_eq!(p.value.to_string(), "+2 hours");
                assert_eq!(p.context, NodeContext::TimeString);
                assert_eq!(p.operator, Operator::GreaterEq);
            }
            other => panic!("Expected predicate, got {:?}", other),
        }
    }

    #[test]
    fn test_combined_query() {
        let parsed = monitoring_filter()
            .create_query_tree_for_filter("Host Is Down AND Service Is Warning OR Service Is Critical");
        assert_eq!(
            parsed.tree().to_string(),
            "((host_state = 1 AND service_state = 1) OR service_state = 2)"
        );
    }

    #[test]
    fn test_proposals() {
        let filter = monitoring_filter();
        assert_eq!(filter.proposals_for_query("Ho"), vec!["{Ho}st", "{Ho}stname"]);
        assert!(filter
            .proposals_for_query("Host Is Down AND Service Is W")
            .contains(&"{W}arning".to_string()));
    }
}
