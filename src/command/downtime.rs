use serde_json::{json, Map, Value};

use super::{check_target, non_negative, pipe_line, ApiCommandChain, Comment, Command, CommandError, IcingaApiCommand, Target, Targets};

/// 主机停机如何传递给子主机
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildPropagation {
    /// 子主机获得各自独立的停机
    Plain,
    /// 子主机的停机由父主机的停机触发
    Triggered,
}

/// 为主机、服务或整个组安排停机
#[derive(Debug, Clone)]
pub struct ScheduleDowntimeCommand {
    comment: Comment,
    start: i64,
    end: i64,
    fixed: bool,
    trigger_id: u64,
    duration: i64,
    exclude_host: bool,
    exclude_services: bool,
    children: Option<ChildPropagation>,
}

impl ScheduleDowntimeCommand {
    const NAME: &'static str = "ScheduleDowntimeCommand";

    /// 从 `start` 到 `end` 的固定停机（Unix时间戳）
    pub fn new(comment: Comment, start: i64, end: i64) -> Result<Self, CommandError> {
        let start = non_negative(Self::NAME, "start time", start)?;
        let end = non_negative(Self::NAME, "end time", end)?;
        if end < start {
            return Err(CommandError::invalid(
                Self::NAME,
                format!("end time {} is before start time {}", end, start),
            ));
        }
        Ok(Self {
            comment,
            start,
            end,
            fixed: true,
            trigger_id: 0,
            duration: 0,
            exclude_host: false,
            exclude_services: false,
            children: None,
        })
    }

    pub fn fixed(mut self, fixed: bool) -> Self {
        self.fixed = fixed;
        self
    }

    /// 灵活停机开始后的持续秒数
    pub fn duration(mut self, seconds: i64) -> Result<Self, CommandError> {
        self.duration = non_negative(Self::NAME, "duration", seconds)?;
        Ok(self)
    }

    /// 在停机 `id` 开始时开始本停机
    pub fn triggered_by(mut self, id: u64) -> Self {
        self.trigger_id = id;
        self
    }

    /// 主机目标只为其服务安排停机; 主机组为服务而不是主机安排停机
    pub fn exclude_host(mut self, exclude: bool) -> Self {
        self.exclude_host = exclude;
        self
    }

    /// 服务组为其服务所在的主机安排停机
    pub fn exclude_services(mut self, exclude: bool) -> Self {
        self.exclude_services = exclude;
        self
    }

    pub fn include_children(mut self, propagation: ChildPropagation) -> Self {
        self.children = Some(propagation);
        self
    }

    fn api_data(&self) -> Map<String, Value> {
        let mut data = Map::new();
        data.insert("author".into(), json!(self.comment.author));
        data.insert("comment".into(), json!(self.comment.content));
        data.insert("start_time".into(), json!(self.start));
        data.insert("end_time".into(), json!(self.end));
        data.insert("duration".into(), json!(self.duration));
        data.insert("fixed".into(), json!(self.fixed));
        data.insert("trigger_name".into(), json!(self.trigger_id));
        data
    }
}

impl Command for ScheduleDowntimeCommand {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn targets(&self) -> Targets {
        Targets::OBJECTS | Targets::GROUPS
    }

    fn arguments(&self) -> Vec<String> {
        let mut args = vec![
            self.start.to_string(),
            self.end.to_string(),
            super::flag(self.fixed),
            self.trigger_id.to_string(),
            self.duration.to_string(),
        ];
        args.extend(self.comment.arguments(false));
        args
    }

    fn host_command(&self, host: &str) -> Result<String, CommandError> {
        let name = match self.children {
            Some(ChildPropagation::Triggered) => "SCHEDULE_AND_PROPAGATE_TRIGGERED_HOST_DOWNTIME",
            Some(ChildPropagation::Plain) => "SCHEDULE_AND_PROPAGATE_HOST_DOWNTIME",
            None if self.exclude_host => "SCHEDULE_HOST_SVC_DOWNTIME",
            None => "SCHEDULE_HOST_DOWNTIME",
        };
        Ok(pipe_line(name, &[host], &self.arguments()))
    }

    fn service_command(&self, host: &str, service: &str) -> Result<String, CommandError> {
        Ok(pipe_line("SCHEDULE_SVC_DOWNTIME", &[host, service], &self.arguments()))
    }

    fn hostgroup_command(&self, hostgroup: &str) -> Result<String, CommandError> {
        let name = if self.exclude_host {
            "SCHEDULE_HOSTGROUP_SVC_DOWNTIME"
        } else {
            "SCHEDULE_HOSTGROUP_HOST_DOWNTIME"
        };
        Ok(pipe_line(name, &[hostgroup], &self.arguments()))
    }

    fn servicegroup_command(&self, servicegroup: &str) -> Result<String, CommandError> {
        let name = if self.exclude_services {
            "SCHEDULE_SERVICEGROUP_HOST_DOWNTIME"
        } else {
            "SCHEDULE_SERVICEGROUP_SVC_DOWNTIME"
        };
        Ok(pipe_line(name, &[servicegroup], &self.arguments()))
    }

    fn to_api(&self, target: &Target, _app: &str) -> Result<ApiCommandChain, CommandError> {
        check_target(Self::NAME, Targets::OBJECTS, target)?;
        let endpoint = "actions/schedule-downtime";
        let mut data = self.api_data();
        if let (Target::Host { .. }, Some(children)) = (target, self.children) {
            let options = match children {
                ChildPropagation::Triggered => 1,
                ChildPropagation::Plain => 2,
            };
            data.insert("child_options".into(), json!(options));
        }
        let first = IcingaApiCommand::for_target(endpoint, data, target);

        match target {
            Target::Host { host } if self.exclude_host => {
                let mut services = self.api_data();
                services.insert("type".into(), json!("Service"));
                services.insert("filter".into(), json!("host.name == host_name"));
                services.insert("filter_vars".into(), json!({ "host_name": host }));
                Ok(ApiCommandChain::builder(first)
                    .then(IcingaApiCommand::new(endpoint, Value::Object(services)))
                    .build())
            }
            _ => Ok(ApiCommandChain::single(first)),
        }
    }
}

/// 按id删除一个停机
#[derive(Debug, Clone)]
pub struct DeleteDowntimeCommand {
    id: u64,
    api_name: Option<String>,
}

impl DeleteDowntimeCommand {
    pub fn new(id: u64) -> Self {
        Self { id, api_name: None }
    }

    /// REST API中的停机名称
    pub fn with_api_name(mut self, name: impl Into<String>) -> Self {
        self.api_name = Some(name.into());
        self
    }
}

impl Command for DeleteDowntimeCommand {
    fn name(&self) -> &'static str {
        "DeleteDowntimeCommand"
    }

    fn targets(&self) -> Targets {
        Targets::OBJECTS
    }

    fn arguments(&self) -> Vec<String> {
        vec![self.id.to_string()]
    }

    fn host_command(&self, host: &str) -> Result<String, CommandError> {
        Ok(pipe_line("DEL_HOST_DOWNTIME", &[host], &self.arguments()))
    }

    fn service_command(&self, host: &str, service: &str) -> Result<String, CommandError> {
        Ok(pipe_line("DEL_SVC_DOWNTIME", &[host, service], &self.arguments()))
    }

    fn to_api(&self, target: &Target, _app: &str) -> Result<ApiCommandChain, CommandError> {
        check_target(self.name(), self.targets(), target)?;
        let name = self
            .api_name
            .as_ref()
            .ok_or_else(|| CommandError::invalid(self.name(), "the API needs the downtime name"))?;
        Ok(ApiCommandChain::single(IcingaApiCommand::new(
            "actions/remove-downtime",
            json!({ "downtime": name }),
        )))
    }
}
