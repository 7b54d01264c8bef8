use serde_json::{json, Map, Value};

use super::{check_target, non_negative, pipe_line, ApiCommandChain, Command, CommandError, IcingaApiCommand, Target, Targets};

/// 安排主机或服务的下一次检查
#[derive(Debug, Clone)]
pub struct ScheduleCheckCommand {
    check_time: i64,
    forced: bool,
    /// 主机目标: 检查其服务而不是主机本身
    all_services: bool,
}

impl ScheduleCheckCommand {
    const NAME: &'static str = "ScheduleCheckCommand";

    pub fn new(check_time: i64) -> Result<Self, CommandError> {
        Ok(Self {
            check_time: non_negative(Self::NAME, "check time", check_time)?,
            forced: false,
            all_services: false,
        })
    }

    /// 不管时间段以及检查是否启用都执行检查
    pub fn forced(mut self, forced: bool) -> Self {
        self.forced = forced;
        self
    }

    pub fn exclude_host(mut self, exclude: bool) -> Self {
        self.all_services = exclude;
        self
    }

    fn prefix(&self) -> &'static str {
        if self.forced {
            "SCHEDULE_FORCED"
        } else {
            "SCHEDULE"
        }
    }

    fn api_data(&self) -> Map<String, Value> {
        let mut data = Map::new();
        data.insert("next_check".into(), json!(self.check_time));
        data.insert("force_check".into(), json!(self.forced));
        data
    }
}

impl Command for ScheduleCheckCommand {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn targets(&self) -> Targets {
        Targets::OBJECTS
    }

    fn arguments(&self) -> Vec<String> {
        vec![self.check_time.to_string()]
    }

    fn host_command(&self, host: &str) -> Result<String, CommandError> {
        let suffix = if self.all_services { "HOST_SVC_CHECKS" } else { "HOST_CHECK" };
        Ok(pipe_line(&format!("{}_{}", self.prefix(), suffix), &[host], &self.arguments()))
    }

    fn service_command(&self, host: &str, service: &str) -> Result<String, CommandError> {
        Ok(pipe_line(&format!("{}_SVC_CHECK", self.prefix()), &[host, service], &self.arguments()))
    }

    fn to_api(&self, target: &Target, _app: &str) -> Result<ApiCommandChain, CommandError> {
        check_target(Self::NAME, self.targets(), target)?;
        match target {
            Target::Host { host } if self.all_services => {
                let mut data = self.api_data();
                data.insert("type".into(), json!("Service"));
                data.insert("filter".into(), json!("host.name == host_name"));
                data.insert("filter_vars".into(), json!({ "host_name": host }));
                Ok(ApiCommandChain::single(IcingaApiCommand::new(
                    "actions/reschedule-check",
                    Value::Object(data),
                )))
            }
            _ => Ok(ApiCommandChain::single(IcingaApiCommand::for_target(
                "actions/reschedule-check",
                self.api_data(),
                target,
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_checks() {
        let command = ScheduleCheckCommand::new(5000).unwrap();
        assert_eq!(command.render(&Target::host("test")).unwrap(), "SCHEDULE_HOST_CHECK;test;5000");
        assert_eq!(
            command.render(&Target::service("test", "svc1")).unwrap(),
            "SCHEDULE_SVC_CHECK;test;svc1;5000"
        );

        let forced = command.forced(true);
        assert_eq!(forced.render(&Target::host("test")).unwrap(), "SCHEDULE_FORCED_HOST_CHECK;test;5000");
        assert_eq!(
            forced.render(&Target::service("test", "svc1")).unwrap(),
            "SCHEDULE_FORCED_SVC_CHECK;test;svc1;5000"
        );

        let services = forced.exclude_host(true);
        assert_eq!(
            services.render(&Target::host("test")).unwrap(),
            "SCHEDULE_FORCED_HOST_SVC_CHECKS;test;5000"
        );
    }

    #[test]
    fn test_negative_time_is_rejected() {
        assert!(ScheduleCheckCommand::new(-1).is_err());
    }

    #[test]
    fn test_reschedule_api() {
        let command = ScheduleCheckCommand::new(42).unwrap().forced(true);
        let chain = command.to_api(&Target::service("web", "http"), "app").unwrap();
        assert_eq!(chain.first().endpoint, "actions/reschedule-check");
        assert_eq!(
            chain.first().data,
            json!({"next_check": 42, "force_check": true, "service": "web!http"})
        );

        let chain = command.exclude_host(true).to_api(&Target::host("web"), "app").unwrap();
        assert_eq!(chain.first().data["type"], "Service");
        assert_eq!(chain.first().data["filter_vars"], json!({"host_name": "web"}));
    }
}
