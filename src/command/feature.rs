//! 对象级和实例级功能开关

use chrono::Utc;
use serde_json::{json, Map};

use super::{check_target, non_negative, pipe_line, ApiCommandChain, Command, CommandError, IcingaApiCommand, Target, Targets};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectFeature {
    ActiveChecks,
    PassiveChecks,
    Obsessing,
    Notifications,
    EventHandler,
    FlapDetection,
    FreshnessChecks,
}

impl ObjectFeature {
    fn api_attribute(self) -> Option<&'static str> {
        match self {
            ObjectFeature::ActiveChecks => Some("enable_active_checks"),
            ObjectFeature::PassiveChecks => Some("enable_passive_checks"),
            ObjectFeature::Notifications => Some("enable_notifications"),
            ObjectFeature::EventHandler => Some("enable_event_handler"),
            ObjectFeature::FlapDetection => Some("enable_flapping"),
            ObjectFeature::Obsessing | ObjectFeature::FreshnessChecks => None,
        }
    }
}

/// 组开关作用于组内哪类成员
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupMembers {
    Hosts,
    Services,
}

/// 启用或禁用主机、服务或组成员的某项功能
///
/// 组目标只支持主动检查和通知。
#[derive(Debug, Clone)]
pub struct ToggleObjectFeatureCommand {
    feature: ObjectFeature,
    enabled: bool,
    members: Option<GroupMembers>,
}

impl ToggleObjectFeatureCommand {
    pub fn new(feature: ObjectFeature, enabled: bool) -> Self {
        Self {
            feature,
            enabled,
            members: None,
        }
    }

    /// 覆盖组的默认成员: 主机组默认为主机, 服务组默认为服务
    pub fn group_members(mut self, members: GroupMembers) -> Self {
        self.members = Some(members);
        self
    }

    fn enable(&self) -> &'static str {
        if self.enabled {
            "ENABLE"
        } else {
            "DISABLE"
        }
    }

    fn object_command(&self, kind: &str) -> String {
        let enable = self.enable();
        match self.feature {
            ObjectFeature::ActiveChecks => format!("{}_{}_CHECK", enable, kind),
            ObjectFeature::PassiveChecks => format!("{}_PASSIVE_{}_CHECKS", enable, kind),
            ObjectFeature::Obsessing => {
                let start = if self.enabled { "START" } else { "STOP" };
                format!("{}_OBSESSING_OVER_{}", start, kind)
            }
            ObjectFeature::Notifications => format!("{}_{}_NOTIFICATIONS", enable, kind),
            ObjectFeature::EventHandler => format!("{}_{}_EVENT_HANDLER", enable, kind),
            ObjectFeature::FlapDetection => format!("{}_{}_FLAP_DETECTION", enable, kind),
            ObjectFeature::FreshnessChecks => format!("{}_{}_FRESHNESS_CHECKS", enable, kind),
        }
    }

    fn group_command(&self, group_kind: &str, natural: GroupMembers) -> Result<String, CommandError> {
        let what = match self.feature {
            ObjectFeature::ActiveChecks => "CHECKS",
            ObjectFeature::Notifications => "NOTIFICATIONS",
            _ => return Err(CommandError::not_implemented(self.name(), "group")),
        };
        let members = match self.members.unwrap_or(natural) {
            GroupMembers::Hosts => "HOST",
            GroupMembers::Services => "SVC",
        };
        Ok(format!("{}_{}_{}_{}", self.enable(), group_kind, members, what))
    }
}

impl Command for ToggleObjectFeatureCommand {
    fn name(&self) -> &'static str {
        "ToggleObjectFeatureCommand"
    }

    fn targets(&self) -> Targets {
        match self.feature {
            ObjectFeature::ActiveChecks | ObjectFeature::Notifications => Targets::OBJECTS | Targets::GROUPS,
            _ => Targets::OBJECTS,
        }
    }

    fn arguments(&self) -> Vec<String> {
        Vec::new()
    }

    fn host_command(&self, host: &str) -> Result<String, CommandError> {
        Ok(pipe_line(&self.object_command("HOST"), &[host], &[]))
    }

    fn service_command(&self, host: &str, service: &str) -> Result<String, CommandError> {
        Ok(pipe_line(&self.object_command("SVC"), &[host, service], &[]))
    }

    fn hostgroup_command(&self, hostgroup: &str) -> Result<String, CommandError> {
        Ok(pipe_line(&self.group_command("HOSTGROUP", GroupMembers::Hosts)?, &[hostgroup], &[]))
    }

    fn servicegroup_command(&self, servicegroup: &str) -> Result<String, CommandError> {
        Ok(pipe_line(&self.group_command("SERVICEGROUP", GroupMembers::Services)?, &[servicegroup], &[]))
    }

    fn to_api(&self, target: &Target, _app: &str) -> Result<ApiCommandChain, CommandError> {
        check_target(self.name(), Targets::OBJECTS, target)?;
        let attribute = self
            .feature
            .api_attribute()
            .ok_or_else(|| CommandError::invalid(self.name(), format!("{:?} has no API attribute", self.feature)))?;
        let endpoint = match target {
            Target::Host { .. } => "objects/hosts",
            _ => "objects/services",
        };
        let mut data = Map::new();
        data.insert("attrs".into(), json!({ attribute: self.enabled }));
        Ok(ApiCommandChain::single(IcingaApiCommand::for_target(endpoint, data, target)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceFeature {
    ActiveHostChecks,
    ActiveServiceChecks,
    HostObsessing,
    ServiceObsessing,
    PassiveHostChecks,
    PassiveServiceChecks,
    EventHandlers,
    FlapDetection,
    Notifications,
    PerformanceData,
}

/// 启用或禁用整个监控实例的某项功能
#[derive(Debug, Clone)]
pub struct ToggleInstanceFeatureCommand {
    feature: InstanceFeature,
    enabled: bool,
}

impl ToggleInstanceFeatureCommand {
    pub fn new(feature: InstanceFeature, enabled: bool) -> Self {
        Self { feature, enabled }
    }

    fn command_name(&self) -> String {
        let start = if self.enabled { "START" } else { "STOP" };
        let enable = if self.enabled { "ENABLE" } else { "DISABLE" };
        match self.feature {
            InstanceFeature::ActiveHostChecks => format!("{}_EXECUTING_HOST_CHECKS", start),
            InstanceFeature::ActiveServiceChecks => format!("{}_EXECUTING_SVC_CHECKS", start),
            InstanceFeature::HostObsessing => format!("{}_OBSESSING_OVER_HOST_CHECKS", start),
            InstanceFeature::ServiceObsessing => format!("{}_OBSESSING_OVER_SVC_CHECKS", start),
            InstanceFeature::PassiveHostChecks => format!("{}_ACCEPTING_PASSIVE_HOST_CHECKS", start),
            InstanceFeature::PassiveServiceChecks => format!("{}_ACCEPTING_PASSIVE_SVC_CHECKS", start),
            InstanceFeature::EventHandlers => format!("{}_EVENT_HANDLERS", enable),
            InstanceFeature::FlapDetection => format!("{}_FLAP_DETECTION", enable),
            InstanceFeature::Notifications => format!("{}_NOTIFICATIONS", enable),
            InstanceFeature::PerformanceData => format!("{}_PERFORMANCE_DATA", enable),
        }
    }

    fn api_attribute(&self) -> Option<&'static str> {
        match self.feature {
            InstanceFeature::ActiveHostChecks => Some("enable_host_checks"),
            InstanceFeature::ActiveServiceChecks => Some("enable_service_checks"),
            InstanceFeature::EventHandlers => Some("enable_event_handlers"),
            InstanceFeature::FlapDetection => Some("enable_flapping"),
            InstanceFeature::Notifications => Some("enable_notifications"),
            InstanceFeature::PerformanceData => Some("enable_perfdata"),
            _ => None,
        }
    }
}

impl Command for ToggleInstanceFeatureCommand {
    fn name(&self) -> &'static str {
        "ToggleInstanceFeatureCommand"
    }

    fn targets(&self) -> Targets {
        Targets::GLOBAL
    }

    fn arguments(&self) -> Vec<String> {
        Vec::new()
    }

    fn global_command(&self, _instance: Option<&str>) -> Result<String, CommandError> {
        Ok(self.command_name())
    }

    fn to_api(&self, target: &Target, app: &str) -> Result<ApiCommandChain, CommandError> {
        check_target(self.name(), self.targets(), target)?;
        let attribute = self
            .api_attribute()
            .ok_or_else(|| CommandError::invalid(self.name(), format!("{:?} has no API attribute", self.feature)))?;
        Ok(ApiCommandChain::single(IcingaApiCommand::new(
            format!("objects/icingaapplications/{}", app),
            json!({ "attrs": { attribute: self.enabled } }),
        )))
    }
}

/// 在 `expire` 之前禁用整个实例的通知
#[derive(Debug, Clone)]
pub struct DisableNotificationsExpireCommand {
    issued: i64,
    expire: i64,
}

impl DisableNotificationsExpireCommand {
    const NAME: &'static str = "DisableNotificationsExpireCommand";

    pub fn new(expire: i64) -> Result<Self, CommandError> {
        Self::issued_at(Utc::now().timestamp(), expire)
    }

    pub fn issued_at(issued: i64, expire: i64) -> Result<Self, CommandError> {
        Ok(Self {
            issued: non_negative(Self::NAME, "issue time", issued)?,
            expire: non_negative(Self::NAME, "expire time", expire)?,
        })
    }
}

impl Command for DisableNotificationsExpireCommand {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn targets(&self) -> Targets {
        Targets::GLOBAL
    }

    fn arguments(&self) -> Vec<String> {
        vec![self.issued.to_string(), self.expire.to_string()]
    }

    fn global_command(&self, _instance: Option<&str>) -> Result<String, CommandError> {
        Ok(pipe_line("DISABLE_NOTIFICATIONS_EXPIRE_TIME", &[], &self.arguments()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct RestartProcessCommand;

impl Command for RestartProcessCommand {
    fn name(&self) -> &'static str {
        "RestartProcessCommand"
    }

    fn targets(&self) -> Targets {
        Targets::GLOBAL
    }

    fn arguments(&self) -> Vec<String> {
        Vec::new()
    }

    fn global_command(&self, _instance: Option<&str>) -> Result<String, CommandError> {
        Ok("RESTART_PROCESS".to_string())
    }
}
