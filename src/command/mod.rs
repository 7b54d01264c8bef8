//! 监控实例的外部命令
//!
//! [`Command`] 渲染为分号分隔的命令文件协议中的一行
//! (`ACKNOWLEDGE_HOST_PROBLEM;web1;2;1;1;me;looking`),
//! 实例的REST API有对应操作时也可以渲染为 [`ApiCommandChain`]。

pub mod acknowledge;
pub mod api;
pub mod check;
pub mod comment;
pub mod comments;
pub mod downtime;
pub mod feature;
pub mod notification;
pub mod object;

pub use acknowledge::{AcknowledgeCommand, RemoveAcknowledgementCommand};
pub use api::{ApiCommandChain, ApiCommandChainBuilder, IcingaApiCommand};
pub use check::ScheduleCheckCommand;
pub use comment::Comment;
pub use comments::{AddCommentCommand, DeleteAllCommentsCommand, DeleteCommentCommand};
pub use downtime::{ChildPropagation, DeleteDowntimeCommand, ScheduleDowntimeCommand};
pub use feature::{
    DisableNotificationsExpireCommand, GroupMembers, InstanceFeature, ObjectFeature, RestartProcessCommand,
    ToggleInstanceFeatureCommand, ToggleObjectFeatureCommand,
};
pub use notification::{
    CustomNotificationCommand, DelayNotificationCommand, SubmitPassiveCheckResultCommand,
};
pub use object::MonitoredObject;

use std::fmt;

use bitflags::bitflags;
use thiserror::Error;

bitflags! {
    /// 命令能够渲染的目标类型
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Targets: u8 {
        const HOST = 1;
        const SERVICE = 1 << 1;
        const HOSTGROUP = 1 << 2;
        const SERVICEGROUP = 1 << 3;
        const GLOBAL = 1 << 4;

        const OBJECTS = Self::HOST.bits() | Self::SERVICE.bits();
        const GROUPS = Self::HOSTGROUP.bits() | Self::SERVICEGROUP.bits();
    }
}

/// 命令渲染的目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Host { host: String },
    Service { host: String, service: String },
    Hostgroup(String),
    Servicegroup(String),
    Global { instance: Option<String> },
}

impl Target {
    pub fn host(host: impl Into<String>) -> Self {
        Target::Host { host: host.into() }
    }

    pub fn service(host: impl Into<String>, service: impl Into<String>) -> Self {
        Target::Service {
            host: host.into(),
            service: service.into(),
        }
    }

    pub fn global() -> Self {
        Target::Global { instance: None }
    }

    pub fn kind(&self) -> Targets {
        match self {
            Target::Host { .. } => Targets::HOST,
            Target::Service { .. } => Targets::SERVICE,
            Target::Hostgroup(_) => Targets::HOSTGROUP,
            Target::Servicegroup(_) => Targets::SERVICEGROUP,
            Target::Global { .. } => Targets::GLOBAL,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Target::Host { .. } => "host",
            Target::Service { .. } => "service",
            Target::Hostgroup(_) => "hostgroup",
            Target::Servicegroup(_) => "servicegroup",
            Target::Global { .. } => "global",
        }
    }

    /// REST API对象过滤条件: `{"host": name}` 或 `{"service": "host!name"}`
    pub(crate) fn api_filter(&self) -> Option<(&'static str, String)> {
        match self {
            Target::Host { host } => Some(("host", host.clone())),
            Target::Service { host, service } => Some(("service", format!("{}!{}", host, service))),
            _ => None,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Host { host } => f.write_str(host),
            Target::Service { host, service } => write!(f, "{}!{}", host, service),
            Target::Hostgroup(group) | Target::Servicegroup(group) => f.write_str(group),
            Target::Global { instance: Some(instance) } => f.write_str(instance),
            Target::Global { instance: None } => f.write_str("global"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    /// 命令不支持该类型的目标
    #[error("{command} does not provide a {target} command")]
    NotImplemented {
        command: &'static str,
        target: &'static str,
    },
    #[error("invalid argument for {command}: {reason}")]
    InvalidArgument { command: &'static str, reason: String },
}

impl CommandError {
    pub(crate) fn not_implemented(command: &'static str, target: &'static str) -> Self {
        CommandError::NotImplemented { command, target }
    }

    pub(crate) fn invalid(command: &'static str, reason: impl Into<String>) -> Self {
        CommandError::InvalidArgument {
            command,
            reason: reason.into(),
        }
    }
}

/// 外部命令
///
/// 实现者只覆盖支持的渲染函数, 并在 [`targets`](Command::targets) 中列出;
/// [`render`](Command::render) 在调用渲染函数之前拒绝其余目标。
pub trait Command: fmt::Debug {
    fn name(&self) -> &'static str;

    fn targets(&self) -> Targets;

    /// 命令参数, 按协议顺序
    fn arguments(&self) -> Vec<String>;

    fn host_command(&self, _host: &str) -> Result<String, CommandError> {
        Err(CommandError::not_implemented(self.name(), "host"))
    }

    fn service_command(&self, _host: &str, _service: &str) -> Result<String, CommandError> {
        Err(CommandError::not_implemented(self.name(), "service"))
    }

    fn hostgroup_command(&self, _hostgroup: &str) -> Result<String, CommandError> {
        Err(CommandError::not_implemented(self.name(), "hostgroup"))
    }

    fn servicegroup_command(&self, _servicegroup: &str) -> Result<String, CommandError> {
        Err(CommandError::not_implemented(self.name(), "servicegroup"))
    }

    fn global_command(&self, _instance: Option<&str>) -> Result<String, CommandError> {
        Err(CommandError::not_implemented(self.name(), "global"))
    }

    /// 命令的REST API形式; `app` 是实例级开关作用的应用对象名
    fn to_api(&self, target: &Target, _app: &str) -> Result<ApiCommandChain, CommandError> {
        Err(CommandError::not_implemented(self.name(), target.kind_name()))
    }

    /// 渲染 `target` 的命令文件行
    fn render(&self, target: &Target) -> Result<String, CommandError> {
        check_target(self.name(), self.targets(), target)?;
        match target {
            Target::Host { host } => self.host_command(host),
            Target::Service { host, service } => self.service_command(host, service),
            Target::Hostgroup(group) => self.hostgroup_command(group),
            Target::Servicegroup(group) => self.servicegroup_command(group),
            Target::Global { instance } => self.global_command(instance.as_deref()),
        }
    }
}

pub(crate) fn check_target(command: &'static str, supported: Targets, target: &Target) -> Result<(), CommandError> {
    if supported.contains(target.kind()) {
        Ok(())
    } else {
        Err(CommandError::not_implemented(command, target.kind_name()))
    }
}

/// `NAME;target;args...`, 后面没有内容时省略分隔符
pub(crate) fn pipe_line(name: &str, target: &[&str], arguments: &[String]) -> String {
    let mut line = name.to_string();
    for part in target.iter().copied().chain(arguments.iter().map(String::as_str)) {
        line.push(';');
        line.push_str(part);
    }
    line
}

pub(crate) fn flag(value: bool) -> String {
    String::from(if value { "1" } else { "0" })
}

pub(crate) fn non_negative(command: &'static str, what: &str, value: i64) -> Result<i64, CommandError> {
    if value < 0 {
        return Err(CommandError::invalid(command, format!("{} must not be negative, got {}", what, value)));
    }
    Ok(value)
}

/// 为命令文件包装 `line`: `[<now>] <line>`, 换行符被转义, 保证一条命令只占一行
pub fn file_line(line: &str, now: i64) -> String {
    format!("[{}] {}", now, line.replace('\r', "\\r").replace('\n', "\\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_line_framing() {
        assert_eq!(file_line("RESTART_PROCESS", 1700000000), "[1700000000] RESTART_PROCESS");
        assert_eq!(
            file_line("ADD_HOST_COMMENT;web;1;me;line one\r\nline two", 5),
            "[5] ADD_HOST_COMMENT;web;1;me;line one\\r\\nline two"
        );
    }

    #[test]
    fn test_pipe_line() {
        assert_eq!(pipe_line("RESTART_PROCESS", &[], &[]), "RESTART_PROCESS");
        assert_eq!(
            pipe_line("DEL_SVC_COMMENT", &["myhost", "myservice"], &["42".to_string()]),
            "DEL_SVC_COMMENT;myhost;myservice;42"
        );
    }

    #[test]
    fn test_target_kinds() {
        assert_eq!(Target::host("a").kind(), Targets::HOST);
        assert!(Targets::OBJECTS.contains(Target::service("a", "b").kind()));
        assert!(!Targets::OBJECTS.contains(Target::Hostgroup("g".into()).kind()));
        assert_eq!(Target::service("a", "b").to_string(), "a!b");
        assert_eq!(Target::global().kind_name(), "global");
    }

    #[test]
    fn test_non_negative() {
        assert_eq!(non_negative("X", "start", 0), Ok(0));
        assert!(matches!(
            non_negative("X", "start", -1),
            Err(CommandError::InvalidArgument { command: "X", .. })
        ));
    }
}
