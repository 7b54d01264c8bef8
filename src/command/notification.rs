use serde_json::{json, Map};

use super::{check_target, non_negative, pipe_line, ApiCommandChain, Comment, Command, CommandError, IcingaApiCommand, Target, Targets};

/// 向对象的联系人发送自定义文本通知
#[derive(Debug, Clone)]
pub struct CustomNotificationCommand {
    comment: Comment,
    forced: bool,
    broadcast: bool,
}

impl CustomNotificationCommand {
    const FORCED: u8 = 2;
    const BROADCAST: u8 = 1;

    pub fn new(comment: Comment) -> Self {
        Self {
            comment,
            forced: false,
            broadcast: false,
        }
    }

    /// 即使通知已禁用或不在时间段内也发送
    pub fn forced(mut self, forced: bool) -> Self {
        self.forced = forced;
        self
    }

    /// 通知所有联系人, 而不只是平时会收到通知的联系人
    pub fn broadcast(mut self, broadcast: bool) -> Self {
        self.broadcast = broadcast;
        self
    }

    fn options(&self) -> u8 {
        let mut options = 0;
        if self.forced {
            options |= Self::FORCED;
        }
        if self.broadcast {
            options |= Self::BROADCAST;
        }
        options
    }
}

impl Command for CustomNotificationCommand {
    fn name(&self) -> &'static str {
        "CustomNotificationCommand"
    }

    fn targets(&self) -> Targets {
        Targets::OBJECTS
    }

    fn arguments(&self) -> Vec<String> {
        let mut args = vec![self.options().to_string()];
        args.extend(self.comment.arguments(false));
        args
    }

    fn host_command(&self, host: &str) -> Result<String, CommandError> {
        Ok(pipe_line("SEND_CUSTOM_HOST_NOTIFICATION", &[host], &self.arguments()))
    }

    fn service_command(&self, host: &str, service: &str) -> Result<String, CommandError> {
        Ok(pipe_line("SEND_CUSTOM_SVC_NOTIFICATION", &[host, service], &self.arguments()))
    }

    fn to_api(&self, target: &Target, _app: &str) -> Result<ApiCommandChain, CommandError> {
        check_target(self.name(), self.targets(), target)?;
        let mut data = Map::new();
        data.insert("author".into(), json!(self.comment.author));
        data.insert("comment".into(), json!(self.comment.content));
        data.insert("force".into(), json!(self.forced));
        Ok(ApiCommandChain::single(IcingaApiCommand::for_target(
            "actions/send-custom-notification",
            data,
            target,
        )))
    }
}

/// 把下一次通知推迟 `delay` 秒
#[derive(Debug, Clone)]
pub struct DelayNotificationCommand {
    delay: i64,
}

impl DelayNotificationCommand {
    pub fn new(delay: i64) -> Result<Self, CommandError> {
        Ok(Self {
            delay: non_negative("DelayNotificationCommand", "delay", delay)?,
        })
    }
}

impl Command for DelayNotificationCommand {
    fn name(&self) -> &'static str {
        "DelayNotificationCommand"
    }

    fn targets(&self) -> Targets {
        Targets::OBJECTS
    }

    fn arguments(&self) -> Vec<String> {
        vec![self.delay.to_string()]
    }

    fn host_command(&self, host: &str) -> Result<String, CommandError> {
        Ok(pipe_line("DELAY_HOST_NOTIFICATION", &[host], &self.arguments()))
    }

    fn service_command(&self, host: &str, service: &str) -> Result<String, CommandError> {
        Ok(pipe_line("DELAY_SVC_NOTIFICATION", &[host, service], &self.arguments()))
    }
}

/// 提交一个不由实例自己执行的检查结果
#[derive(Debug, Clone)]
pub struct SubmitPassiveCheckResultCommand {
    state: u8,
    output: String,
    performance_data: String,
}

impl SubmitPassiveCheckResultCommand {
    pub fn new(state: u8, output: impl Into<String>) -> Self {
        Self {
            state,
            output: output.into(),
            performance_data: String::new(),
        }
    }

    pub fn performance_data(mut self, performance_data: impl Into<String>) -> Self {
        self.performance_data = performance_data.into();
        self
    }

    /// `output|perfdata`, 没有性能数据时只有output
    fn plugin_output(&self) -> String {
        if self.performance_data.is_empty() {
            self.output.clone()
        } else {
            format!("{}|{}", self.output, self.performance_data)
        }
    }
}

impl Command for SubmitPassiveCheckResultCommand {
    fn name(&self) -> &'static str {
        "SubmitPassiveCheckResultCommand"
    }

    fn targets(&self) -> Targets {
        Targets::OBJECTS
    }

    fn arguments(&self) -> Vec<String> {
        vec![self.state.to_string(), self.plugin_output()]
    }

    fn host_command(&self, host: &str) -> Result<String, CommandError> {
        Ok(pipe_line("PROCESS_HOST_CHECK_RESULT", &[host], &self.arguments()))
    }

    fn service_command(&self, host: &str, service: &str) -> Result<String, CommandError> {
        Ok(pipe_line("PROCESS_SERVICE_CHECK_RESULT", &[host, service], &self.arguments()))
    }

    fn to_api(&self, target: &Target, _app: &str) -> Result<ApiCommandChain, CommandError> {
        check_target(self.name(), self.targets(), target)?;
        let mut data = Map::new();
        data.insert("exit_status".into(), json!(self.state));
        data.insert("plugin_output".into(), json!(self.output));
        data.insert("performance_data".into(), json!(self.performance_data));
        Ok(ApiCommandChain::single(IcingaApiCommand::for_target(
            "actions/process-check-result",
            data,
            target,
        )))
    }
}
