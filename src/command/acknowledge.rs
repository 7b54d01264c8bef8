use serde_json::{json, Map, Value};

use super::{check_target, non_negative, pipe_line, ApiCommandChain, Comment, Command, CommandError, IcingaApiCommand, Target, Targets};

/// 确认主机或服务的问题
#[derive(Debug, Clone)]
pub struct AcknowledgeCommand {
    comment: Comment,
    sticky: bool,
    notify: bool,
    expire_time: Option<i64>,
}

impl AcknowledgeCommand {
    const NAME: &'static str = "AcknowledgeCommand";

    pub fn new(comment: Comment) -> Self {
        Self {
            comment,
            sticky: false,
            notify: false,
            expire_time: None,
        }
    }

    /// 确认保持到对象恢复, 而不是下一次状态变化
    pub fn sticky(mut self, sticky: bool) -> Self {
        self.sticky = sticky;
        self
    }

    pub fn notify(mut self, notify: bool) -> Self {
        self.notify = notify;
        self
    }

    /// 确认在此Unix时间戳之后移除
    pub fn expire_at(mut self, timestamp: i64) -> Result<Self, CommandError> {
        self.expire_time = Some(non_negative(Self::NAME, "expire time", timestamp)?);
        Ok(self)
    }

    pub fn comment(&self) -> &Comment {
        &self.comment
    }

    fn command_name(&self, kind: &str) -> String {
        match self.expire_time {
            Some(_) => format!("ACKNOWLEDGE_{}_PROBLEM_EXPIRE", kind),
            None => format!("ACKNOWLEDGE_{}_PROBLEM", kind),
        }
    }
}

impl Command for AcknowledgeCommand {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn targets(&self) -> Targets {
        Targets::OBJECTS
    }

    fn arguments(&self) -> Vec<String> {
        let mut args = vec![
            String::from(if self.sticky { "2" } else { "0" }),
            super::flag(self.notify),
            super::flag(self.comment.persistent),
        ];
        if let Some(expire) = self.expire_time {
            args.push(expire.to_string());
        }
        args.extend(self.comment.arguments(false));
        args
    }

    fn host_command(&self, host: &str) -> Result<String, CommandError> {
        Ok(pipe_line(&self.command_name("HOST"), &[host], &self.arguments()))
    }

    fn service_command(&self, host: &str, service: &str) -> Result<String, CommandError> {
        Ok(pipe_line(&self.command_name("SVC"), &[host, service], &self.arguments()))
    }

    fn to_api(&self, target: &Target, _app: &str) -> Result<ApiCommandChain, CommandError> {
        check_target(Self::NAME, self.targets(), target)?;
        let mut data = Map::new();
        data.insert("author".into(), json!(self.comment.author));
        data.insert("comment".into(), json!(self.comment.content));
        data.insert("expiry".into(), self.expire_time.map_or(Value::Null, |t| json!(t)));
        data.insert("sticky".into(), json!(self.sticky));
        data.insert("notify".into(), json!(self.notify));
        Ok(ApiCommandChain::single(IcingaApiCommand::for_target(
            "actions/acknowledge-problem",
            data,
            target,
        )))
    }
}

/// 移除主机或服务问题的确认
#[derive(Debug, Clone, Default)]
pub struct RemoveAcknowledgementCommand;

impl RemoveAcknowledgementCommand {
    pub fn new() -> Self {
        Self
    }
}

impl Command for RemoveAcknowledgementCommand {
    fn name(&self) -> &'static str {
        "RemoveAcknowledgementCommand"
    }

    fn targets(&self) -> Targets {
        Targets::OBJECTS
    }

    fn arguments(&self) -> Vec<String> {
        Vec::new()
    }

    fn host_command(&self, host: &str) -> Result<String, CommandError> {
        Ok(pipe_line("REMOVE_HOST_ACKNOWLEDGEMENT", &[host], &[]))
    }

    fn service_command(&self, host: &str, service: &str) -> Result<String, CommandError> {
        Ok(pipe_line("REMOVE_SVC_ACKNOWLEDGEMENT", &[host, service], &[]))
    }

    fn to_api(&self, target: &Target, _app: &str) -> Result<ApiCommandChain, CommandError> {
        check_target(self.name(), self.targets(), target)?;
        Ok(ApiCommandChain::single(IcingaApiCommand::for_target(
            "actions/remove-acknowledgement",
            Map::new(),
            target,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acknowledge_single_host() {
        let command = AcknowledgeCommand::new(Comment::new("I can", "sends teh ack"));
        assert_eq!(
            command.render(&Target::host("hostA")).unwrap(),
            "ACKNOWLEDGE_HOST_PROBLEM;hostA;0;0;0;I can;sends teh ack"
        );
        assert_eq!(
            command.render(&Target::service("hostC", "svc")).unwrap(),
            "ACKNOWLEDGE_SVC_PROBLEM;hostC;svc;0;0;0;I can;sends teh ack"
        );
    }

    #[test]
    fn test_acknowledge_flags() {
        let command = AcknowledgeCommand::new(Comment::new("Author", "Comment text").persistent(true)).notify(true);
        assert_eq!(
            command.render(&Target::host("myhost")).unwrap(),
            "ACKNOWLEDGE_HOST_PROBLEM;myhost;0;1;1;Author;Comment text"
        );
    }

    #[test]
    fn test_expire_toggles_name_and_arguments() {
        let command = AcknowledgeCommand::new(Comment::new("Author", "Comment text").persistent(true)).sticky(true);
        let plain = command.render(&Target::host("myhost")).unwrap();
        assert_eq!(plain, "ACKNOWLEDGE_HOST_PROBLEM;myhost;2;0;1;Author;Comment text");

        let expiring = command.expire_at(1700000000).unwrap();
        assert_eq!(
            expiring.render(&Target::host("myhost")).unwrap(),
            "ACKNOWLEDGE_HOST_PROBLEM_EXPIRE;myhost;2;0;1;1700000000;Author;Comment text"
        );
        assert_eq!(
            expiring.render(&Target::service("myhost", "myservice")).unwrap(),
            "ACKNOWLEDGE_SVC_PROBLEM_EXPIRE;myhost;myservice;2;0;1;1700000000;Author;Comment text"
        );
    }

    #[test]
    fn test_negative_expire_is_rejected() {
        let result = AcknowledgeCommand::new(Comment::new("a", "b")).expire_at(-5);
        assert!(matches!(result, Err(CommandError::InvalidArgument { .. })));
    }

    #[test]
    fn test_unsupported_targets() {
        let command = AcknowledgeCommand::new(Comment::new("a", "b"));
        assert_eq!(
            command.render(&Target::Hostgroup("linux".into())),
            Err(CommandError::NotImplemented {
                command: "AcknowledgeCommand",
                target: "hostgroup"
            })
        );
        assert!(command.render(&Target::global()).is_err());
    }

    #[test]
    fn test_acknowledge_api_payload() {
        let command = AcknowledgeCommand::new(Comment::new("me", "on it")).sticky(true).notify(true);
        let chain = command.to_api(&Target::service("web", "http"), "app").unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.first().endpoint, "actions/acknowledge-problem");
        assert_eq!(
            chain.first().data,
            json!({
                "author": "me",
                "comment": "on it",
                "expiry": null,
                "sticky": true,
                "notify": true,
                "service": "web!http"
            })
        );
    }

    #[test]
    fn test_remove_acknowledgement() {
        let command = RemoveAcknowledgementCommand::new();
        assert_eq!(command.render(&Target::host("web")).unwrap(), "REMOVE_HOST_ACKNOWLEDGEMENT;web");
        assert_eq!(
            command.render(&Target::service("web", "http")).unwrap(),
            "REMOVE_SVC_ACKNOWLEDGEMENT;web;http"
        );
        let chain = command.to_api(&Target::host("web"), "app").unwrap();
        assert_eq!(chain.first().data, json!({"host": "web"}));
    }
}
