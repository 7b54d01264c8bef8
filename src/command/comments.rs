use serde_json::{json, Map};

use super::{check_target, pipe_line, ApiCommandChain, Comment, Command, CommandError, IcingaApiCommand, Target, Targets};

#[derive(Debug, Clone)]
pub struct AddCommentCommand {
    comment: Comment,
}

impl AddCommentCommand {
    pub fn new(comment: Comment) -> Self {
        Self { comment }
    }
}

impl Command for AddCommentCommand {
    fn name(&self) -> &'static str {
        "AddCommentCommand"
    }

    fn targets(&self) -> Targets {
        Targets::OBJECTS
    }

    fn arguments(&self) -> Vec<String> {
        self.comment.arguments(true)
    }

    fn host_command(&self, host: &str) -> Result<String, CommandError> {
        Ok(pipe_line("ADD_HOST_COMMENT", &[host], &self.arguments()))
    }

    fn service_command(&self, host: &str, service: &str) -> Result<String, CommandError> {
        Ok(pipe_line("ADD_SVC_COMMENT", &[host, service], &self.arguments()))
    }

    fn to_api(&self, target: &Target, _app: &str) -> Result<ApiCommandChain, CommandError> {
        check_target(self.name(), self.targets(), target)?;
        let mut data = Map::new();
        data.insert("author".into(), json!(self.comment.author));
        data.insert("comment".into(), json!(self.comment.content));
        Ok(ApiCommandChain::single(IcingaApiCommand::for_target("actions/add-comment", data, target)))
    }
}

/// 按id删除一条评论
///
/// REST API按名称定位评论; 没有名称时命令没有API形式。
#[derive(Debug, Clone)]
pub struct DeleteCommentCommand {
    id: u64,
    api_name: Option<String>,
}

impl DeleteCommentCommand {
    pub fn new(id: u64) -> Self {
        Self { id, api_name: None }
    }

    pub fn with_api_name(mut self, name: impl Into<String>) -> Self {
        self.api_name = Some(name.into());
        self
    }
}

impl Command for DeleteCommentCommand {
    fn name(&self) -> &'static str {
        "DeleteCommentCommand"
    }

    fn targets(&self) -> Targets {
        Targets::OBJECTS
    }

    fn arguments(&self) -> Vec<String> {
        vec![self.id.to_string()]
    }

    fn host_command(&self, host: &str) -> Result<String, CommandError> {
        Ok(pipe_line("DEL_HOST_COMMENT", &[host], &self.arguments()))
    }

    fn service_command(&self, host: &str, service: &str) -> Result<String, CommandError> {
        Ok(pipe_line("DEL_SVC_COMMENT", &[host, service], &self.arguments()))
    }

    fn to_api(&self, target: &Target, _app: &str) -> Result<ApiCommandChain, CommandError> {
        check_target(self.name(), self.targets(), target)?;
        let name = self
            .api_name
            .as_ref()
            .ok_or_else(|| CommandError::invalid(self.name(), "the API needs the comment name"))?;
        Ok(ApiCommandChain::single(IcingaApiCommand::new(
            "actions/remove-comment",
            json!({ "comment": name }),
        )))
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeleteAllCommentsCommand;

impl DeleteAllCommentsCommand {
    pub fn new() -> Self {
        Self
    }
}

impl Command for DeleteAllCommentsCommand {
    fn name(&self) -> &'static str {
        "DeleteAllCommentsCommand"
    }

    fn targets(&self) -> Targets {
        Targets::OBJECTS
    }

    fn arguments(&self) -> Vec<String> {
        Vec::new()
    }

    fn host_command(&self, host: &str) -> Result<String, CommandError> {
        Ok(pipe_line("DEL_ALL_HOST_COMMENTS", &[host], &[]))
    }

    fn service_command(&self, host: &str, service: &str) -> Result<String, CommandError> {
        Ok(pipe_line("DEL_ALL_SVC_COMMENTS", &[host, service], &[]))
    }
}
