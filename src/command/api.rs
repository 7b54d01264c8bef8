use serde::Serialize;
use serde_json::{Map, Value};

/// 一次REST API调用: 向 `v1/<endpoint>` POST `data`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IcingaApiCommand {
    pub endpoint: String,
    pub data: Value,
}

impl IcingaApiCommand {
    pub fn new(endpoint: impl Into<String>, data: Value) -> Self {
        Self {
            endpoint: endpoint.into(),
            data,
        }
    }

    /// 与 [`new`](Self::new) 相同, 并把目标的对象过滤条件合并进 `data`
    pub(crate) fn for_target(endpoint: impl Into<String>, mut data: Map<String, Value>, target: &crate::command::Target) -> Self {
        if let Some((key, value)) = target.api_filter() {
            data.insert(key.to_string(), Value::String(value));
        }
        Self::new(endpoint, Value::Object(data))
    }
}

/// 一个逻辑操作按顺序发送的API调用
#[derive(Debug, Clone, PartialEq)]
pub struct ApiCommandChain {
    commands: Vec<IcingaApiCommand>,
}

impl ApiCommandChain {
    pub fn single(command: IcingaApiCommand) -> Self {
        Self {
            commands: vec![command],
        }
    }

    pub fn builder(first: IcingaApiCommand) -> ApiCommandChainBuilder {
        ApiCommandChainBuilder {
            commands: vec![first],
        }
    }

    pub fn first(&self) -> &IcingaApiCommand {
        &self.commands[0]
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// 总是false: 调用链至少包含一个调用
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IcingaApiCommand> {
        self.commands.iter()
    }
}

impl<'a> IntoIterator for &'a ApiCommandChain {
    type Item = &'a IcingaApiCommand;
    type IntoIter = std::slice::Iter<'a, IcingaApiCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}

pub struct ApiCommandChainBuilder {
    commands: Vec<IcingaApiCommand>,
}

impl ApiCommandChainBuilder {
    /// 追加一个在已有调用之后执行的调用
    pub fn then(mut self, command: IcingaApiCommand) -> Self {
        self.commands.push(command);
        self
    }

    pub fn build(self) -> ApiCommandChain {
        ApiCommandChain {
            commands: self.commands,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Target;
    use serde_json::json;

    #[test]
    fn test_chain_order() {
        let chain = ApiCommandChain::builder(IcingaApiCommand::new("actions/a", json!({})))
            .then(IcingaApiCommand::new("actions/b", json!({})))
            .then(IcingaApiCommand::new("actions/c", json!({})))
            .build();
        let endpoints: Vec<_> = chain.iter().map(|c| c.endpoint.as_str()).collect();
        assert_eq!(endpoints, ["actions/a", "actions/b", "actions/c"]);
        assert_eq!(chain.first().endpoint, "actions/a");
        assert!(!chain.is_empty());
    }

    #[test]
    fn test_target_filter() {
        let host = IcingaApiCommand::for_target("actions/x", Map::new(), &Target::host("web"));
        assert_eq!(host.data, json!({"host": "web"}));

        let service = IcingaApiCommand::for_target("actions/x", Map::new(), &Target::service("web", "http"));
        assert_eq!(service.data, json!({"service": "web!http"}));

        let global = IcingaApiCommand::for_target("actions/x", Map::new(), &Target::global());
        assert_eq!(global.data, json!({}));
    }
}
