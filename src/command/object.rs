use serde::{Deserialize, Serialize};

use super::Target;

/// 命令作用的主机或服务
///
/// 反序列化时同时接受普通列名和旧的带前缀列名
/// (`host` / `host_name`, `service` / `service_description`)。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoredObject {
    #[serde(alias = "host", alias = "hostname")]
    pub host_name: String,
    #[serde(default, alias = "service", alias = "service_name")]
    pub service_description: Option<String>,
    /// 对象所属的监控实例
    #[serde(default, alias = "instance_name")]
    pub instance: Option<String>,
}

impl MonitoredObject {
    pub fn host(host_name: impl Into<String>) -> Self {
        Self {
            host_name: host_name.into(),
            service_description: None,
            instance: None,
        }
    }

    pub fn service(host_name: impl Into<String>, service_description: impl Into<String>) -> Self {
        Self {
            service_description: Some(service_description.into()),
            ..Self::host(host_name)
        }
    }

    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    pub fn is_service(&self) -> bool {
        self.service_description.is_some()
    }

    pub fn target(&self) -> Target {
        match &self.service_description {
            Some(service) => Target::service(self.host_name.clone(), service.clone()),
            None => Target::host(self.host_name.clone()),
        }
    }
}
