//! 把渲染好的命令发送到监控实例

mod api;
mod chain;
mod local_file;
mod remote_file;

pub use api::ApiCommandTransport;
pub use chain::TransportChain;
pub use local_file::LocalCommandFile;
pub use remote_file::RemoteCommandFile;

use std::fmt;
use std::io;

use thiserror::Error;

use crate::command::{Command, CommandError, Target};

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("can't write to the command file: {0}")]
    Io(#[from] io::Error),
    #[error("remote command failed with exit code {code:?}: {output}")]
    Remote { code: Option<i32>, output: String },
    #[error("API request failed with status {code}: {status}")]
    Api { code: u16, status: String },
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no command transport is configured for this instance")]
    NoTransport,
    #[error("all {attempts} command transports failed")]
    AllTransportsFailed { attempts: usize },
    #[error(transparent)]
    Render(#[from] CommandError),
}

/// 能把命令发送到监控实例的传输通道
pub trait CommandTransport: fmt::Debug {
    fn name(&self) -> &str;

    /// 传输通道绑定的实例
    fn instance(&self) -> Option<&str> {
        None
    }

    /// 为 `target` 渲染并发送 `command`。`instance` 是目标所属的监控实例（已知时）
    fn send(&self, command: &dyn Command, target: &Target, instance: Option<&str>) -> Result<(), TransportError>;

    /// 检查实例是否可达。无法检查的传输通道直接返回成功
    fn probe(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// 绑定到 `bound` 的传输通道能否发送 `instance` 的命令
///
/// 未绑定或绑定到 `none` 的通道发送所有命令; 实例未知时所有通道都可用。
pub(crate) fn serves_instance(bound: Option<&str>, instance: Option<&str>) -> bool {
    match (bound, instance) {
        (Some(bound), Some(instance)) => bound.eq_ignore_ascii_case("none") || bound.eq_ignore_ascii_case(instance),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serves_instance() {
        assert!(serves_instance(None, Some("a")));
        assert!(serves_instance(Some("a"), None));
        assert!(serves_instance(Some("none"), Some("a")));
        assert!(serves_instance(Some("Default"), Some("default")));
        assert!(!serves_instance(Some("a"), Some("b")));
    }
}
