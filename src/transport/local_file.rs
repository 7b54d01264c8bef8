use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::debug;

use super::{CommandTransport, TransportError};
use crate::command::{file_line, Command, Target};

/// 把命令追加到实例的命令文件（通常是FIFO）
///
/// 文件必须已存在, 不会被创建。
#[derive(Debug, Clone)]
pub struct LocalCommandFile {
    name: String,
    path: PathBuf,
    instance: Option<String>,
}

impl LocalCommandFile {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            instance: None,
        }
    }

    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 写入已渲染的命令行
    pub fn write_line(&self, line: &str, now: i64) -> Result<(), TransportError> {
        let framed = file_line(line, now);
        debug!(path = %self.path.display(), command = %framed, "writing external command");
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        // 每条命令只写一次, 避免并发写入交错
        file.write_all(format!("{}\n", framed).as_bytes())?;
        Ok(())
    }
}

impl CommandTransport for LocalCommandFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn instance(&self) -> Option<&str> {
        self.instance.as_deref()
    }

    fn send(&self, command: &dyn Command, target: &Target, _instance: Option<&str>) -> Result<(), TransportError> {
        let line = command.render(target)?;
        self.write_line(&line, Utc::now().timestamp())
    }
}
