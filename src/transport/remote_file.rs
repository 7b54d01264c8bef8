use std::path::PathBuf;
use std::process::Command as Process;

use chrono::Utc;
use tracing::debug;

use super::{CommandTransport, TransportError};
use crate::command::{file_line, Command, Target};

/// 通过ssh把命令写入另一台主机上实例的命令文件, 依赖密钥认证
#[derive(Debug, Clone)]
pub struct RemoteCommandFile {
    name: String,
    host: String,
    port: u16,
    user: Option<String>,
    path: PathBuf,
    instance: Option<String>,
}

impl RemoteCommandFile {
    pub fn new(name: impl Into<String>, host: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port: 22,
            user: None,
            path: path.into(),
            instance: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    fn destination(&self) -> String {
        match &self.user {
            Some(user) => format!("{}@{}", user, self.host),
            None => self.host.clone(),
        }
    }

    /// 把 `framed` 写入远程命令文件的ssh调用
    pub fn ssh_command(&self, framed: &str) -> Process {
        let remote = format!(
            "echo {} > {}",
            shell_quote(framed),
            shell_quote(&self.path.to_string_lossy())
        );
        let mut ssh = Process::new("ssh");
        ssh.arg("-o")
            .arg("BatchMode=yes")
            .arg("-p")
            .arg(self.port.to_string())
            .arg(self.destination())
            .arg(remote);
        ssh
    }

    pub fn write_line(&self, line: &str, now: i64) -> Result<(), TransportError> {
        let framed = file_line(line, now);
        debug!(
            host = %self.host,
            port = self.port,
            path = %self.path.display(),
            command = %framed,
            "sending external command via ssh"
        );
        let output = self.ssh_command(&framed).output()?;
        if !output.status.success() {
            return Err(TransportError::Remote {
                code: output.status.code(),
                output: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

impl CommandTransport for RemoteCommandFile {
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

/// 为POSIX shell用单引号包住 `text`
fn shell_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', r"'\''"))
}
