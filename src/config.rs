//! 配置模块，负责加载JSON配置文件（命令传输通道与SQL列映射）

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::transport::{ApiCommandTransport, LocalCommandFile, RemoteCommandFile, TransportChain};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file does not exist: {}", .0.display())]
    Missing(PathBuf),
    #[error("can't read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("can't parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

fn default_kind() -> String {
    "local".to_string()
}

/// `transports` 中的一项。必填字段取决于 `transport`:
/// `local` 需要 `path`, `remote` 需要 `host` 和 `path`,
/// `api` 需要 `host`、`username` 和 `password`。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    pub name: String,
    #[serde(default = "default_kind")]
    pub transport: String,
    #[serde(default)]
    pub instance: Option<String>,
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub app: Option<String>,
    #[serde(default)]
    pub verify_tls: Option<bool>,
}

impl TransportConfig {
    fn required<'a, T>(&self, field: &str, value: &'a Option<T>) -> Result<&'a T, ConfigError> {
        value.as_ref().ok_or_else(|| {
            ConfigError::Invalid(format!(
                "{} transport `{}` needs `{}`",
                self.transport, self.name, field
            ))
        })
    }

    /// 把配置的传输通道加入 `chain`
    fn add_to(&self, chain: &mut TransportChain) -> Result<(), ConfigError> {
        match self.transport.to_ascii_lowercase().as_str() {
            "local" => {
                let mut transport = LocalCommandFile::new(&self.name, self.required("path", &self.path)?);
                if let Some(instance) = &self.instance {
                    transport = transport.with_instance(instance);
                }
                chain.push(transport);
            }
            "remote" => {
                let mut transport = RemoteCommandFile::new(
                    &self.name,
                    self.required("host", &self.host)?,
                    self.required("path", &self.path)?,
                )
                .with_port(self.port.unwrap_or(22));
                if let Some(user) = &self.user {
                    transport = transport.with_user(user);
                }
                if let Some(instance) = &self.instance {
                    transport = transport.with_instance(instance);
                }
                chain.push(transport);
            }
            "api" => {
                let mut transport = ApiCommandTransport::new(
                    &self.name,
                    self.required("host", &self.host)?,
                    self.required("username", &self.username)?,
                    self.required("password", &self.password)?,
                )
                .with_port(self.port.unwrap_or(ApiCommandTransport::DEFAULT_PORT))
                .with_app(self.app.as_deref().unwrap_or("app"))
                .verify_tls(self.verify_tls.unwrap_or(true));
                if let Some(instance) = &self.instance {
                    transport = transport.with_instance(instance);
                }
                chain.push(transport);
            }
            other => {
                return Err(ConfigError::Invalid(format!(
                    "unknown transport `{}` for `{}`",
                    other, self.name
                )))
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// 每条命令按顺序尝试
    #[serde(default)]
    pub transports: Vec<TransportConfig>,
    /// Filter字段到数据库列的映射
    #[serde(default)]
    pub columns: HashMap<String, String>,
}

impl DispatcherConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::Missing(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut names = std::collections::HashSet::new();
        for transport in &self.transports {
            if !names.insert(transport.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate transport name `{}`",
                    transport.name
                )));
            }
        }
        Ok(())
    }

    pub fn build_transport(&self) -> Result<TransportChain, ConfigError> {
        let mut chain = TransportChain::new();
        for transport in &self.transports {
            transport.add_to(&mut chain)?;
        }
        Ok(chain)
    }

    pub fn column_mapping(&self) -> &HashMap<String, String> {
        &self.columns
    }
}
