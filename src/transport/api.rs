use std::fmt;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;
use tracing::debug;
use ureq::tls::TlsConfig;
use ureq::Agent;

use super::{CommandTransport, TransportError};
use crate::command::{ApiCommandChain, Command, IcingaApiCommand, Target};

/// 通过实例的REST API发送命令
///
/// 命令调用链中的每个调用按顺序POST。第一个失败的调用结束整条链, 已发送的调用不回滚。
pub struct ApiCommandTransport {
    name: String,
    host: String,
    port: u16,
    username: String,
    password: String,
    app: String,
    instance: Option<String>,
    agent: Agent,
}

impl fmt::Debug for ApiCommandTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCommandTransport")
            .field("name", &self.name)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("app", &self.app)
            .field("instance", &self.instance)
            .finish_non_exhaustive()
    }
}

impl ApiCommandTransport {
    pub const DEFAULT_PORT: u16 = 5665;

    pub fn new(
        name: impl Into<String>,
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port: Self::DEFAULT_PORT,
            username: username.into(),
            password: password.into(),
            app: "app".to_string(),
            instance: None,
            agent: build_agent(true),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// 实例级开关作用的应用对象
    pub fn with_app(mut self, app: impl Into<String>) -> Self {
        self.app = app.into();
        self
    }

    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    /// 用于使用自签名证书的实例
    pub fn verify_tls(mut self, verify: bool) -> Self {
        self.agent = build_agent(verify);
        self
    }

    pub fn app(&self) -> &str {
        &self.app
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("https://{}:{}/v1/{}", self.host, self.port, endpoint)
    }

    fn authorization(&self) -> String {
        let credentials = format!("{}:{}", self.username, self.password);
        format!("Basic {}", STANDARD.encode(credentials))
    }

    pub fn send_chain(&self, chain: &ApiCommandChain) -> Result<(), TransportError> {
        run_chain(chain, |command| {
            let url = self.url(&command.endpoint);
            debug!(url = %url, data = %command.data, "sending API command");
            let response = self
                .agent
                .post(&url)
                .header("Accept", "application/json")
                .header("Authorization", self.authorization())
                .send_json(&command.data)
                .map_err(|e| TransportError::Http(e.to_string()))?;
            read_response(response)
        })
    }

    /// 获取配置的应用对象, 检查地址、凭据和权限
    pub fn probe(&self) -> Result<(), TransportError> {
        let url = self.url(&format!("objects/icingaapplications/{}", self.app));
        debug!(url = %url, "probing API");
        let response = self
            .agent
            .get(&url)
            .header("Accept", "application/json")
            .header("Authorization", self.authorization())
            .call()
            .map_err(|e| TransportError::Http(format!("can't connect to the API: {}", e)))?;
        let (code, body) = read_response(response)?;
        check_response(code, &body)
    }
}

fn read_response(mut response: ureq::http::Response<ureq::Body>) -> Result<(u16, String), TransportError> {
    let code = response.status().as_u16();
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| TransportError::Http(e.to_string()))?;
    Ok((code, body))
}

/// 用 `post` 发送每个调用, 并在发送下一个调用之前检查响应
fn run_chain<F>(chain: &ApiCommandChain, mut post: F) -> Result<(), TransportError>
where
    F: FnMut(&IcingaApiCommand) -> Result<(u16, String), TransportError>,
{
    for command in chain {
        let (code, body) = post(command)?;
        check_response(code, &body)?;
    }
    Ok(())
}

/// 错误状态码、顶层 `error` 字段、或最后一个 `results` 项的 `code` 不在2xx范围内时失败。
/// 没有匹配到对象的操作同样返回 `200`。
fn check_response(code: u16, body: &str) -> Result<(), TransportError> {
    if !(200..300).contains(&code) {
        return Err(TransportError::Api {
            code,
            status: error_status(body),
        });
    }
    if body.trim().is_empty() {
        return Ok(());
    }
    let json: Value = serde_json::from_str(body)?;
    if let Some(error) = json.get("error") {
        return Err(TransportError::Api {
            code: error.as_u64().and_then(|c| u16::try_from(c).ok()).unwrap_or(code),
            status: status_of(&json),
        });
    }
    let result = json
        .get("results")
        .and_then(Value::as_array)
        .and_then(|results| results.last());
    if let Some(result_code) = result.and_then(|r| r.get("code")).and_then(Value::as_f64) {
        if !(200.0..300.0).contains(&result_code) {
            return Err(TransportError::Api {
                code: result_code as u16,
                status: result.map(status_of).unwrap_or_default(),
            });
        }
    }
    Ok(())
}

fn status_of(json: &Value) -> String {
    json.get("status")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

impl CommandTransport for ApiCommandTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn instance(&self) -> Option<&str> {
        self.instance.as_deref()
    }

    fn send(&self, command: &dyn Command, target: &Target, _instance: Option<&str>) -> Result<(), TransportError> {
        let chain = command.to_api(target, &self.app)?;
        self.send_chain(&chain)
    }

    fn probe(&self) -> Result<(), TransportError> {
        ApiCommandTransport::probe(self)
    }
}

fn build_agent(verify_tls: bool) -> Agent {
    Agent::config_builder()
        .http_status_as_error(false)
        .timeout_global(Some(Duration::from_secs(10)))
        .tls_config(TlsConfig::builder().disable_verification(!verify_tls).build())
        .build()
        .into()
}

/// API错误响应中的 `status` 消息, 没有时返回响应体本身
fn error_status(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| json.get("status").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn transport() -> ApiCommandTransport {
        ApiCommandTransport::new("api", "mon1", "root", "icinga")
    }

    #[test]
    fn test_url() {
        assert_eq!(transport().url("actions/add-comment"), "https://mon1:5665/v1/actions/add-comment");
        assert_eq!(
            transport().with_port(8443).url("objects/hosts"),
            "https://mon1:8443/v1/objects/hosts"
        );
    }

    #[test]
    fn test_basic_auth() {
        assert_eq!(transport().authorization(), "Basic cm9vdDppY2luZ2E=");
    }

    #[test]
    fn test_debug_hides_password() {
        let debug = format!("{:?}", transport());
        assert!(debug.contains("root"));
        assert!(!debug.contains("icinga\""));
    }

    #[test]
    fn test_error_status() {
        assert_eq!(
            error_status(r#"{"error": 404, "status": "No objects found."}"#),
            "No objects found."
        );
        assert_eq!(error_status(" Unauthorized \n"), "Unauthorized");
    }

    #[test]
    fn test_check_response() {
        assert!(check_response(200, r#"{"results": [{"code": 200.0, "status": "Successfully acknowledged problem"}]}"#).is_ok());
        assert!(check_response(200, "").is_ok());
        assert!(check_response(200, r#"{"results": []}"#).is_ok());

        match check_response(200, r#"{"results":[{"code":404,"status":"No objects found"}]}"#) {
            Err(TransportError::Api { code, status }) => {
                assert_eq!(code, 404);
                assert_eq!(status, "No objects found");
            }
            other => panic!("expected API error, got {:?}", other),
        }
        match check_response(200, r#"{"error": 403, "status": "No permission"}"#) {
            Err(TransportError::Api { code, status }) => {
                assert_eq!(code, 403);
                assert_eq!(status, "No permission");
            }
            other => panic!("expected API error, got {:?}", other),
        }
        assert!(matches!(
            check_response(401, "Unauthorized"),
            Err(TransportError::Api { code: 401, .. })
        ));
        assert!(matches!(check_response(200, "<html>"), Err(TransportError::Json(_))));
    }

    #[test]
    fn test_last_result_decides() {
        let body = r#"{"results": [{"code": 500, "status": "x"}, {"code": 200, "status": "ok"}]}"#;
        assert!(check_response(200, body).is_ok());
    }

    #[test]
    fn test_failing_link_stops_the_chain() {
        let chain = ApiCommandChain::builder(IcingaApiCommand::new("actions/schedule-downtime", json!({"n": 1})))
            .then(IcingaApiCommand::new("actions/schedule-downtime", json!({"n": 2})))
            .then(IcingaApiCommand::new("actions/schedule-downtime", json!({"n": 3})))
            .build();
        let mut posted = Vec::new();
        let result = run_chain(&chain, |command| {
            posted.push(command.data["n"].as_i64().unwrap());
            let body = if command.data["n"] == 2 {
                r#"{"results":[{"code":404,"status":"No objects found"}]}"#
            } else {
                r#"{"results":[{"code":200,"status":"Successfully scheduled downtime"}]}"#
            };
            Ok((200, body.to_string()))
        });

        assert!(matches!(result, Err(TransportError::Api { code: 404, .. })));
        assert_eq!(posted, [1, 2]);
    }

    #[test]
    fn test_transport_error_stops_the_chain() {
        let chain = ApiCommandChain::builder(IcingaApiCommand::new("a", json!({})))
            .then(IcingaApiCommand::new("b", json!({})))
            .build();
        let mut calls = 0;
        let result = run_chain(&chain, |_| {
            calls += 1;
            Err(TransportError::Http("connection refused".into()))
        });
        assert!(matches!(result, Err(TransportError::Http(_))));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_unsupported_command_is_not_sent() {
        use crate::command::DelayNotificationCommand;

        let command = DelayNotificationCommand::new(300).unwrap();
        assert!(matches!(
            transport().send(&command, &Target::host("web"), None),
            Err(TransportError::Render(_))
        ));
    }
}
