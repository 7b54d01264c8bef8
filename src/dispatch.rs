//! 把一个操作尽力分发到多个选中的对象
//!
//! 每个对象有自己的命令。单个对象失败时记录日志和错误, 其余对象继续执行。

use thiserror::Error;
use tracing::{error, info, warn};

use crate::command::{Command, CommandError, MonitoredObject};
use crate::transport::{CommandTransport, TransportError};

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("can't build command: {0}")]
    Build(#[from] CommandError),
    #[error("can't send command: {0}")]
    Send(#[from] TransportError),
}

#[derive(Debug)]
pub struct DispatchFailure {
    pub object: MonitoredObject,
    pub error: DispatchError,
}

#[derive(Debug, Default)]
pub struct DispatchReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failures: Vec<DispatchFailure>,
}

impl DispatchReport {
    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// 用 `build` 为每个对象构造命令并通过 `transport` 发送。不会失败, 错误见返回的报告
pub fn dispatch<C, F>(transport: &dyn CommandTransport, objects: &[MonitoredObject], mut build: F) -> DispatchReport
where
    C: Command,
    F: FnMut(&MonitoredObject) -> Result<C, CommandError>,
{
    let mut report = DispatchReport::default();
    for object in objects {
        report.attempted += 1;
        let result = build(object)
            .map_err(DispatchError::from)
            .and_then(|command| {
                transport
                    .send(&command, &object.target(), object.instance.as_deref())
                    .map_err(DispatchError::from)
            });
        match result {
            Ok(()) => report.succeeded += 1,
            Err(e) => {
                error!(object = %object.target(), error = %e, "failed to dispatch command");
                report.failures.push(DispatchFailure {
                    object: object.clone(),
                    error: e,
                });
            }
        }
    }
    report
}

/// 接收操作对用户可见的结果
pub trait NotificationSink {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// 把通知写入日志而不是显示
#[derive(Debug, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn success(&self, message: &str) {
        info!("{}", message);
    }

    fn error(&self, message: &str) {
        error!("{}", message);
    }
}

/// 用一条复数形式的成功消息报告操作, 例如 `Sent 3 acknowledgements`,
/// 即使部分对象失败也是如此。失败只写日志。没有选中对象时不报告。
pub fn notify(report: &DispatchReport, sink: &dyn NotificationSink, noun: &str) {
    if report.attempted == 0 {
        return;
    }
    if !report.failures.is_empty() {
        warn!(
            failed = report.failures.len(),
            attempted = report.attempted,
            "some commands could not be dispatched"
        );
    }
    let noun = if report.attempted == 1 {
        noun.to_string()
    } else {
        format!("{}s", noun)
    };
    sink.success(&format!("Sent {} {}", report.attempted, noun));
}
