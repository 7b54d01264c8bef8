//! 日志输出初始化

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 根据 `-v` 的次数返回默认日志级别
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// 安装全局subscriber。`RUST_LOG` 优先于 `verbosity`。日志写到stderr, 不与REPL输出混在一起。
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));
    // 重复初始化时保留第一个subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}
