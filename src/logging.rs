//! 日志初始化
//!
//! 终端被 TUI 占用，日志写到数据目录下的 corkboard.log。

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

pub const LOG_ENV: &str = "CORKBOARD_LOG";
const LOG_FILE: &str = "corkboard.log";

/// 环境变量优先，其次是配置里的过滤规则
fn build_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// 返回的 guard 必须活到程序结束，否则缓冲中的日志会丢失
pub fn init(dir: &Path, filter: &str) -> Result<WorkerGuard, AppError> {
    let appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(build_filter(filter))
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))?;

    Ok(guard)
}

