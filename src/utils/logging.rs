use anyhow::Result;
/// 日志工具模块
///
/// 负责初始化 tracing 输出（终端 + 日志文件）以及常用的日志格式化辅助函数
use std::fs::{self, OpenOptions};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// 初始化日志
///
/// 终端输出带颜色，同时以追加方式写入 `log_file_path`。
/// 级别由 `RUST_LOG` 控制，默认 `info`（`verbose` 时为 `debug`）。
pub fn init(log_file_path: Option<&str>, verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let file_layer = match log_file_path {
        Some(path) => {
            init_log_file(path)?;
            let file = OpenOptions::new().append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    // 重复初始化（测试中常见）时忽略错误
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .try_init();

    Ok(())
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n自动回复日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(port: u16, settings_path: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 信息流自动回复模式");
    info!("🔌 浏览器调试端口: {}", port);
    info!("⚙️ 设置文件: {}", settings_path);
    info!("{}", "=".repeat(60));
}

/// 打印可用的控制台指令
pub fn log_console_help() {
    info!("💡 可用指令: start | stop | status | draft <帖子ID> | quit");
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_counts_chars_not_bytes() {
        assert_eq!(truncate_text("你好世界", 2), "你好...");
        assert_eq!(truncate_text("short", 10), "short");
    }
}
