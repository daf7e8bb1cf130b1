use std::str::FromStr;
use std::time::Duration;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 浏览器调试端口
    pub browser_debug_port: u16,
    /// 目标URL（没有已打开的 x.com 标签页时新建）
    pub target_url: String,
    /// 操作员设置文件（apiUrl / apiKey / modelName / systemPrompt / isRunning / totalReplies）
    pub settings_path: String,
    /// 输出日志文件
    pub output_log_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 引擎时序参数
    pub timing: EngineTiming,
}

/// 引擎时序参数
///
/// 所有等待、轮询、抖动的取值都集中在这里，测试可以整体替换。
#[derive(Clone, Debug)]
pub struct EngineTiming {
    /// 被动滚动间隔
    pub scroll_interval: Duration,
    /// 被动滚动距离（像素）
    pub scroll_offset: i64,
    /// 队列空闲时的等待基准
    pub idle_delay: Duration,
    /// 队列空闲等待的随机抖动上限
    pub idle_jitter: Duration,
    /// 拉取页面内插入事件的间隔
    pub insertion_poll: Duration,
    /// 等待回复输入框出现的超时
    pub composer_timeout: Duration,
    /// 检查输入框是否出现的间隔
    pub composer_poll: Duration,
    /// 聚焦输入框后、写入文本前的停顿
    pub focus_delay: Duration,
    /// 检查发送按钮是否可用的间隔
    pub enable_poll_interval: Duration,
    /// 检查发送按钮的最大次数
    pub enable_poll_attempts: u32,
    /// 发送成功后的随机等待下限
    pub post_submit_delay_min: Duration,
    /// 发送成功后的随机等待上限
    pub post_submit_delay_max: Duration,
    /// 发送成功后的滚动距离
    pub post_submit_scroll: i64,
    /// 单次 LLM 调用超时
    pub generation_timeout: Duration,
    /// 手动草稿模式下等待输入框的超时
    pub draft_composer_timeout: Duration,
}

impl Default for EngineTiming {
    fn default() -> Self {
        Self {
            scroll_interval: Duration::from_secs(5),
            scroll_offset: 100,
            idle_delay: Duration::from_millis(2000),
            idle_jitter: Duration::from_millis(500),
            insertion_poll: Duration::from_millis(500),
            composer_timeout: Duration::from_secs(5),
            composer_poll: Duration::from_millis(100),
            focus_delay: Duration::from_millis(100),
            enable_poll_interval: Duration::from_millis(500),
            enable_poll_attempts: 10,
            post_submit_delay_min: Duration::from_secs(3),
            post_submit_delay_max: Duration::from_secs(5),
            post_submit_scroll: 400,
            generation_timeout: Duration::from_secs(25),
            draft_composer_timeout: Duration::from_secs(3),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser_debug_port: 9222,
            target_url: "https://x.com/home".to_string(),
            settings_path: "settings.toml".to_string(),
            output_log_file: "output.txt".to_string(),
            verbose_logging: false,
            timing: EngineTiming::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        let timing = default.timing;
        Self {
            browser_debug_port: env_or("BROWSER_DEBUG_PORT", default.browser_debug_port),
            target_url: std::env::var("TARGET_URL").unwrap_or(default.target_url),
            settings_path: std::env::var("SETTINGS_PATH").unwrap_or(default.settings_path),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            verbose_logging: env_or("VERBOSE_LOGGING", default.verbose_logging),
            timing: EngineTiming {
                scroll_interval: env_millis("SCROLL_INTERVAL_MS", timing.scroll_interval),
                scroll_offset: env_or("SCROLL_OFFSET", timing.scroll_offset),
                idle_delay: env_millis("IDLE_DELAY_MS", timing.idle_delay),
                generation_timeout: env_millis("GENERATION_TIMEOUT_MS", timing.generation_timeout),
                ..timing
            },
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_millis(name: &str, default: Duration) -> Duration {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timing_matches_protocol_budget() {
        let timing = EngineTiming::default();
        // 10 次 × 500ms = 5 秒
        assert_eq!(
            timing.enable_poll_interval * timing.enable_poll_attempts,
            Duration::from_secs(5)
        );
        assert_eq!(timing.composer_timeout, Duration::from_secs(5));
        assert_eq!(timing.generation_timeout, Duration::from_secs(25));
        assert!(timing.post_submit_delay_min < timing.post_submit_delay_max);
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        std::env::set_var("FEED_REPLY_TEST_PORT", "not-a-port");
        assert_eq!(env_or("FEED_REPLY_TEST_PORT", 9222u16), 9222);
        std::env::remove_var("FEED_REPLY_TEST_PORT");
    }
}
