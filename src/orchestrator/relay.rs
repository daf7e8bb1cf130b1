//! 指令中继
//!
//! 操作员指令到引擎的唯一通道：
//! - 握手完成前拒绝投递
//! - 只接受 x.com / twitter.com 页面
//! - 每条指令先写入设置，再切换引擎状态；投递失败时回滚 `isRunning`

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{AppResult, RelayError};
use crate::infrastructure::FeedPage;
use crate::models::StartStopCommand;
use crate::orchestrator::controller::AutomationController;
use crate::services::{ReplyCounter, SettingsStore};

/// 支持的站点
pub const SUPPORTED_HOSTS: &[&str] = &["x.com", "twitter.com"];

/// 页面 URL 是否属于支持的站点
pub fn is_supported_url(url: &str) -> bool {
    SUPPORTED_HOSTS
        .iter()
        .any(|host| url.starts_with(&format!("https://{}/", host)))
}

/// 指令中继
pub struct CommandRelay {
    controller: Arc<AutomationController>,
    settings: Arc<SettingsStore>,
    counter: ReplyCounter,
    page: Arc<dyn FeedPage>,
    ready: AtomicBool,
}

impl CommandRelay {
    pub fn new(
        controller: Arc<AutomationController>,
        settings: Arc<SettingsStore>,
        counter: ReplyCounter,
        page: Arc<dyn FeedPage>,
    ) -> Self {
        Self {
            controller,
            settings,
            counter,
            page,
            ready: AtomicBool::new(false),
        }
    }

    /// 就绪握手：引擎已加载，可以接收指令
    pub fn handshake(&self) {
        self.ready.store(true, Ordering::Release);
        debug!("指令中继握手完成");
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// 用当前设置构造一条启动 / 停止指令
    pub fn command_from_settings(&self, running: bool) -> AppResult<StartStopCommand> {
        let settings = self.settings.reload()?;
        Ok(StartStopCommand {
            running,
            api_url: settings.api_url,
            api_key: settings.api_key,
            model: settings.model_name,
            system_prompt: settings.system_prompt,
        })
    }

    /// 投递指令
    pub async fn dispatch(&self, command: StartStopCommand) -> Result<(), RelayError> {
        let was_running = self.settings.snapshot().is_running;
        // 操作员从停止切到启动时计数归零
        let reset_count = command.running && !was_running;

        let persisted = self.settings.update(|s| {
            s.api_url = command.api_url.trim().to_string();
            s.api_key = command.api_key.trim().to_string();
            if !command.model.trim().is_empty() {
                s.model_name = command.model.trim().to_string();
            }
            s.system_prompt = command.system_prompt.trim().to_string();
            s.is_running = command.running;
            if reset_count {
                s.total_replies = 0;
            }
        });
        if let Err(e) = persisted {
            warn!("保存设置失败: {}", e);
        }
        if reset_count {
            self.counter.announce();
        }

        let result = self.deliver(command.running).await;
        if let Err(e) = &result {
            warn!("指令投递失败: {}", e);
            if let Err(e) = self.settings.update(|s| s.is_running = false) {
                warn!("回滚运行状态失败: {}", e);
            }
        }
        result
    }

    /// 启动时恢复上次的运行状态
    pub async fn resume_persisted(&self) -> Result<bool, RelayError> {
        if !self.settings.snapshot().is_running {
            return Ok(false);
        }
        info!("🔁 检测到上次处于运行状态，自动恢复");
        let result = self.deliver(true).await;
        if result.is_err() {
            if let Err(e) = self.settings.update(|s| s.is_running = false) {
                warn!("回滚运行状态失败: {}", e);
            }
        }
        result.map(|_| true)
    }

    async fn deliver(&self, running: bool) -> Result<(), RelayError> {
        if !self.is_ready() {
            return Err(RelayError::NotConnected);
        }

        let url = self
            .page
            .current_url()
            .await
            .map_err(|e| RelayError::Unreachable(e.to_string()))?;
        if !is_supported_url(&url) {
            return Err(RelayError::UnsupportedPage { url });
        }

        if running {
            self.controller
                .start()
                .await
                .map_err(|e| RelayError::StartFailed(e.to_string()))?;
        } else {
            self.controller.stop().await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_urls() {
        assert!(is_supported_url("https://x.com/home"));
        assert!(is_supported_url("https://twitter.com/alice/status/1"));
        assert!(!is_supported_url("https://example.com/x.com/"));
        assert!(!is_supported_url("http://x.com/home"));
    }
}
