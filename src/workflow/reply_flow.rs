//! 回复处理流程 - 流程层
//!
//! 核心职责：定义"一条帖子"的完整回复流程
//!
//! 流程顺序：
//! 1. 定位帖子 → 读取正文（为空则跳过）
//! 2. LLM 生成回复
//! 3. 点击回复按钮 → 等待输入框（5 秒）
//! 4. 写入文本
//! 5. 轮询发送按钮（500ms × 10）→ 发送，或关闭弹窗放弃
//!
//! 任何一步失败即结束本条，不重试。

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::config::EngineTiming;
use crate::error::{AppResult, ProtocolError};
use crate::infrastructure::{FeedPage, SubmitState};
use crate::models::{ContentUnit, GenerationRequest};
use crate::services::{ReplyCounter, ReplyGenerator, SettingsStore};
use crate::utils::{random_delay, truncate_text};
use crate::workflow::in_flight::{InFlight, InFlightPermit};
use crate::workflow::reply_ctx::ReplyCtx;

/// 单条回复结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// 已发送，附带发送后的累计回复数
    Sent { count: u64 },
    /// 帖子没有正文，未做任何操作
    SkippedEmptyText,
}

/// 手动草稿结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftOutcome {
    /// 回复已填入输入框，等待操作员确认发送
    Injected(String),
    /// 输入框没有打开，回复文本直接交给操作员
    Returned(String),
}

/// 回复处理流程
///
/// - 编排单条帖子的交互步骤
/// - 只依赖页面能力（FeedPage）和生成能力（ReplyGenerator）
/// - 不管理队列，不判断是否还在运行
pub struct ReplyFlow {
    page: Arc<dyn FeedPage>,
    generator: Arc<dyn ReplyGenerator>,
    settings: Arc<SettingsStore>,
    counter: ReplyCounter,
    in_flight: Arc<InFlight>,
    timing: EngineTiming,
}

impl ReplyFlow {
    pub fn new(
        page: Arc<dyn FeedPage>,
        generator: Arc<dyn ReplyGenerator>,
        settings: Arc<SettingsStore>,
        counter: ReplyCounter,
        in_flight: Arc<InFlight>,
        timing: EngineTiming,
    ) -> Self {
        Self {
            page,
            generator,
            settings,
            counter,
            in_flight,
            timing,
        }
    }

    /// 自动回复一条帖子
    ///
    /// 调用方必须先拿到进行中许可，许可在流程结束（无论成败）时释放
    pub async fn run(
        &self,
        unit: &ContentUnit,
        ctx: &ReplyCtx,
        _permit: InFlightPermit,
    ) -> AppResult<ReplyOutcome> {
        // ========== 步骤 1: 定位 ==========
        self.page.scroll_into_view(&unit.handle).await?;
        let text = self.page.display_text(&unit.handle).await?;
        let text = text.trim();
        if text.is_empty() {
            debug!("{} 帖子没有正文，跳过", ctx);
            return Ok(ReplyOutcome::SkippedEmptyText);
        }
        info!("{} 📝 正在处理: {}", ctx, truncate_text(text, 20));

        // ========== 步骤 2: 生成 ==========
        let reply = self.generate(text).await?;
        info!("{} 🤖 AI 回复: {}", ctx, reply);

        // 生成期间帖子可能已被页面回收
        if !self.page.is_attached(&unit.handle).await? {
            return Err(ProtocolError::NodeDetached.into());
        }

        // ========== 步骤 3: 打开输入框 ==========
        if !self.page.click_reply(&unit.handle).await? {
            return Err(ProtocolError::ComposerControlMissing.into());
        }
        if !self.wait_for_composer(self.timing.composer_timeout).await? {
            return Err(ProtocolError::InputBoxNotOpen {
                timeout_ms: self.timing.composer_timeout.as_millis() as u64,
            }
            .into());
        }

        // ========== 步骤 4: 写入 ==========
        self.inject(&reply).await?;

        // ========== 步骤 5: 发送 ==========
        if self.click_send_when_enabled().await? {
            let count = self.counter.increment();
            info!("{} ✅ 已发送 (累计 {} 条)", ctx, count);
            random_delay(
                self.timing.post_submit_delay_min,
                self.timing.post_submit_delay_max,
            )
            .await;
            if let Err(e) = self.page.scroll_by(self.timing.post_submit_scroll).await {
                debug!("{} 发送后滚动失败: {}", ctx, e);
            }
            return Ok(ReplyOutcome::Sent { count });
        }

        // 发送按钮一直不可用，尝试关闭弹窗（失败不再上报）
        match self.page.close_composer().await {
            Ok(true) => debug!("{} 已关闭回复弹窗", ctx),
            Ok(false) => debug!("{} 未找到关闭按钮", ctx),
            Err(e) => debug!("{} 关闭回复弹窗失败: {}", ctx, e),
        }
        Err(ProtocolError::SubmitNeverEnabled {
            attempts: self.timing.enable_poll_attempts,
        }
        .into())
    }

    /// 手动草稿：用定位时读到的正文生成回复并填入输入框，不发送
    ///
    /// 与自动流程共用进行中标记，二者不会交错操作输入框
    pub async fn draft(&self, unit: &ContentUnit) -> AppResult<DraftOutcome> {
        let Some(_permit) = self.in_flight.try_begin() else {
            return Err(ProtocolError::Busy.into());
        };

        let reply = self.generate(unit.text.trim()).await?;

        if !self.page.click_reply(&unit.handle).await? {
            return Ok(DraftOutcome::Returned(reply));
        }
        if !self.wait_for_composer(self.timing.draft_composer_timeout).await? {
            warn!("输入框未打开，回复文本直接输出");
            return Ok(DraftOutcome::Returned(reply));
        }
        self.inject(&reply).await?;
        Ok(DraftOutcome::Injected(reply))
    }

    /// 调用生成器
    async fn generate(&self, text: &str) -> AppResult<String> {
        let persona = self.settings.snapshot().persona();
        let request = GenerationRequest::for_post(&persona, text);
        let reply = self
            .generator
            .generate(request)
            .await
            .into_result()
            .map_err(ProtocolError::Generation)?;
        Ok(reply)
    }

    /// 等待输入框出现，超时返回 `false`
    async fn wait_for_composer(&self, timeout: Duration) -> AppResult<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.page.composer_ready().await? {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            sleep(self.timing.composer_poll).await;
        }
    }

    /// 聚焦 → 停顿 → 全选替换
    async fn inject(&self, reply: &str) -> AppResult<()> {
        self.page.focus_composer().await?;
        sleep(self.timing.focus_delay).await;
        self.page.insert_composer_text(reply).await
    }

    /// 轮询发送按钮，可用即点击；次数用完返回 `false`
    async fn click_send_when_enabled(&self) -> AppResult<bool> {
        for attempt in 1..=self.timing.enable_poll_attempts {
            if self.page.submit_state().await? == SubmitState::Enabled
                && self.page.click_submit().await?
            {
                return Ok(true);
            }
            debug!(
                "发送按钮暂不可用 ({}/{})",
                attempt, self.timing.enable_poll_attempts
            );
            sleep(self.timing.enable_poll_interval).await;
        }
        Ok(false)
    }
}
