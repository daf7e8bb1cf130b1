//! 引擎装配
//!
//! 把会话、观察器、处理器、回复流程和指令中继按依赖顺序组装起来。
//! 页面与生成器都以 trait 对象注入，测试可以替换成脚本化实现。

use std::sync::Arc;

use tracing::info;

use crate::config::EngineTiming;
use crate::error::{AppResult, ProtocolError};
use crate::infrastructure::FeedPage;
use crate::models::ContentUnit;
use crate::orchestrator::controller::AutomationController;
use crate::orchestrator::discovery_observer::DiscoveryObserver;
use crate::orchestrator::queue_processor::QueueProcessor;
use crate::orchestrator::relay::CommandRelay;
use crate::orchestrator::session::AutomationSession;
use crate::services::{
    CandidateExtractor, ReplyCounter, ReplyGenerator, SettingsStore, StatusReporter,
};
use crate::workflow::{DraftOutcome, ReplyFlow};

/// 组装完成的引擎
pub struct Engine {
    pub session: Arc<AutomationSession>,
    pub controller: Arc<AutomationController>,
    pub relay: Arc<CommandRelay>,
    pub flow: Arc<ReplyFlow>,
    pub settings: Arc<SettingsStore>,
    pub counter: ReplyCounter,
    pub reporter: StatusReporter,
    pub page: Arc<dyn FeedPage>,
}

impl Engine {
    pub fn assemble(
        page: Arc<dyn FeedPage>,
        generator: Arc<dyn ReplyGenerator>,
        settings: Arc<SettingsStore>,
        reporter: StatusReporter,
        timing: EngineTiming,
    ) -> Self {
        let session = AutomationSession::new();
        let counter = ReplyCounter::new(Arc::clone(&settings), reporter.clone());

        let flow = Arc::new(ReplyFlow::new(
            Arc::clone(&page),
            generator,
            Arc::clone(&settings),
            counter.clone(),
            Arc::clone(session.in_flight()),
            timing.clone(),
        ));

        let observer = DiscoveryObserver::new(
            Arc::clone(&page),
            Arc::clone(&session),
            Arc::new(CandidateExtractor::default()),
            counter.clone(),
            timing.clone(),
        );

        let processor = Arc::new(QueueProcessor::new(
            Arc::clone(&session),
            Arc::clone(&page),
            Arc::clone(&flow),
            timing,
        ));

        let controller = Arc::new(AutomationController::new(
            Arc::clone(&session),
            observer,
            processor,
        ));

        let relay = Arc::new(CommandRelay::new(
            Arc::clone(&controller),
            Arc::clone(&settings),
            counter.clone(),
            Arc::clone(&page),
        ));

        Self {
            session,
            controller,
            relay,
            flow,
            settings,
            counter,
            reporter,
            page,
        }
    }

    /// 手动草稿：为页面上指定 ID 的帖子生成回复并填入输入框
    ///
    /// 自动回复运行期间拒绝执行；页面上找不到该帖子时返回 `Ok(None)`
    pub async fn draft(&self, post_id: &str) -> AppResult<Option<DraftOutcome>> {
        if self.session.is_running() {
            return Err(ProtocolError::Busy.into());
        }
        let Some(raw) = self.page.locate_post(post_id).await? else {
            return Ok(None);
        };
        info!("✍️ 为帖子 #{} 生成草稿", post_id);

        let unit = ContentUnit {
            id: post_id.to_string(),
            handle: raw.handle,
            text: raw.text,
            is_sponsored: false,
            is_detail_view_subject: false,
        };
        self.flow.draft(&unit).await.map(Some)
    }

    /// 停止并等待进行中的回复结束
    pub async fn shutdown(&self) {
        self.controller.stop().await;
        self.controller.wait_processor().await;
    }
}
