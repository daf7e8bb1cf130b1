//! 自动化控制器
//!
//! 顶层状态机：Idle ⇄ Running

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::AppResult;
use crate::orchestrator::discovery_observer::DiscoveryObserver;
use crate::orchestrator::queue_processor::{ProcessorStats, QueueProcessor};
use crate::orchestrator::session::{AutomationSession, AutomationState};

/// 自动化控制器
///
/// 唯一可以切换会话状态的组件
pub struct AutomationController {
    session: Arc<AutomationSession>,
    observer: DiscoveryObserver,
    processor: Arc<QueueProcessor>,
    /// 最近一次启动的处理循环；同时串行化 start / stop
    processor_task: Mutex<Option<JoinHandle<ProcessorStats>>>,
}

impl AutomationController {
    pub fn new(
        session: Arc<AutomationSession>,
        observer: DiscoveryObserver,
        processor: Arc<QueueProcessor>,
    ) -> Self {
        Self {
            session,
            observer,
            processor,
            processor_task: Mutex::new(None),
        }
    }

    pub fn session(&self) -> &Arc<AutomationSession> {
        &self.session
    }

    pub fn state(&self) -> AutomationState {
        self.session.state()
    }

    pub fn is_running(&self) -> bool {
        self.session.is_running()
    }

    /// 启动：清空账本，启动观察器与处理循环
    ///
    /// 已在运行时返回 `Ok(false)`
    pub async fn start(&self) -> AppResult<bool> {
        let mut task = self.processor_task.lock().await;
        if self.session.is_running() {
            return Ok(false);
        }

        let epoch = self.session.begin();
        if let Err(e) = self.observer.start().await {
            self.session.end();
            return Err(e);
        }
        *task = Some(self.processor.spawn(epoch));

        info!("🚀 自动回复已启动");
        Ok(true)
    }

    /// 停止：不再开始新的回复；进行中的回复会走完
    ///
    /// 已停止时返回 `false`
    pub async fn stop(&self) -> bool {
        let _task = self.processor_task.lock().await;
        if !self.session.is_running() {
            return false;
        }

        self.session.end();
        self.observer.stop().await;

        info!("🛑 自动回复已停止");
        true
    }

    /// 等待最近一次的处理循环退出（需先 `stop`）
    pub async fn wait_processor(&self) -> Option<ProcessorStats> {
        let handle = self.processor_task.lock().await.take()?;
        match handle.await {
            Ok(stats) => Some(stats),
            Err(e) => {
                warn!("队列处理器异常退出: {}", e);
                None
            }
        }
    }
}
