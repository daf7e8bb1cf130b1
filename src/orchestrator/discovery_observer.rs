//! 发现观察器
//!
//! 把页面的子树插入事件交给提取器并入队，同时按固定间隔被动滚动，
//! 促使页面自己加载更多内容。

use std::sync::{Arc, Mutex, PoisonError};

use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::EngineTiming;
use crate::error::AppResult;
use crate::infrastructure::{insertion_stream, FeedPage};
use crate::models::InsertedSubtree;
use crate::orchestrator::session::AutomationSession;
use crate::services::{Admission, CandidateExtractor, ReplyCounter};

/// 发现观察器
pub struct DiscoveryObserver {
    page: Arc<dyn FeedPage>,
    session: Arc<AutomationSession>,
    extractor: Arc<CandidateExtractor>,
    counter: ReplyCounter,
    timing: EngineTiming,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl DiscoveryObserver {
    pub fn new(
        page: Arc<dyn FeedPage>,
        session: Arc<AutomationSession>,
        extractor: Arc<CandidateExtractor>,
        counter: ReplyCounter,
        timing: EngineTiming,
    ) -> Self {
        Self {
            page,
            session,
            extractor,
            counter,
            timing,
            task: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// 安装页面监听并启动观察任务；已在运行时什么都不做
    pub async fn start(&self) -> AppResult<()> {
        if self.is_running() {
            return Ok(());
        }

        self.page.install_watch().await?;

        let worker = ObserverWorker {
            page: Arc::clone(&self.page),
            session: Arc::clone(&self.session),
            extractor: Arc::clone(&self.extractor),
            counter: self.counter.clone(),
            timing: self.timing.clone(),
        };
        let handle = tokio::spawn(worker.run());
        *self.task.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);

        info!(
            "👀 开始监听信息流 (每 {:?} 滚动 {}px)",
            self.timing.scroll_interval, self.timing.scroll_offset
        );
        Ok(())
    }

    /// 停止观察任务（同时取消滚动定时）并断开页面监听
    pub async fn stop(&self) {
        let task = self.task.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(task) = task {
            task.abort();
        }
        if let Err(e) = self.page.remove_watch().await {
            warn!("断开页面监听失败: {}", e);
        }
        info!("🛑 已停止监听信息流");
    }
}

/// 观察任务本体
struct ObserverWorker {
    page: Arc<dyn FeedPage>,
    session: Arc<AutomationSession>,
    extractor: Arc<CandidateExtractor>,
    counter: ReplyCounter,
    timing: EngineTiming,
}

impl ObserverWorker {
    async fn run(self) {
        let insertions = insertion_stream(Arc::clone(&self.page), self.timing.insertion_poll);
        tokio::pin!(insertions);

        let mut scroll = interval_at(
            Instant::now() + self.timing.scroll_interval,
            self.timing.scroll_interval,
        );
        scroll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                Some(subtree) = insertions.next() => self.handle_insertion(subtree).await,
                _ = scroll.tick() => {
                    if let Err(e) = self.page.scroll_by(self.timing.scroll_offset).await {
                        debug!("被动滚动失败: {}", e);
                    }
                }
            }
        }
    }

    async fn handle_insertion(&self, subtree: InsertedSubtree) {
        let location = match self.page.location().await {
            Ok(location) => location,
            Err(e) => {
                warn!("读取页面位置失败，丢弃本次插入事件: {}", e);
                return;
            }
        };

        let mut queued = 0usize;
        for unit in self.extractor.extract(&subtree, &location) {
            let id = unit.id.clone();
            match self.session.admit(unit) {
                Admission::Queued => queued += 1,
                Admission::Sponsored => debug!("跳过推广帖: {}", id),
                Admission::DetailViewSubject => debug!("跳过详情页主帖: {}", id),
                Admission::AlreadySeen => {}
            }
        }

        if queued > 0 {
            info!(
                "📥 新入队 {} 条 (队列 {} 条)",
                queued,
                self.session.queue_len()
            );
            self.counter.announce();
        }
    }
}
