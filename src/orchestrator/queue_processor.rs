//! 队列处理器
//!
//! Running 期间的协作式循环：队列非空且没有回复在进行时取出队首，
//! 走完整个回复流程后再取下一条。同一时刻只有一个回复流程，
//! 发现速度再快也不会并发操作输入框。

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::EngineTiming;
use crate::infrastructure::FeedPage;
use crate::orchestrator::session::AutomationSession;
use crate::utils::random_delay;
use crate::workflow::{ReplyCtx, ReplyFlow, ReplyOutcome};

/// 处理统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessorStats {
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
    /// 出队时节点已脱离页面
    pub dropped: usize,
}

/// 队列处理器
pub struct QueueProcessor {
    session: Arc<AutomationSession>,
    page: Arc<dyn FeedPage>,
    flow: Arc<ReplyFlow>,
    timing: EngineTiming,
}

impl QueueProcessor {
    pub fn new(
        session: Arc<AutomationSession>,
        page: Arc<dyn FeedPage>,
        flow: Arc<ReplyFlow>,
        timing: EngineTiming,
    ) -> Self {
        Self {
            session,
            page,
            flow,
            timing,
        }
    }

    pub fn spawn(self: &Arc<Self>, epoch: u64) -> JoinHandle<ProcessorStats> {
        let processor = Arc::clone(self);
        tokio::spawn(async move { processor.run(epoch).await })
    }

    /// 处理循环；`epoch` 对应的 Running 结束后在下一次醒来时退出
    pub async fn run(&self, epoch: u64) -> ProcessorStats {
        info!("▶️ 队列处理器启动 (第 {} 次运行)", epoch);
        let mut stats = ProcessorStats::default();
        let mut seq = 0usize;

        while self.session.is_current(epoch) {
            if let Some(permit) = self.session.in_flight().try_begin() {
                if let Some(unit) = self.session.pop_next() {
                    seq += 1;
                    let ctx = ReplyCtx::new(seq, &unit.id);

                    // 节点可能在排队期间被页面回收
                    match self.page.is_attached(&unit.handle).await {
                        Ok(true) => match self.flow.run(&unit, &ctx, permit).await {
                            Ok(ReplyOutcome::Sent { .. }) => stats.sent += 1,
                            Ok(ReplyOutcome::SkippedEmptyText) => stats.skipped += 1,
                            Err(e) => {
                                stats.failed += 1;
                                if e.is_item_local() {
                                    warn!("{} ⚠️ 已放弃: {}", ctx, e);
                                } else {
                                    error!("{} ❌ 已放弃: {}", ctx, e);
                                }
                            }
                        },
                        Ok(false) => {
                            stats.dropped += 1;
                            debug!("{} 节点已脱离页面，丢弃", ctx);
                        }
                        Err(e) => {
                            stats.dropped += 1;
                            warn!("{} 无法确认节点状态，丢弃: {}", ctx, e);
                        }
                    }
                }
            }

            random_delay(
                self.timing.idle_delay,
                self.timing.idle_delay + self.timing.idle_jitter,
            )
            .await;
        }

        log_final_stats(epoch, &stats);
        stats
    }
}

fn log_final_stats(epoch: u64, stats: &ProcessorStats) {
    info!("{}", "─".repeat(60));
    info!("⏹ 队列处理器退出 (第 {} 次运行)", epoch);
    info!(
        "✅ 发送: {}  ⏭ 跳过: {}  ❌ 失败: {}  🗑 丢弃: {}",
        stats.sent, stats.skipped, stats.failed, stats.dropped
    );
    info!("{}", "─".repeat(60));
}
