//! 自动化会话
//!
//! 运行状态、去重账本、待回复队列集中在一个结构里，由控制器独占修改权；
//! 其他组件只持有 `Arc` 句柄。锁只在不跨 await 的短临界区内持有。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::models::ContentUnit;
use crate::services::{admit, Admission, DeduplicationLedger, WorkQueue};
use crate::workflow::InFlight;

/// 自动化状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomationState {
    Idle,
    Running,
}

/// 自动化会话
#[derive(Debug)]
pub struct AutomationSession {
    state: watch::Sender<AutomationState>,
    /// 每次进入 Running 加 1；队列处理器据此判断自己是否已过期
    epoch: AtomicU64,
    ledger: Mutex<DeduplicationLedger>,
    queue: Mutex<WorkQueue>,
    in_flight: Arc<InFlight>,
}

impl AutomationSession {
    pub fn new() -> Arc<Self> {
        let (state, _) = watch::channel(AutomationState::Idle);
        Arc::new(Self {
            state,
            epoch: AtomicU64::new(0),
            ledger: Mutex::new(DeduplicationLedger::new()),
            queue: Mutex::new(WorkQueue::new()),
            in_flight: InFlight::new(),
        })
    }

    pub fn state(&self) -> AutomationState {
        *self.state.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.state() == AutomationState::Running
    }

    pub fn subscribe(&self) -> watch::Receiver<AutomationState> {
        self.state.subscribe()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    /// 仍处于 `epoch` 开启的那一段 Running 中
    pub fn is_current(&self, epoch: u64) -> bool {
        self.is_running() && self.epoch() == epoch
    }

    pub fn in_flight(&self) -> &Arc<InFlight> {
        &self.in_flight
    }

    /// Idle → Running：清空账本与队列，返回新的 epoch
    pub(crate) fn begin(&self) -> u64 {
        self.ledger().clear();
        self.queue().clear();
        let epoch = self.epoch.fetch_add(1, Ordering::AcqRel) + 1;
        self.state.send_replace(AutomationState::Running);
        epoch
    }

    /// Running → Idle
    pub(crate) fn end(&self) {
        self.state.send_replace(AutomationState::Idle);
    }

    /// 对一个已提取的帖子做入队判定
    pub fn admit(&self, unit: ContentUnit) -> Admission {
        let mut ledger = self.ledger();
        let mut queue = self.queue();
        admit(unit, &mut ledger, &mut queue)
    }

    pub fn pop_next(&self) -> Option<ContentUnit> {
        self.queue().pop()
    }

    pub fn has_seen(&self, id: &str) -> bool {
        self.ledger().has(id)
    }

    pub fn seen_count(&self) -> usize {
        self.ledger().len()
    }

    pub fn queue_len(&self) -> usize {
        self.queue().len()
    }

    pub fn queued_ids(&self) -> Vec<String> {
        self.queue().ids()
    }

    fn ledger(&self) -> MutexGuard<'_, DeduplicationLedger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn queue(&self) -> MutexGuard<'_, WorkQueue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
