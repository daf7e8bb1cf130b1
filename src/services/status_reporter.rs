use serde::Serialize;
use tokio::sync::broadcast;

/// 计数通知
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountUpdate {
    pub count: u64,
}

/// 对外状态通知
///
/// 发出即忘：没有订阅者或订阅者落后时直接丢弃
#[derive(Debug, Clone)]
pub struct StatusReporter {
    tx: broadcast::Sender<CountUpdate>,
}

impl StatusReporter {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CountUpdate> {
        self.tx.subscribe()
    }

    pub fn publish(&self, count: u64) {
        let _ = self.tx.send(CountUpdate { count });
    }
}

impl Default for StatusReporter {
    fn default() -> Self {
        Self::new(64)
    }
}
