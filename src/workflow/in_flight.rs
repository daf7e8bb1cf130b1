use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 回复进行中标记
///
/// 同一时刻只允许一个回复流程操作输入框。许可在 drop 时自动释放。
#[derive(Debug, Default)]
pub struct InFlight {
    busy: AtomicBool,
}

impl InFlight {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// 尝试获取许可；已有流程在进行时返回 `None`
    pub fn try_begin(self: &Arc<Self>) -> Option<InFlightPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightPermit {
                owner: Arc::clone(self),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// 回复许可
#[derive(Debug)]
pub struct InFlightPermit {
    owner: Arc<InFlight>,
}

impl Drop for InFlightPermit {
    fn drop(&mut self) {
        self.owner.busy.store(false, Ordering::Release);
    }
}
