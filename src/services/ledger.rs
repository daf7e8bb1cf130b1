use std::collections::HashSet;

/// 去重账本
///
/// 记录本次运行期间见过的帖子 ID。只在 Idle → Running 时整体清空，
/// 不会单独淘汰条目；被跳过的帖子（推广、详情页主帖）同样记入。
#[derive(Debug, Default)]
pub struct DeduplicationLedger {
    seen: HashSet<String>,
}

impl DeduplicationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// 记入 ID，返回是否为新 ID
    pub fn add(&mut self, id: impl Into<String>) -> bool {
        self.seen.insert(id.into())
    }

    pub fn clear(&mut self) {
        self.seen.clear();
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
