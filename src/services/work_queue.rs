use std::collections::VecDeque;

use crate::models::ContentUnit;

/// 待回复队列：先进先出、无上限、只在内存中
#[derive(Debug, Default)]
pub struct WorkQueue {
    items: VecDeque<ContentUnit>,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, unit: ContentUnit) {
        self.items.push_back(unit);
    }

    pub fn pop(&mut self) -> Option<ContentUnit> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// 队列中的 ID（按出队顺序）
    pub fn ids(&self) -> Vec<String> {
        self.items.iter().map(|u| u.id.clone()).collect()
    }
}
