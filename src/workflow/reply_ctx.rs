//! 回复处理上下文
//!
//! 封装"这是本次运行中的第几条、哪个帖子"这一信息，只用于日志

use std::fmt::Display;

/// 回复处理上下文
#[derive(Debug, Clone)]
pub struct ReplyCtx {
    /// 本次运行中的序号（从1开始）
    pub seq: usize,

    /// 帖子ID
    pub post_id: String,
}

impl ReplyCtx {
    pub fn new(seq: usize, post_id: impl Into<String>) -> Self {
        Self {
            seq,
            post_id: post_id.into(),
        }
    }
}

impl Display for ReplyCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[回复 #{} 帖子#{}]", self.seq, self.post_id)
    }
}
