//! 帖子（内容单元）模型
//!
//! 帖子的身份是从 permalink 中提取的 `id`；页面节点只通过一个弱句柄引用，
//! 每次使用前都要重新确认它还挂在页面上。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 页面节点句柄
///
/// 页面驱动给每个候选帖子节点打上的标记值。节点可能随时被页面回收，
/// 句柄本身不保证有效。
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeHandle(String);

impl NodeHandle {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 页面端采集到的原始候选帖子（尚未过滤）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCandidate {
    pub handle: NodeHandle,
    /// 第一个包含 `/status/` 的链接
    #[serde(default)]
    pub permalink: Option<String>,
    /// 整个帖子节点的可见文本（用于识别推广）
    #[serde(default)]
    pub inner_text: String,
    /// 帖子正文
    #[serde(default)]
    pub text: String,
}

/// 一次子树插入事件：某个新插入节点本身及其后代中的所有候选帖子
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsertedSubtree {
    pub candidates: Vec<RawCandidate>,
}

impl InsertedSubtree {
    pub fn new(candidates: Vec<RawCandidate>) -> Self {
        Self { candidates }
    }
}

/// 帖子（内容单元）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentUnit {
    /// 稳定 ID，非空
    pub id: String,
    /// 页面节点句柄（弱引用）
    pub handle: NodeHandle,
    /// 发现时的正文
    pub text: String,
    pub is_sponsored: bool,
    /// 是否为当前详情页正在查看的主帖
    pub is_detail_view_subject: bool,
}

impl ContentUnit {
    /// 是否可以进入回复队列
    pub fn is_eligible(&self) -> bool {
        !self.is_sponsored && !self.is_detail_view_subject
    }
}

/// 从 permalink 中提取帖子 ID
///
/// `https://x.com/alice/status/1789/photo/1` → `1789`
pub fn extract_status_id(permalink: &str) -> Option<String> {
    let tail = permalink.split("/status/").nth(1)?;
    let id = tail.split(['/', '?', '#']).next()?.trim();
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}
