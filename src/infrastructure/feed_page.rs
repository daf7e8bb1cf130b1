//! 信息流页面能力接口
//!
//! 引擎中唯一接触 DOM 的边界。CDP 实现见 `ChromeFeedPage`，
//! 测试使用脚本化的内存实现。

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, Stream};
use serde::Deserialize;
use tracing::warn;

use crate::error::AppResult;
use crate::models::{InsertedSubtree, NodeHandle, PageLocation, RawCandidate};

/// 发送按钮状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitState {
    /// 找不到发送按钮
    Missing,
    /// 按钮存在但不可用（`disabled` 或 `aria-disabled="true"`）
    Disabled,
    Enabled,
}

/// 信息流页面
///
/// 所有方法都是单步操作，不做等待和重试；轮询与超时由调用方负责。
#[async_trait]
pub trait FeedPage: Send + Sync {
    /// 当前完整 URL
    async fn current_url(&self) -> AppResult<String>;

    /// 当前路径
    async fn location(&self) -> AppResult<PageLocation>;

    /// 安装插入监听（重复安装无副作用）
    async fn install_watch(&self) -> AppResult<()>;

    /// 断开插入监听并清空未读事件
    async fn remove_watch(&self) -> AppResult<()>;

    /// 取走自上次调用以来的所有插入事件
    async fn drain_insertions(&self) -> AppResult<Vec<InsertedSubtree>>;

    async fn scroll_by(&self, dy: i64) -> AppResult<()>;

    /// 按帖子 ID 在当前页面查找帖子
    async fn locate_post(&self, id: &str) -> AppResult<Option<RawCandidate>>;

    /// 节点是否仍挂在页面上
    async fn is_attached(&self, handle: &NodeHandle) -> AppResult<bool>;

    async fn scroll_into_view(&self, handle: &NodeHandle) -> AppResult<()>;

    /// 帖子当前显示的正文，找不到时为空串
    async fn display_text(&self, handle: &NodeHandle) -> AppResult<String>;

    /// 点击帖子的回复按钮；按钮不存在时返回 `false`
    async fn click_reply(&self, handle: &NodeHandle) -> AppResult<bool>;

    /// 回复输入框是否已出现
    async fn composer_ready(&self) -> AppResult<bool>;

    async fn focus_composer(&self) -> AppResult<()>;

    /// 全选并替换输入框内容，然后派发 change 事件
    async fn insert_composer_text(&self, text: &str) -> AppResult<()>;

    async fn submit_state(&self) -> AppResult<SubmitState>;

    /// 点击发送；按钮不存在时返回 `false`
    async fn click_submit(&self) -> AppResult<bool>;

    /// 关闭回复弹窗；关闭按钮不存在时返回 `false`
    async fn close_composer(&self) -> AppResult<bool>;
}

/// 子树插入事件流
///
/// 每隔 `poll` 拉取一次页面端缓存的事件，逐个产出。
/// 流是无限的、不可重启的；拉取失败只记录日志，不会结束流。
pub fn insertion_stream(
    page: Arc<dyn FeedPage>,
    poll: Duration,
) -> impl Stream<Item = InsertedSubtree> + Send {
    stream::unfold(
        (page, VecDeque::<InsertedSubtree>::new()),
        move |(page, mut pending)| async move {
            loop {
                if let Some(next) = pending.pop_front() {
                    return Some((next, (page, pending)));
                }
                tokio::time::sleep(poll).await;
                match page.drain_insertions().await {
                    Ok(batch) => pending.extend(batch),
                    Err(e) => warn!("拉取页面插入事件失败: {}", e),
                }
            }
        },
    )
}
