//! 基于 CDP 的信息流页面实现

use async_trait::async_trait;

use crate::error::AppResult;
use crate::infrastructure::feed_page::{FeedPage, SubmitState};
use crate::infrastructure::scripts;
use crate::infrastructure::JsExecutor;
use crate::models::{InsertedSubtree, NodeHandle, PageLocation, RawCandidate};

/// 通过 `JsExecutor` 在真实标签页中执行页面脚本
pub struct ChromeFeedPage {
    executor: JsExecutor,
}

impl ChromeFeedPage {
    pub fn new(executor: JsExecutor) -> Self {
        Self { executor }
    }

    async fn eval_bool(&self, js: String) -> AppResult<bool> {
        self.executor.eval_as::<bool>(js).await
    }
}

#[async_trait]
impl FeedPage for ChromeFeedPage {
    async fn current_url(&self) -> AppResult<String> {
        self.executor.eval_as(scripts::current_url()).await
    }

    async fn location(&self) -> AppResult<PageLocation> {
        let path: String = self.executor.eval_as(scripts::current_path()).await?;
        Ok(PageLocation::new(path))
    }

    async fn install_watch(&self) -> AppResult<()> {
        self.eval_bool(scripts::install_watch()).await?;
        Ok(())
    }

    async fn remove_watch(&self) -> AppResult<()> {
        self.eval_bool(scripts::remove_watch()).await?;
        Ok(())
    }

    async fn drain_insertions(&self) -> AppResult<Vec<InsertedSubtree>> {
        self.executor.eval_as(scripts::drain_insertions()).await
    }

    async fn scroll_by(&self, dy: i64) -> AppResult<()> {
        self.eval_bool(scripts::scroll_by(dy)).await?;
        Ok(())
    }

    async fn locate_post(&self, id: &str) -> AppResult<Option<RawCandidate>> {
        let found: Vec<RawCandidate> = self.executor.eval_as(scripts::locate_post(id)).await?;
        Ok(found.into_iter().next())
    }

    async fn is_attached(&self, handle: &NodeHandle) -> AppResult<bool> {
        self.eval_bool(scripts::is_attached(handle)).await
    }

    async fn scroll_into_view(&self, handle: &NodeHandle) -> AppResult<()> {
        self.eval_bool(scripts::scroll_into_view(handle)).await?;
        Ok(())
    }

    async fn display_text(&self, handle: &NodeHandle) -> AppResult<String> {
        self.executor.eval_as(scripts::display_text(handle)).await
    }

    async fn click_reply(&self, handle: &NodeHandle) -> AppResult<bool> {
        self.eval_bool(scripts::click_reply(handle)).await
    }

    async fn composer_ready(&self) -> AppResult<bool> {
        self.eval_bool(scripts::composer_ready()).await
    }

    async fn focus_composer(&self) -> AppResult<()> {
        self.eval_bool(scripts::focus_composer()).await?;
        Ok(())
    }

    async fn insert_composer_text(&self, text: &str) -> AppResult<()> {
        self.eval_bool(scripts::insert_composer_text(text)).await?;
        Ok(())
    }

    async fn submit_state(&self) -> AppResult<SubmitState> {
        self.executor.eval_as(scripts::submit_state()).await
    }

    async fn click_submit(&self) -> AppResult<bool> {
        self.eval_bool(scripts::click_submit()).await
    }

    async fn close_composer(&self) -> AppResult<bool> {
        self.eval_bool(scripts::close_composer()).await
    }
}
