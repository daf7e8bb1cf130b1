//! 集成测试用的脚本化页面与生成器

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use feed_reply::config::EngineTiming;
use feed_reply::error::{AppResult, LlmError};
use feed_reply::infrastructure::{FeedPage, SubmitState};
use feed_reply::models::{
    ChatRole, GenerationRequest, GenerationResponse, InsertedSubtree, NodeHandle, PageLocation,
    RawCandidate,
};
use feed_reply::orchestrator::Engine;
use feed_reply::services::{ChatBackend, ReplyGenerator, Settings, SettingsStore, StatusReporter};

/// 单条帖子在页面上的表现
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Normal,
    /// 没有回复按钮
    NoReplyControl,
    /// 点击回复后输入框一直不出现
    ComposerNeverOpens,
    /// 发送按钮一直不可用
    SubmitNeverEnabled,
}

#[derive(Debug, Clone)]
struct ScriptedPost {
    id: String,
    text: String,
    inner_text: String,
    behavior: Behavior,
    attached: bool,
}

#[derive(Debug, Default)]
struct PageState {
    url: String,
    watching: bool,
    pending: Vec<InsertedSubtree>,
    posts: HashMap<NodeHandle, ScriptedPost>,
    /// 插入顺序
    order: Vec<NodeHandle>,
    composer_for: Option<NodeHandle>,
    composer_text: String,
    injected: Vec<String>,
    submitted: Vec<(String, String)>,
    reply_clicks: Vec<String>,
    close_attempts: usize,
    submit_state_calls: usize,
    /// 输入框尚未关闭时又点击了回复
    overlapping_opens: usize,
    scrolls: Vec<i64>,
}

/// 脚本化的信息流页面
#[derive(Debug, Clone)]
pub struct ScriptedPage {
    state: Arc<Mutex<PageState>>,
}

pub fn handle_for(id: &str) -> NodeHandle {
    NodeHandle::new(format!("h-{}", id))
}

impl ScriptedPage {
    pub fn new(url: &str) -> Self {
        Self {
            state: Arc::new(Mutex::new(PageState {
                url: url.to_string(),
                ..Default::default()
            })),
        }
    }

    pub fn home() -> Self {
        Self::new("https://x.com/home")
    }

    fn state(&self) -> std::sync::MutexGuard<'_, PageState> {
        self.state.lock().unwrap()
    }

    /// 页面插入一批帖子（作为一次插入事件）
    pub fn insert(&self, posts: &[(&str, &str)]) {
        let specs: Vec<_> = posts
            .iter()
            .map(|(id, text)| (*id, *text, *text, Behavior::Normal))
            .collect();
        self.insert_with(&specs);
    }

    /// 插入带有指定表现的帖子：(id, 正文, 整体可见文本, 表现)
    pub fn insert_with(&self, posts: &[(&str, &str, &str, Behavior)]) {
        let mut state = self.state();
        let mut candidates = Vec::new();
        for (id, text, inner_text, behavior) in posts {
            let handle = handle_for(id);
            if !state.posts.contains_key(&handle) {
                state.order.push(handle.clone());
            }
            state.posts.insert(
                handle.clone(),
                ScriptedPost {
                    id: id.to_string(),
                    text: text.to_string(),
                    inner_text: inner_text.to_string(),
                    behavior: *behavior,
                    attached: true,
                },
            );
            candidates.push(candidate(id, text, inner_text));
        }
        if state.watching {
            state.pending.push(InsertedSubtree::new(candidates));
        }
    }

    /// 页面回收帖子节点
    pub fn detach(&self, id: &str) {
        if let Some(post) = self.state().posts.get_mut(&handle_for(id)) {
            post.attached = false;
        }
    }

    pub fn set_url(&self, url: &str) {
        self.state().url = url.to_string();
    }

    pub fn submitted(&self) -> Vec<(String, String)> {
        self.state().submitted.clone()
    }

    pub fn submitted_ids(&self) -> Vec<String> {
        self.state().submitted.iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn injected(&self) -> Vec<String> {
        self.state().injected.clone()
    }

    pub fn reply_clicks(&self) -> Vec<String> {
        self.state().reply_clicks.clone()
    }

    pub fn close_attempts(&self) -> usize {
        self.state().close_attempts
    }

    pub fn submit_state_calls(&self) -> usize {
        self.state().submit_state_calls
    }

    pub fn overlapping_opens(&self) -> usize {
        self.state().overlapping_opens
    }

    pub fn is_watching(&self) -> bool {
        self.state().watching
    }

    pub fn scrolls(&self) -> Vec<i64> {
        self.state().scrolls.clone()
    }
}

fn candidate(id: &str, text: &str, inner_text: &str) -> RawCandidate {
    RawCandidate {
        handle: handle_for(id),
        permalink: Some(format!("/someone/status/{}", id)),
        inner_text: inner_text.to_string(),
        text: text.to_string(),
    }
}

#[async_trait]
impl FeedPage for ScriptedPage {
    async fn current_url(&self) -> AppResult<String> {
        Ok(self.state().url.clone())
    }

    async fn location(&self) -> AppResult<PageLocation> {
        let url = self.state().url.clone();
        let path = url
            .split_once("://")
            .and_then(|(_, rest)| rest.find('/').map(|i| rest[i..].to_string()))
            .unwrap_or_else(|| "/".to_string());
        Ok(PageLocation::new(path))
    }

    async fn install_watch(&self) -> AppResult<()> {
        let mut state = self.state();
        state.watching = true;
        // 已在页面上的帖子作为一次插入事件
        let existing: Vec<_> = state
            .order
            .iter()
            .filter_map(|h| state.posts.get(h))
            .filter(|p| p.attached)
            .map(|p| candidate(&p.id, &p.text, &p.inner_text))
            .collect();
        if !existing.is_empty() {
            state.pending.push(InsertedSubtree::new(existing));
        }
        Ok(())
    }

    async fn remove_watch(&self) -> AppResult<()> {
        let mut state = self.state();
        state.watching = false;
        state.pending.clear();
        Ok(())
    }

    async fn drain_insertions(&self) -> AppResult<Vec<InsertedSubtree>> {
        Ok(std::mem::take(&mut self.state().pending))
    }

    async fn scroll_by(&self, dy: i64) -> AppResult<()> {
        self.state().scrolls.push(dy);
        Ok(())
    }

    async fn locate_post(&self, id: &str) -> AppResult<Option<RawCandidate>> {
        let state = self.state();
        Ok(state
            .posts
            .get(&handle_for(id))
            .filter(|p| p.attached)
            .map(|p| candidate(&p.id, &p.text, &p.inner_text)))
    }

    async fn is_attached(&self, handle: &NodeHandle) -> AppResult<bool> {
        Ok(self.state().posts.get(handle).is_some_and(|p| p.attached))
    }

    async fn scroll_into_view(&self, _handle: &NodeHandle) -> AppResult<()> {
        Ok(())
    }

    async fn display_text(&self, handle: &NodeHandle) -> AppResult<String> {
        Ok(self
            .state()
            .posts
            .get(handle)
            .map(|p| p.text.clone())
            .unwrap_or_default())
    }

    async fn click_reply(&self, handle: &NodeHandle) -> AppResult<bool> {
        let mut state = self.state();
        let Some(post) = state.posts.get(handle).cloned() else {
            return Ok(false);
        };
        if post.behavior == Behavior::NoReplyControl {
            return Ok(false);
        }
        if state.composer_for.is_some() {
            state.overlapping_opens += 1;
        }
        state.reply_clicks.push(post.id.clone());
        if post.behavior != Behavior::ComposerNeverOpens {
            state.composer_for = Some(handle.clone());
            state.composer_text.clear();
        }
        Ok(true)
    }

    async fn composer_ready(&self) -> AppResult<bool> {
        Ok(self.state().composer_for.is_some())
    }

    async fn focus_composer(&self) -> AppResult<()> {
        Ok(())
    }

    async fn insert_composer_text(&self, text: &str) -> AppResult<()> {
        let mut state = self.state();
        state.composer_text = text.to_string();
        state.injected.push(text.to_string());
        Ok(())
    }

    async fn submit_state(&self) -> AppResult<SubmitState> {
        let mut state = self.state();
        state.submit_state_calls += 1;
        let Some(handle) = state.composer_for.clone() else {
            return Ok(SubmitState::Missing);
        };
        let behavior = state.posts.get(&handle).map(|p| p.behavior);
        if behavior == Some(Behavior::SubmitNeverEnabled) || state.composer_text.is_empty() {
            Ok(SubmitState::Disabled)
        } else {
            Ok(SubmitState::Enabled)
        }
    }

    async fn click_submit(&self) -> AppResult<bool> {
        let mut state = self.state();
        let Some(handle) = state.composer_for.take() else {
            return Ok(false);
        };
        let id = state
            .posts
            .get(&handle)
            .map(|p| p.id.clone())
            .unwrap_or_default();
        let text = std::mem::take(&mut state.composer_text);
        state.submitted.push((id, text));
        Ok(true)
    }

    async fn close_composer(&self) -> AppResult<bool> {
        let mut state = self.state();
        state.close_attempts += 1;
        Ok(state.composer_for.take().is_some())
    }
}

/// 脚本化的回复生成器
///
/// 默认回复 `re: <正文>`；正文为 `boom` 时失败；可以设置生成耗时
#[derive(Debug, Clone, Default)]
pub struct ScriptedGenerator {
    calls: Arc<Mutex<Vec<String>>>,
    latency: Duration,
}

impl ScriptedGenerator {
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

/// 从请求中取出帖子正文
pub fn post_text(request: &GenerationRequest) -> String {
    request
        .messages
        .iter()
        .rev()
        .find(|m| m.role == ChatRole::User)
        .map(|m| {
            m.content
                .trim_start_matches("Reply to this tweet: \"")
                .trim_end_matches('"')
                .to_string()
        })
        .unwrap_or_default()
}

#[async_trait]
impl ReplyGenerator for ScriptedGenerator {
    async fn generate(&self, request: GenerationRequest) -> GenerationResponse {
        let text = post_text(&request);
        self.calls.lock().unwrap().push(text.clone());
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if text == "boom" {
            GenerationResponse::failed("boom")
        } else {
            GenerationResponse::ok(format!("re: {}", text))
        }
    }
}

/// 固定输出的聊天后端，可设置耗时
#[derive(Debug, Clone)]
pub struct ScriptedBackend {
    pub output: String,
    pub latency: Duration,
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn complete(
        &self,
        _endpoint: &str,
        _request: &GenerationRequest,
    ) -> Result<String, LlmError> {
        tokio::time::sleep(self.latency).await;
        Ok(self.output.clone())
    }
}

pub fn test_settings() -> Settings {
    Settings {
        api_key: "sk-test".to_string(),
        ..Settings::default()
    }
}

/// 组装引擎（未握手）
pub fn build_engine(
    page: &ScriptedPage,
    generator: Arc<dyn ReplyGenerator>,
    settings: Settings,
) -> Engine {
    let page: Arc<dyn FeedPage> = Arc::new(page.clone());
    Engine::assemble(
        page,
        generator,
        Arc::new(SettingsStore::in_memory(settings)),
        StatusReporter::default(),
        EngineTiming::default(),
    )
}

/// 组装引擎并完成握手
pub fn engine_with(page: &ScriptedPage, generator: Arc<dyn ReplyGenerator>) -> Engine {
    let engine = build_engine(page, generator, test_settings());
    engine.relay.handshake();
    engine
}

/// 让暂停的时钟走过 `secs` 秒
pub async fn advance(secs: u64) {
    tokio::time::sleep(Duration::from_secs(secs)).await;
}
