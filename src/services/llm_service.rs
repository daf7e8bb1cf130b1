//! LLM 服务 - 业务能力层
//!
//! 只负责"根据帖子生成回复文本"能力，不关心页面与流程
//!
//! ## 技术栈
//! - 使用 `async-openai` 的类型构建请求体
//! - 使用 `reqwest` 发送请求，每次生成只发一次
//! - 兼容任何 OpenAI 风格的 `chat/completions` 网关

use std::sync::LazyLock;
use std::time::Duration;

use async_openai::{
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::LlmError;
use crate::models::{ChatRole, GenerationRequest, GenerationResponse};
use crate::services::settings_store::DEFAULT_API_URL;
use crate::utils::truncate_text;

/// 回复最长字符数
pub const MAX_REPLY_CHARS: usize = 220;
/// 错误诊断信息最长字符数
const MAX_DIAGNOSTIC_CHARS: usize = 200;

const COMPLETIONS_SUFFIX: &str = "/chat/completions";

/// 回复生成器
///
/// 引擎只依赖这个接口：文本进，文本（或失败）出
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> GenerationResponse;
}

/// 聊天补全后端：向完整的 endpoint 发请求，返回模型原始输出
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, endpoint: &str, request: &GenerationRequest)
        -> Result<String, LlmError>;
}

/// OpenAI 风格网关后端
///
/// 请求体用 async-openai 的类型构建，经 reqwest 单次发出，不做重试
#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    http: reqwest::Client,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiBackend {
    /// 使用外部配置好的 HTTP 客户端
    pub fn with_client(http: reqwest::Client) -> Self {
        Self {
            http,
            temperature: 0.8,
            max_tokens: 120,
        }
    }

    fn build_request(
        &self,
        request: &GenerationRequest,
    ) -> Result<CreateChatCompletionRequest, LlmError> {
        let invalid = |e: OpenAIError| LlmError::InvalidRequest(e.to_string());

        let mut messages = Vec::with_capacity(request.messages.len());
        for message in &request.messages {
            let built = match message.role {
                ChatRole::System => ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessageArgs::default()
                        .content(message.content.as_str())
                        .build()
                        .map_err(invalid)?,
                ),
                ChatRole::User => ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(message.content.as_str())
                        .build()
                        .map_err(invalid)?,
                ),
            };
            messages.push(built);
        }

        CreateChatCompletionRequestArgs::default()
            .model(&request.model)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(invalid)
    }
}

/// 网关返回体中用到的部分
#[derive(Debug, Deserialize)]
struct CompletionBody {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

fn api_error(model: &str, message: String) -> LlmError {
    LlmError::Api {
        model: model.to_string(),
        message: truncate_text(&message, MAX_DIAGNOSTIC_CHARS),
    }
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    async fn complete(
        &self,
        endpoint: &str,
        request: &GenerationRequest,
    ) -> Result<String, LlmError> {
        let body = self.build_request(request)?;

        let response = self
            .http
            .post(endpoint)
            .bearer_auth(&request.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!("LLM API 请求发送失败: {}", e);
                api_error(&request.model, format!("请求发送失败: {}", e))
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| api_error(&request.model, format!("读取返回体失败: {}", e)))?;

        if !status.is_success() {
            warn!("LLM API 返回错误状态: {}", status);
            return Err(api_error(
                &request.model,
                format!("API {}: {}", status.as_u16(), text.trim()),
            ));
        }

        let parsed: CompletionBody = serde_json::from_str(&text).map_err(|e| {
            warn!("LLM API 返回体无法解析: {}", e);
            api_error(
                &request.model,
                format!("返回体无法解析 ({}): {}", e, text.trim()),
            )
        })?;

        debug!("LLM API 调用成功");

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }
}

/// LLM 服务
///
/// 职责：
/// - 校验请求、规范化 endpoint
/// - 给单次调用加超时
/// - 清洗模型输出
/// - 把所有失败折叠成 `{ success: false, error }`
pub struct LlmService<B = OpenAiBackend> {
    backend: B,
    timeout: Duration,
}

impl<B: ChatBackend> LlmService<B> {
    pub fn new(backend: B, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    async fn try_generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        if request.api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let endpoint = normalize_endpoint(&request.api_url);
        debug!("调用 LLM API: {}，模型: {}", endpoint, request.model);

        let raw = tokio::time::timeout(self.timeout, self.backend.complete(&endpoint, request))
            .await
            .map_err(|_| LlmError::Timeout {
                secs: self.timeout.as_secs(),
            })??;

        let reply = sanitize_reply(&raw);
        if reply.is_empty() {
            return Err(LlmError::EmptyReply {
                model: request.model.clone(),
            });
        }
        Ok(reply)
    }
}

#[async_trait]
impl<B: ChatBackend> ReplyGenerator for LlmService<B> {
    async fn generate(&self, request: GenerationRequest) -> GenerationResponse {
        match self.try_generate(&request).await {
            Ok(reply) => GenerationResponse::ok(reply),
            Err(e) => GenerationResponse::failed(e.to_string()),
        }
    }
}

/// 规范化 endpoint
///
/// 允许填写 `https://xx.com`、`https://xx.com/v1` 或完整的
/// `https://xx.com/v1/chat/completions`，统一补全为完整地址
pub fn normalize_endpoint(api_url: &str) -> String {
    let mut base = api_url.trim().to_string();
    if base.is_empty() {
        base = DEFAULT_API_URL.to_string();
    }
    let mut base = base.trim_end_matches('/').to_string();

    if !base.contains("/v1") {
        base.push_str("/v1");
    }
    if !base.ends_with(COMPLETIONS_SUFFIX) {
        base.push_str(COMPLETIONS_SUFFIX);
    }
    base
}

static EDGE_QUOTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^["“”]+|["“”]+$"#).expect("valid regex"));
static LINE_BREAKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\n+\s*").expect("valid regex"));
static SPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("valid regex"));

/// 清洗模型输出
///
/// 去掉首尾引号，换行折叠为单个空格，连续空白折叠，最多保留 220 个字符
pub fn sanitize_reply(raw: &str) -> String {
    let text = raw.trim();
    let text = EDGE_QUOTES.replace_all(text, "");
    let text = LINE_BREAKS.replace_all(&text, " ");
    let text = SPACE_RUNS.replace_all(&text, " ");
    text.trim().chars().take(MAX_REPLY_CHARS).collect()
}
