//! 文本生成请求 / 响应模型

use serde::{Deserialize, Serialize};

/// 默认模型
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
/// 未配置人设时使用的系统提示词
pub const FALLBACK_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// 消息角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

/// 单条对话消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// 人设与接口配置（来自操作员设置）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonaConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub system_prompt: String,
}

/// 生成请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

impl GenerationRequest {
    /// 为一条帖子构建请求
    pub fn for_post(persona: &PersonaConfig, post_text: &str) -> Self {
        let system_prompt = if persona.system_prompt.trim().is_empty() {
            FALLBACK_SYSTEM_PROMPT.to_string()
        } else {
            persona.system_prompt.clone()
        };
        let model = if persona.model.trim().is_empty() {
            DEFAULT_MODEL.to_string()
        } else {
            persona.model.trim().to_string()
        };

        Self {
            api_url: persona.api_url.clone(),
            api_key: persona.api_key.clone(),
            model,
            messages: vec![
                ChatMessage {
                    role: ChatRole::System,
                    content: system_prompt,
                },
                ChatMessage {
                    role: ChatRole::User,
                    content: format!("Reply to this tweet: \"{}\"", post_text),
                },
            ],
        }
    }
}

/// 生成响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationResponse {
    pub fn ok(reply: impl Into<String>) -> Self {
        Self {
            success: true,
            reply: Some(reply.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            reply: None,
            error: Some(error.into()),
        }
    }

    /// 转为 `Result`：成功且回复非空才算成功
    pub fn into_result(self) -> Result<String, String> {
        match (self.success, self.reply) {
            (true, Some(reply)) if !reply.trim().is_empty() => Ok(reply),
            (true, _) => Err("AI 返回为空".to_string()),
            (false, _) => Err(self.error.unwrap_or_else(|| "Unknown AI Error".to_string())),
        }
    }
}
