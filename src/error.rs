use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 浏览器 / 页面相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// LLM 服务错误
    #[error("LLM错误: {0}")]
    Llm(#[from] LlmError),
    /// 回复流程错误（单条帖子范围内，不影响引擎）
    #[error("流程错误: {0}")]
    Protocol(#[from] ProtocolError),
    /// 指令中继错误
    #[error("中继错误: {0}")]
    Relay(#[from] RelayError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {message}")]
    ConnectionFailed { port: u16, message: String },
    /// 执行脚本失败
    #[error("执行脚本失败: {0}")]
    ScriptFailed(#[source] chromiumoxide::error::CdpError),
    /// 脚本返回值无法解析
    #[error("脚本返回值无法解析: {0}")]
    UnexpectedResult(#[source] serde_json::Error),
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// 未配置 API Key
    #[error("API Key 为空，请先在配置中填写")]
    MissingApiKey,
    /// 请求构建失败
    #[error("请求构建失败: {0}")]
    InvalidRequest(String),
    /// API 调用失败（非 2xx / 网络错误 / 返回体不兼容）
    #[error("LLM API调用失败 (模型: {model}): {message}")]
    Api { model: String, message: String },
    /// 超时
    #[error("LLM 调用超时 ({secs} 秒)")]
    Timeout { secs: u64 },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyReply { model: String },
}

/// 单条帖子回复流程中的错误
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// 已有回复流程在进行中
    #[error("已有回复正在进行")]
    Busy,
    /// 帖子节点已从页面移除
    #[error("帖子节点已脱离页面")]
    NodeDetached,
    /// 找不到回复按钮
    #[error("Reply button not found")]
    ComposerControlMissing,
    /// 输入框未在限定时间内出现
    #[error("Input box not open ({timeout_ms} ms)")]
    InputBoxNotOpen { timeout_ms: u64 },
    /// 发送按钮始终不可用
    #[error("发送按钮在 {attempts} 次检查后仍不可用")]
    SubmitNeverEnabled { attempts: u32 },
    /// 生成回复失败
    #[error("生成回复失败: {0}")]
    Generation(String),
}

/// 指令中继错误
#[derive(Debug, Error)]
pub enum RelayError {
    /// 握手尚未完成
    #[error("页面未连接，请刷新页面后再启动")]
    NotConnected,
    /// 当前页面不是 x.com / twitter.com
    #[error("请在 x.com / twitter.com 页面上启动 (当前: {url})")]
    UnsupportedPage { url: String },
    /// 页面无法访问
    #[error("页面无法访问: {0}")]
    Unreachable(String),
    /// 引擎启动失败
    #[error("启动失败: {0}")]
    StartFailed(String),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取设置文件失败
    #[error("读取设置文件失败 ({path}): {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入设置文件失败
    #[error("写入设置文件失败 ({path}): {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// TOML 序列化失败
    #[error("TOML序列化失败: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ========== 从常见错误类型转换 ==========

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::ScriptFailed(err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Browser(BrowserError::UnexpectedResult(err))
    }
}

impl AppError {
    /// 是否属于单条帖子范围内的失败（引擎应继续处理下一条）
    pub fn is_item_local(&self) -> bool {
        matches!(self, AppError::Protocol(_) | AppError::Llm(_))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
