//! # Feed Reply
//!
//! 一个在 x.com 信息流上自动生成并发送 AI 回复的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有页面资源，只暴露单步能力
//! - `FeedPage` - 页面能力接口（插入事件、定位、点击、输入）
//! - `ChromeFeedPage` - 基于 `JsExecutor` 的 Chrome 实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单条帖子
//! - `CandidateExtractor` - 从插入事件中提取帖子、识别推广帖
//! - `LlmService` - 生成回复
//! - `SettingsStore` / `ReplyCounter` - 设置与计数持久化
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一条帖子"的完整回复流程
//! - `ReplyCtx` - 上下文封装（序号 + 帖子 ID）
//! - `ReplyFlow` - 流程编排（定位 → 生成 → 打开输入框 → 写入 → 发送）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/controller` - 运行状态机
//! - `orchestrator/discovery_observer` - 发现新帖子并入队
//! - `orchestrator/queue_processor` - 逐条处理队列
//! - `orchestrator/relay` - 操作员指令中继
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::connect_to_browser_and_page;
pub use config::{Config, EngineTiming};
pub use error::{AppError, AppResult};
pub use infrastructure::{ChromeFeedPage, FeedPage, JsExecutor};
pub use models::{ContentUnit, GenerationRequest, GenerationResponse, StartStopCommand};
pub use orchestrator::{App, AutomationController, AutomationState, CommandRelay, Engine};
pub use workflow::{ReplyCtx, ReplyFlow, ReplyOutcome};
