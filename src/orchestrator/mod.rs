//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责运行状态和调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `session` - 自动化会话
//! - 运行状态（Idle / Running）
//! - 去重账本与待回复队列
//! - 进行中标记
//!
//! ### `controller` - 自动化控制器
//! - 唯一的状态切换入口（start / stop）
//! - 启动观察器与队列处理器
//!
//! ### `discovery_observer` - 发现观察器
//! - 监听信息流插入事件，提取并入队
//! - 被动滚动
//!
//! ### `queue_processor` - 队列处理器
//! - 一次只处理一条帖子
//! - 空闲时随机等待
//!
//! ### `relay` - 指令中继
//! - 握手、页面校验、设置持久化
//!
//! ### `engine` / `app`
//! - 组装与应用生命周期
//!
//! ## 层次关系
//!
//! ```text
//! app (控制台 / 浏览器 / 设置)
//!     ↓
//! relay → controller → observer + queue_processor
//!     ↓
//! workflow::ReplyFlow (处理单条帖子)
//!     ↓
//! services (能力层：extract / llm / settings)
//!     ↓
//! infrastructure (基础设施：FeedPage)
//! ```

pub mod app;
pub mod controller;
pub mod discovery_observer;
pub mod engine;
pub mod queue_processor;
pub mod relay;
pub mod session;

// 重新导出主要类型
pub use app::App;
pub use controller::AutomationController;
pub use discovery_observer::DiscoveryObserver;
pub use engine::Engine;
pub use queue_processor::{ProcessorStats, QueueProcessor};
pub use relay::{is_supported_url, CommandRelay, SUPPORTED_HOSTS};
pub use session::{AutomationSession, AutomationState};
