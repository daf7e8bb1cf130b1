//! 基础设施层
//!
//! 持有页面资源，只暴露单步的页面能力，不包含任何等待、重试或业务判断

pub mod chrome_page;
pub mod feed_page;
pub mod js_executor;
pub mod scripts;

pub use chrome_page::ChromeFeedPage;
pub use feed_page::{insertion_stream, FeedPage, SubmitState};
pub use js_executor::JsExecutor;
