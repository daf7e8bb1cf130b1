pub mod in_flight;
pub mod reply_ctx;
pub mod reply_flow;

pub use in_flight::{InFlight, InFlightPermit};
pub use reply_ctx::ReplyCtx;
pub use reply_flow::{DraftOutcome, ReplyFlow, ReplyOutcome};
