pub mod delay;
pub mod logging;

pub use delay::{random_between, random_delay};
pub use logging::truncate_text;
