//! Data models

mod activity;
mod change;
mod export;
mod filter;
mod statistics;

pub use activity::*;
pub use change::*;
pub use export::*;
pub use filter::*;
pub use statistics::*;
