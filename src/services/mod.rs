//! Audit engine services

pub mod export;
pub mod logger;
pub mod query;
pub mod seed;
pub mod statistics;
pub mod store;
pub mod timeline;

pub use export::ExportService;
pub use logger::{ActivityLogger, LoggedActivity};
pub use seed::seed_demo_data;
pub use store::{local_now, Collection, EventStore, MemoryEventStore};
pub use timeline::{EntityHistory, RefreshSummary, TimelineRepository, TimelineSnapshot};
