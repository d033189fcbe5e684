//! Conservation Audit Library
//!
//! Change tracking and audit log engine for the conservation management
//! dashboard: append-only activity and field-change records, filtering,
//! timeline grouping, statistics and export.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod utils;

pub use config::AppConfig;
pub use db::DbPool;
use db::SqliteEventStore;
use services::{ActivityLogger, EventStore, TimelineRepository};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Database connection pool
    pub db: DbPool,
    /// Append-only audit store
    pub store: Arc<dyn EventStore>,
    /// Snapshot the read endpoints query
    pub timeline: Arc<TimelineRepository>,
    /// Write path for producers
    pub logger: ActivityLogger,
}

impl AppState {
    /// Wire the SQLite store, logger and timeline over an initialized pool
    pub fn new(config: AppConfig, db: DbPool) -> Self {
        let store: Arc<dyn EventStore> = Arc::new(SqliteEventStore::new(db.clone()));
        let timeline = Arc::new(TimelineRepository::new(
            store.clone(),
            config.audit.correlation_window(),
        ));
        let logger = ActivityLogger::new(store.clone());

        Self {
            config,
            db,
            store,
            timeline,
            logger,
        }
    }
}
