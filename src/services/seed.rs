//! Demo data for fresh installations

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, FixedOffset};
use serde_json::json;
use tracing::info;

use crate::models::{
    ActionType, ActivityMetadata, EntityType, FieldChange, NewActivity, Severity, TypedMetadata,
};
use crate::services::logger::ActivityLogger;
use crate::services::store::EventStore;

/// Append demo activities when the store holds no activities yet
///
/// Returns the number of activities written.
pub async fn seed_demo_data(
    store: &dyn EventStore,
    logger: &ActivityLogger,
    now: DateTime<FixedOffset>,
) -> Result<usize> {
    let existing = store
        .list_activities()
        .await
        .context("Failed to inspect store before seeding")?;
    if !existing.is_empty() {
        info!(existing = existing.len(), "Store not empty, skipping demo data");
        return Ok(0);
    }

    let mut written = 0;

    logger
        .log_with_changes(
            NewActivity::new(
                EntityType::Survey,
                "survey-yellowstone-2025",
                "Yellowstone Research Area",
                ActionType::Create,
                "Created new wildlife survey for Yellowstone Research Area",
            )
            .by_user("user-schen", "Dr. Sarah Chen")
            .with_role("researcher")
            .at(now - Duration::days(2)),
            vec![
                FieldChange::new("status", None, Some(json!("planned"))),
                FieldChange::new("target_species", None, Some(json!(["gray wolf", "elk"]))),
            ],
        )
        .await?;
    written += 1;

    logger
        .log(
            NewActivity::new(
                EntityType::Species,
                "species-bald-eagle",
                "Bald Eagle",
                ActionType::Create,
                "Recorded bald eagle sighting near Lamar River",
            )
            .by_user("user-mrivera", "Marcus Rivera")
            .with_role("volunteer")
            .with_metadata(ActivityMetadata::Typed(TypedMetadata::Location {
                latitude: 44.8997,
                longitude: -110.2219,
                accuracy_m: Some(15.0),
            }))
            .at(now - Duration::days(1)),
        )
        .await?;
    written += 1;

    logger
        .log_with_changes(
            NewActivity::new(
                EntityType::Site,
                "site-hayden-valley",
                "Hayden Valley",
                ActionType::Update,
                "Updated habitat assessment for Hayden Valley",
            )
            .by_user("user-schen", "Dr. Sarah Chen")
            .with_role("researcher")
            .with_severity(Severity::Medium)
            .at(now - Duration::hours(20)),
            vec![FieldChange::new(
                "habitat_quality",
                Some(json!("fair")),
                Some(json!("good")),
            )],
        )
        .await?;
    written += 1;

    logger
        .log(
            NewActivity::new(
                EntityType::Report,
                "report-q2-population",
                "Q2 Population Report",
                ActionType::Export,
                "Exported Q2 population report",
            )
            .by_user("user-akim", "Alex Kim")
            .with_role("coordinator")
            .with_metadata(ActivityMetadata::Typed(TypedMetadata::Export {
                record_count: 342,
                format: "csv".to_string(),
            }))
            .at(now - Duration::hours(3)),
        )
        .await?;
    written += 1;

    logger
        .log(
            NewActivity::new(
                EntityType::User,
                "user-unknown",
                "unknown",
                ActionType::LoginFailed,
                "Failed login attempt",
            )
            .with_severity(Severity::High)
            .with_metadata(ActivityMetadata::Typed(TypedMetadata::LoginAttempt {
                reason: Some("invalid password".to_string()),
                attempts: Some(3),
            }))
            .failed()
            .at(now - Duration::minutes(30)),
        )
        .await?;
    written += 1;

    info!(activities = written, "Demo data seeded");
    Ok(written)
}
