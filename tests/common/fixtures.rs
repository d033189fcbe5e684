//! Test fixtures for common test data
//!
//! Fixed timestamps and records so scenario tests are reproducible.

use chrono::{DateTime, FixedOffset, TimeZone};
use uuid::Uuid;

use conservation_audit::models::{ActionType, ActivityRecord, EntityType, NewActivity};

/// Mountain daylight time, the offset of the field stations
pub fn station_offset() -> FixedOffset {
    FixedOffset::west_opt(6 * 3600).unwrap()
}

/// `2025-07-<day> <hour>:00` at the station offset
pub fn july(day: u32, hour: u32) -> DateTime<FixedOffset> {
    station_offset()
        .with_ymd_and_hms(2025, 7, day, hour, 0, 0)
        .unwrap()
}

pub struct ActivityFixtures;

impl ActivityFixtures {
    pub fn yellowstone_survey(timestamp: DateTime<FixedOffset>) -> NewActivity {
        NewActivity::new(
            EntityType::Survey,
            "survey-yellowstone-2025",
            "Yellowstone Research Area",
            ActionType::Create,
            "Created new wildlife survey for Yellowstone Research Area",
        )
        .by_user("user-schen", "Dr. Sarah Chen")
        .with_role("researcher")
        .at(timestamp)
    }

    pub fn site_update(timestamp: DateTime<FixedOffset>) -> NewActivity {
        NewActivity::new(
            EntityType::Site,
            "site-hayden-valley",
            "Hayden Valley",
            ActionType::Update,
            "Updated habitat assessment",
        )
        .by_user("user-mrivera", "Marcus Rivera")
        .at(timestamp)
    }

    /// A stored record with a given action, for pure engine tests
    pub fn record(action: ActionType, timestamp: DateTime<FixedOffset>) -> ActivityRecord {
        NewActivity::new(
            EntityType::Species,
            "species-elk",
            "Elk",
            action,
            "Herd count recorded",
        )
        .by_user("user-akim", "Alex Kim")
        .into_record(Uuid::new_v4(), timestamp)
    }
}
