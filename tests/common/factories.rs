//! Test factories for generating test data
//!
//! Factories create randomized records, useful for property checks over
//! mixed record sets.

use chrono::{DateTime, Duration, FixedOffset};
use fake::faker::address::en::CityName;
use fake::faker::name::en::Name;
use fake::Fake;
use uuid::Uuid;

use conservation_audit::models::{ActionType, ActivityRecord, EntityType, NewActivity, Severity};

/// Factory for activity records spread over several days
pub struct ActivityFactory {
    counter: std::sync::atomic::AtomicU64,
}

impl Default for ActivityFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityFactory {
    pub fn new() -> Self {
        Self {
            counter: std::sync::atomic::AtomicU64::new(0),
        }
    }

    /// A unique activity; entity, action and user cycle with the counter
    pub fn create(&self, base: DateTime<FixedOffset>) -> NewActivity {
        let n = self
            .counter
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst) as usize;

        let entity_type = EntityType::TRACKED[n % EntityType::TRACKED.len()].clone();
        let action_type = ActionType::TRACKED[(n / 2) % ActionType::TRACKED.len()].clone();
        let site: String = CityName().fake();
        let user_name: String = Name().fake();
        let severity = match n % 5 {
            0 => Severity::High,
            1 | 2 => Severity::Medium,
            _ => Severity::Low,
        };

        NewActivity::new(
            entity_type,
            format!("entity-{}", n % 7),
            format!("{} field site", site),
            action_type,
            format!("Routine entry {} near {}", n, site),
        )
        .by_user(format!("user-{}", n % 3), user_name)
        .with_severity(severity)
        .at(base - Duration::hours((n * 7) as i64))
    }

    /// `count` stored records, in append order
    pub fn records(&self, count: usize, base: DateTime<FixedOffset>) -> Vec<ActivityRecord> {
        (0..count)
            .map(|_| {
                let new = self.create(base);
                new.into_record(Uuid::new_v4(), base)
            })
            .collect()
    }
}
