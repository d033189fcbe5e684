//! Engine behavior over mixed record sets

use std::sync::Arc;

use chrono::NaiveDate;
use rstest::rstest;

use conservation_audit::{
    db::SqliteEventStore,
    models::{ActionType, ActivityFilter, ActivityRecord, EntityType},
    services::{query, statistics, ActivityLogger, EventStore},
};

use crate::common::{july, ActivityFactory, ActivityFixtures, TestApp};

fn mixed_records() -> Vec<ActivityRecord> {
    ActivityFactory::new().records(40, july(25, 18))
}

fn ids(records: &[ActivityRecord]) -> Vec<uuid::Uuid> {
    records.iter().map(|r| r.id).collect()
}

type Restriction = fn(ActivityFilter) -> ActivityFilter;

fn by_entity(f: ActivityFilter) -> ActivityFilter {
    f.for_entity(EntityType::Survey)
}

fn by_action(f: ActivityFilter) -> ActivityFilter {
    f.for_action(ActionType::Update)
}

fn by_user(f: ActivityFilter) -> ActivityFilter {
    f.for_user("user-1")
}

fn by_search(f: ActivityFilter) -> ActivityFilter {
    f.search("routine entry 1")
}

fn by_dates(f: ActivityFilter) -> ActivityFilter {
    f.between(
        NaiveDate::from_ymd_opt(2025, 7, 20),
        NaiveDate::from_ymd_opt(2025, 7, 23),
    )
}

fn restrictions() -> Vec<(&'static str, Restriction)> {
    vec![
        ("entity", by_entity as Restriction),
        ("action", by_action as Restriction),
        ("user", by_user as Restriction),
        ("search", by_search as Restriction),
        ("dates", by_dates as Restriction),
    ]
}

fn filters() -> Vec<ActivityFilter> {
    restrictions()
        .into_iter()
        .map(|(_, restrict)| restrict(ActivityFilter::default()))
        .collect()
}

#[test]
fn test_filters_compose_as_conjunction() {
    let records = mixed_records();
    let all = restrictions();

    for (i, (first_name, first)) in all.iter().enumerate() {
        for (second_name, second) in all.iter().skip(i + 1) {
            let only_first = first(ActivityFilter::default());
            let only_second = second(ActivityFilter::default());
            let combined = second(first(ActivityFilter::default()));

            let chained = query::filter(&query::filter(&records, &only_first), &only_second);
            let reversed = query::filter(&query::filter(&records, &only_second), &only_first);
            let direct = query::filter(&records, &combined);

            assert_eq!(ids(&chained), ids(&direct), "{} then {}", first_name, second_name);
            assert_eq!(ids(&reversed), ids(&direct), "{} then {}", second_name, first_name);
        }
    }
}

#[test]
fn test_filter_is_idempotent() {
    let records = mixed_records();
    for spec in filters() {
        let once = query::filter(&records, &spec);
        let twice = query::filter(&once, &spec);
        assert_eq!(ids(&once), ids(&twice), "filter {:?}", spec);
    }
}

#[test]
fn test_filter_preserves_input_order() {
    let records = mixed_records();
    let position = |id: uuid::Uuid| records.iter().position(|r| r.id == id).unwrap();

    for spec in filters() {
        let result = query::filter(&records, &spec);
        for pair in result.windows(2) {
            assert!(position(pair[0].id) < position(pair[1].id));
        }
    }
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(40)]
fn test_trend_is_always_seven_consecutive_days(#[case] count: usize) {
    let records = ActivityFactory::new().records(count, july(25, 18));
    let now = july(25, 18);
    let trend = statistics::recent_trend(&records, 7, now);

    assert_eq!(trend.len(), 7);
    assert_eq!(trend[6].date, now.date_naive());
    for pair in trend.windows(2) {
        assert_eq!(pair[0].date.succ_opt(), Some(pair[1].date));
    }
}

#[test]
fn test_action_counts_are_conserved() {
    let records = mixed_records();
    assert!(records
        .iter()
        .all(|r| ActionType::TRACKED.contains(&r.action_type)));

    let counts = statistics::count_by_action_type(&records);
    assert_eq!(counts.values().sum::<usize>(), records.len());
}

#[test]
fn test_date_range_returns_the_two_inclusive_days() {
    let records = vec![
        ActivityFixtures::record(ActionType::Create, july(23, 10)),
        ActivityFixtures::record(ActionType::Create, july(24, 10)),
        ActivityFixtures::record(ActionType::Create, july(25, 10)),
    ];
    let spec = ActivityFilter::default().between(
        NaiveDate::from_ymd_opt(2025, 7, 24),
        NaiveDate::from_ymd_opt(2025, 7, 25),
    );

    let result = query::filter(&records, &spec);
    assert_eq!(ids(&result), vec![records[1].id, records[2].id]);
}

#[test]
fn test_count_by_action_type_example() {
    let mut records = Vec::new();
    for (action, n) in [
        (ActionType::Create, 3),
        (ActionType::Update, 2),
        (ActionType::Delete, 1),
    ] {
        for _ in 0..n {
            records.push(ActivityFixtures::record(action.clone(), july(25, 9)));
        }
    }

    let counts = statistics::count_by_action_type(&records);
    let expected = [
        (ActionType::Create, 3),
        (ActionType::Update, 2),
        (ActionType::Delete, 1),
        (ActionType::View, 0),
        (ActionType::Export, 0),
        (ActionType::Import, 0),
    ];
    assert_eq!(counts.len(), expected.len());
    for (action, n) in expected {
        assert_eq!(counts[&action], n, "{}", action);
    }
}

#[test]
fn test_search_matches_description_case_insensitively() {
    let record = ActivityFixtures::yellowstone_survey(july(25, 9))
        .into_record(uuid::Uuid::new_v4(), july(25, 9));
    let result = query::filter(&[record], &ActivityFilter::default().search("yellowstone"));
    assert_eq!(result.len(), 1);
}

#[test]
fn test_trend_without_records_is_seven_zero_buckets() {
    let records: Vec<ActivityRecord> = Vec::new();
    let trend = statistics::recent_trend(&records, 7, july(25, 12));

    let dates: Vec<NaiveDate> = trend.iter().map(|b| b.date).collect();
    let expected: Vec<NaiveDate> = (19..=25)
        .map(|d| NaiveDate::from_ymd_opt(2025, 7, d).unwrap())
        .collect();
    assert_eq!(dates, expected);
    assert!(trend.iter().all(|b| b.count == 0));
}

#[tokio::test]
async fn test_appends_never_alter_existing_records() {
    let app = TestApp::new().await;
    let store: Arc<dyn EventStore> = Arc::new(SqliteEventStore::new(app.state.db.clone()));
    let logger = ActivityLogger::new(store.clone());

    logger
        .log(ActivityFixtures::yellowstone_survey(july(24, 8)))
        .await
        .unwrap();
    let before = store.list_activities().await.unwrap();

    let factory = ActivityFactory::new();
    for _ in 0..10 {
        logger.log(factory.create(july(25, 18))).await.unwrap();
    }
    let after = store.list_activities().await.unwrap();

    assert_eq!(after.len(), before.len() + 10);
    for existing in &before {
        let current = after.iter().find(|r| r.id == existing.id).unwrap();
        assert_eq!(current, existing);
    }
}
