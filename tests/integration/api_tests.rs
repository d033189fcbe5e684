//! API integration tests

use serde_json::{json, Value};

use crate::common::{july, ActivityFixtures, TestApp};

async fn log_survey(app: &TestApp) -> Value {
    let activity = ActivityFixtures::yellowstone_survey(july(24, 9));
    let response = app
        .post_json(
            "/api/v1/activities",
            json!({
                "activity": activity,
                "changes": [
                    {"field_name": "status", "old_value": null, "new_value": "planned"},
                    {"field_name": "observer_count", "old_value": null, "new_value": 4}
                ]
            }),
        )
        .await;
    response.assert_created();
    response.json()
}

#[tokio::test]
async fn test_health_endpoint_returns_ok() {
    let app = TestApp::new().await;
    let response = app.get("/api/v1/health").await;

    response.assert_ok();
    let json: Value = response.json();
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_detailed_health_reports_database_and_snapshot() {
    let app = TestApp::new().await;
    let response = app.get("/api/v1/health/detailed").await;

    response.assert_ok();
    let json: Value = response.json();
    assert_eq!(json["components"]["database"]["status"], "healthy");
    assert_eq!(json["components"]["snapshot"]["activities"], 0);
}

#[tokio::test]
async fn test_logged_activity_is_listed_after_refresh_on_write() {
    let app = TestApp::new().await;
    let logged = log_survey(&app).await;

    assert_eq!(logged["changes"].as_array().unwrap().len(), 2);
    assert!(logged["warnings"].as_array().unwrap().is_empty());

    let response = app.get("/api/v1/activities").await;
    response.assert_ok();
    let page: Value = response.json();
    assert_eq!(page["total"], 1);
    assert_eq!(
        page["items"][0]["entity_name"],
        "Yellowstone Research Area"
    );
    assert_eq!(page["items"][0]["action_type"], "create");
}

#[tokio::test]
async fn test_list_activities_applies_filters() {
    let app = TestApp::new().await;
    log_survey(&app).await;
    app.post_json(
        "/api/v1/activities",
        json!({"activity": ActivityFixtures::site_update(july(25, 9))}),
    )
    .await
    .assert_created();

    let page: Value = app
        .get("/api/v1/activities?entity_type=site&action_type=all")
        .await
        .json();
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["entity_type"], "site");

    let page: Value = app
        .get("/api/v1/activities?search=YELLOWSTONE")
        .await
        .json();
    assert_eq!(page["total"], 1);

    let page: Value = app
        .get("/api/v1/activities?start=2025-07-25&end=2025-07-25")
        .await
        .json();
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["entity_id"], "site-hayden-valley");
}

#[tokio::test]
async fn test_list_activities_is_newest_first_and_paginated() {
    let app = TestApp::new().await;
    for day in 20..=24 {
        app.post_json(
            "/api/v1/activities",
            json!({"activity": ActivityFixtures::site_update(july(day, 9))}),
        )
        .await
        .assert_created();
    }

    let page: Value = app.get("/api/v1/activities?limit=2&offset=1").await.json();
    assert_eq!(page["total"], 5);
    assert_eq!(page["limit"], 2);
    let items = page["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(items[0]["timestamp"].as_str().unwrap().starts_with("2025-07-23"));
    assert!(items[1]["timestamp"].as_str().unwrap().starts_with("2025-07-22"));
}

#[tokio::test]
async fn test_invalid_date_is_bad_request() {
    let app = TestApp::new().await;
    let response = app.get("/api/v1/activities?start=07/24/2025").await;

    response.assert_bad_request();
    let json: Value = response.json();
    assert_eq!(json["error"], "bad_request");
}

#[tokio::test]
async fn test_missing_required_field_is_rejected() {
    let app = TestApp::new().await;
    let mut activity = serde_json::to_value(ActivityFixtures::site_update(july(25, 9))).unwrap();
    activity["description"] = json!("");

    let response = app
        .post_json("/api/v1/activities", json!({"activity": activity}))
        .await;
    response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);

    let page: Value = app.get("/api/v1/activities").await.json();
    assert_eq!(page["total"], 0);
}

#[tokio::test]
async fn test_free_form_content_is_recorded() {
    let app = TestApp::new().await;
    let activity = ActivityFixtures::site_update(july(25, 9)).with_role("Lead (Field)");

    let response = app
        .post_json(
            "/api/v1/activities",
            json!({
                "activity": activity,
                "changes": [
                    {"field_name": "Species Name", "old_value": null, "new_value": "Grey Wolf"}
                ]
            }),
        )
        .await;
    response.assert_created();

    let logged: Value = response.json();
    assert_eq!(logged["activity"]["user_role"], "Lead (Field)");
    assert_eq!(logged["changes"][0]["field_name"], "Species Name");

    let page: Value = app.get("/api/v1/changes?search=species%20name").await.json();
    assert_eq!(page["total"], 1);
}

#[tokio::test]
async fn test_timeline_groups_by_day() {
    let app = TestApp::new().await;
    log_survey(&app).await;
    for hour in [8, 15] {
        app.post_json(
            "/api/v1/activities",
            json!({"activity": ActivityFixtures::site_update(july(25, hour))}),
        )
        .await
        .assert_created();
    }

    let days: Vec<Value> = app.get("/api/v1/activities/timeline").await.json();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0]["date"], "2025-07-25");
    assert_eq!(days[0]["records"].as_array().unwrap().len(), 2);
    assert_eq!(days[1]["date"], "2025-07-24");
}

#[tokio::test]
async fn test_activity_changes_are_correlated() {
    let app = TestApp::new().await;
    let logged = log_survey(&app).await;
    let id = logged["activity"]["id"].as_str().unwrap();

    let response = app.get(&format!("/api/v1/activities/{}/changes", id)).await;
    response.assert_ok();
    let changes: Vec<Value> = response.json();
    assert_eq!(changes.len(), 2);
    assert!(changes
        .iter()
        .all(|c| c["change_set_id"] == logged["change_set_id"]));
}

#[tokio::test]
async fn test_unknown_activity_is_not_found() {
    let app = TestApp::new().await;
    app.get(&format!("/api/v1/activities/{}/changes", uuid::Uuid::new_v4()))
        .await
        .assert_not_found();
    app.get("/api/v1/activities/not-a-uuid/changes")
        .await
        .assert_bad_request();
}

#[tokio::test]
async fn test_changes_list_and_create() {
    let app = TestApp::new().await;
    log_survey(&app).await;

    let response = app
        .post_json(
            "/api/v1/changes",
            json!({
                "entity_type": "survey",
                "entity_id": "survey-yellowstone-2025",
                "field_name": "status",
                "old_value": "planned",
                "new_value": "active",
                "change_type": "update"
            }),
        )
        .await;
    response.assert_created();

    let page: Value = app.get("/api/v1/changes?search=active").await.json();
    assert_eq!(page["total"], 1);

    let page: Value = app.get("/api/v1/changes?action_type=create").await.json();
    assert_eq!(page["total"], 2);
}

#[tokio::test]
async fn test_entity_history() {
    let app = TestApp::new().await;
    log_survey(&app).await;

    let history: Value = app
        .get("/api/v1/entities/survey/survey-yellowstone-2025/history")
        .await
        .json();
    assert_eq!(history["activities"].as_array().unwrap().len(), 1);
    assert_eq!(history["changes"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_statistics_have_dense_breakdowns() {
    let app = TestApp::new().await;
    log_survey(&app).await;

    let response = app.get("/api/v1/statistics?window_days=14").await;
    response.assert_ok();
    let stats: Value = response.json();

    assert_eq!(stats["total_activities"], 1);
    assert_eq!(stats["total_changes"], 2);
    assert_eq!(stats["trend"].as_array().unwrap().len(), 14);
    assert_eq!(stats["by_action_type"]["create"], 1);
    assert_eq!(stats["by_action_type"]["import"], 0);

    app.get("/api/v1/statistics?window_days=0")
        .await
        .assert_bad_request();
}

#[tokio::test]
async fn test_export_json_includes_filter() {
    let app = TestApp::new().await;
    log_survey(&app).await;

    let response = app
        .post_json(
            "/api/v1/export",
            json!({"filter": {"entity_type": "survey", "search_text": "wildlife"}, "format": "json"}),
        )
        .await;
    response.assert_ok();
    assert_eq!(response.header("content-type"), Some("application/json"));
    assert!(response
        .header("content-disposition")
        .unwrap()
        .starts_with("attachment; filename=\"audit_export_"));

    let document: Value = response.json();
    assert_eq!(document["filter"]["entity_type"], "survey");
    assert_eq!(document["filter"]["action_type"], "all");
    assert_eq!(document["record_counts"]["activities"], 1);
    assert_eq!(document["statistics"]["total_activities"], 1);
}

#[tokio::test]
async fn test_export_csv() {
    let app = TestApp::new().await;
    log_survey(&app).await;

    let response = app
        .post_json("/api/v1/export", json!({"format": "csv"}))
        .await;
    response.assert_ok();
    assert_eq!(response.header("content-type"), Some("text/csv"));
    assert!(response.text().contains("Yellowstone Research Area"));
}

#[tokio::test]
async fn test_refresh_reports_counts() {
    let mut config = crate::common::test_config();
    config.audit.refresh_on_write = false;
    let app = TestApp::with_config(config).await;
    log_survey(&app).await;

    let page: Value = app.get("/api/v1/activities").await.json();
    assert_eq!(page["total"], 0);

    let response = app.post_json("/api/v1/refresh", json!({})).await;
    response.assert_ok();
    let summary: Value = response.json();
    assert_eq!(summary["activities"], 1);
    assert_eq!(summary["changes"], 2);

    let page: Value = app.get("/api/v1/activities").await.json();
    assert_eq!(page["total"], 1);
}

#[tokio::test]
async fn test_no_update_or_delete_routes() {
    let app = TestApp::new().await;
    let logged = log_survey(&app).await;
    let id = logged["activity"]["id"].as_str().unwrap();

    for method in ["PUT", "PATCH", "DELETE"] {
        let response = app
            .request(
                axum::http::Request::builder()
                    .method(method)
                    .uri("/api/v1/activities")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(response.status, axum::http::StatusCode::METHOD_NOT_ALLOWED);

        let response = app
            .request(
                axum::http::Request::builder()
                    .method(method)
                    .uri(format!("/api/v1/activities/{}", id))
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await;
        assert!(response.status.is_client_error());
    }
}
