mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn empty_history_is_an_empty_array() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/history").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn runs_are_listed_most_recent_first() {
    let app = TestApp::new().await;
    app.analyze("First feedback.").await;
    app.analyze("Second feedback.").await;

    let (status, body) = app.get("/api/history").await;

    assert_eq!(status, StatusCode::OK);
    let runs = body.as_array().unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0]["input_preview"], "Second feedback.");
    assert_eq!(runs[1]["input_preview"], "First feedback.");
    assert!(runs[0]["id"].as_i64().unwrap() > runs[1]["id"].as_i64().unwrap());
}

#[tokio::test]
async fn limit_caps_the_number_of_runs() {
    let app = TestApp::new().await;
    for i in 0..5 {
        app.analyze(&format!("Feedback number {}.", i)).await;
    }

    let (status, body) = app.get("/api/history?limit=3").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn zero_limit_is_clamped_to_one() {
    let app = TestApp::new().await;
    app.analyze("One.").await;
    app.analyze("Two.").await;

    let (status, body) = app.get("/api/history?limit=0").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn non_numeric_limit_is_a_json_bad_request() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/history?limit=abc").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("limit"));
}

#[tokio::test]
async fn item_count_matches_items() {
    let app = TestApp::new().await;
    app.analyze("The login button is broken.").await;

    let (_, body) = app.get("/api/history").await;

    for run in body.as_array().unwrap() {
        assert_eq!(
            run["item_count"].as_u64().unwrap() as usize,
            run["items"].as_array().unwrap().len()
        );
        assert!(run["created_at"].is_string());
    }
}

#[tokio::test]
async fn long_input_is_previewed() {
    let app = TestApp::new().await;
    let text = "a".repeat(300);
    app.analyze(&text).await;

    let (_, body) = app.get("/api/history").await;

    let preview = body[0]["input_preview"].as_str().unwrap();
    assert_eq!(preview.chars().count(), 121);
    assert!(preview.ends_with('…'));
}

#[tokio::test]
async fn store_failure_on_history_is_reported() {
    let app = TestApp::new().await;
    app.state.db.pool().close().await;

    let (status, body) = app.get("/api/history").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}
