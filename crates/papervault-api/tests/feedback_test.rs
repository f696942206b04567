//! Feedback and subject catalogue routes.
//!
//! Run with: `cargo test -p papervault-api --test feedback_test`

mod helpers;

use helpers::setup_test_app;
use serde_json::{json, Value};

#[tokio::test]
async fn test_submit_feedback() {
    let app = setup_test_app().await;
    let response = app
        .client()
        .post("/api/feedback")
        .json(&json!({ "message": "  Please add more physics papers ", "email": "reader@example.com" }))
        .await;

    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Feedback submitted");
    assert_eq!(body["feedback"]["message"], "Please add more physics papers");
    assert_eq!(app.feedback.entries().len(), 1);
}

#[tokio::test]
async fn test_feedback_email_is_optional() {
    let app = setup_test_app().await;
    let response = app
        .client()
        .post("/api/feedback")
        .json(&json!({ "message": "Great site" }))
        .await;

    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    assert_eq!(body["feedback"]["email"], "");
}

#[tokio::test]
async fn test_blank_feedback_is_rejected() {
    let app = setup_test_app().await;
    let response = app
        .client()
        .post("/api/feedback")
        .json(&json!({ "message": "   " }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"], "Message is required");
    assert!(app.feedback.entries().is_empty());
}

#[tokio::test]
async fn test_malformed_feedback_body_is_rejected() {
    let app = setup_test_app().await;
    let response = app
        .client()
        .post("/api/feedback")
        .content_type("application/json")
        .text("{not json")
        .await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_subjects_create_and_list() {
    let app = setup_test_app().await;
    let client = app.client();

    let response = client
        .post("/api/subjects")
        .json(&json!({ "name": "Physics" }))
        .await;
    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    assert_eq!(body["message"], "Subject added");

    client
        .post("/api/subjects")
        .json(&json!({ "name": "Algebra" }))
        .await;

    let response = client.get("/api/subjects").await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    let names: Vec<&str> = body["subjects"]
        .as_array()
        .expect("subjects array")
        .iter()
        .filter_map(|s| s["name"].as_str())
        .collect();
    assert_eq!(names.len(), 2);
}

#[tokio::test]
async fn test_duplicate_subject_is_rejected() {
    let app = setup_test_app().await;
    let client = app.client();

    client
        .post("/api/subjects")
        .json(&json!({ "name": "Physics" }))
        .await;
    let response = client
        .post("/api/subjects")
        .json(&json!({ "name": " physics " }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"], "Subject already exists");
}

#[tokio::test]
async fn test_blank_subject_is_rejected() {
    let app = setup_test_app().await;
    let response = app
        .client()
        .post("/api/subjects")
        .json(&json!({ "name": "" }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"], "Subject name is required");
}
