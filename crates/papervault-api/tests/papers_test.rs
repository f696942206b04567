//! Submission, listing and voting through the public routes.
//!
//! Run with: `cargo test -p papervault-api --test papers_test`

mod helpers;

use helpers::fixtures::{
    image_part, paper_id, pdf_part, submission, upload_pdfs, DownGate, PrefixGate,
};
use helpers::{setup_test_app, setup_test_app_with};
use serde_json::Value;
use std::sync::Arc;

#[tokio::test]
async fn test_upload_creates_paper_with_files_in_order() {
    let app = setup_test_app().await;
    let client = app.client();

    let form = submission(
        "  Mathematics ",
        "Fall 2024",
        vec![
            pdf_part("first.pdf", "one"),
            pdf_part("second.pdf", "two"),
        ],
    );
    let response = client.post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["paper"]["subject"], "mathematics");
    assert_eq!(body["paper"]["semester"], "Fall 2024");
    let files = body["paper"]["files"].as_array().expect("files array");
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["filename"], "first.pdf");
    assert_eq!(files[1]["filename"], "second.pdf");
    assert_eq!(files[0]["index"], 0);
    assert_eq!(files[0]["upvotes"], 0);
    assert!(body["skipped"].as_array().expect("skipped array").is_empty());
    assert_eq!(app.papers.len(), 1);
    assert_eq!(app.stored_file_count(), 2);
}

#[tokio::test]
async fn test_uploaded_payload_is_served_from_its_url() {
    let app = setup_test_app().await;
    let client = app.client();

    let paper = upload_pdfs(client, "physics", 1).await;
    let url = paper["files"][0]["url"].as_str().expect("url");
    assert!(url.starts_with("/uploads/"));

    let response = client.get(url).await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.as_bytes().as_ref(), b"%PDF-1.4 page 0");
}

#[tokio::test]
async fn test_upload_without_files_is_rejected() {
    let app = setup_test_app().await;
    let response = app
        .client()
        .post("/upload")
        .multipart(submission("math", "Fall 2024", vec![]))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"], "No files uploaded.");
    assert_eq!(app.papers.len(), 0);
}

#[tokio::test]
async fn test_upload_requires_subject() {
    let app = setup_test_app().await;
    let response = app
        .client()
        .post("/upload")
        .multipart(submission("   ", "Fall 2024", vec![pdf_part("a.pdf", "a")]))
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(app.stored_file_count(), 0);
}

#[tokio::test]
async fn test_rejected_image_is_skipped_and_rest_kept() {
    let app = setup_test_app_with(Arc::new(PrefixGate)).await;

    let form = submission(
        "biology",
        "Spring 2025",
        vec![
            image_part("bad.png", b"flagged image"),
            pdf_part("good.pdf", "fine"),
        ],
    );
    let response = app.client().post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    let files = body["paper"]["files"].as_array().expect("files array");
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["filename"], "good.pdf");
    assert_eq!(body["skipped"][0]["index"], 0);
    assert_eq!(body["skipped"][0]["reason"], "moderation_rejected");
    assert_eq!(app.stored_file_count(), 1);
}

#[tokio::test]
async fn test_all_images_rejected_creates_no_paper() {
    let app = setup_test_app_with(Arc::new(PrefixGate)).await;

    let form = submission(
        "biology",
        "Spring 2025",
        vec![image_part("bad.png", b"flagged image")],
    );
    let response = app.client().post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(app.papers.len(), 0);
    assert_eq!(app.stored_file_count(), 0);
}

#[tokio::test]
async fn test_unreachable_moderation_discards_images() {
    let app = setup_test_app_with(Arc::new(DownGate)).await;

    let form = submission(
        "chemistry",
        "Fall 2024",
        vec![
            image_part("scan.png", b"plain image"),
            pdf_part("notes.pdf", "notes"),
        ],
    );
    let response = app.client().post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    assert_eq!(body["paper"]["files"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["skipped"][0]["reason"], "moderation_unavailable");
}

#[tokio::test]
async fn test_list_papers_filters_by_normalized_subject() {
    let app = setup_test_app().await;
    let client = app.client();

    upload_pdfs(client, "Math", 1).await;
    upload_pdfs(client, "history", 1).await;

    let response = client.get("/papers").add_query_param("subject", " MATH ").await;
    assert_eq!(response.status_code(), 200);
    let papers: Vec<Value> = response.json();
    assert_eq!(papers.len(), 1);
    assert_eq!(papers[0]["subject"], "math");

    let all: Vec<Value> = client.get("/papers").await.json();
    assert_eq!(all.len(), 2);
    // Newest first
    assert_eq!(all[0]["subject"], "history");
}

#[tokio::test]
async fn test_upvote_increments_counter() {
    let app = setup_test_app().await;
    let client = app.client();
    let paper = upload_pdfs(client, "math", 2).await;
    let id = paper_id(&paper);

    let response = client.put(&format!("/papers/{}/files/1/upvote", id)).await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["message"], "File upvoted");
    assert_eq!(body["file"]["index"], 1);
    assert_eq!(body["file"]["upvotes"], 1);
    assert_eq!(body["file"]["downvotes"], 0);
}

#[tokio::test]
async fn test_third_downvote_hides_file_from_listing() {
    let app = setup_test_app().await;
    let client = app.client();
    let paper = upload_pdfs(client, "math", 2).await;
    let id = paper_id(&paper);

    for _ in 0..3 {
        let response = client.put(&format!("/papers/{}/files/0/downvote", id)).await;
        assert_eq!(response.status_code(), 200);
        let body: Value = response.json();
        assert_eq!(body["message"], "File downvoted");
    }

    let papers: Vec<Value> = client.get("/papers").await.json();
    let files = papers[0]["files"].as_array().expect("files array");
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["index"], 1);
}

#[tokio::test]
async fn test_paper_with_every_file_hidden_is_not_listed() {
    let app = setup_test_app().await;
    let client = app.client();
    let paper = upload_pdfs(client, "math", 1).await;
    let id = paper_id(&paper);

    for _ in 0..3 {
        client.put(&format!("/papers/{}/files/0/downvote", id)).await;
    }

    let papers: Vec<Value> = client.get("/papers").await.json();
    assert!(papers.is_empty());
}

#[tokio::test]
async fn test_vote_on_missing_targets() {
    let app = setup_test_app().await;
    let client = app.client();
    let paper = upload_pdfs(client, "math", 1).await;
    let id = paper_id(&paper);

    let response = client.put(&format!("/papers/{}/files/5/upvote", id)).await;
    assert_eq!(response.status_code(), 404);
    let body: Value = response.json();
    assert_eq!(body["error"], "File not found");

    let response = client
        .put(&format!("/papers/{}/files/0/upvote", uuid::Uuid::new_v4()))
        .await;
    assert_eq!(response.status_code(), 404);
    let body: Value = response.json();
    assert_eq!(body["error"], "Paper not found");
}

#[tokio::test]
async fn test_vote_with_malformed_id_is_bad_request() {
    let app = setup_test_app().await;
    let response = app.client().put("/papers/not-a-uuid/files/0/upvote").await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_concurrent_upvotes_are_all_counted() {
    let app = setup_test_app().await;
    let client = app.client();
    let paper = upload_pdfs(client, "math", 1).await;
    let id = paper_id(&paper);
    let path = format!("/papers/{}/files/0/upvote", id);

    let requests = (0..20).map(|_| async { client.put(&path).await.status_code() });
    let statuses = futures::future::join_all(requests).await;
    assert!(statuses.iter().all(|s| *s == 200));

    let papers: Vec<Value> = client.get("/papers").await.json();
    assert_eq!(papers[0]["files"][0]["upvotes"], 20);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = setup_test_app().await;
    let response = app.client().get("/api/openapi.json").await;
    assert_eq!(response.status_code(), 200);
    let spec: Value = response.json();
    assert!(spec["paths"]["/upload"].is_object());
}
