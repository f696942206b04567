//! Multipart bodies and helpers shared by the suites.

#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use bytes::Bytes;
use papervault_services::{ModerationError, ModerationGate, Verdict};
use serde_json::Value;

/// Bytes that classify as a PDF by name but fail to parse, so they are stored as sent.
pub fn pdf_part(filename: &str, body: &str) -> Part {
    Part::bytes(Bytes::from(format!("%PDF-1.4 {}", body)))
        .file_name(filename.to_string())
        .mime_type("application/pdf")
}

pub fn image_part(filename: &str, body: &[u8]) -> Part {
    Part::bytes(Bytes::copy_from_slice(body))
        .file_name(filename.to_string())
        .mime_type("image/png")
}

pub fn submission(subject: &str, semester: &str, parts: Vec<Part>) -> MultipartForm {
    let mut form = MultipartForm::new()
        .add_text("subject", subject.to_string())
        .add_text("semester", semester.to_string())
        .add_text("description", "Final exam");
    for part in parts {
        form = form.add_part("files", part);
    }
    form
}

/// Upload a paper with `files` PDFs and return the created paper JSON.
pub async fn upload_pdfs(client: &TestServer, subject: &str, files: usize) -> Value {
    let parts = (0..files)
        .map(|i| pdf_part(&format!("page-{}.pdf", i), &format!("page {}", i)))
        .collect();
    let response = client
        .post("/upload")
        .multipart(submission(subject, "Fall 2024", parts))
        .await;
    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    body["paper"].clone()
}

pub fn paper_id(paper: &Value) -> String {
    paper["id"]
        .as_str()
        .expect("Expected 'id' in paper")
        .to_string()
}

/// Rejects images whose bytes start with `flagged`.
pub struct PrefixGate;

#[async_trait]
impl ModerationGate for PrefixGate {
    async fn assess(&self, image: &Bytes) -> Result<Verdict, ModerationError> {
        let score = if image.starts_with(b"flagged") { 0.95 } else { 0.05 };
        Ok(Verdict::from_score(score, 0.6))
    }

    fn name(&self) -> &'static str {
        "prefix"
    }
}

/// Classifier that is never reachable.
pub struct DownGate;

#[async_trait]
impl ModerationGate for DownGate {
    async fn assess(&self, _image: &Bytes) -> Result<Verdict, ModerationError> {
        Err(ModerationError::Timeout(10))
    }

    fn name(&self) -> &'static str {
        "down"
    }
}
