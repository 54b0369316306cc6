#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response},
    Router,
};
use docx_rust::document::Paragraph;
use docx_rust::Docx;
use serde_json::Value;

use question_gateway::error::{AppError, AppResult};
use question_gateway::models::UploadedFile;
use question_gateway::services::{ExtractorRegistry, QuestionParser, QuestionStore, TextExtractor};
use question_gateway::{router, AppState, Config};

pub const SECRET: &str = "test-access-id-2718!";
pub const BOUNDARY: &str = "----question-gateway-test-boundary";

/// Parser that records every text it receives and answers with a fixed list.
#[derive(Default)]
pub struct RecordingParser {
    pub calls: Mutex<Vec<String>>,
    pub reply: Vec<String>,
}

impl RecordingParser {
    pub fn replying(reply: &[&str]) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            reply: reply.iter().map(|q| q.to_string()).collect(),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuestionParser for RecordingParser {
    async fn parse_questions(&self, text: &str) -> AppResult<Vec<String>> {
        self.calls.lock().unwrap().push(text.to_string());
        Ok(self.reply.clone())
    }
}

#[derive(Default)]
pub struct RecordingStore {
    pub calls: Mutex<Vec<(Vec<String>, String)>>,
    pub fail: bool,
}

impl RecordingStore {
    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<(Vec<String>, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuestionStore for RecordingStore {
    async fn upload_questions(&self, questions: &[String], topic: &str) -> AppResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push((questions.to_vec(), topic.to_string()));
        if self.fail {
            return Err(AppError::persistence("connection refused"));
        }
        Ok(())
    }

    async fn is_healthy(&self) -> bool {
        !self.fail
    }
}

/// Extractor that counts invocations and returns a fixed text.
pub struct CountingExtractor {
    pub extension: &'static str,
    pub text: String,
    pub calls: AtomicUsize,
}

impl CountingExtractor {
    pub fn new(extension: &'static str, text: &str) -> Self {
        Self {
            extension,
            text: text.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextExtractor for CountingExtractor {
    fn extension(&self) -> &'static str {
        self.extension
    }

    async fn extract(&self, _file: &UploadedFile) -> AppResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone())
    }
}

pub fn test_config() -> Config {
    Config {
        access_id: SECRET.to_string(),
        pages_converter_command: "cat".to_string(),
        pages_converter_args: vec!["{input}".to_string()],
        conversion_timeout_seconds: 5,
        ..Config::default()
    }
}

pub fn app(parser: Arc<RecordingParser>, store: Arc<RecordingStore>) -> Router {
    router(AppState::new(test_config(), parser, store))
}

pub fn app_with_extractors(
    config: Config,
    extractors: ExtractorRegistry,
    parser: Arc<RecordingParser>,
    store: Arc<RecordingStore>,
) -> Router {
    router(AppState::with_extractors(config, extractors, parser, store))
}

/// Builds a `multipart/form-data` body with an `access_id` field and, when
/// given, a `file` field.
pub fn multipart_body(file: Option<(&str, &[u8])>, access_id: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(access_id) = access_id {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(b"Content-Disposition: form-data; name=\"access_id\"\r\n\r\n");
        body.extend_from_slice(access_id.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    if let Some((file_name, content)) = file {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
                file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn parse_request(file_name: &str, content: &[u8], access_id: &str) -> Request<Body> {
    multipart_request(multipart_body(Some((file_name, content)), Some(access_id)))
}

pub fn multipart_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/parse-question")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn upload_request(body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/upload-question")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// A real `.docx` with one body paragraph per entry.
pub fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
    docx_with_paragraphs(
        paragraphs
            .iter()
            .map(|text| Paragraph::default().push_text(*text))
            .collect(),
    )
}

/// A real `.docx` built from prepared paragraphs, for run-level content.
pub fn docx_with_paragraphs(paragraphs: Vec<Paragraph<'_>>) -> Vec<u8> {
    let mut docx = Docx::default();
    for paragraph in paragraphs {
        docx.document.push(paragraph);
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("questions.docx");
    docx.write_file(&path).unwrap();
    std::fs::read(&path).unwrap()
}
