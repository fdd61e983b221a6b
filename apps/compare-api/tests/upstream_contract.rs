//! Upstream clients against in-process stand-ins for the document-parse
//! and chat-completion services

use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, State};
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use compare_api::analysis::{analyze, build_request};
use compare_api::upstream::{
    ChatCompletion, DocumentParser, UploadFile, UpstageChat, UpstageDocumentParser, UpstreamError,
};
use pretty_assertions::assert_eq;
use reqwest::Client;
use serde_json::{json, Value};
use shared_types::{AnalyzeRequest, Severity};

/// What the stand-in service saw
#[derive(Debug, Default)]
struct Received {
    calls: usize,
    auth: Option<String>,
    fields: Vec<(String, String)>,
    file_name: Option<String>,
    file_type: Option<String>,
    body: Option<Value>,
}

type Shared = Arc<Mutex<Received>>;

fn auth_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn fake_document_parse(
    State(received): State<Shared>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Json<Value> {
    let mut fields = Vec::new();
    let mut file_name = None;
    let mut file_type = None;
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        if name == "document" {
            file_name = field.file_name().map(str::to_string);
            file_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.unwrap();
            fields.push((name, String::from_utf8_lossy(&bytes).into_owned()));
        } else {
            fields.push((name, field.text().await.unwrap()));
        }
    }

    let mut r = received.lock().unwrap();
    r.calls += 1;
    r.auth = auth_header(&headers);
    r.fields = fields;
    r.file_name = file_name;
    r.file_type = file_type;

    Json(json!({
        "api": "2.0",
        "content": { "html": "<p>Confidential</p>", "markdown": "", "text": "Confidential" },
        "elements": [{
            "category": "paragraph",
            "content": { "html": "<p>Confidential</p>", "markdown": "", "text": "Confidential" },
            "coordinates": [{ "x": 0.1, "y": 0.2 }],
            "id": 0,
            "page": 1
        }],
        "model": "document-parse",
        "usage": { "pages": 1 }
    }))
}

async fn fake_chat(
    State(received): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let mut r = received.lock().unwrap();
    r.calls += 1;
    r.auth = auth_header(&headers);
    r.body = Some(body);

    let content = json!({
        "sections": [{ "title": "Term", "match": 80, "differences": "Shorter term" }],
        "risks": [],
        "summary": { "overallRisk": "low", "keyIssues": [], "recommendation": "Sign" }
    })
    .to_string();
    Json(json!({
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
    }))
}

/// Serve `app` on an ephemeral port and return its base URL
async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn document_parse_service() -> (String, Shared) {
    let received = Shared::default();
    let app = Router::new()
        .route("/v1/document-digitization", post(fake_document_parse))
        .with_state(received.clone());
    let base = serve(app).await;
    (format!("{}/v1/document-digitization", base), received)
}

async fn chat_service() -> (String, Shared) {
    let received = Shared::default();
    let app = Router::new()
        .route("/v1/chat/completions", post(fake_chat))
        .with_state(received.clone());
    let base = serve(app).await;
    (format!("{}/v1/chat/completions", base), received)
}

/// A service that always answers `status` with `body`
async fn failing_service(status: StatusCode, body: Value) -> String {
    let app = Router::new().route(
        "/",
        post(move || {
            let body = body.clone();
            async move { (status, Json(body)) }
        }),
    );
    format!("{}/", serve(app).await)
}

fn pdf() -> UploadFile {
    UploadFile {
        file_name: "a.pdf".to_string(),
        content_type: Some("application/pdf".to_string()),
        bytes: b"%PDF-1.4".to_vec(),
    }
}

fn field<'a>(received: &'a Received, name: &str) -> Option<&'a str> {
    received
        .fields
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
}

// ============================================================
// Document parse
// ============================================================

#[tokio::test]
async fn document_parse_sends_form_and_bearer_key() {
    let (url, received) = document_parse_service().await;
    let parser = UpstageDocumentParser::new(Client::new(), Some("k".to_string())).with_url(url);

    let parsed = parser.parse(pdf()).await.unwrap();
    assert_eq!(parsed.text, "Confidential");
    assert_eq!(parsed.pages, 1);
    assert_eq!(parsed.elements.len(), 1);

    let r = received.lock().unwrap();
    assert_eq!(r.calls, 1);
    assert_eq!(r.auth.as_deref(), Some("Bearer k"));
    assert_eq!(r.file_name.as_deref(), Some("a.pdf"));
    assert_eq!(r.file_type.as_deref(), Some("application/pdf"));
    assert_eq!(field(&r, "document"), Some("%PDF-1.4"));
    assert_eq!(field(&r, "output_formats"), Some(r#"["html", "text"]"#));
    assert_eq!(field(&r, "base64_encoding"), Some(r#"["table"]"#));
    assert_eq!(field(&r, "ocr"), Some("auto"));
    assert_eq!(field(&r, "coordinates"), Some("true"));
    assert_eq!(field(&r, "model"), Some("document-parse"));
}

#[tokio::test]
async fn document_parse_maps_error_status_and_message() {
    let url = failing_service(
        StatusCode::TOO_MANY_REQUESTS,
        json!({ "error": { "message": "slow down" } }),
    )
    .await;
    let parser = UpstageDocumentParser::new(Client::new(), Some("k".to_string())).with_url(url);

    match parser.parse(pdf()).await {
        Err(UpstreamError::Status { status, message }) => {
            assert_eq!(status, 429);
            assert_eq!(message, "slow down");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn document_parse_without_key_makes_no_request() {
    let (url, received) = document_parse_service().await;
    let parser = UpstageDocumentParser::new(Client::new(), None).with_url(url);

    assert!(matches!(
        parser.parse(pdf()).await,
        Err(UpstreamError::MissingApiKey)
    ));
    assert_eq!(received.lock().unwrap().calls, 0);
}

// ============================================================
// Chat completion
// ============================================================

#[tokio::test]
async fn chat_sends_strict_schema_request() {
    let (url, received) = chat_service().await;
    let chat = UpstageChat::new(Client::new(), Some("k".to_string())).with_url(url);
    let request = build_request("solar-pro2", &AnalyzeRequest::new("Reference", "Customer"));

    let response = chat.complete(&request).await.unwrap();
    assert!(response.first_content().is_some());

    let r = received.lock().unwrap();
    assert_eq!(r.calls, 1);
    assert_eq!(r.auth.as_deref(), Some("Bearer k"));

    let body = r.body.as_ref().unwrap();
    assert_eq!(body["model"], "solar-pro2");
    assert_eq!(body["reasoning_effort"], "high");
    assert_eq!(body["stream"], false);
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["role"], "user");
    assert!(body["messages"][1]["content"]
        .as_str()
        .unwrap()
        .contains("Reference"));
    assert_eq!(body["response_format"]["type"], "json_schema");
    assert_eq!(body["response_format"]["json_schema"]["name"], "nda_analysis");
    assert_eq!(body["response_format"]["json_schema"]["strict"], true);
    assert_eq!(
        body["response_format"]["json_schema"]["schema"]["type"],
        "object"
    );
}

#[tokio::test]
async fn analyze_over_http_returns_model_result() {
    let (url, _received) = chat_service().await;
    let chat = UpstageChat::new(Client::new(), Some("k".to_string())).with_url(url);

    let result = analyze(&chat, "solar-pro2", &AnalyzeRequest::new("a", "b")).await;
    assert!(!result.is_degraded());
    assert_eq!(result.sections[0].match_score, 80);
    assert_eq!(result.summary.overall_risk, Severity::Low);
}

#[tokio::test]
async fn chat_maps_error_status_and_message() {
    let url = failing_service(
        StatusCode::SERVICE_UNAVAILABLE,
        json!({ "message": "overloaded" }),
    )
    .await;
    let chat = UpstageChat::new(Client::new(), Some("k".to_string())).with_url(url);
    let request = build_request("solar-pro2", &AnalyzeRequest::new("a", "b"));

    match chat.complete(&request).await {
        Err(UpstreamError::Status { status, message }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "overloaded");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    let result = analyze(&chat, "solar-pro2", &AnalyzeRequest::new("a", "b")).await;
    assert!(result.is_degraded());
}

#[tokio::test]
async fn chat_without_key_makes_no_request() {
    let (url, received) = chat_service().await;
    let chat = UpstageChat::new(Client::new(), None).with_url(url);
    let request = build_request("solar-pro2", &AnalyzeRequest::new("a", "b"));

    assert!(matches!(
        chat.complete(&request).await,
        Err(UpstreamError::MissingApiKey)
    ));
    assert_eq!(received.lock().unwrap().calls, 0);
}
