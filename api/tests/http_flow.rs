use std::{future::Future, io::Write, path::Path, pin::Pin, sync::Arc, time::Duration};

use ai_llm_service::AiLlmError;

use api::{AppState, QaService, build_router};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use dataset_loader::DatasetLoader;
use http_body_util::BodyExt;
use rag_store::{ChatModel, EmbeddingFingerprint, EmbeddingsProvider, RagConfig, RagError, VectorIndex};
use serde_json::Value;
use tower::ServiceExt;

struct CharEmbedder;

impl EmbeddingsProvider for CharEmbedder {
    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, RagError>> + Send + 'a>> {
        Box::pin(async move {
            let lower = text.to_lowercase();
            Ok(vec![
                lower.matches("fever").count() as f32,
                lower.matches("cough").count() as f32,
                1.0,
            ])
        })
    }

    fn fingerprint(&self) -> EmbeddingFingerprint {
        EmbeddingFingerprint {
            provider: "test".into(),
            model: "chars".into(),
        }
    }
}

struct FixedChat;

impl ChatModel for FixedChat {
    fn complete<'a>(
        &'a self,
        _prompt: &'a str,
        _system: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = Result<String, RagError>> + Send + 'a>> {
        Box::pin(async { Ok("Rest, drink fluids and watch your temperature.".to_string()) })
    }
}

struct TimedOutChat;

impl ChatModel for TimedOutChat {
    fn complete<'a>(
        &'a self,
        _prompt: &'a str,
        _system: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = Result<String, RagError>> + Send + 'a>> {
        Box::pin(async { Err(RagError::Upstream(AiLlmError::Timeout(Duration::from_secs(60)))) })
    }
}

fn write_dataset(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("rows.jsonl");
    let mut f = std::fs::File::create(&path).unwrap();
    writeln!(f, r#"{{"input":"I have a fever since yesterday","output":"Rest and drink fluids."}}"#).unwrap();
    writeln!(f, r#"{{"input":"Dry cough at night","output":"Try honey in warm water."}}"#).unwrap();
    writeln!(f, r#"{{"input":"Headache after screens","output":"Take breaks."}}"#).unwrap();
    path
}

fn app(dir: &Path) -> Router {
    app_with_chat(dir, Arc::new(FixedChat))
}

fn app_with_chat(dir: &Path, chat: Arc<dyn ChatModel>) -> Router {
    let dataset = write_dataset(dir);
    let index = VectorIndex::new(
        RagConfig::new_default(dir.join("vector_store")),
        Arc::new(CharEmbedder),
        chat,
    )
    .unwrap();
    let qa = QaService::new(index, DatasetLoader::jsonl(dataset, "local"));
    build_router(Arc::new(AppState::ready(qa)))
}

async fn call(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    assert!(resp.headers().contains_key("x-request-id"));
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::post(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn initialize_query_reset_flow() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path());

    let (status, body) = call(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (_, body) = call(&app, get("/status")).await;
    assert_eq!(body["status"], "not_ready");
    assert_eq!(body["index_loaded"], false);

    let (status, body) = call(&app, post_json("/query", r#"{"question":"fever?"}"#)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "INDEX_NOT_READY");
    assert_eq!(
        body["detail"],
        "Vector store not initialized. Use /initialize endpoint first."
    );

    let (status, body) = call(&app, post_empty("/initialize?max_samples=2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["documents_count"], 22);
    assert_eq!(body["message"], "Index initialized with 22 documents");

    let (_, body) = call(&app, get("/status")).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["message"], "System ready");

    let (status, body) = call(&app, post_json("/query", r#"{"question":"What about my fever?"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["answer"], "Rest, drink fluids and watch your temperature.");

    let (status, body) = call(&app, post_empty("/reset")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Vector store reset successfully");

    let (_, body) = call(&app, get("/status")).await;
    assert_eq!(body["index_loaded"], false);
}

#[tokio::test]
async fn initialize_defaults_to_whole_small_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path());

    let (status, body) = call(&app, post_empty("/initialize")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["documents_count"], 23);
}

#[tokio::test]
async fn zero_max_samples_loads_every_row() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path());

    let (status, body) = call(&app, post_empty("/initialize?max_samples=0")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["documents_count"], 23);
}

#[tokio::test]
async fn malformed_json_is_a_client_error() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path());

    let (status, body) = call(&app, post_json("/query", "{")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");

    let (status, body) = call(&app, post_json("/query", r#"{"q":"x"}"#)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "UNPROCESSABLE_ENTITY");
}

#[tokio::test]
async fn missing_dataset_reports_ingestion_failure() {
    let dir = tempfile::tempdir().unwrap();
    let index = VectorIndex::new(
        RagConfig::new_default(dir.path().join("vector_store")),
        Arc::new(CharEmbedder),
        Arc::new(FixedChat),
    )
    .unwrap();
    let qa = QaService::new(index, DatasetLoader::jsonl(dir.path().join("absent.jsonl"), "local"));
    let app = build_router(Arc::new(AppState::ready(qa)));

    let (status, body) = call(&app, post_empty("/initialize")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "INGESTION_FAILED");
}

#[tokio::test]
async fn unavailable_service_reports_error_status() {
    let app = build_router(Arc::new(AppState::unavailable("missing config")));

    let (_, body) = call(&app, get("/status")).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Vector store not initialized");

    let (status, _) = call(&app, post_json("/query", r#"{"question":"hi"}"#)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, body) = call(&app, post_empty("/reset")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, body) = call(&app, get("/")).await;
    assert_eq!(body["endpoints"]["query"], "/query");
}

#[tokio::test]
async fn model_failure_is_reported_as_upstream_failure() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with_chat(dir.path(), Arc::new(TimedOutChat));

    let (status, _) = call(&app, post_empty("/initialize?max_samples=1")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app, post_json("/query", r#"{"question":"fever?"}"#)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "UPSTREAM_FAILURE");
    assert!(body["detail"].as_str().unwrap().starts_with("upstream model failure: "));
}
