#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use quiz_adaptive_backend::config::DEFAULT_ROUTE_PREFIX;
use quiz_adaptive_backend::quiz::store::{MemoryRecordStore, RecordStore, SqliteRecordStore};
use quiz_adaptive_backend::quiz::{QuizConfig, QuizEngine};
use quiz_adaptive_backend::state::{AppState, Engine};

pub const TEST_SEED: u64 = 42;

pub type TestEngine = Engine;

pub fn create_test_engine() -> Arc<Engine> {
    Arc::new(QuizEngine::with_seed(
        QuizConfig::default(),
        RecordStore::Memory(MemoryRecordStore::new()),
        TEST_SEED,
    ))
}

pub async fn create_sqlite_engine(target: &str) -> Arc<Engine> {
    let store = SqliteRecordStore::connect(target)
        .await
        .expect("sqlite store should open");
    Arc::new(QuizEngine::with_seed(
        QuizConfig::default(),
        RecordStore::Sqlite(store),
        TEST_SEED,
    ))
}

pub fn create_test_app() -> (Router, Arc<Engine>) {
    let engine = create_test_engine();
    let app = quiz_adaptive_backend::build_app(
        AppState::new(Arc::clone(&engine)),
        Some(DEFAULT_ROUTE_PREFIX),
    );
    (app, engine)
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}
