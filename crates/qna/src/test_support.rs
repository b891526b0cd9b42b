//! In-process backend for shell tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;

use crate::client::ApiClient;
use crate::config::ApiConfig;

/// Query strings received by a test route, in arrival order
pub type Recorded = Arc<Mutex<Vec<HashMap<String, String>>>>;

/// Serve `router` on an ephemeral local port and return its API base URL
pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{addr}/api/v1")
}

/// Base URL of a port nothing listens on
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    format!("http://{addr}/api/v1")
}

pub fn client(base_url: &str) -> ApiClient {
    let config = ApiConfig::new(base_url, Duration::from_secs(5)).unwrap();
    ApiClient::new(&config).unwrap()
}

pub fn recorded() -> Recorded {
    Arc::new(Mutex::new(Vec::new()))
}

/// A question record as the backend serializes it
pub fn question_json(id: u64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": format!("Question number {id}"),
        "content": "What is the idiomatic way to do this?",
        "created_at": "2024-03-01T10:00:00Z",
        "updated_at": "2024-03-01T10:00:00Z",
        "like_count": 2,
        "likes_count": 2,
        "view_count": 11,
        "views_count": 11
    })
}
