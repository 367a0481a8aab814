#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{json, Value};
use todoflow_lib::storage::{KeyValueStore, MemoryStore, TOKEN_KEY, USER_KEY};
use todoflow_lib::{ApiClient, ClientConfig, Session};
use wiremock::MockServer;

pub fn user_json() -> Value {
    json!({"id": "5", "email": "a@b.com"})
}

pub fn task_json(id: i64, title: &str, completed: bool) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": null,
        "completed": completed,
        "user_id": "5",
        "created_at": "2025-01-01T00:00:00",
        "updated_at": "2025-01-01T00:00:00"
    })
}

pub fn client_with(server: &MockServer, store: MemoryStore) -> Arc<ApiClient> {
    let config = ClientConfig::new(&server.uri()).unwrap();
    Arc::new(ApiClient::new(config, Box::new(store)).unwrap())
}

/// A session that has not been initialized yet, over an empty store.
pub fn fresh_session(server: &MockServer) -> Arc<Session> {
    Arc::new(Session::new(client_with(server, MemoryStore::new())))
}

/// A session restored from a store that already holds user 5 and token `t1`.
pub async fn signed_in_session(server: &MockServer) -> Arc<Session> {
    let store = MemoryStore::new();
    store.set(USER_KEY, &user_json().to_string()).unwrap();
    store.set(TOKEN_KEY, "t1").unwrap();

    let session = Arc::new(Session::new(client_with(server, store)));
    session.initialize().await;
    assert!(session.is_authenticated());
    session
}

pub async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.map(|r| r.len()).unwrap_or(0)
}
