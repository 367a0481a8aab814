mod common;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use todoflow_lib::models::{MessageStatus, Role};
use todoflow_lib::storage::{KeyValueStore, MemoryStore, TOKEN_KEY, USER_KEY};
use todoflow_lib::{ApiClient, ChatController, ChatError, ClientConfig, Navigation, Session};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{fresh_session, request_count, signed_in_session};

#[tokio::test]
async fn tool_calls_add_a_summary_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/5/chat"))
        .and(header("authorization", "Bearer t1"))
        .and(body_json(json!({"message": "Add milk"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "conversation_id": 42,
            "response": "Added.",
            "tool_calls": [{"name": "add_task", "arguments": {"title": "milk"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = signed_in_session(&server).await;
    let mut chat = ChatController::new(Arc::clone(&session));
    chat.send_message("Add milk").await.unwrap();

    let conversation = chat.conversation();
    assert_eq!(conversation.id, Some(42));
    assert_eq!(conversation.messages.len(), 3);

    let user = &conversation.messages[0];
    assert_eq!(user.role, Role::User);
    assert_eq!(user.content, "Add milk");
    assert_eq!(user.status, MessageStatus::Sent);
    assert!(user.id.starts_with("user-"));

    assert_eq!(conversation.messages[1].role, Role::Assistant);
    assert_eq!(conversation.messages[1].content, "Added.");
    assert_eq!(conversation.messages[2].role, Role::Assistant);
    assert_eq!(
        conversation.messages[2].content,
        "I've executed the requested actions: add_task."
    );
    assert!(!chat.is_loading());
    assert_eq!(chat.error(), None);
}

#[tokio::test]
async fn multiple_tool_names_are_joined() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/5/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "conversation_id": 7,
            "response": "Done.",
            "tool_calls": [{"name": "complete_task"}, {"name": "delete_task"}]
        })))
        .mount(&server)
        .await;

    let session = signed_in_session(&server).await;
    let mut chat = ChatController::new(session);
    chat.send_message("tidy up").await.unwrap();

    assert_eq!(
        chat.conversation().messages[2].content,
        "I've executed the requested actions: complete_task, delete_task."
    );
}

#[tokio::test]
async fn blank_messages_are_ignored() {
    let server = MockServer::start().await;
    let session = signed_in_session(&server).await;
    let mut chat = ChatController::new(session);

    chat.send_message("").await.unwrap();
    chat.send_message("   \n\t").await.unwrap();

    assert!(chat.conversation().messages.is_empty());
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn conversation_id_is_kept_from_first_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/5/chat"))
        .and(body_json(json!({"message": "first"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "conversation_id": 42,
            "response": "one",
            "tool_calls": []
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/5/chat"))
        .and(body_json(json!({"conversation_id": 42, "message": "second"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "conversation_id": 99,
            "response": "two",
            "tool_calls": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = signed_in_session(&server).await;
    let mut chat = ChatController::new(session);
    chat.send_message("first").await.unwrap();
    assert_eq!(chat.conversation().id, Some(42));

    chat.send_message("second").await.unwrap();
    assert_eq!(chat.conversation().id, Some(42));
    assert_eq!(chat.conversation().messages.len(), 4);
}

#[tokio::test]
async fn failed_send_marks_exactly_one_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/5/chat"))
        .and(body_json(json!({"message": "ok"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "conversation_id": 3,
            "response": "fine",
            "tool_calls": []
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/5/chat"))
        .and(body_json(json!({"conversation_id": 3, "message": "break"})))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "boom"})))
        .mount(&server)
        .await;

    let session = signed_in_session(&server).await;
    let mut chat = ChatController::new(session);
    chat.send_message("ok").await.unwrap();

    let err = chat.send_message("break").await.unwrap_err();
    assert!(matches!(err, ChatError::Api(_)));
    assert_eq!(chat.error(), Some("Backend error: 500 - boom"));

    let errored: Vec<_> = chat
        .conversation()
        .messages
        .iter()
        .filter(|m| m.status == MessageStatus::Error)
        .collect();
    assert_eq!(errored.len(), 1);
    assert_eq!(errored[0].content, "break");
    assert_eq!(chat.conversation().messages.len(), 3);

    chat.clear_error();
    assert_eq!(chat.error(), None);
}

#[tokio::test]
async fn plain_text_failure_reports_status_reason() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/5/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;

    let session = signed_in_session(&server).await;
    let mut chat = ChatController::new(session);

    assert!(chat.send_message("hello").await.is_err());
    assert_eq!(chat.error(), Some("Backend error: 500 - Internal Server Error"));
}

#[tokio::test]
async fn unauthorized_chat_clears_identity_and_fails_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/5/chat"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "expired"})))
        .expect(1)
        .mount(&server)
        .await;

    let session = signed_in_session(&server).await;
    let mut chat = ChatController::new(Arc::clone(&session));

    let err = chat.send_message("hello").await.unwrap_err();
    assert!(matches!(err, ChatError::Api(_)));
    assert_eq!(err.navigation(), Some(Navigation::Login));
    assert_eq!(chat.error(), Some("Backend error: 401 - expired"));
    assert!(!session.is_authenticated());
    assert!(!session.client().storage().has_persisted_identity());

    let statuses: Vec<_> = chat.conversation().messages.iter().map(|m| m.status).collect();
    assert_eq!(statuses, vec![MessageStatus::Error]);
}

#[tokio::test]
async fn abandoned_send_does_not_stay_loading() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/5/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"conversation_id": 1, "response": "late"}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let session = signed_in_session(&server).await;
    let mut chat = ChatController::new(session);

    let outcome = tokio::time::timeout(Duration::from_millis(100), chat.send_message("hi")).await;
    assert!(outcome.is_err());
    assert!(!chat.is_loading());
}

#[tokio::test]
async fn unreachable_backend_reports_network_error() {
    let store = MemoryStore::new();
    store.set(USER_KEY, &common::user_json().to_string()).unwrap();
    store.set(TOKEN_KEY, "t1").unwrap();
    // Nothing listens on port 1.
    let config = ClientConfig::new("http://127.0.0.1:1").unwrap();
    let client = Arc::new(ApiClient::new(config, Box::new(store)).unwrap());
    let session = Arc::new(Session::new(client));
    session.initialize().await;

    let mut chat = ChatController::new(session);
    let err = chat.send_message("hello").await.unwrap_err();

    assert!(matches!(err, ChatError::Api(_)));
    assert_eq!(chat.error(), Some("Network error: Unable to reach the server"));
    assert_eq!(chat.conversation().messages[0].status, MessageStatus::Error);
}

#[tokio::test]
async fn signed_out_user_cannot_send() {
    let server = MockServer::start().await;
    let session = fresh_session(&server);
    session.initialize().await;

    let mut chat = ChatController::new(session);
    let err = chat.send_message("hello").await.unwrap_err();

    assert!(matches!(err, ChatError::NotLoggedIn));
    assert_eq!(
        chat.error(),
        Some("You must be logged in to send messages. Please log in and try again.")
    );
    assert!(chat.conversation().messages.is_empty());
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn sending_waits_for_session_restore() {
    let server = MockServer::start().await;
    let session = fresh_session(&server);

    let mut chat = ChatController::new(session);
    let err = chat.send_message("hello").await.unwrap_err();

    assert!(matches!(err, ChatError::AuthPending));
    assert_eq!(
        chat.error(),
        Some("Please wait while we verify your authentication...")
    );
    assert!(chat.conversation().messages.is_empty());
}

#[tokio::test]
async fn new_conversation_drops_history_and_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/5/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "conversation_id": 42,
            "response": "hi",
            "tool_calls": []
        })))
        .mount(&server)
        .await;

    let session = signed_in_session(&server).await;
    let mut chat = ChatController::new(session);
    chat.send_message("hello").await.unwrap();
    assert!(chat.conversation().id.is_some());

    chat.start_new_conversation();
    assert_eq!(chat.conversation().id, None);
    assert!(chat.conversation().messages.is_empty());
}
