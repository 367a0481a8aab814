use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use crate::busy::Busy;
use crate::error::ApiError;
use crate::models::{ChatMessage, ChatRequest, ChatResponse, Conversation, MessageStatus, Role};
use crate::navigation::Navigation;
use crate::session::Session;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Please wait while we verify your authentication...")]
    AuthPending,

    #[error("You must be logged in to send messages. Please log in and try again.")]
    NotLoggedIn,

    #[error("{}", describe(.0))]
    Api(#[from] ApiError),
}

impl ChatError {
    /// Where the UI should go after this failure, if anywhere.
    pub fn navigation(&self) -> Option<Navigation> {
        match self {
            ChatError::NotLoggedIn => Some(Navigation::Login),
            ChatError::Api(api) => api.navigation(),
            ChatError::AuthPending => None,
        }
    }
}

fn describe(err: &ApiError) -> String {
    match err {
        ApiError::Transport(_) => "Network error: Unable to reach the server".to_string(),
        ApiError::Unauthorized { detail } => format!(
            "Backend error: 401 - {}",
            detail.as_deref().unwrap_or("Unauthorized")
        ),
        other => other.to_string(),
    }
}

/// One assistant conversation. History only grows until
/// [`start_new_conversation`](Self::start_new_conversation) drops it.
pub struct ChatController {
    session: Arc<Session>,
    conversation: Conversation,
    loading: bool,
    error: Option<String>,
    seq: u64,
}

impl ChatController {
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            conversation: Conversation::default(),
            loading: false,
            error: None,
            seq: 0,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn start_new_conversation(&mut self) {
        log::info!("Starting new conversation");
        self.conversation = Conversation::default();
    }

    pub async fn send_message(&mut self, content: &str) -> Result<(), ChatError> {
        if content.trim().is_empty() {
            return Ok(());
        }
        if self.session.is_loading() {
            return Err(self.fail(ChatError::AuthPending));
        }
        let Some(user) = self.session.user() else {
            return Err(self.fail(ChatError::NotLoggedIn));
        };

        self.error = None;

        let pending_id = self.push(Role::User, content.to_string(), MessageStatus::Sending);

        log::info!("Sending chat message for user {}", user.id);
        let request = ChatRequest {
            conversation_id: self.conversation.id,
            message: content,
        };
        let busy = Busy::start(&mut self.loading);
        let result = self
            .session
            .client()
            .post::<_, ChatResponse>(&format!("/api/{}/chat", user.id), &request)
            .await;
        drop(busy);

        match result {
            Ok(response) => {
                self.apply(&pending_id, response);
                Ok(())
            }
            Err(e) => {
                log::error!("Error sending message: {}", e);
                self.mark_pending_failed();
                Err(self.fail(ChatError::Api(e)))
            }
        }
    }

    fn apply(&mut self, pending_id: &str, response: ChatResponse) {
        if self.conversation.id.is_none() {
            self.conversation.id = Some(response.conversation_id);
        }

        if let Some(message) = self
            .conversation
            .messages
            .iter_mut()
            .find(|m| m.id == pending_id)
        {
            message.status = MessageStatus::Sent;
        }
        self.push(Role::Assistant, response.response, MessageStatus::Sent);

        if !response.tool_calls.is_empty() {
            let names: Vec<&str> = response.tool_calls.iter().map(|c| c.name.as_str()).collect();
            let summary = format!("I've executed the requested actions: {}.", names.join(", "));
            self.push(Role::Assistant, summary, MessageStatus::Sent);
        }
    }

    fn mark_pending_failed(&mut self) {
        let prefix = format!("{}-", Role::User.prefix());
        for message in &mut self.conversation.messages {
            if message.id.starts_with(&prefix) && message.status == MessageStatus::Sending {
                message.status = MessageStatus::Error;
            }
        }
    }

    fn push(&mut self, role: Role, content: String, status: MessageStatus) -> String {
        let now = Utc::now();
        self.seq += 1;
        let id = format!("{}-{}-{}", role.prefix(), now.timestamp_millis(), self.seq);
        self.conversation.messages.push(ChatMessage {
            id: id.clone(),
            role,
            content,
            timestamp: now,
            status,
        });
        id
    }

    fn fail(&mut self, err: ChatError) -> ChatError {
        self.error = Some(err.to_string());
        err
    }
}
