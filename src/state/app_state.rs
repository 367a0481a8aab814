use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::chat::ChatController;
use crate::models::User;
use crate::session::Session;
use crate::tasks::TaskList;

pub struct AppState {
    pub session: Arc<Session>,
    pub tasks: Mutex<TaskList>,
    pub chat: Mutex<ChatController>,
}

impl AppState {
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            tasks: Mutex::new(TaskList::new(Arc::clone(&session))),
            chat: Mutex::new(ChatController::new(Arc::clone(&session))),
            session,
        }
    }

    /// Drops per-user view state after the identity goes away.
    pub async fn reset_views(&self) {
        *self.tasks.lock().await = TaskList::new(Arc::clone(&self.session));
        self.chat.lock().await.start_new_conversation();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let identity = self.session.identity();
        SessionSnapshot {
            is_authenticated: identity.is_authenticated(),
            is_loading: self.session.is_loading(),
            display_name: identity.user.as_ref().map(|u| u.display_name().to_string()),
            user: identity.user,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub display_name: Option<String>,
    pub is_authenticated: bool,
    pub is_loading: bool,
}
