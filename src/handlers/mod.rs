use serde::Serialize;

use crate::navigation::Navigation;

pub mod message_handler;
pub mod task_handler;
pub mod user_handler;

/// Error shape handed to the webview; `redirect` tells it where to go next
/// and `redirect_path` is the route to push.
#[derive(Debug, Serialize)]
pub struct CommandError {
    pub message: String,
    pub redirect: Option<Navigation>,
    pub redirect_path: Option<&'static str>,
}

impl CommandError {
    pub fn new(message: String, redirect: Option<Navigation>) -> Self {
        CommandError {
            message,
            redirect,
            redirect_path: redirect.map(Navigation::path),
        }
    }
}
