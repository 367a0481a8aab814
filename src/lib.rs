//! TodoFlow client core: the signed-in session, the HTTP wrapper that carries
//! it, the task list and the assistant chat. The Tauri shell that exposes
//! these to the webview is behind the `desktop` feature.

mod busy;
pub mod chat;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod navigation;
pub mod session;
pub mod storage;
pub mod tasks;

#[cfg(feature = "desktop")]
mod handlers;
#[cfg(feature = "desktop")]
mod state;

pub use chat::{ChatController, ChatError};
pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{ApiError, StorageError};
pub use navigation::{Navigation, RouteDecision, RouteGuard};
pub use session::{Session, SessionError};
pub use tasks::{TaskError, TaskList, TaskStats};

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use std::sync::Arc;
    use tauri::Manager;

    tauri::Builder::default()
        .setup(|app| {
            let config = ClientConfig::from_env()?;
            let client = Arc::new(ApiClient::from_config(config)?);
            let session = Arc::new(Session::new(client));

            let restoring = Arc::clone(&session);
            tauri::async_runtime::spawn(async move {
                restoring.initialize().await;
            });

            app.manage(state::AppState::new(session));
            Ok(())
        })
        .plugin(
            tauri_plugin_log::Builder::new()
                .target(tauri_plugin_log::Target::new(
                    tauri_plugin_log::TargetKind::LogDir {
                        file_name: Some("todoflow.log".to_string()),
                    },
                ))
                .build(),
        )
        .invoke_handler(tauri::generate_handler![
            handlers::user_handler::login,
            handlers::user_handler::register,
            handlers::user_handler::logout,
            handlers::user_handler::current_session,
            handlers::user_handler::check_route,
            handlers::task_handler::fetch_tasks,
            handlers::task_handler::create_task,
            handlers::task_handler::toggle_complete,
            handlers::task_handler::get_task,
            handlers::task_handler::update_task,
            handlers::task_handler::delete_task,
            handlers::task_handler::task_stats,
            handlers::message_handler::send_message,
            handlers::message_handler::get_conversation,
            handlers::message_handler::start_new_conversation,
            handlers::message_handler::clear_chat_error
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
