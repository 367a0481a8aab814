use crate::chat::ChatError;
use crate::models::Conversation;
use crate::state::AppState;

use super::CommandError;

impl From<ChatError> for CommandError {
    fn from(err: ChatError) -> Self {
        CommandError::new(err.to_string(), err.navigation())
    }
}

#[tauri::command]
pub async fn send_message(
    state: tauri::State<'_, AppState>,
    content: String,
) -> Result<Conversation, CommandError> {
    let mut chat = state.chat.lock().await;
    chat.send_message(&content).await?;
    Ok(chat.conversation().clone())
}

#[tauri::command]
pub async fn get_conversation(state: tauri::State<'_, AppState>) -> Result<Conversation, String> {
    Ok(state.chat.lock().await.conversation().clone())
}

#[tauri::command]
pub async fn start_new_conversation(state: tauri::State<'_, AppState>) -> Result<(), String> {
    state.chat.lock().await.start_new_conversation();
    Ok(())
}

#[tauri::command]
pub async fn clear_chat_error(state: tauri::State<'_, AppState>) -> Result<(), String> {
    state.chat.lock().await.clear_error();
    Ok(())
}
