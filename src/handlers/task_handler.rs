use crate::models::{Task, TaskUpdate};
use crate::state::AppState;
use crate::tasks::{TaskError, TaskStats};

use super::CommandError;

impl From<TaskError> for CommandError {
    fn from(err: TaskError) -> Self {
        CommandError::new(err.to_string(), err.navigation())
    }
}

#[tauri::command]
pub async fn fetch_tasks(state: tauri::State<'_, AppState>) -> Result<Vec<Task>, CommandError> {
    log::info!("Fetching all tasks");
    let mut tasks = state.tasks.lock().await;
    tasks.fetch_tasks().await?;
    Ok(tasks.tasks().to_vec())
}

#[tauri::command]
pub async fn create_task(
    state: tauri::State<'_, AppState>,
    title: String,
    description: Option<String>,
) -> Result<Task, CommandError> {
    let mut tasks = state.tasks.lock().await;
    Ok(tasks.create_task(&title, description.as_deref()).await?)
}

#[tauri::command]
pub async fn get_task(
    state: tauri::State<'_, AppState>,
    task_id: i64,
) -> Result<Task, CommandError> {
    let mut tasks = state.tasks.lock().await;
    Ok(tasks.get_task(task_id).await?)
}

#[tauri::command]
pub async fn toggle_complete(
    state: tauri::State<'_, AppState>,
    task_id: i64,
    current_completed: bool,
) -> Result<Vec<Task>, CommandError> {
    let mut tasks = state.tasks.lock().await;
    tasks.toggle_complete(task_id, current_completed).await?;
    Ok(tasks.tasks().to_vec())
}

#[tauri::command]
pub async fn update_task(
    state: tauri::State<'_, AppState>,
    task_id: i64,
    update: TaskUpdate,
) -> Result<Vec<Task>, CommandError> {
    let mut tasks = state.tasks.lock().await;
    tasks.update_task(task_id, &update).await?;
    Ok(tasks.tasks().to_vec())
}

#[tauri::command]
pub async fn delete_task(
    state: tauri::State<'_, AppState>,
    task_id: i64,
) -> Result<Vec<Task>, CommandError> {
    let mut tasks = state.tasks.lock().await;
    tasks.delete_task(task_id).await?;
    Ok(tasks.tasks().to_vec())
}

#[tauri::command]
pub async fn task_stats(state: tauri::State<'_, AppState>) -> Result<TaskStats, CommandError> {
    Ok(state.tasks.lock().await.stats())
}
