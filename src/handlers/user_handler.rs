use crate::navigation::{Navigation, RouteDecision};
use crate::state::{AppState, SessionSnapshot};

#[tauri::command]
pub async fn login(
    state: tauri::State<'_, AppState>,
    email: String,
    password: String,
) -> Result<Navigation, String> {
    log::info!("login requested for {}", email);
    state.session.login(&email, &password).await.map_err(|e| {
        log::error!("Login failed: {}", e);
        e.to_string()
    })
}

#[tauri::command]
pub async fn register(
    state: tauri::State<'_, AppState>,
    email: String,
    password: String,
    first_name: Option<String>,
    last_name: Option<String>,
) -> Result<Navigation, String> {
    log::info!("register requested for {}", email);
    state
        .session
        .register(&email, &password, first_name.as_deref(), last_name.as_deref())
        .await
        .map_err(|e| {
            log::error!("Registration failed: {}", e);
            e.to_string()
        })
}

#[tauri::command]
pub async fn logout(state: tauri::State<'_, AppState>) -> Result<Navigation, String> {
    let navigation = state.session.logout().await;
    state.reset_views().await;
    Ok(navigation)
}

#[tauri::command]
pub async fn current_session(state: tauri::State<'_, AppState>) -> Result<SessionSnapshot, String> {
    Ok(state.snapshot())
}

#[tauri::command]
pub async fn check_route(
    state: tauri::State<'_, AppState>,
    path: String,
) -> Result<RouteDecision, String> {
    Ok(state.session.guard(&path))
}
