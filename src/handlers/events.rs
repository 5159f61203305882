use axum::extract::State;
use axum::response::Response;

use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

pub async fn list_events(State(state): State<AppState>) -> Result<Response, AppError> {
    let events = state.store.list_available_events().await?;
    Ok(success(events))
}
