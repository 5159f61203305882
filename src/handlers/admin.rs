use axum::extract::State;
use axum::response::Response;

use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::extract::AdminAccess;
use crate::utils::response::success;

pub async fn dashboard_stats(
    _admin: AdminAccess,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let stats = state.store.dashboard_stats().await?;
    Ok(success(stats))
}
