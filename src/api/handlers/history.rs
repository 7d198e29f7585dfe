//! History handler: the caller's four derived views.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::auth::AuthUser;
use crate::app_state::AppState;
use crate::error::{ErrorResponse, LedgerError};
use crate::service::UserHistory;

/// `GET /history` — The caller's rides and payment promises, split by role.
///
/// # Errors
///
/// Returns [`LedgerError`] on store failure.
#[utoipa::path(
    get,
    path = "/api/v1/history",
    tag = "History",
    summary = "Get the caller's history",
    description = "Returns rides the caller requested and provided, plus promises owed and owed to them, each newest first. A caller with no activity gets four empty lists.",
    responses(
        (status = 200, description = "History views", body = UserHistory),
        (status = 401, description = "Missing or invalid credential", body = ErrorResponse),
    )
)]
pub async fn get_history(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, LedgerError> {
    let history = state.history_service.history(&user.id).await?;
    Ok(Json(history))
}

/// History routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/history", get(get_history))
}
