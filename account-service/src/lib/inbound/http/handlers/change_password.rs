use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use crate::domain::account::context::ResolvedIdentity;
use crate::domain::account::models::ChangePasswordCommand;
use crate::inbound::http::router::AppState;

/// Replies `204 No Content` with an empty body on success.
pub async fn change_password(
    State(state): State<AppState>,
    Extension(identity): Extension<ResolvedIdentity>,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    let command = ChangePasswordCommand {
        current_password: body.current_password,
        new_password: body.new_password,
    };

    state
        .account_service
        .change_password(&identity.subject, command)
        .await
        .map_err(ApiError::from)
        .map(|_| StatusCode::NO_CONTENT)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangePasswordRequest {
    current_password: String,
    new_password: String,
}
