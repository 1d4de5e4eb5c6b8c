use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::account::context::ResolvedIdentity;
use crate::domain::account::models::Account;
use crate::inbound::http::router::AppState;

pub async fn get_me(
    State(state): State<AppState>,
    Extension(identity): Extension<ResolvedIdentity>,
) -> Result<ApiSuccess<Account>, ApiError> {
    let account = match identity.account {
        Some(account) => account,
        None => state.account_service.get_account(&identity.subject).await?,
    };

    Ok(ApiSuccess::new(StatusCode::OK, account))
}
