use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::account::errors::AccountError;
use crate::domain::account::context::AuthContext;
use crate::domain::account::models::Account;
use crate::inbound::http::router::AppState;

/// Report who the caller is without ever rejecting the request.
pub async fn get_session(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
) -> Result<ApiSuccess<SessionData>, ApiError> {
    let Some(identity) = context.identity() else {
        return Ok(ApiSuccess::new(StatusCode::OK, SessionData::anonymous()));
    };

    match state.account_service.get_account(&identity.subject).await {
        Ok(account) if account.is_active => Ok(ApiSuccess::new(
            StatusCode::OK,
            SessionData {
                authenticated: true,
                account: Some(account),
            },
        )),
        Ok(_) | Err(AccountError::NotFound(_)) => {
            Ok(ApiSuccess::new(StatusCode::OK, SessionData::anonymous()))
        }
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionData {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<Account>,
}

impl SessionData {
    fn anonymous() -> Self {
        Self {
            authenticated: false,
            account: None,
        }
    }
}
