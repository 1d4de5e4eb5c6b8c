use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;
use serde::Deserializer;

use super::ApiError;
use super::ApiSuccess;
use crate::account::errors::AccountError;
use crate::domain::account::context::ResolvedIdentity;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountUpdate;
use crate::domain::account::models::EmailAddress;
use crate::inbound::http::router::AppState;

pub async fn update_me(
    State(state): State<AppState>,
    Extension(identity): Extension<ResolvedIdentity>,
    Json(body): Json<UpdateMeRequest>,
) -> Result<ApiSuccess<Account>, ApiError> {
    state
        .account_service
        .update_account(&identity.subject, body.try_into_update()?)
        .await
        .map_err(ApiError::from)
        .map(|account| ApiSuccess::new(StatusCode::OK, account))
}

/// HTTP request body for updating the caller's own account (raw JSON)
///
/// An absent field is left alone; `"display_name": null` clears the display name.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateMeRequest {
    #[serde(default)]
    email: Option<String>,
    #[serde(default, deserialize_with = "present")]
    display_name: Option<Option<String>>,
}

/// Distinguish an explicit `null` from an absent field.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl UpdateMeRequest {
    fn try_into_update(self) -> Result<AccountUpdate, AccountError> {
        let email = self
            .email
            .map(|email| EmailAddress::new(&email))
            .transpose()?;

        Ok(AccountUpdate {
            email,
            display_name: self.display_name,
            ..AccountUpdate::default()
        })
    }
}
