use axum::extract::Request;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;

use crate::domain::account::context::AccountLookup;
use crate::domain::account::context::AuthContext;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Cookie carrying the access token for browser clients.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Owned copies of the `Authorization` header and the access token cookie.
struct RequestCredentials {
    header: Option<String>,
    cookie: Option<String>,
}

impl RequestCredentials {
    fn from_request(req: &Request) -> Self {
        let header = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let cookie = CookieJar::from_headers(req.headers())
            .get(ACCESS_TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_owned());

        Self { header, cookie }
    }
}

/// Strict guard: rejects the request with 401 unless the bearer token (or the
/// access token cookie) resolves to an existing, active account. Inserts the
/// `ResolvedIdentity` into request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let credentials = RequestCredentials::from_request(&req);
    let identity = state
        .resolver
        .resolve_request(
            credentials.header.as_deref(),
            credentials.cookie.as_deref(),
            AccountLookup::Load,
        )
        .await?;

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

/// Permissive resolution: never rejects. Inserts an `AuthContext`, anonymous
/// when the credential is missing or fails to resolve.
pub async fn attach_auth_context(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let credentials = RequestCredentials::from_request(&req);
    let context = AuthContext::from(
        state
            .resolver
            .resolve_request(
                credentials.header.as_deref(),
                credentials.cookie.as_deref(),
                AccountLookup::SubjectOnly,
            )
            .await,
    );

    req.extensions_mut().insert(context);

    next.run(req).await
}
