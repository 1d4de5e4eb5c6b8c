use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::routing::put;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::change_password::change_password;
use super::handlers::get_me::get_me;
use super::handlers::get_session::get_session;
use super::handlers::login::login;
use super::handlers::logout::logout;
use super::handlers::register::register;
use super::handlers::update_me::update_me;
use super::middleware::attach_auth_context;
use super::middleware::require_auth;
use crate::domain::account::context::AuthContextResolver;
use crate::domain::account::ports::AccountRepository;
use crate::domain::account::ports::AccountServicePort;

#[derive(Clone)]
pub struct AppState {
    pub account_service: Arc<dyn AccountServicePort>,
    pub resolver: Arc<AuthContextResolver<dyn AccountRepository>>,
}

pub fn create_router(
    account_service: Arc<dyn AccountServicePort>,
    resolver: Arc<AuthContextResolver<dyn AccountRepository>>,
) -> Router {
    let state = AppState {
        account_service,
        resolver,
    };

    let public_routes = Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/session", get(get_session))
        .route("/api/auth/logout", get(logout).post(logout));

    let protected_routes = Router::new()
        .route("/api/auth/me", get(get_me).patch(update_me))
        .route("/api/auth/password", put(change_password))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            attach_auth_context,
        ))
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
