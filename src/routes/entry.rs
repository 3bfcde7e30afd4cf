use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use super::{api, health};
use crate::{
    config::GeneralConfig,
    error::AppError,
    middleware::{catch_panic_layer, json_error_middleware},
    state::AppState,
};

pub const API_PREFIX: &str = "/api/v1";

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest(API_PREFIX, api::router(state))
        .merge(health::router())
        .fallback(route_not_found)
}

/// The router wrapped in the HTTP plumbing the server runs with.
pub fn app(state: Arc<AppState>) -> Router {
    let general = state.config.general.clone();
    router(state)
        .layer(catch_panic_layer())
        .layer(RequestBodyLimitLayer::new(general.max_body_bytes))
        .layer(middleware::from_fn(json_error_middleware))
        .layer(cors_layer(&general))
        .layer(TraceLayer::new_for_http())
}

async fn route_not_found() -> AppError {
    AppError::not_found("Route not found")
}

fn cors_layer(cfg: &GeneralConfig) -> CorsLayer {
    let origins = cfg.cors_origins();
    let allow_origin = if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
        AllowOrigin::from(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(%origin, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
