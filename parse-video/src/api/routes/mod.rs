//! API route modules.

pub mod parse;
pub mod stream_proxy;

use axum::Router;

use crate::api::server::AppState;

/// Create the main API router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(parse::router())
        .merge(stream_proxy::router())
        .with_state(state)
}
