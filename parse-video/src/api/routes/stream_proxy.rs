//! Media stream relay route.
//!
//! `GET /video/stream?url=` fetches a resolved media URL and streams it back,
//! forwarding `Range` so players can seek. Header handling depends on whether
//! the caller is a restricted in-app browser, see [`share_parser::relay`].

use axum::Router;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::routing::get;

use crate::api::error::{ApiError, ApiResult};
use crate::api::models::StreamQuery;
use crate::api::server::AppState;

/// Create the stream proxy router.
pub fn router() -> Router<AppState> {
    Router::new().route("/video/stream", get(stream_video))
}

pub async fn stream_video(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let url = query.url.trim();
    if url.is_empty() {
        return Err(ApiError::bad_request("video url must not be empty"));
    }

    let relayed = state.relay.relay(url, &headers).await?;

    // fresh response: nothing staged by middleware leaks into the relay
    let mut response = Response::new(Body::from_stream(relayed.body));
    *response.status_mut() = relayed.status;
    *response.headers_mut() = relayed.headers;
    Ok(response)
}
