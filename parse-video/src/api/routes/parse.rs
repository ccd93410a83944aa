//! Share-link and id resolution routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use share_parser::VideoInfo;
use tracing::{debug, warn};

use crate::api::models::{HttpResponse, ShareUrlQuery, VideoIdQuery};
use crate::api::server::AppState;

/// Create the parse router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/video/share/url/parse", get(parse_share_url))
        .route("/video/id/parse", get(parse_video_id))
}

/// `GET /video/share/url/parse?url=`
pub async fn parse_share_url(
    State(state): State<AppState>,
    Query(query): Query<ShareUrlQuery>,
) -> Json<HttpResponse<VideoInfo>> {
    let result = state.factory.resolve_share_url(&query.url).await;
    match &result {
        Ok(info) => debug!(url = %query.url, gallery = info.is_gallery(), "Share url parsed"),
        Err(e) => warn!(url = %query.url, error = %e, "Share url parse failed"),
    }
    Json(HttpResponse::from_result(result))
}

/// `GET /video/id/parse?source=&video_id=`
pub async fn parse_video_id(
    State(state): State<AppState>,
    Query(query): Query<VideoIdQuery>,
) -> Json<HttpResponse<VideoInfo>> {
    let result = state
        .factory
        .resolve_by_id(&query.source, &query.video_id)
        .await;
    if let Err(e) = &result {
        warn!(source = %query.source, id = %query.video_id, error = %e, "Video id parse failed");
    }
    Json(HttpResponse::from_result(result))
}
