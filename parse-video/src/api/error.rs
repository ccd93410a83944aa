//! API error handling.
//!
//! Errors that change the HTTP status (currently only the relay route) are
//! rendered as the usual envelope with `code` equal to the status.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use share_parser::ParseError;

use crate::api::models::HttpResponse;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Create a 400 Bad Request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Create a 500 Internal Server Error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Create a 502 Bad Gateway error.
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = HttpResponse::<()>::error(self.status.as_u16(), self.message);
        (self.status, Json(body)).into_response()
    }
}

impl From<ParseError> for ApiError {
    fn from(err: ParseError) -> Self {
        match &err {
            ParseError::InvalidUrl(_) => ApiError::bad_request(err.to_string()),
            ParseError::UpstreamStatus(status) => {
                ApiError::bad_gateway(format!("upstream returned status {}", status.as_u16()))
            }
            _ => ApiError::internal(format!("failed to fetch media: {err}")),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
