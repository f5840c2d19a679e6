use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::state::ErrorState;

pub const RSS_CONTENT_TYPE: &str = "application/rss+xml";

pub fn rss(body: String) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, RSS_CONTENT_TYPE)],
        body,
    )
        .into_response()
}

pub fn healthy() -> Response {
    (StatusCode::OK, "Ok").into_response()
}

/// 400 with `{"error_message": .., "error_time": ..}`.
pub fn unhealthy(error: ErrorState) -> Response {
    (StatusCode::BAD_REQUEST, Json(error)).into_response()
}
