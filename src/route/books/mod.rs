use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

pub mod app;
pub mod get_book;
pub mod search_books;

/// Upstream JSON, relayed without any transformation.
#[derive(Debug)]
pub struct RelayedResponse(pub Value);

impl IntoResponse for RelayedResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self.0)).into_response()
    }
}
