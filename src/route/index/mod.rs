use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod app;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IndexResponse {
    #[schema(example = "1.0")]
    pub version: String,
    #[schema(example = "Google Books API")]
    pub message: String,
}

impl IntoResponse for IndexResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Service banner
#[utoipa::path(
    get,
    path = "/",
    tag = "index",
    responses((status = 200, description = "Service banner", body = IndexResponse))
)]
pub async fn index() -> IndexResponse {
    IndexResponse {
        version: "1.0".to_string(),
        message: "Google Books API".to_string(),
    }
}
