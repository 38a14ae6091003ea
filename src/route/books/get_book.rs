use axum::extract::State;
use serde::Deserialize;

use crate::{
    error::{ApiError, DetailResponse, ErrorVerbosityProvider},
    extractor::path::ApiPath,
    state::ApiState,
};

use super::RelayedResponse;

#[derive(Debug, Deserialize)]
pub struct GetBookPath {
    pub book_id: String,
}

/// Get a volume by its identifier
#[utoipa::path(
    get,
    path = "/api/v1/book/{book_id}",
    tag = "books",
    params(("book_id" = String, Path, description = "Volume identifier, passed through verbatim")),
    responses(
        (status = 200, description = "Upstream volume, relayed unmodified", body = serde_json::Value),
        (status = 400, description = "The upstream service reported an error", body = DetailResponse),
        (status = 502, description = "The upstream service could not be reached or returned an invalid response"),
        (status = 504, description = "The upstream service did not respond in time"),
    )
)]
pub async fn get_book(
    State(state): State<ApiState>,
    ApiPath(path): ApiPath<GetBookPath>,
) -> Result<RelayedResponse, ApiError> {
    state
        .relay()
        .get_book(&path.book_id)
        .await
        .map(RelayedResponse)
        .map_err(|err| ApiError::from_relay_error(state.error_verbosity(), err))
}
