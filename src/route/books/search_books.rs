use axum::extract::State;
use schemars::JsonSchema;
use serde::{de, Deserialize, Deserializer};
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    error::{ApiError, DetailResponse, ErrorVerbosityProvider},
    extractor::{query::ApiQuery, validated::Validated},
    google_books::{query, SearchParameters},
    state::ApiState,
};

use super::RelayedResponse;

fn default_count_per_page() -> u32 {
    query::DEFAULT_RESULTS_PER_PAGE
}

fn default_print_type() -> String {
    query::DEFAULT_PRINT_TYPE.to_string()
}

fn default_order_by() -> String {
    query::DEFAULT_ORDER_BY.to_string()
}

fn deserialize_download_format<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;

    match value.as_str() {
        "epub" | "true" => Ok(true),
        "false" => Ok(false),
        other => Err(de::Error::invalid_value(
            de::Unexpected::Str(other),
            &"`epub`, `true` or `false`",
        )),
    }
}

#[derive(Debug, Deserialize, JsonSchema, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchBooksQuery {
    /// Search term.
    #[validate(length(min = 1, message = "Must not be empty"))]
    pub q: String,
    /// Only return volumes downloadable as epub. Accepts `epub`, `true` or `false`.
    #[serde(default, deserialize_with = "deserialize_download_format")]
    #[schemars(with = "String")]
    #[param(value_type = String, default = "false")]
    pub download_format: bool,
    /// One of `partial`, `full`, `free-ebooks`, `paid-ebooks`, `ebooks`. Other values are ignored.
    pub filter: Option<String>,
    /// Position of the first result.
    #[serde(default)]
    #[param(default = 0)]
    pub start_index: u32,
    /// Number of results per page.
    #[serde(default = "default_count_per_page")]
    #[validate(range(min = 1, message = "Must be at least 1"))]
    #[param(default = 10, minimum = 1)]
    pub count_per_page: u32,
    /// One of `all`, `books`, `magazines`. Other values are ignored.
    #[serde(default = "default_print_type")]
    #[param(default = "all")]
    pub print_type: String,
    /// One of `relevance`, `newest`. Other values are ignored.
    #[serde(default = "default_order_by")]
    #[param(default = "relevance")]
    pub order_by: String,
}

impl From<SearchBooksQuery> for SearchParameters {
    fn from(query: SearchBooksQuery) -> Self {
        SearchParameters {
            query: query.q,
            filter: query.filter,
            print_type: query.print_type,
            order_by: query.order_by,
            start_index: query.start_index,
            results_per_page: query.count_per_page,
            wants_epub: query.download_format,
        }
    }
}

/// Search volumes
#[utoipa::path(
    get,
    path = "/api/v1/books/",
    tag = "books",
    params(SearchBooksQuery),
    responses(
        (status = 200, description = "Upstream search result, relayed unmodified", body = serde_json::Value),
        (status = 400, description = "The upstream service reported an error", body = DetailResponse),
        (status = 422, description = "`q` is empty or `count_per_page` is zero"),
        (status = 502, description = "The upstream service could not be reached or returned an invalid response"),
        (status = 504, description = "The upstream service did not respond in time"),
    )
)]
pub async fn search_books(
    State(state): State<ApiState>,
    Validated(ApiQuery(query)): Validated<ApiQuery<SearchBooksQuery>>,
) -> Result<RelayedResponse, ApiError> {
    let params = SearchParameters::from(query);

    state
        .relay()
        .search(&params)
        .await
        .map(RelayedResponse)
        .map_err(|err| ApiError::from_relay_error(state.error_verbosity(), err))
}
