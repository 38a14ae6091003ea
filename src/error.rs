use axum::{
    extract::rejection::{PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use clap::ValueEnum;
use derive_more::From;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::ValidationErrors;

use crate::google_books::RelayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ErrorVerbosity {
    /// Server returns an empty response with [`StatusCode::NO_CONTENT`] for all errors.
    None,
    /// Server returns only the appropriate status code.
    StatusCode,
    /// Server returns only the message with the appropriate status code.
    Message,
    /// Server returns the message, the error type with cleared error content and the appropriate status code.
    Type,
    /// Server returns the message, the error type with the error content and the appropriate status code.
    Full,
}

impl ErrorVerbosity {
    pub fn should_generate_error_reason(&self) -> bool {
        matches!(self, ErrorVerbosity::Full)
    }
}

pub trait ErrorVerbosityProvider {
    fn error_verbosity(&self) -> ErrorVerbosity;
}

/// Body of a relayed upstream error.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DetailResponse {
    /// The upstream error message, verbatim.
    #[schema(example = "Invalid Value")]
    pub detail: String,
}

#[derive(Debug, Serialize)]
struct ApiErrorResponse {
    #[serde(flatten)]
    error: ApiError,
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct ApiErrorMessage {
    message: &'static str,
}

impl From<ApiErrorResponse> for ApiErrorMessage {
    fn from(response: ApiErrorResponse) -> Self {
        ApiErrorMessage {
            message: response.message,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        let status_code = self.error.status_code();

        match self.error.verbosity() {
            ErrorVerbosity::None => StatusCode::NO_CONTENT.into_response(),
            ErrorVerbosity::StatusCode => status_code.into_response(),
            ErrorVerbosity::Message => {
                (status_code, Json(ApiErrorMessage::from(self))).into_response()
            }
            ErrorVerbosity::Type | ErrorVerbosity::Full => {
                (status_code, Json(self)).into_response()
            }
        }
    }
}

#[derive(Debug, From, Serialize)]
#[serde(tag = "error_type", content = "error")]
/// API error
pub enum ApiError {
    /// Internal server error
    ///
    /// This error is returned when an internal server error occurs.
    InternalServerError(InternalServerError),
    /// Query error
    ///
    /// This error is returned when the query parameters are not as expected.
    Query(QueryError),
    /// Path error
    ///
    /// This error is returned when the path is not as expected.
    Path(PathError),
    /// Validation error
    ///
    /// This error is returned when extracted parameters fail validation.
    Validation(ValidationError),
    /// Method not allowed
    ///
    /// This error is returned when the method is not allowed.
    MethodNotAllowed(MethodNotAllowedError),
    /// Not found error
    ///
    /// This error is returned when the requested resource is not found.
    NotFound(NotFoundError),
    /// Upstream error
    ///
    /// The upstream service answered with an `error` object. Always rendered as `{"detail": ...}`.
    Upstream(UpstreamError),
    /// Gateway error
    ///
    /// The upstream service could not be reached, timed out or answered with something that is not JSON.
    Gateway(GatewayError),
}

impl ApiError {
    /// Maps a relay failure to the error contract of the routes.
    pub fn from_relay_error(verbosity: ErrorVerbosity, err: RelayError) -> Self {
        match err {
            RelayError::Upstream { message } => UpstreamError::new(message).into(),
            RelayError::Timeout(err) => {
                GatewayError::new(verbosity, GatewayErrorType::Timeout, err.to_string()).into()
            }
            RelayError::Transport(err) => {
                GatewayError::new(verbosity, GatewayErrorType::Transport, err.to_string()).into()
            }
            RelayError::Decode(err) => {
                GatewayError::new(verbosity, GatewayErrorType::Decode, err.to_string()).into()
            }
            err @ RelayError::DotSegmentId(_) => PathError::new(verbosity, err.to_string()).into(),
            err @ (RelayError::BaseUrl(_) | RelayError::Client(_)) => {
                InternalServerError::from_generic_error(verbosity, err).into()
            }
        }
    }

    fn verbosity(&self) -> ErrorVerbosity {
        match self {
            ApiError::InternalServerError(err) => err.verbosity,
            ApiError::Query(err) => err.verbosity,
            ApiError::Path(err) => err.verbosity,
            ApiError::Validation(err) => err.verbosity,
            ApiError::MethodNotAllowed(err) => err.verbosity,
            ApiError::NotFound(err) => err.verbosity,
            ApiError::Upstream(_) => ErrorVerbosity::Full,
            ApiError::Gateway(err) => err.verbosity,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            ApiError::InternalServerError(_) => "An internal server error has occurred",
            ApiError::Query(_) => "Failed to parse query parameters",
            ApiError::Path(_) => "Failed to parse path parameters",
            ApiError::Validation(_) => "Validation failed",
            ApiError::MethodNotAllowed(_) => "Method not allowed",
            ApiError::NotFound(_) => "The requested resource was not found",
            ApiError::Upstream(_) => "The upstream service reported an error",
            ApiError::Gateway(err) => err.message(),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InternalServerError(err) => err.status_code(),
            ApiError::Query(err) => err.status_code(),
            ApiError::Path(err) => err.status_code(),
            ApiError::Validation(err) => err.status_code(),
            ApiError::MethodNotAllowed(err) => err.status_code(),
            ApiError::NotFound(err) => err.status_code(),
            ApiError::Upstream(err) => err.status_code(),
            ApiError::Gateway(err) => err.status_code(),
        }
    }
}

impl From<ApiError> for ApiErrorResponse {
    fn from(error: ApiError) -> Self {
        let message = match error.verbosity() {
            ErrorVerbosity::None => "",
            _ => error.message(),
        };

        ApiErrorResponse { error, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Upstream(err) => err.into_response(),
            other => ApiErrorResponse::from(other).into_response(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InternalServerError {
    #[serde(skip)]
    verbosity: ErrorVerbosity,
    internal_server_error: Option<String>,
}

impl InternalServerError {
    pub fn from_generic_error<E: Into<anyhow::Error>>(verbosity: ErrorVerbosity, err: E) -> Self {
        let err: anyhow::Error = err.into();
        let err = format!("{err:#}");
        tracing::error!(%err, "Internal server error");

        let internal_server_error = verbosity.should_generate_error_reason().then_some(err);

        InternalServerError {
            verbosity,
            internal_server_error,
        }
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

#[derive(Debug, Serialize)]
pub struct QueryError {
    #[serde(skip)]
    verbosity: ErrorVerbosity,
    query_error_reason: Option<String>,
    query_expected_schema: Option<String>,
}

impl QueryError {
    pub fn from_query_rejection(
        verbosity: ErrorVerbosity,
        query_rejection: QueryRejection,
        query_expected_schema: String,
    ) -> Self {
        let (query_error_reason, query_expected_schema) =
            match verbosity.should_generate_error_reason() {
                true => (
                    Some(query_rejection.body_text()),
                    Some(query_expected_schema),
                ),
                false => (None, None),
            };

        QueryError {
            verbosity,
            query_error_reason,
            query_expected_schema,
        }
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

#[derive(Debug, Serialize)]
pub struct PathError {
    #[serde(skip)]
    verbosity: ErrorVerbosity,
    path_error_reason: Option<String>,
}

impl PathError {
    pub fn new(verbosity: ErrorVerbosity, path_error_reason: String) -> Self {
        let path_error_reason = verbosity
            .should_generate_error_reason()
            .then_some(path_error_reason);

        PathError {
            verbosity,
            path_error_reason,
        }
    }

    pub fn from_path_rejection(verbosity: ErrorVerbosity, path_rejection: PathRejection) -> Self {
        let path_error_reason = verbosity
            .should_generate_error_reason()
            .then(|| path_rejection.body_text());

        PathError {
            verbosity,
            path_error_reason,
        }
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

#[derive(Debug, Serialize)]
pub struct ValidationError {
    #[serde(skip)]
    verbosity: ErrorVerbosity,
    validation_errors: Option<ValidationErrors>,
}

impl ValidationError {
    pub fn from_validation_errors(verbosity: ErrorVerbosity, errors: ValidationErrors) -> Self {
        let validation_errors = verbosity.should_generate_error_reason().then_some(errors);

        ValidationError {
            verbosity,
            validation_errors,
        }
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::UNPROCESSABLE_ENTITY
    }
}

#[derive(Debug, Serialize)]
pub struct MethodNotAllowedError {
    #[serde(skip)]
    verbosity: ErrorVerbosity,
}

impl MethodNotAllowedError {
    pub fn new(verbosity: ErrorVerbosity) -> Self {
        MethodNotAllowedError { verbosity }
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::METHOD_NOT_ALLOWED
    }
}

#[derive(Debug, Serialize)]
pub struct NotFoundError {
    #[serde(skip)]
    verbosity: ErrorVerbosity,
}

impl NotFoundError {
    pub fn new(verbosity: ErrorVerbosity) -> Self {
        NotFoundError { verbosity }
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::NOT_FOUND
    }
}

/// Relayed verbatim, never shaped by [`ErrorVerbosity`].
#[derive(Debug, Serialize)]
pub struct UpstreamError {
    message: String,
}

impl UpstreamError {
    pub fn new(message: String) -> Self {
        UpstreamError { message }
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

impl IntoResponse for UpstreamError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        (
            status_code,
            Json(DetailResponse {
                detail: self.message,
            }),
        )
            .into_response()
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub enum GatewayErrorType {
    Transport,
    Decode,
    Timeout,
}

#[derive(Debug, Serialize)]
pub struct GatewayError {
    #[serde(skip)]
    verbosity: ErrorVerbosity,
    gateway_error_type: GatewayErrorType,
    gateway_error_reason: Option<String>,
}

impl GatewayError {
    pub fn new(
        verbosity: ErrorVerbosity,
        gateway_error_type: GatewayErrorType,
        reason: String,
    ) -> Self {
        let gateway_error_reason = verbosity.should_generate_error_reason().then_some(reason);

        GatewayError {
            verbosity,
            gateway_error_type,
            gateway_error_reason,
        }
    }

    fn message(&self) -> &'static str {
        match self.gateway_error_type {
            GatewayErrorType::Transport => "Failed to reach the upstream service",
            GatewayErrorType::Decode => "The upstream service returned an invalid response",
            GatewayErrorType::Timeout => "The upstream service did not respond in time",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self.gateway_error_type {
            GatewayErrorType::Transport | GatewayErrorType::Decode => StatusCode::BAD_GATEWAY,
            GatewayErrorType::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}
