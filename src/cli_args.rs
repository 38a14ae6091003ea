use std::net::SocketAddr;

use clap::Parser;
use url::Url;

use crate::error::ErrorVerbosity;

#[derive(Parser)]
#[command(author, about, version)]
pub struct CliArgs {
    /// API key of the Google Books API.
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub google_api_key: String,

    /// Base URL of the Google Books `volumes` resource.
    #[arg(
        long,
        env = "GOOGLE_BOOKS_URL",
        default_value = "https://www.googleapis.com/books/v1/volumes"
    )]
    pub google_books_url: Url,

    /// Timeout of a single request to the Google Books API, in seconds.
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = 10)]
    pub upstream_timeout_secs: u64,

    /// Address the server listens on.
    #[arg(long, env = "SOCKET_ADDRESS", default_value = "127.0.0.1:5000")]
    pub socket_address: SocketAddr,

    /// How much detail error responses carry.
    #[arg(long, env = "ERROR_VERBOSITY", value_enum, default_value_t = ErrorVerbosity::Full)]
    pub error_verbosity: ErrorVerbosity,

    /// Log every response body at trace level.
    #[arg(long, env = "TRACE_RESPONSE_BODY")]
    pub trace_response_body: bool,
}
