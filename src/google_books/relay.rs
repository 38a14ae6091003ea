use serde_json::Value;
use url::Url;

use super::{GoogleBooksConfig, SearchParameters};

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The upstream body carried a top-level `error` object.
    #[error("Upstream service reported an error: {message}")]
    Upstream { message: String },
    #[error("Base URL can not carry path segments: {0}")]
    BaseUrl(Url),
    /// `.` and `..` would be resolved away and turn the lookup into a search.
    #[error("Book id `{0}` is a dot segment")]
    DotSegmentId(String),
    #[error("Failed to build the HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Upstream request timed out: {0}")]
    Timeout(#[source] reqwest::Error),
    #[error("Failed to reach the upstream service: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("Failed to decode the upstream response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl RelayError {
    /// Drops the request URL from `err`, it carries the credential.
    fn from_reqwest(err: reqwest::Error) -> Self {
        let err = err.without_url();

        match err.is_timeout() {
            true => RelayError::Timeout(err),
            false => RelayError::Transport(err),
        }
    }
}

/// Forwards requests to the upstream books service and relays its JSON.
#[derive(Debug, Clone)]
pub struct BooksRelay {
    config: GoogleBooksConfig,
    http_client: reqwest::Client,
}

impl BooksRelay {
    pub fn new(config: GoogleBooksConfig) -> Result<Self, RelayError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(RelayError::Client)?;

        Ok(Self::with_client(config, http_client))
    }

    pub fn with_client(config: GoogleBooksConfig, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    /// `<base>?<query>` for the given search.
    pub fn search_url(&self, params: &SearchParameters) -> Url {
        let mut url = self.config.base_url().clone();
        url.set_query(Some(params.query_string(self.config.api_key()).as_str()));

        url
    }

    /// `<base>/<id>?key=<credential>`, with `id` as a single path segment.
    pub fn book_url(&self, id: &str) -> Result<Url, RelayError> {
        if matches!(id, "." | "..") {
            return Err(RelayError::DotSegmentId(id.to_string()));
        }

        let mut url = self.config.base_url().clone();
        url.set_query(None);

        url.path_segments_mut()
            .map_err(|_| RelayError::BaseUrl(self.config.base_url().clone()))?
            .pop_if_empty()
            .push(id);

        url.query_pairs_mut()
            .append_pair("key", self.config.api_key());

        Ok(url)
    }

    #[tracing::instrument(skip_all)]
    pub async fn search(&self, params: &SearchParameters) -> Result<Value, RelayError> {
        tracing::debug!(query = %params.query, "Searching books");

        self.relay(self.search_url(params)).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_book(&self, id: &str) -> Result<Value, RelayError> {
        let url = self.book_url(id)?;

        self.relay(url).await
    }

    /// Performs a single GET and returns the decoded body unmodified.
    ///
    /// The upstream status code is ignored, only the body decides between success and [`RelayError::Upstream`].
    #[tracing::instrument(name = "relay", skip_all, fields(path = %url.path()))]
    pub async fn relay(&self, url: Url) -> Result<Value, RelayError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(RelayError::from_reqwest)?;

        let status = response.status();

        let bytes = response.bytes().await.map_err(RelayError::from_reqwest)?;

        let body = serde_json::from_slice::<Value>(&bytes).map_err(|err| {
            tracing::warn!(%status, %err, "Upstream body is not JSON");

            RelayError::Decode(err)
        })?;

        if let Some(error) = body.get("error") {
            let message = upstream_message(error);

            tracing::warn!(%status, %message, "Upstream error");

            return Err(RelayError::Upstream { message });
        }

        tracing::debug!(%status, "Relayed");

        Ok(body)
    }
}

/// Extracts `error.message`, falling back to the `error` value itself.
fn upstream_message(error: &Value) -> String {
    match error.get("message") {
        Some(Value::String(message)) => message.clone(),
        _ => match error {
            Value::String(message) => message.clone(),
            other => other.to_string(),
        },
    }
}
