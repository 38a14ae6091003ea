use std::time::Duration;

use derivative::Derivative;
use url::Url;

/// Immutable settings of the upstream books service.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct GoogleBooksConfig {
    /// Credential sent as the `key` query parameter. Never leaves the server.
    #[derivative(Debug(format_with = "mask_secret"))]
    api_key: String,
    /// Base URL of the `volumes` resource.
    base_url: Url,
    /// Upper bound for a single outbound request.
    timeout: Duration,
}

impl GoogleBooksConfig {
    pub fn new(api_key: String, base_url: Url, timeout: Duration) -> Self {
        Self {
            api_key,
            base_url,
            timeout,
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Formats any secret as `...`
fn mask_secret<T>(_: &T, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    f.write_str("...")
}
