/// Content filters understood by the `volumes` search endpoint.
pub const FILTERS: &[&str] = &["partial", "full", "free-ebooks", "paid-ebooks", "ebooks"];

/// Print types understood by the `volumes` search endpoint.
pub const PRINT_TYPES: &[&str] = &["all", "books", "magazines"];

/// Sort orders understood by the `volumes` search endpoint.
pub const ORDER_BYS: &[&str] = &["relevance", "newest"];

pub const DEFAULT_PRINT_TYPE: &str = "all";
pub const DEFAULT_ORDER_BY: &str = "relevance";
pub const DEFAULT_START_INDEX: u32 = 0;
pub const DEFAULT_RESULTS_PER_PAGE: u32 = 10;

/// Returns the allowed value matching `value`, or [`None`] if `value` is absent or not allowed.
///
/// Unknown values are dropped instead of rejected, so the upstream service falls back to its own defaults.
pub fn normalize_enum(value: Option<&str>, allowed: &[&'static str]) -> Option<&'static str> {
    let value = value?;

    allowed.iter().copied().find(|candidate| *candidate == value)
}

/// Parameters of a single search, already defaulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParameters {
    pub query: String,
    pub filter: Option<String>,
    pub print_type: String,
    pub order_by: String,
    pub start_index: u32,
    pub results_per_page: u32,
    pub wants_epub: bool,
}

impl SearchParameters {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            filter: None,
            print_type: DEFAULT_PRINT_TYPE.to_string(),
            order_by: DEFAULT_ORDER_BY.to_string(),
            start_index: DEFAULT_START_INDEX,
            results_per_page: DEFAULT_RESULTS_PER_PAGE,
            wants_epub: false,
        }
    }

    /// Builds the outbound query pairs in the order the upstream service documents them.
    ///
    /// The credential is always the last pair.
    pub fn query_pairs(&self, api_key: &str) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("q", self.query.clone())];

        if let Some(filter) = normalize_enum(self.filter.as_deref(), FILTERS) {
            pairs.push(("filter", filter.to_string()));
        }

        if let Some(print_type) = normalize_enum(Some(self.print_type.as_str()), PRINT_TYPES) {
            pairs.push(("printType", print_type.to_string()));
        }

        if let Some(order_by) = normalize_enum(Some(self.order_by.as_str()), ORDER_BYS) {
            pairs.push(("orderBy", order_by.to_string()));
        }

        if self.start_index != DEFAULT_START_INDEX {
            pairs.push(("startIndex", self.start_index.to_string()));
        }

        if self.results_per_page != DEFAULT_RESULTS_PER_PAGE {
            pairs.push(("maxResults", self.results_per_page.to_string()));
        }

        if self.wants_epub {
            pairs.push(("download", "epub".to_string()));
        }

        pairs.push(("key", api_key.to_string()));

        pairs
    }

    /// Form-urlencoded rendition of [`SearchParameters::query_pairs`].
    pub fn query_string(&self, api_key: &str) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query_pairs(api_key))
            .finish()
    }
}
