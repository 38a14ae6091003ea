pub mod config;
pub mod query;
pub mod relay;

pub use config::GoogleBooksConfig;
pub use query::SearchParameters;
pub use relay::{BooksRelay, RelayError};
