pub mod cli_args;
pub mod error;
mod extractor;
pub mod google_books;
mod middleware;
mod openapi;
mod route;
pub mod server;
pub mod state;

#[cfg(test)]
mod test;
