use axum::{routing::get, Router};

use crate::state::ApiState;

pub fn app() -> Router<ApiState> {
    Router::<ApiState>::new()
        .route("/books/", get(super::search_books::search_books))
        .route("/books", get(super::search_books::search_books))
        .route("/book/:book_id", get(super::get_book::get_book))
}
