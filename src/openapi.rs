use utoipa::OpenApi;

use crate::{
    error::DetailResponse,
    route::{books, index},
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Google Books API",
        version = "1.0",
        description = "Search and fetch volumes from the Google Books API without holding an API key."
    ),
    paths(
        index::index,
        books::search_books::search_books,
        books::get_book::get_book,
    ),
    components(schemas(index::IndexResponse, DetailResponse)),
    tags(
        (name = "index", description = "Service information"),
        (name = "books", description = "Volumes relayed from the Google Books API"),
    )
)]
pub struct ApiDoc;
