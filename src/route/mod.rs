pub mod books;
pub mod index;
