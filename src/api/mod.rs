pub mod authors;
pub mod book_copies;
pub mod books;
pub mod categories;
pub mod error;
pub mod extract;
pub mod health;
pub mod pagination;
pub mod permissions;
pub mod publishers;

use axum::{Router, extract::DefaultBodyLimit, middleware, routing::get};

use crate::infrastructure::AppState;

pub use error::ApiError;

/// Catalog routes, mounted under `/api`
pub fn api_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.settings.max_upload_bytes);

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Authors
        .route(
            "/authors",
            get(authors::list_authors).post(authors::create_author),
        )
        .route(
            "/authors/:id",
            get(authors::get_author)
                .put(authors::replace_author)
                .patch(authors::update_author)
                .delete(authors::delete_author),
        )
        // Categories
        .route(
            "/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/categories/:id",
            get(categories::get_category)
                .put(categories::replace_category)
                .patch(categories::update_category)
                .delete(categories::delete_category),
        )
        // Publishers
        .route(
            "/publishers",
            get(publishers::list_publishers).post(publishers::create_publisher),
        )
        .route(
            "/publishers/:id",
            get(publishers::get_publisher)
                .put(publishers::replace_publisher)
                .patch(publishers::update_publisher)
                .delete(publishers::delete_publisher),
        )
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::replace_book)
                .patch(books::update_book)
                .delete(books::delete_book),
        )
        .route("/books/:id/copies", get(books::list_book_copies))
        // Book copies
        .route(
            "/book_copies",
            get(book_copies::list_copies)
                .post(book_copies::create_copy)
                .layer(upload_limit),
        )
        .route(
            "/book_copies/:id",
            get(book_copies::get_copy)
                .put(book_copies::replace_copy)
                .patch(book_copies::update_copy)
                .delete(book_copies::delete_copy)
                .layer(upload_limit),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            permissions::enforce_permission,
        ))
        .with_state(state)
}
