use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::get,
    Extension, Json, Router,
};

use bookshelf_authz::{require_bearer, Identity, TokenService};
use bookshelf_http::{error::AppError, extract::ApiJson};

use super::models::{Book, BookPatch, NewBook};
use super::store::{BookStore, BookStoreError};

/// Book CRUD routes, all behind the bearer gate
pub fn router(store: Arc<BookStore>, tokens: Arc<TokenService>) -> Router {
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route(
            "/books/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route_layer(middleware::from_fn_with_state(tokens, require_bearer))
        .with_state(store)
}

/// Ids that are not integers match no book.
fn parse_id(raw: &str) -> Result<u64, AppError> {
    raw.parse()
        .map_err(|_| AppError::from(BookStoreError::NotFound(0)))
}

async fn list_books(
    State(store): State<Arc<BookStore>>,
    Extension(identity): Extension<Identity>,
) -> Json<Vec<Book>> {
    let books = store.list();
    tracing::debug!(subject = %identity.subject, count = books.len(), "listing books");
    Json(books)
}

async fn get_book(
    State(store): State<Arc<BookStore>>,
    Path(id): Path<String>,
) -> Result<Json<Book>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(store.get(id)?))
}

async fn create_book(
    State(store): State<Arc<BookStore>>,
    Extension(identity): Extension<Identity>,
    ApiJson(new): ApiJson<NewBook>,
) -> (StatusCode, Json<Book>) {
    let book = store.create(new);
    tracing::info!(subject = %identity.subject, book_id = book.id, "book created");
    (StatusCode::CREATED, Json(book))
}

async fn update_book(
    State(store): State<Arc<BookStore>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<BookPatch>,
) -> Result<Json<Book>, AppError> {
    let id = parse_id(&id)?;
    let book = store.update(id, patch)?;
    tracing::info!(subject = %identity.subject, book_id = book.id, "book updated");
    Ok(Json(book))
}

async fn delete_book(
    State(store): State<Arc<BookStore>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    store.delete(id)?;
    tracing::info!(subject = %identity.subject, book_id = id, "book deleted");
    Ok(StatusCode::NO_CONTENT)
}
