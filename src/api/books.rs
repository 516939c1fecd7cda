use axum::extract::{OriginalUri, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use super::book_copies::render_copies;
use super::error::ApiError;
use super::extract::{IdPath, Payload, QueryParams};
use super::pagination::{PageParams, Paginated};
use crate::domain::{BookCopyFilter, BookFilter, DomainError};
use crate::infrastructure::AppState;
use crate::serializers::book::{BookRead, BookWrite};
use crate::serializers::book_copy::BookCopyRead;
use crate::serializers::{Expand, ExpandQuery};

pub async fn list_books(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    QueryParams(filter): QueryParams<BookFilter>,
    QueryParams(params): QueryParams<PageParams>,
    QueryParams(expand): QueryParams<ExpandQuery>,
) -> Result<Json<Paginated<BookRead>>, ApiError> {
    let expand = Expand::from(expand);
    let request = params.resolve(&state.settings)?;
    let page = state.book_repo.find_all(filter, request).await?;
    let results = page
        .items
        .into_iter()
        .map(|book| BookRead::new(book, &expand))
        .collect();
    Ok(Json(Paginated::new(results, page.total, request, &uri)?))
}

pub async fn get_book(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
    QueryParams(expand): QueryParams<ExpandQuery>,
) -> Result<Json<BookRead>, ApiError> {
    let book = state
        .book_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound)?;
    Ok(Json(BookRead::new(book, &expand.into())))
}

/// Author names that match nothing create new authors
pub async fn create_book(
    State(state): State<AppState>,
    QueryParams(expand): QueryParams<ExpandQuery>,
    Payload(payload): Payload<BookWrite>,
) -> Result<(StatusCode, Json<BookRead>), ApiError> {
    let input = payload.into_new()?;
    let book = state.book_repo.create(input).await?;
    Ok((StatusCode::CREATED, Json(BookRead::new(book, &expand.into()))))
}

/// PUT: replaces title, authors and category
pub async fn replace_book(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
    QueryParams(expand): QueryParams<ExpandQuery>,
    Payload(payload): Payload<BookWrite>,
) -> Result<Json<BookRead>, ApiError> {
    state
        .book_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound)?;
    let changes = payload.into_replacement()?;
    let book = state.book_repo.update(id, changes).await?;
    Ok(Json(BookRead::new(book, &expand.into())))
}

/// PATCH
pub async fn update_book(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
    QueryParams(expand): QueryParams<ExpandQuery>,
    Payload(payload): Payload<BookWrite>,
) -> Result<Json<BookRead>, ApiError> {
    let book = state.book_repo.update(id, payload.into_changes()).await?;
    Ok(Json(BookRead::new(book, &expand.into())))
}

pub async fn delete_book(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.book_repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Copies of one book, paginated like `/book_copies`
pub async fn list_book_copies(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
    OriginalUri(uri): OriginalUri,
    QueryParams(params): QueryParams<PageParams>,
    QueryParams(expand): QueryParams<ExpandQuery>,
) -> Result<Json<Paginated<BookCopyRead>>, ApiError> {
    state
        .book_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound)?;

    let expand = Expand::from(expand);
    let request = params.resolve(&state.settings)?;
    let filter = BookCopyFilter {
        book: Some(id),
        ..Default::default()
    };
    let page = state.copy_repo.find_all(filter, request).await?;
    let results = render_copies(&state, page.items, &expand).await?;
    Ok(Json(Paginated::new(results, page.total, request, &uri)?))
}
