//! Book copy handlers
//!
//! Covers are written to media storage before the database write and the
//! superseded file is removed only once the write has committed.

use std::collections::HashMap;

use axum::extract::{OriginalUri, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use super::error::ApiError;
use super::extract::{BookCopyForm, IdPath, QueryParams};
use super::pagination::{PageParams, Paginated};
use crate::domain::{Book, BookCopy, BookCopyFilter, DomainError};
use crate::infrastructure::AppState;
use crate::serializers::book_copy::{BookCopyRead, BookCopyWrite, CoverChange};
use crate::serializers::{Expand, ExpandQuery};

/// Renders copies, loading each referenced book once when it is expanded
pub(crate) async fn render_copies(
    state: &AppState,
    copies: Vec<BookCopy>,
    expand: &Expand,
) -> Result<Vec<BookCopyRead>, ApiError> {
    let mut books: HashMap<Uuid, Option<Book>> = HashMap::new();
    let mut results = Vec::with_capacity(copies.len());
    for copy in copies {
        let book = if expand.has("book") {
            if !books.contains_key(&copy.book_id) {
                let book = state.book_repo.find_by_id(copy.book_id).await?;
                books.insert(copy.book_id, book);
            }
            books.get(&copy.book_id).cloned().flatten()
        } else {
            None
        };
        results.push(BookCopyRead::new(copy, book, &state.media, expand));
    }
    Ok(results)
}

async fn render_copy(
    state: &AppState,
    copy: BookCopy,
    expand: &Expand,
) -> Result<BookCopyRead, ApiError> {
    render_copies(state, vec![copy], expand)
        .await?
        .pop()
        .ok_or(ApiError::Domain(DomainError::NotFound))
}

/// Stores a newly supplied cover and returns its media name
async fn store_cover(state: &AppState, cover: &CoverChange) -> Result<Option<String>, ApiError> {
    match cover {
        Some(Some(image)) => Ok(Some(
            state.media.save_cover(&image.bytes, image.extension).await?,
        )),
        _ => Ok(None),
    }
}

pub async fn list_copies(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    QueryParams(filter): QueryParams<BookCopyFilter>,
    QueryParams(params): QueryParams<PageParams>,
    QueryParams(expand): QueryParams<ExpandQuery>,
) -> Result<Json<Paginated<BookCopyRead>>, ApiError> {
    let expand = Expand::from(expand);
    let request = params.resolve(&state.settings)?;
    let page = state.copy_repo.find_all(filter, request).await?;
    let results = render_copies(&state, page.items, &expand).await?;
    Ok(Json(Paginated::new(results, page.total, request, &uri)?))
}

pub async fn get_copy(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
    QueryParams(expand): QueryParams<ExpandQuery>,
) -> Result<Json<BookCopyRead>, ApiError> {
    let copy = state
        .copy_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound)?;
    Ok(Json(render_copy(&state, copy, &expand.into()).await?))
}

pub async fn create_copy(
    State(state): State<AppState>,
    QueryParams(expand): QueryParams<ExpandQuery>,
    BookCopyForm(payload): BookCopyForm,
) -> Result<(StatusCode, Json<BookCopyRead>), ApiError> {
    let (mut input, cover) = payload.into_new()?;
    let stored = store_cover(&state, &cover).await?;
    input.cover = stored.clone();

    let copy = match state.copy_repo.create(input).await {
        Ok(copy) => copy,
        Err(e) => {
            if let Some(name) = &stored {
                state.media.remove(name).await;
            }
            return Err(e.into());
        }
    };

    let read = render_copy(&state, copy, &expand.into()).await?;
    Ok((StatusCode::CREATED, Json(read)))
}

async fn save_copy(
    state: &AppState,
    id: Uuid,
    payload: BookCopyWrite,
    partial: bool,
    expand: Expand,
) -> Result<Json<BookCopyRead>, ApiError> {
    let existing = state
        .copy_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound)?;

    let (mut changes, cover) = payload.into_changes(partial)?;
    let stored = store_cover(state, &cover).await?;
    changes.cover = match cover {
        Some(Some(_)) => Some(stored.clone()),
        Some(None) => Some(None),
        None => None,
    };
    let replaces_cover = changes.cover.is_some();

    let copy = match state.copy_repo.update(id, changes).await {
        Ok(copy) => copy,
        Err(e) => {
            if let Some(name) = &stored {
                state.media.remove(name).await;
            }
            return Err(e.into());
        }
    };

    if replaces_cover && let Some(old) = existing.cover.as_deref() {
        state.media.remove(old).await;
    }

    Ok(Json(render_copy(state, copy, &expand).await?))
}

/// PUT: book, date and publisher are required; an omitted cover is kept
pub async fn replace_copy(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
    QueryParams(expand): QueryParams<ExpandQuery>,
    BookCopyForm(payload): BookCopyForm,
) -> Result<Json<BookCopyRead>, ApiError> {
    save_copy(&state, id, payload, false, expand.into()).await
}

/// PATCH
pub async fn update_copy(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
    QueryParams(expand): QueryParams<ExpandQuery>,
    BookCopyForm(payload): BookCopyForm,
) -> Result<Json<BookCopyRead>, ApiError> {
    save_copy(&state, id, payload, true, expand.into()).await
}

pub async fn delete_copy(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    let copy = state.copy_repo.delete(id).await?;
    if let Some(cover) = copy.cover.as_deref() {
        state.media.remove(cover).await;
    }
    Ok(StatusCode::NO_CONTENT)
}
