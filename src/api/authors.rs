use axum::extract::{OriginalUri, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use super::error::ApiError;
use super::extract::{IdPath, Payload, QueryParams};
use super::pagination::{PageParams, Paginated};
use crate::domain::{AuthorChanges, AuthorFilter, DomainError, NewAuthor};
use crate::infrastructure::AppState;
use crate::serializers::NamedWrite;
use crate::serializers::author::AuthorRead;

pub async fn list_authors(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    QueryParams(filter): QueryParams<AuthorFilter>,
    QueryParams(params): QueryParams<PageParams>,
) -> Result<Json<Paginated<AuthorRead>>, ApiError> {
    let request = params.resolve(&state.settings)?;
    let page = state.author_repo.find_all(filter, request).await?;
    let results = page.items.into_iter().map(AuthorRead::from).collect();
    Ok(Json(Paginated::new(results, page.total, request, &uri)?))
}

pub async fn get_author(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
) -> Result<Json<AuthorRead>, ApiError> {
    let author = state
        .author_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound)?;
    Ok(Json(author.into()))
}

pub async fn create_author(
    State(state): State<AppState>,
    Payload(payload): Payload<NamedWrite>,
) -> Result<(StatusCode, Json<AuthorRead>), ApiError> {
    let input = NewAuthor::try_from(payload)?;
    let author = state.author_repo.create(input).await?;
    Ok((StatusCode::CREATED, Json(author.into())))
}

/// PUT: every field is required
pub async fn replace_author(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
    Payload(payload): Payload<NamedWrite>,
) -> Result<Json<AuthorRead>, ApiError> {
    state
        .author_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound)?;
    let input = NewAuthor::try_from(payload)?;
    let author = state.author_repo.update(id, input.into()).await?;
    Ok(Json(author.into()))
}

/// PATCH
pub async fn update_author(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
    Payload(payload): Payload<NamedWrite>,
) -> Result<Json<AuthorRead>, ApiError> {
    let author = state
        .author_repo
        .update(id, AuthorChanges::from(payload))
        .await?;
    Ok(Json(author.into()))
}

pub async fn delete_author(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.author_repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
