use axum::extract::{OriginalUri, State};
use axum::http::StatusCode;
use axum::Json;

use super::error::ApiError;
use super::extract::{IdPath, Payload, QueryParams};
use super::pagination::{PageParams, Paginated};
use crate::domain::{CategoryChanges, DomainError, NameFilter, NewCategory};
use crate::infrastructure::AppState;
use crate::serializers::NamedWrite;
use crate::serializers::category::CategoryRead;

pub async fn list_categories(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    QueryParams(filter): QueryParams<NameFilter>,
    QueryParams(params): QueryParams<PageParams>,
) -> Result<Json<Paginated<CategoryRead>>, ApiError> {
    let request = params.resolve(&state.settings)?;
    let page = state.category_repo.find_all(filter, request).await?;
    let results = page.items.into_iter().map(CategoryRead::from).collect();
    Ok(Json(Paginated::new(results, page.total, request, &uri)?))
}

pub async fn get_category(
    State(state): State<AppState>,
    IdPath(id): IdPath<i32>,
) -> Result<Json<CategoryRead>, ApiError> {
    let category = state
        .category_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound)?;
    Ok(Json(category.into()))
}

pub async fn create_category(
    State(state): State<AppState>,
    Payload(payload): Payload<NamedWrite>,
) -> Result<(StatusCode, Json<CategoryRead>), ApiError> {
    let input = NewCategory::try_from(payload)?;
    let category = state.category_repo.create(input).await?;
    Ok((StatusCode::CREATED, Json(category.into())))
}

pub async fn replace_category(
    State(state): State<AppState>,
    IdPath(id): IdPath<i32>,
    Payload(payload): Payload<NamedWrite>,
) -> Result<Json<CategoryRead>, ApiError> {
    state
        .category_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound)?;
    let input = NewCategory::try_from(payload)?;
    let category = state.category_repo.update(id, input.into()).await?;
    Ok(Json(category.into()))
}

pub async fn update_category(
    State(state): State<AppState>,
    IdPath(id): IdPath<i32>,
    Payload(payload): Payload<NamedWrite>,
) -> Result<Json<CategoryRead>, ApiError> {
    let category = state
        .category_repo
        .update(id, CategoryChanges::from(payload))
        .await?;
    Ok(Json(category.into()))
}

/// Books of the category stay, uncategorized
pub async fn delete_category(
    State(state): State<AppState>,
    IdPath(id): IdPath<i32>,
) -> Result<StatusCode, ApiError> {
    state.category_repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
