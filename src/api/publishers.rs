use axum::extract::{OriginalUri, State};
use axum::http::StatusCode;
use axum::Json;

use super::error::ApiError;
use super::extract::{IdPath, Payload, QueryParams};
use super::pagination::{PageParams, Paginated};
use crate::domain::{PublisherChanges, DomainError, NameFilter, NewPublisher};
use crate::infrastructure::AppState;
use crate::serializers::NamedWrite;
use crate::serializers::publisher::PublisherRead;

pub async fn list_publishers(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    QueryParams(filter): QueryParams<NameFilter>,
    QueryParams(params): QueryParams<PageParams>,
) -> Result<Json<Paginated<PublisherRead>>, ApiError> {
    let request = params.resolve(&state.settings)?;
    let page = state.publisher_repo.find_all(filter, request).await?;
    let results = page.items.into_iter().map(PublisherRead::from).collect();
    Ok(Json(Paginated::new(results, page.total, request, &uri)?))
}

pub async fn get_publisher(
    State(state): State<AppState>,
    IdPath(id): IdPath<i32>,
) -> Result<Json<PublisherRead>, ApiError> {
    let publisher = state
        .publisher_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound)?;
    Ok(Json(publisher.into()))
}

pub async fn create_publisher(
    State(state): State<AppState>,
    Payload(payload): Payload<NamedWrite>,
) -> Result<(StatusCode, Json<PublisherRead>), ApiError> {
    let input = NewPublisher::try_from(payload)?;
    let publisher = state.publisher_repo.create(input).await?;
    Ok((StatusCode::CREATED, Json(publisher.into())))
}

pub async fn replace_publisher(
    State(state): State<AppState>,
    IdPath(id): IdPath<i32>,
    Payload(payload): Payload<NamedWrite>,
) -> Result<Json<PublisherRead>, ApiError> {
    state
        .publisher_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound)?;
    let input = NewPublisher::try_from(payload)?;
    let publisher = state.publisher_repo.update(id, input.into()).await?;
    Ok(Json(publisher.into()))
}

pub async fn update_publisher(
    State(state): State<AppState>,
    IdPath(id): IdPath<i32>,
    Payload(payload): Payload<NamedWrite>,
) -> Result<Json<PublisherRead>, ApiError> {
    let publisher = state
        .publisher_repo
        .update(id, PublisherChanges::from(payload))
        .await?;
    Ok(Json(publisher.into()))
}

pub async fn delete_publisher(
    State(state): State<AppState>,
    IdPath(id): IdPath<i32>,
) -> Result<StatusCode, ApiError> {
    state.publisher_repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
