//! Resolution of related records named in write payloads
//!
//! Runs on whatever connection the caller holds, typically the open
//! transaction of the write that needs the relation.

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;
use validator::Validate;

use super::author_repository::insert_author;
use crate::domain::{AuthorRef, DomainError, FieldErrors, NewAuthor};
use crate::models::{author, book, category, publisher};

/// Resolves author references in order, creating unknown names.
///
/// Duplicate references collapse onto the first occurrence. When several
/// authors share a name, the oldest one (lowest id on equal timestamps) wins.
pub(crate) async fn resolve_authors<C: ConnectionTrait>(
    db: &C,
    refs: &[AuthorRef],
) -> Result<Vec<author::Model>, DomainError> {
    let mut errors = FieldErrors::new();
    let mut resolved: Vec<author::Model> = Vec::with_capacity(refs.len());

    for author_ref in refs {
        let model = match author_ref {
            AuthorRef::Id(id) => match author::Entity::find_by_id(id.to_string()).one(db).await? {
                Some(model) => model,
                None => {
                    errors.add(
                        "authors",
                        format!("Invalid pk \"{}\" - object does not exist.", id),
                    );
                    continue;
                }
            },
            AuthorRef::Name(name) => {
                let input = NewAuthor {
                    name: name.trim().to_string(),
                };
                if let Err(e) = input.validate() {
                    let e = FieldErrors::from(e);
                    for message in e.get("name").unwrap_or_default() {
                        errors.add("authors", message.clone());
                    }
                    continue;
                }
                match find_author_by_name(db, &input.name).await? {
                    Some(model) => model,
                    None => {
                        let model = insert_author(db, input.name).await?;
                        tracing::info!("Created author {} ({}) from book write", model.id, model.name);
                        model
                    }
                }
            }
        };

        if !resolved.iter().any(|a| a.id == model.id) {
            resolved.push(model);
        }
    }

    errors.into_result(resolved).map_err(DomainError::from)
}

async fn find_author_by_name<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> Result<Option<author::Model>, DomainError> {
    Ok(author::Entity::find()
        .filter(author::Column::Name.eq(name))
        .order_by_asc(author::Column::CreatedAt)
        .order_by_asc(author::Column::Id)
        .one(db)
        .await?)
}

pub(crate) async fn resolve_category<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> Result<category::Model, DomainError> {
    category::Entity::find()
        .filter(category::Column::Name.eq(name))
        .order_by_asc(category::Column::Id)
        .one(db)
        .await?
        .ok_or_else(|| missing_name("category", name))
}

pub(crate) async fn resolve_publisher<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> Result<publisher::Model, DomainError> {
    publisher::Entity::find()
        .filter(publisher::Column::Name.eq(name))
        .order_by_asc(publisher::Column::Id)
        .one(db)
        .await?
        .ok_or_else(|| missing_name("publisher", name))
}

pub(crate) async fn resolve_book<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<book::Model, DomainError> {
    book::Entity::find_by_id(id.to_string())
        .one(db)
        .await?
        .ok_or(DomainError::ReferenceNotFound("Book"))
}

fn missing_name(field: &str, name: &str) -> DomainError {
    FieldErrors::single(field, format!("Object with name={} does not exist.", name)).into()
}

/// Moves field errors into `errors`, passing every other failure through.
pub(crate) fn collect<T>(
    errors: &mut FieldErrors,
    result: Result<T, DomainError>,
) -> Result<Option<T>, DomainError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(DomainError::Validation(e)) => {
            errors.extend(e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
