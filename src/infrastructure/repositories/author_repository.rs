//! SeaORM implementation of AuthorRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;
use validator::Validate;

use super::{contains_literal, now, parse_id};
use crate::domain::{
    Author, AuthorChanges, AuthorFilter, AuthorRepository, DomainError, NewAuthor, Page,
    PageRequest, search_terms,
};
use crate::models::author::{ActiveModel, Column, Entity as AuthorEntity, Model};
use crate::models::book_authors;

impl TryFrom<Model> for Author {
    type Error = DomainError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Author {
            id: parse_id(&model.id)?,
            name: model.name,
        })
    }
}

pub(crate) async fn insert_author<C: ConnectionTrait>(db: &C, name: String) -> Result<Model, DbErr> {
    let now = now();
    ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        name: Set(name),
        created_at: Set(now.clone()),
        updated_at: Set(now),
    }
    .insert(db)
    .await
}

/// SeaORM-based implementation of AuthorRepository
pub struct SeaOrmAuthorRepository {
    db: DatabaseConnection,
}

impl SeaOrmAuthorRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuthorRepository for SeaOrmAuthorRepository {
    async fn find_all(
        &self,
        filter: AuthorFilter,
        page: PageRequest,
    ) -> Result<Page<Author>, DomainError> {
        let mut query = AuthorEntity::find();

        if let Some(id) = filter.id {
            query = query.filter(Column::Id.eq(id.to_string()));
        }
        if let Some(name) = &filter.name {
            query = query.filter(Column::Name.eq(name.as_str()));
        }
        for term in search_terms(filter.search.as_deref()) {
            query = query.filter(contains_literal(Column::Name, term));
        }

        let paginator = query
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .paginate(&self.db, page.page_size);
        let total = paginator.num_items().await?;
        let items = paginator
            .fetch_page(page.index())
            .await?
            .into_iter()
            .map(Author::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page { items, total })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Author>, DomainError> {
        AuthorEntity::find_by_id(id.to_string())
            .one(&self.db)
            .await?
            .map(Author::try_from)
            .transpose()
    }

    async fn create(&self, input: NewAuthor) -> Result<Author, DomainError> {
        input.validate()?;
        let model = insert_author(&self.db, input.name).await?;
        tracing::info!("Created author {} ({})", model.id, model.name);
        Author::try_from(model)
    }

    async fn update(&self, id: Uuid, input: AuthorChanges) -> Result<Author, DomainError> {
        input.validate()?;
        let existing = AuthorEntity::find_by_id(id.to_string())
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        active.updated_at = Set(now());

        let model = active.update(&self.db).await?;
        tracing::info!("Updated author {}", model.id);
        Author::try_from(model)
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let txn = self.db.begin().await?;

        book_authors::Entity::delete_many()
            .filter(book_authors::Column::AuthorId.eq(id.to_string()))
            .exec(&txn)
            .await?;
        let result = AuthorEntity::delete_by_id(id.to_string()).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }

        txn.commit().await?;
        tracing::info!("Deleted author {}", id);
        Ok(())
    }
}
