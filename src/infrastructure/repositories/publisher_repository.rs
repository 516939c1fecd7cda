//! SeaORM implementation of PublisherRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use validator::Validate;

use super::{contains_literal, now};
use crate::domain::{
    DomainError, NameFilter, NewPublisher, Page, PageRequest, Publisher, PublisherChanges,
    PublisherRepository, search_terms,
};
use crate::models::book_copy;
use crate::models::publisher::{ActiveModel, Column, Entity as PublisherEntity, Model};

impl From<Model> for Publisher {
    fn from(model: Model) -> Self {
        Publisher {
            id: model.id,
            name: model.name,
        }
    }
}

/// SeaORM-based implementation of PublisherRepository
pub struct SeaOrmPublisherRepository {
    db: DatabaseConnection,
}

impl SeaOrmPublisherRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PublisherRepository for SeaOrmPublisherRepository {
    async fn find_all(
        &self,
        filter: NameFilter,
        page: PageRequest,
    ) -> Result<Page<Publisher>, DomainError> {
        let mut query = PublisherEntity::find();

        if let Some(id) = filter.id {
            query = query.filter(Column::Id.eq(id));
        }
        if let Some(name) = &filter.name {
            query = query.filter(Column::Name.eq(name.as_str()));
        }
        for term in search_terms(filter.search.as_deref()) {
            query = query.filter(contains_literal(Column::Name, term));
        }

        let paginator = query
            .order_by_asc(Column::Id)
            .paginate(&self.db, page.page_size);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.index()).await?;

        Ok(Page {
            items: items.into_iter().map(Publisher::from).collect(),
            total,
        })
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Publisher>, DomainError> {
        let publisher = PublisherEntity::find_by_id(id).one(&self.db).await?;
        Ok(publisher.map(Publisher::from))
    }

    async fn create(&self, input: NewPublisher) -> Result<Publisher, DomainError> {
        input.validate()?;
        let now = now();

        let publisher = ActiveModel {
            name: Set(input.name),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = publisher.insert(&self.db).await?;
        tracing::info!("Created publisher {} ({})", result.id, result.name);
        Ok(Publisher::from(result))
    }

    async fn update(&self, id: i32, input: PublisherChanges) -> Result<Publisher, DomainError> {
        input.validate()?;
        let existing = PublisherEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        active.updated_at = Set(now());

        let result = active.update(&self.db).await?;
        tracing::info!("Updated publisher {}", result.id);
        Ok(Publisher::from(result))
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let txn = self.db.begin().await?;

        if PublisherEntity::find_by_id(id).one(&txn).await?.is_none() {
            return Err(DomainError::NotFound);
        }

        let copies = book_copy::Entity::find()
            .filter(book_copy::Column::PublisherId.eq(id))
            .count(&txn)
            .await?;
        if copies > 0 {
            return Err(DomainError::ReferentialConflict(format!(
                "Cannot delete publisher {}: {} book copies still reference it.",
                id, copies
            )));
        }

        PublisherEntity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        tracing::info!("Deleted publisher {}", id);
        Ok(())
    }
}
