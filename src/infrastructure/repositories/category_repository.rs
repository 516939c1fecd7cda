//! SeaORM implementation of CategoryRepository

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait, Value,
};
use validator::Validate;

use super::{contains_literal, now};
use crate::domain::{
    Category, CategoryChanges, CategoryRepository, DomainError, NameFilter, NewCategory, Page,
    PageRequest, search_terms,
};
use crate::models::book;
use crate::models::category::{ActiveModel, Column, Entity as CategoryEntity, Model};

impl From<Model> for Category {
    fn from(model: Model) -> Self {
        Category {
            id: model.id,
            name: model.name,
        }
    }
}

/// SeaORM-based implementation of CategoryRepository
pub struct SeaOrmCategoryRepository {
    db: DatabaseConnection,
}

impl SeaOrmCategoryRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CategoryRepository for SeaOrmCategoryRepository {
    async fn find_all(
        &self,
        filter: NameFilter,
        page: PageRequest,
    ) -> Result<Page<Category>, DomainError> {
        let mut query = CategoryEntity::find();

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
            items: items.into_iter().map(Category::from).collect(),
            total,
        })
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Category>, DomainError> {
        let category = CategoryEntity::find_by_id(id).one(&self.db).await?;
        Ok(category.map(Category::from))
    }

    async fn create(&self, input: NewCategory) -> Result<Category, DomainError> {
        input.validate()?;
        let now = now();

        let category = ActiveModel {
            name: Set(input.name),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = category.insert(&self.db).await?;
        tracing::info!("Created category {} ({})", result.id, result.name);
        Ok(Category::from(result))
    }

    async fn update(&self, id: i32, input: CategoryChanges) -> Result<Category, DomainError> {
        input.validate()?;
        let existing = CategoryEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        active.updated_at = Set(now());

        let result = active.update(&self.db).await?;
        tracing::info!("Updated category {}", result.id);
        Ok(Category::from(result))
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let txn = self.db.begin().await?;

        // Books outlive their category
        let cleared = book::Entity::update_many()
            .col_expr(book::Column::CategoryId, Expr::value(Value::Int(None)))
            .filter(book::Column::CategoryId.eq(id))
            .exec(&txn)
            .await?;

        let result = CategoryEntity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }

        txn.commit().await?;
        tracing::info!(
            "Deleted category {} ({} books uncategorized)",
            id,
            cleared.rows_affected
        );
        Ok(())
    }
}
