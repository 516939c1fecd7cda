//! SeaORM implementation of BookCopyRepository

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use super::book_repository::books_with_author_matching;
use super::resolve::{resolve_book, resolve_publisher};
use super::{contains_literal, now, parse_id};
use crate::domain::{
    BookCopy, BookCopyChanges, BookCopyFilter, BookCopyRepository, DomainError, NewBookCopy, Page,
    PageRequest, Publisher, search_terms,
};
use crate::models::book_copy::{ActiveModel, Column, Entity as BookCopyEntity, Model};
use crate::models::{book, publisher};

const DATE_FORMAT: &str = "%Y-%m-%d";

async fn load_copies<C: ConnectionTrait>(
    db: &C,
    models: Vec<Model>,
) -> Result<Vec<BookCopy>, DomainError> {
    if models.is_empty() {
        return Ok(Vec::new());
    }

    let publisher_ids: Vec<i32> = models.iter().map(|m| m.publisher_id).collect();
    let publishers: HashMap<i32, Publisher> = publisher::Entity::find()
        .filter(publisher::Column::Id.is_in(publisher_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|p| (p.id, Publisher::from(p)))
        .collect();

    models
        .into_iter()
        .map(|m| {
            let publisher = publishers.get(&m.publisher_id).cloned().ok_or_else(|| {
                DomainError::Database(format!("copy {} has no publisher {}", m.id, m.publisher_id))
            })?;
            let date_published = NaiveDate::parse_from_str(&m.date_published, DATE_FORMAT)
                .map_err(|e| DomainError::Database(format!("copy {} date: {}", m.id, e)))?;
            Ok(BookCopy {
                id: parse_id(&m.id)?,
                book_id: parse_id(&m.book_id)?,
                date_published,
                publisher,
                cover: m.cover,
            })
        })
        .collect()
}

/// SeaORM-based implementation of BookCopyRepository
pub struct SeaOrmBookCopyRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookCopyRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BookCopyRepository for SeaOrmBookCopyRepository {
    async fn find_all(
        &self,
        filter: BookCopyFilter,
        page: PageRequest,
    ) -> Result<Page<BookCopy>, DomainError> {
        let mut query = BookCopyEntity::find();

        if let Some(id) = filter.id {
            query = query.filter(Column::Id.eq(id.to_string()));
        }
        if let Some(book_id) = filter.book {
            query = query.filter(Column::BookId.eq(book_id.to_string()));
        }
        if let Some(name) = &filter.publisher {
            query = query.filter(
                Column::PublisherId.in_subquery(
                    Query::select()
                        .column(publisher::Column::Id)
                        .from(publisher::Entity)
                        .and_where(publisher::Column::Name.eq(name.as_str()))
                        .to_owned(),
                ),
            );
        }
        if let Some(date) = filter.date_published {
            query = query.filter(Column::DatePublished.eq(date.format(DATE_FORMAT).to_string()));
        }
        for term in search_terms(filter.search.as_deref()) {
            query = query.filter(
                Condition::any()
                    .add(
                        Column::BookId.in_subquery(
                            Query::select()
                                .column(book::Column::Id)
                                .from(book::Entity)
                                .and_where(contains_literal(book::Column::Title, term))
                                .to_owned(),
                        ),
                    )
                    .add(Column::BookId.in_subquery(books_with_author_matching(term))),
            );
        }

        let paginator = query
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .paginate(&self.db, page.page_size);
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page.index()).await?;

        Ok(Page {
            items: load_copies(&self.db, models).await?,
            total,
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<BookCopy>, DomainError> {
        let Some(model) = BookCopyEntity::find_by_id(id.to_string())
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };
        Ok(load_copies(&self.db, vec![model]).await?.pop())
    }

    async fn create(&self, input: NewBookCopy) -> Result<BookCopy, DomainError> {
        let txn = self.db.begin().await?;

        let book = resolve_book(&txn, input.book).await?;
        let publisher = resolve_publisher(&txn, &input.publisher).await?;

        let now = now();
        let model = ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            book_id: Set(book.id),
            publisher_id: Set(publisher.id),
            date_published: Set(input.date_published.format(DATE_FORMAT).to_string()),
            cover: Set(input.cover),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        tracing::info!("Created copy {} of book {}", model.id, model.book_id);

        Ok(load_copies(&self.db, vec![model])
            .await?
            .pop()
            .ok_or(DomainError::NotFound)?)
    }

    async fn update(&self, id: Uuid, input: BookCopyChanges) -> Result<BookCopy, DomainError> {
        let txn = self.db.begin().await?;

        let existing = BookCopyEntity::find_by_id(id.to_string())
            .one(&txn)
            .await?
            .ok_or(DomainError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        if let Some(book_id) = input.book {
            active.book_id = Set(resolve_book(&txn, book_id).await?.id);
        }
        if let Some(name) = &input.publisher {
            active.publisher_id = Set(resolve_publisher(&txn, name).await?.id);
        }
        if let Some(date) = input.date_published {
            active.date_published = Set(date.format(DATE_FORMAT).to_string());
        }
        if let Some(cover) = input.cover {
            active.cover = Set(cover);
        }
        active.updated_at = Set(now());
        let model = active.update(&txn).await?;

        txn.commit().await?;
        tracing::info!("Updated copy {}", model.id);

        Ok(load_copies(&self.db, vec![model])
            .await?
            .pop()
            .ok_or(DomainError::NotFound)?)
    }

    async fn delete(&self, id: Uuid) -> Result<BookCopy, DomainError> {
        let txn = self.db.begin().await?;

        let model = BookCopyEntity::find_by_id(id.to_string())
            .one(&txn)
            .await?
            .ok_or(DomainError::NotFound)?;
        let copy = load_copies(&txn, vec![model]).await?.pop().ok_or(DomainError::NotFound)?;

        BookCopyEntity::delete_by_id(id.to_string()).exec(&txn).await?;
        txn.commit().await?;
        tracing::info!("Deleted copy {}", id);
        Ok(copy)
    }
}
