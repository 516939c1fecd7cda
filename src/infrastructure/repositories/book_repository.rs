//! SeaORM implementation of BookRepository

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Query, SelectStatement};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;
use validator::Validate;

use super::resolve::{collect, resolve_authors, resolve_category};
use super::{contains_literal, now, parse_id};
use crate::domain::{
    Author, Book, BookChanges, BookFilter, BookRepository, Category, DomainError, FieldErrors,
    NewBook, Page, PageRequest, search_terms,
};
use crate::models::book::{ActiveModel, Column, Entity as BookEntity, Model};
use crate::models::{author, book_authors, book_copy, category};

/// `SELECT book_id` of the books with an author whose name contains `term`
pub(crate) fn books_with_author_matching(term: &str) -> SelectStatement {
    Query::select()
        .column((book_authors::Entity, book_authors::Column::BookId))
        .from(book_authors::Entity)
        .inner_join(
            author::Entity,
            Expr::col((author::Entity, author::Column::Id))
                .equals((book_authors::Entity, book_authors::Column::AuthorId)),
        )
        .and_where(contains_literal((author::Entity, author::Column::Name), term))
        .to_owned()
}

/// Attaches authors (in position order) and categories to a batch of books
async fn load_books<C: ConnectionTrait>(db: &C, models: Vec<Model>) -> Result<Vec<Book>, DomainError> {
    if models.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<String> = models.iter().map(|m| m.id.clone()).collect();
    let links = book_authors::Entity::find()
        .filter(book_authors::Column::BookId.is_in(ids))
        .order_by_asc(book_authors::Column::Position)
        .find_also_related(author::Entity)
        .all(db)
        .await?;

    let mut authors_by_book: HashMap<String, Vec<Author>> = HashMap::new();
    for (link, author) in links {
        if let Some(author) = author {
            authors_by_book
                .entry(link.book_id)
                .or_default()
                .push(Author::try_from(author)?);
        }
    }

    let category_ids: Vec<i32> = models.iter().filter_map(|m| m.category_id).collect();
    let categories: HashMap<i32, Category> = if category_ids.is_empty() {
        HashMap::new()
    } else {
        category::Entity::find()
            .filter(category::Column::Id.is_in(category_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, Category::from(c)))
            .collect()
    };

    models
        .into_iter()
        .map(|m| {
            Ok(Book {
                id: parse_id(&m.id)?,
                authors: authors_by_book.remove(&m.id).unwrap_or_default(),
                category: m.category_id.and_then(|id| categories.get(&id).cloned()),
                title: m.title,
            })
        })
        .collect()
}

async fn link_authors<C: ConnectionTrait>(
    db: &C,
    book_id: &str,
    authors: &[author::Model],
) -> Result<(), DbErr> {
    if authors.is_empty() {
        return Ok(());
    }
    let rows = authors
        .iter()
        .enumerate()
        .map(|(position, author)| book_authors::ActiveModel {
            book_id: Set(book_id.to_string()),
            author_id: Set(author.id.clone()),
            position: Set(position as i32),
        });
    book_authors::Entity::insert_many(rows)
        .exec_without_returning(db)
        .await?;
    Ok(())
}

async fn unlink_authors<C: ConnectionTrait>(db: &C, book_id: &str) -> Result<(), DbErr> {
    book_authors::Entity::delete_many()
        .filter(book_authors::Column::BookId.eq(book_id))
        .exec(db)
        .await?;
    Ok(())
}

/// SeaORM-based implementation of BookRepository
pub struct SeaOrmBookRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BookRepository for SeaOrmBookRepository {
    async fn find_all(&self, filter: BookFilter, page: PageRequest) -> Result<Page<Book>, DomainError> {
        let mut query = BookEntity::find();

        // Apply filters
        if let Some(id) = filter.id {
            query = query.filter(Column::Id.eq(id.to_string()));
        }
        if let Some(title) = &filter.title {
            query = query.filter(Column::Title.eq(title.as_str()));
        }
        if let Some(name) = &filter.category {
            query = query.filter(
                Column::CategoryId.in_subquery(
                    Query::select()
                        .column(category::Column::Id)
                        .from(category::Entity)
                        .and_where(category::Column::Name.eq(name.as_str()))
                        .to_owned(),
                ),
            );
        }
        if let Some(author_id) = filter.author {
            query = query.filter(
                Column::Id.in_subquery(
                    Query::select()
                        .column(book_authors::Column::BookId)
                        .from(book_authors::Entity)
                        .and_where(book_authors::Column::AuthorId.eq(author_id.to_string()))
                        .to_owned(),
                ),
            );
        }
        for term in search_terms(filter.search.as_deref()) {
            query = query.filter(
                Condition::any()
                    .add(contains_literal(Column::Title, term))
                    .add(Column::Id.in_subquery(books_with_author_matching(term))),
            );
        }

        let paginator = query
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .paginate(&self.db, page.page_size);
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page.index()).await?;

        Ok(Page {
            items: load_books(&self.db, models).await?,
            total,
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Book>, DomainError> {
        let Some(model) = BookEntity::find_by_id(id.to_string()).one(&self.db).await? else {
            return Ok(None);
        };
        Ok(load_books(&self.db, vec![model]).await?.pop())
    }

    async fn create(&self, input: NewBook) -> Result<Book, DomainError> {
        let txn = self.db.begin().await?;

        let mut errors = FieldErrors::new();
        if let Err(e) = input.validate() {
            errors.extend(e.into());
        }
        let category = match &input.category {
            Some(name) => collect(&mut errors, resolve_category(&txn, name).await)?,
            None => None,
        };
        let authors = collect(&mut errors, resolve_authors(&txn, &input.authors).await)?
            .unwrap_or_default();
        if !errors.is_empty() {
            return Err(errors.into());
        }

        let now = now();
        let model = ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            title: Set(input.title),
            category_id: Set(category.as_ref().map(|c| c.id)),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;
        link_authors(&txn, &model.id, &authors).await?;

        txn.commit().await?;
        tracing::info!(
            "Created book {} ({}) with {} authors",
            model.id,
            model.title,
            authors.len()
        );

        Ok(Book {
            id: parse_id(&model.id)?,
            title: model.title,
            authors: authors
                .into_iter()
                .map(Author::try_from)
                .collect::<Result<_, _>>()?,
            category: category.map(Category::from),
        })
    }

    async fn update(&self, id: Uuid, input: BookChanges) -> Result<Book, DomainError> {
        let txn = self.db.begin().await?;

        let existing = BookEntity::find_by_id(id.to_string())
            .one(&txn)
            .await?
            .ok_or(DomainError::NotFound)?;

        let mut errors = FieldErrors::new();
        if let Err(e) = input.validate() {
            errors.extend(e.into());
        }
        let category_id = match &input.category {
            None => None,
            Some(None) => Some(None),
            Some(Some(name)) => collect(&mut errors, resolve_category(&txn, name).await)?
                .map(|c| Some(c.id)),
        };
        let authors = match &input.authors {
            Some(refs) => collect(&mut errors, resolve_authors(&txn, refs).await)?,
            None => None,
        };
        if !errors.is_empty() {
            return Err(errors.into());
        }

        let mut active: ActiveModel = existing.into();
        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(category_id) = category_id {
            active.category_id = Set(category_id);
        }
        active.updated_at = Set(now());
        let model = active.update(&txn).await?;

        if let Some(authors) = authors {
            unlink_authors(&txn, &model.id).await?;
            link_authors(&txn, &model.id, &authors).await?;
        }

        txn.commit().await?;
        tracing::info!("Updated book {}", model.id);

        Ok(load_books(&self.db, vec![model])
            .await?
            .pop()
            .ok_or(DomainError::NotFound)?)
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let txn = self.db.begin().await?;
        let book_id = id.to_string();

        if BookEntity::find_by_id(book_id.clone()).one(&txn).await?.is_none() {
            return Err(DomainError::NotFound);
        }

        let copies = book_copy::Entity::find()
            .filter(book_copy::Column::BookId.eq(book_id.as_str()))
            .count(&txn)
            .await?;
        if copies > 0 {
            return Err(DomainError::ReferentialConflict(format!(
                "Cannot delete book {}: {} book copies still reference it.",
                id, copies
            )));
        }

        unlink_authors(&txn, &book_id).await?;
        BookEntity::delete_by_id(book_id).exec(&txn).await?;

        txn.commit().await?;
        tracing::info!("Deleted book {}", id);
        Ok(())
    }
}
