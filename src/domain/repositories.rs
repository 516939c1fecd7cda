//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_with::{NoneAsEmptyString, serde_as};
use uuid::Uuid;
use validator::Validate;

use super::DomainError;

/// A 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl PageRequest {
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    /// Zero-based index expected by the sea-orm paginator
    pub fn index(&self) -> u64 {
        self.page - 1
    }
}

/// Paginated result with total count
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publisher {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    /// In the order they were supplied on the last write
    pub authors: Vec<Author>,
    pub category: Option<Category>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookCopy {
    pub id: Uuid,
    pub book_id: Uuid,
    pub date_published: NaiveDate,
    pub publisher: Publisher,
    /// Media-relative path of the stored cover image
    pub cover: Option<String>,
}

// ---------------------------------------------------------------------------
// Write inputs
// ---------------------------------------------------------------------------

/// How a book write refers to one of its authors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorRef {
    /// Existing author, by primary key
    Id(Uuid),
    /// Looked up by exact name, created when missing
    Name(String),
}

#[derive(Debug, Clone, Validate)]
pub struct NewAuthor {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct AuthorChanges {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Validate)]
pub struct NewCategory {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct CategoryChanges {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Validate)]
pub struct NewPublisher {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct PublisherChanges {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Validate)]
pub struct NewBook {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    pub authors: Vec<AuthorRef>,
    /// Category name
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct BookChanges {
    #[validate(length(min = 1, max = 100))]
    pub title: Option<String>,
    /// Replaces the whole author set when present
    pub authors: Option<Vec<AuthorRef>>,
    /// `Some(None)` clears the category
    pub category: Option<Option<String>>,
}

#[derive(Debug, Clone)]
pub struct NewBookCopy {
    pub book: Uuid,
    pub date_published: NaiveDate,
    /// Publisher name
    pub publisher: String,
    pub cover: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BookCopyChanges {
    pub book: Option<Uuid>,
    pub date_published: Option<NaiveDate>,
    pub publisher: Option<String>,
    /// `Some(None)` clears the cover
    pub cover: Option<Option<String>>,
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Exact-match filters plus free-text search for authors.
///
/// Empty query values (`?name=`) are treated as absent.
#[serde_as]
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AuthorFilter {
    #[serde_as(as = "NoneAsEmptyString")]
    pub id: Option<Uuid>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub name: Option<String>,
    pub search: Option<String>,
}

/// Filters for categories and publishers
#[serde_as]
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct NameFilter {
    #[serde_as(as = "NoneAsEmptyString")]
    pub id: Option<i32>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub name: Option<String>,
    pub search: Option<String>,
}

#[serde_as]
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct BookFilter {
    #[serde_as(as = "NoneAsEmptyString")]
    pub id: Option<Uuid>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub title: Option<String>,
    /// Category name
    #[serde_as(as = "NoneAsEmptyString")]
    pub category: Option<String>,
    /// Author id
    #[serde_as(as = "NoneAsEmptyString")]
    pub author: Option<Uuid>,
    pub search: Option<String>,
}

#[serde_as]
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct BookCopyFilter {
    #[serde_as(as = "NoneAsEmptyString")]
    pub id: Option<Uuid>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub book: Option<Uuid>,
    /// Publisher name
    #[serde_as(as = "NoneAsEmptyString")]
    pub publisher: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub date_published: Option<NaiveDate>,
    pub search: Option<String>,
}

/// Whitespace-separated search terms, empty when there is nothing to search for
pub fn search_terms(search: Option<&str>) -> Vec<&str> {
    search
        .map(|s| s.split_whitespace().collect())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Repositories
// ---------------------------------------------------------------------------

/// Repository trait for Author entity
#[async_trait]
pub trait AuthorRepository: Send + Sync {
    async fn find_all(
        &self,
        filter: AuthorFilter,
        page: PageRequest,
    ) -> Result<Page<Author>, DomainError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Author>, DomainError>;

    async fn create(&self, input: NewAuthor) -> Result<Author, DomainError>;

    async fn update(&self, id: Uuid, input: AuthorChanges) -> Result<Author, DomainError>;

    /// Removes the author and its book associations; the books survive
    async fn delete(&self, id: Uuid) -> Result<(), DomainError>;
}

/// Repository trait for Category entity
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find_all(
        &self,
        filter: NameFilter,
        page: PageRequest,
    ) -> Result<Page<Category>, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Category>, DomainError>;

    async fn create(&self, input: NewCategory) -> Result<Category, DomainError>;

    async fn update(&self, id: i32, input: CategoryChanges) -> Result<Category, DomainError>;

    /// Clears the category on referencing books, then removes it
    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}

/// Repository trait for Publisher entity
#[async_trait]
pub trait PublisherRepository: Send + Sync {
    async fn find_all(
        &self,
        filter: NameFilter,
        page: PageRequest,
    ) -> Result<Page<Publisher>, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Publisher>, DomainError>;

    async fn create(&self, input: NewPublisher) -> Result<Publisher, DomainError>;

    async fn update(&self, id: i32, input: PublisherChanges)
    -> Result<Publisher, DomainError>;

    /// Fails with `ReferentialConflict` while a copy references the publisher
    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}

/// Repository trait for Book entity
#[async_trait]
pub trait BookRepository: Send + Sync {
    async fn find_all(&self, filter: BookFilter, page: PageRequest)
    -> Result<Page<Book>, DomainError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Book>, DomainError>;

    /// Resolves authors and category, creates the book and links it, atomically
    async fn create(&self, input: NewBook) -> Result<Book, DomainError>;

    async fn update(&self, id: Uuid, input: BookChanges) -> Result<Book, DomainError>;

    /// Fails with `ReferentialConflict` while a copy references the book
    async fn delete(&self, id: Uuid) -> Result<(), DomainError>;
}

/// Repository trait for BookCopy entity
#[async_trait]
pub trait BookCopyRepository: Send + Sync {
    async fn find_all(
        &self,
        filter: BookCopyFilter,
        page: PageRequest,
    ) -> Result<Page<BookCopy>, DomainError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<BookCopy>, DomainError>;

    /// Fails with `ReferenceNotFound("Book")` when the book id is unknown
    async fn create(&self, input: NewBookCopy) -> Result<BookCopy, DomainError>;

    async fn update(&self, id: Uuid, input: BookCopyChanges) -> Result<BookCopy, DomainError>;

    async fn delete(&self, id: Uuid) -> Result<BookCopy, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_terms_split_on_whitespace() {
        assert_eq!(search_terms(Some("  john   doe ")), vec!["john", "doe"]);
        assert!(search_terms(Some("   ")).is_empty());
        assert!(search_terms(None).is_empty());
    }

    #[test]
    fn test_empty_filter_values_are_ignored() {
        let filter: BookFilter = serde_json::from_str(r#"{"id": "", "title": "Dune"}"#).unwrap();
        assert!(filter.id.is_none());
        assert_eq!(filter.title.as_deref(), Some("Dune"));
        assert!(filter.author.is_none());
    }

    #[test]
    fn test_page_request_is_one_based() {
        let page = PageRequest::new(0, 0);
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 1);
        assert_eq!(PageRequest::new(3, 10).index(), 2);
    }
}
