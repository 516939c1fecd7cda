//! Application state containing repositories and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::{
    AuthorRepository, BookCopyRepository, BookRepository, CategoryRepository, PermissionPolicy,
    PublisherRepository, StaffOrReadOnly,
};
use crate::infrastructure::config::DEFAULT_MAX_UPLOAD_BYTES;
use crate::infrastructure::media::MediaStorage;
use crate::infrastructure::{
    SeaOrmAuthorRepository, SeaOrmBookCopyRepository, SeaOrmBookRepository,
    SeaOrmCategoryRepository, SeaOrmPublisherRepository,
};

/// Request-independent settings of the HTTP surface
#[derive(Clone, Debug)]
pub struct ApiSettings {
    pub jwt_secret: String,
    pub default_page_size: u64,
    pub max_page_size: u64,
    /// Largest accepted request body on the book copy routes
    pub max_upload_bytes: usize,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            jwt_secret: "secret".to_string(),
            default_page_size: 10,
            max_page_size: 100,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub author_repo: Arc<dyn AuthorRepository>,
    pub category_repo: Arc<dyn CategoryRepository>,
    pub publisher_repo: Arc<dyn PublisherRepository>,
    pub book_repo: Arc<dyn BookRepository>,
    pub copy_repo: Arc<dyn BookCopyRepository>,
    /// Decides who may read and who may write
    pub permissions: Arc<dyn PermissionPolicy>,
    pub media: MediaStorage,
    pub settings: Arc<ApiSettings>,
}

impl AppState {
    /// Create a new AppState with all repositories initialized
    pub fn new(db: DatabaseConnection, settings: ApiSettings, media: MediaStorage) -> Self {
        Self {
            author_repo: Arc::new(SeaOrmAuthorRepository::new(db.clone())),
            category_repo: Arc::new(SeaOrmCategoryRepository::new(db.clone())),
            publisher_repo: Arc::new(SeaOrmPublisherRepository::new(db.clone())),
            book_repo: Arc::new(SeaOrmBookRepository::new(db.clone())),
            copy_repo: Arc::new(SeaOrmBookCopyRepository::new(db.clone())),
            db,
            permissions: Arc::new(StaffOrReadOnly),
            media,
            settings: Arc::new(settings),
        }
    }

    /// Replaces the default staff-or-read-only rule
    pub fn with_permission_policy(mut self, policy: Arc<dyn PermissionPolicy>) -> Self {
        self.permissions = policy;
        self
    }
}
