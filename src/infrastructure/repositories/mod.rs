//! Repository implementations using SeaORM

pub mod author_repository;
pub mod book_copy_repository;
pub mod book_repository;
pub mod category_repository;
pub mod publisher_repository;
mod resolve;

pub use author_repository::SeaOrmAuthorRepository;
pub use book_copy_repository::SeaOrmBookCopyRepository;
pub use book_repository::SeaOrmBookRepository;
pub use category_repository::SeaOrmCategoryRepository;
pub use publisher_repository::SeaOrmPublisherRepository;

use chrono::{SecondsFormat, Utc};
use sea_orm::sea_query::{Expr, IntoColumnRef, LikeExpr, SimpleExpr};
use uuid::Uuid;

use crate::domain::DomainError;

/// Fixed-width UTC timestamp, so text ordering matches time ordering
pub(crate) fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true)
}

const LIKE_ESCAPE: char = '!';

/// Prefixes the `LIKE` wildcards of `term` (and the escape char itself)
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// Substring match on `column` in which `%` and `_` match themselves
pub(crate) fn contains_literal<T: IntoColumnRef>(column: T, term: &str) -> SimpleExpr {
    Expr::col(column).like(LikeExpr::new(format!("%{}%", escape_like(term))).escape(LIKE_ESCAPE))
}

pub(crate) fn parse_id(id: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(id).map_err(|e| DomainError::Database(format!("stored id {:?}: {}", id, e)))
}
