use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

/// Connects to `database_url` and creates the catalog schema when missing.
///
/// An in-memory SQLite database lives as long as its connection, so the pool
/// is pinned to a single connection in that case.
pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options
        .connect_timeout(Duration::from_secs(8))
        .sqlx_logging(false);
    if database_url.contains(":memory:") {
        options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(Duration::from_secs(u32::MAX as u64));
    }

    let db = Database::connect(options).await?;
    run_migrations(&db).await?;
    Ok(db)
}

async fn execute(db: &DatabaseConnection, sql: &str) -> Result<(), DbErr> {
    db.execute(Statement::from_string(db.get_database_backend(), sql.to_owned()))
        .await?;
    Ok(())
}

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    execute(db, "PRAGMA foreign_keys = ON").await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS authors (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS publishers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS books (
            id TEXT PRIMARY KEY NOT NULL,
            title TEXT NOT NULL,
            category_id INTEGER REFERENCES categories(id) ON DELETE SET NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS book_authors (
            book_id TEXT NOT NULL REFERENCES books(id) ON DELETE CASCADE,
            author_id TEXT NOT NULL REFERENCES authors(id) ON DELETE CASCADE,
            position INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (book_id, author_id)
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS book_copies (
            id TEXT PRIMARY KEY NOT NULL,
            book_id TEXT NOT NULL REFERENCES books(id) ON DELETE RESTRICT,
            publisher_id INTEGER NOT NULL REFERENCES publishers(id) ON DELETE RESTRICT,
            date_published TEXT NOT NULL,
            cover TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    // Lookup paths used by filters and name resolution
    for index in [
        "CREATE INDEX IF NOT EXISTS idx_authors_name ON authors(name)",
        "CREATE INDEX IF NOT EXISTS idx_categories_name ON categories(name)",
        "CREATE INDEX IF NOT EXISTS idx_publishers_name ON publishers(name)",
        "CREATE INDEX IF NOT EXISTS idx_books_category ON books(category_id)",
        "CREATE INDEX IF NOT EXISTS idx_book_authors_author ON book_authors(author_id)",
        "CREATE INDEX IF NOT EXISTS idx_book_copies_book ON book_copies(book_id)",
        "CREATE INDEX IF NOT EXISTS idx_book_copies_publisher ON book_copies(publisher_id)",
    ] {
        execute(db, index).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let db = init_db("sqlite::memory:").await.unwrap();
        run_migrations(&db).await.unwrap();

        let row = db
            .query_one(Statement::from_string(
                db.get_database_backend(),
                "SELECT COUNT(*) AS n FROM sqlite_master WHERE type = 'table' AND name = 'book_copies'"
                    .to_owned(),
            ))
            .await
            .unwrap()
            .unwrap();
        let n: i64 = row.try_get("", "n").unwrap();
        assert_eq!(n, 1);
    }
}
