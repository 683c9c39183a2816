//! Libris Database Layer
//!
//! This crate provides database operations for the Libris library
//! manager. It uses SQLite with sqlx for type-safe database queries.

pub mod connection;
pub mod migrations;
pub mod queries;
pub mod search;

pub use connection::DbPool;
pub use migrations::{current_version, run_migrations, verify_integrity};

#[cfg(test)]
mod tests {
    use crate::connection::create_test_db;
    use crate::migrations::run_migrations;
    use crate::queries::{books, borrows, copies, publishers, readers};
    use crate::search::search_books_by_text;
    use chrono::NaiveDate;
    use libris_core::{AppError, Author, Book, Borrow, PhysicalBook, Publisher, Reader};

    #[tokio::test]
    async fn test_database_migrations() -> Result<(), AppError> {
        let pool = create_test_db().await?;
        run_migrations(&pool).await?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_migrations")
            .fetch_one(&pool)
            .await
            .map_err(|e| AppError::database("Failed to count migrations", e))?;

        assert!(count > 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_full_circulation_workflow() -> Result<(), AppError> {
        let pool = create_test_db().await?;
        run_migrations(&pool).await?;

        // catalog a book with an author
        let author = Author::new("Graciliano Ramos");
        crate::queries::authors::create_author(&pool, &author).await?;

        let mut book = Book::new("Vidas Secas");
        book.authors.push(author);
        books::create_book(&pool, &book).await?;

        // register a copy and a reader
        let physical_id = copies::next_physical_id(&pool).await?;
        assert_eq!(physical_id, 1);
        let copy = PhysicalBook::new(physical_id, book.id);
        copies::create_copy(&pool, &copy).await?;

        let reader = Reader::new("Sinhá Vitória");
        readers::create_reader(&pool, &reader).await?;

        // lend it out and bring it back
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let borrow = Borrow::new(copy.id, reader.id, date);
        borrows::create_borrow(&pool, &borrow).await?;

        assert!(borrows::find_open_borrow_for(&pool, copy.id).await?.is_some());

        borrows::mark_returned(&pool, borrow.id, date + chrono::Duration::days(3)).await?;
        assert!(borrows::find_open_borrow_for(&pool, copy.id).await?.is_none());

        // the book is findable by its author
        let found = search_books_by_text(&pool, "Graciliano").await?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, book.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_protection_on_referenced_publisher() -> Result<(), AppError> {
        let pool = create_test_db().await?;
        run_migrations(&pool).await?;

        let publisher = Publisher::new("Editora Record");
        publishers::create_publisher(&pool, &publisher).await?;

        let mut book = Book::new("Memórias do Cárcere");
        book.publisher = Some(publisher.clone());
        books::create_book(&pool, &book).await?;

        let err = publishers::delete_publisher(&pool, publisher.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DeleteProtected { .. }));

        // the publisher row survived the rejected delete
        let survivor = publishers::get_publisher(&pool, publisher.id).await?;
        assert_eq!(survivor.name, "Editora Record");

        Ok(())
    }
}
