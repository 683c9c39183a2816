//! Physical copy database operations

use crate::queries::is_unique_violation;
use crate::DbPool;
use libris_core::{
    AppError, BookId, CopyStatus, PhysicalBook, PhysicalBookId, ShelfId, ValidationError,
};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

/// Suggests the next circulation number: max(existing) + 1, or 1 for an
/// empty library.
///
/// This is a form default, not a reserved sequence. Two concurrent
/// callers can receive the same suggestion; the UNIQUE constraint
/// catches the loser at insert time and [`create_copy`] reports it as a
/// validation error on `physical_id`.
pub async fn next_physical_id(pool: &DbPool) -> Result<i64, AppError> {
    let max: Option<i64> = sqlx::query_scalar("SELECT MAX(physical_id) FROM physical_books")
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::database("Failed to read max physical ID", e))?;

    Ok(max.unwrap_or(0) + 1)
}

/// Creates a new physical copy
pub async fn create_copy(pool: &DbPool, copy: &PhysicalBook) -> Result<(), AppError> {
    let result = sqlx::query(
        r#"
        INSERT INTO physical_books (id, physical_id, book_id, shelf_id, observations, status)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(copy.id.as_string())
    .bind(copy.physical_id)
    .bind(copy.book_id.as_string())
    .bind(copy.shelf_id.map(|s| s.as_string()))
    .bind(&copy.observations)
    .bind(copy.status.as_str())
    .execute(pool)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(e) if is_unique_violation(&e) => Err(ValidationError::single(
            "physical_id",
            format!("Physical ID {} is already in use", copy.physical_id),
        )
        .into()),
        Err(e) => Err(AppError::database("Failed to create physical copy", e)),
    }
}

/// Gets a copy by ID
pub async fn get_copy(pool: &DbPool, id: PhysicalBookId) -> Result<PhysicalBook, AppError> {
    let row = sqlx::query(
        "SELECT id, physical_id, book_id, shelf_id, observations, status \
         FROM physical_books WHERE id = ?",
    )
    .bind(id.as_string())
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::database("Failed to fetch physical copy", e))?
    .ok_or_else(|| AppError::not_found("PhysicalBook", id))?;

    row_to_copy(row)
}

/// Gets a copy by its circulation number
pub async fn get_copy_by_physical_id(
    pool: &DbPool,
    physical_id: i64,
) -> Result<PhysicalBook, AppError> {
    let row = sqlx::query(
        "SELECT id, physical_id, book_id, shelf_id, observations, status \
         FROM physical_books WHERE physical_id = ?",
    )
    .bind(physical_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::database("Failed to fetch physical copy", e))?
    .ok_or_else(|| AppError::not_found("PhysicalBook", physical_id))?;

    row_to_copy(row)
}

/// Updates a copy's shelf, observations and status.
/// The circulation number is immutable once assigned and is never
/// touched here.
pub async fn update_copy(pool: &DbPool, copy: &PhysicalBook) -> Result<(), AppError> {
    sqlx::query(
        "UPDATE physical_books SET shelf_id = ?, observations = ?, status = ? WHERE id = ?",
    )
    .bind(copy.shelf_id.map(|s| s.as_string()))
    .bind(&copy.observations)
    .bind(copy.status.as_str())
    .bind(copy.id.as_string())
    .execute(pool)
    .await
    .map_err(|e| AppError::database("Failed to update physical copy", e))?;

    Ok(())
}

/// Lists all copies ordered by circulation number
pub async fn list_copies(pool: &DbPool) -> Result<Vec<PhysicalBook>, AppError> {
    let rows = sqlx::query(
        "SELECT id, physical_id, book_id, shelf_id, observations, status \
         FROM physical_books ORDER BY physical_id",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to list physical copies", e))?;

    rows.into_iter().map(row_to_copy).collect()
}

/// Finds copies indistinguishable from the candidate across the whole
/// field set
pub async fn find_copy_equals(
    pool: &DbPool,
    candidate: &PhysicalBook,
) -> Result<Vec<PhysicalBook>, AppError> {
    let rows = sqlx::query(
        r#"
        SELECT id, physical_id, book_id, shelf_id, observations, status
        FROM physical_books
        WHERE physical_id = ?
          AND book_id = ?
          AND shelf_id IS ?
          AND observations IS ?
          AND status = ?
        "#,
    )
    .bind(candidate.physical_id)
    .bind(candidate.book_id.as_string())
    .bind(candidate.shelf_id.map(|s| s.as_string()))
    .bind(&candidate.observations)
    .bind(candidate.status.as_str())
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to look up copy duplicates", e))?;

    rows.into_iter().map(row_to_copy).collect()
}

fn row_to_copy(row: SqliteRow) -> Result<PhysicalBook, AppError> {
    let id_str: String = row
        .try_get("id")
        .map_err(|e| AppError::database("Missing copy ID", e))?;
    let id = PhysicalBookId::from_string(&id_str)
        .map_err(|e| AppError::database("Invalid copy ID", e))?;

    let book_id_str: String = row
        .try_get("book_id")
        .map_err(|e| AppError::database("Missing book ID", e))?;
    let book_id =
        BookId::from_string(&book_id_str).map_err(|e| AppError::database("Invalid book ID", e))?;

    let shelf_id = match row.try_get::<Option<String>, _>("shelf_id").ok().flatten() {
        Some(s) => {
            Some(ShelfId::from_string(&s).map_err(|e| AppError::database("Invalid shelf ID", e))?)
        }
        None => None,
    };

    let status_str: String = row
        .try_get("status")
        .map_err(|e| AppError::database("Missing copy status", e))?;
    let status = CopyStatus::parse(&status_str).ok_or_else(|| AppError::InternalError {
        message: format!("Unknown copy status '{}'", status_str),
    })?;

    Ok(PhysicalBook {
        id,
        physical_id: row
            .try_get("physical_id")
            .map_err(|e| AppError::database("Missing physical ID", e))?,
        book_id,
        shelf_id,
        observations: row.try_get("observations").ok().flatten(),
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::create_test_db;
    use crate::migrations::run_migrations;
    use crate::queries::books::create_book;
    use libris_core::Book;

    async fn setup_with_book() -> (DbPool, Book) {
        let pool = create_test_db().await.unwrap();
        run_migrations(&pool).await.unwrap();

        let book = Book::new("Grande Sertão: Veredas");
        create_book(&pool, &book).await.unwrap();
        (pool, book)
    }

    #[tokio::test]
    async fn test_next_physical_id_on_empty_table() {
        let (pool, _) = setup_with_book().await;
        assert_eq!(next_physical_id(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_next_physical_id_skips_gaps() {
        let (pool, book) = setup_with_book().await;

        for physical_id in [1, 3, 5] {
            create_copy(&pool, &PhysicalBook::new(physical_id, book.id))
                .await
                .unwrap();
        }

        assert_eq!(next_physical_id(&pool).await.unwrap(), 6);
    }

    #[tokio::test]
    async fn test_duplicate_physical_id_is_a_validation_error() {
        let (pool, book) = setup_with_book().await;

        create_copy(&pool, &PhysicalBook::new(7, book.id)).await.unwrap();

        let err = create_copy(&pool, &PhysicalBook::new(7, book.id))
            .await
            .unwrap_err();
        let validation = err.as_validation().expect("expected validation error");
        assert!(!validation.field("physical_id").is_empty());

        // the losing insert must not have persisted anything
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM physical_books")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_get_copy_by_physical_id() {
        let (pool, book) = setup_with_book().await;
        let copy = PhysicalBook::new(42, book.id);
        create_copy(&pool, &copy).await.unwrap();

        let retrieved = get_copy_by_physical_id(&pool, 42).await.unwrap();
        assert_eq!(retrieved, copy);
        assert!(get_copy_by_physical_id(&pool, 99).await.is_err());
    }

    #[tokio::test]
    async fn test_update_copy_never_touches_physical_id() {
        let (pool, book) = setup_with_book().await;
        let mut copy = PhysicalBook::new(1, book.id);
        create_copy(&pool, &copy).await.unwrap();

        copy.status = CopyStatus::Archived;
        copy.physical_id = 999; // must be ignored by the update
        update_copy(&pool, &copy).await.unwrap();

        let retrieved = get_copy(&pool, copy.id).await.unwrap();
        assert_eq!(retrieved.status, CopyStatus::Archived);
        assert_eq!(retrieved.physical_id, 1);
    }

    #[tokio::test]
    async fn test_find_equals_full_field_set() {
        let (pool, book) = setup_with_book().await;
        let copy = PhysicalBook::new(1, book.id);
        create_copy(&pool, &copy).await.unwrap();

        assert_eq!(find_copy_equals(&pool, &copy).await.unwrap().len(), 1);

        let mut different = copy.clone();
        different.status = CopyStatus::Defective;
        assert!(find_copy_equals(&pool, &different).await.unwrap().is_empty());
    }
}
