//! Borrow database operations
//!
//! Writes here enforce the circulation invariants: at most one open
//! borrow per physical copy, and a return date never before the borrow
//! date. Both checks run inside the same transaction as the write, so a
//! pair of concurrent borrows for one copy cannot both pass.

use crate::DbPool;
use chrono::NaiveDate;
use libris_core::{
    AppError, Borrow, BorrowId, PhysicalBookId, ReaderId, ValidationError, Validator,
};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, Transaction};

/// Creates a new borrow after validating the circulation invariants
pub async fn create_borrow(pool: &DbPool, borrow: &Borrow) -> Result<(), AppError> {
    borrow.validate()?;

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::database("Failed to start transaction", e))?;

    check_copy_not_out(&mut tx, borrow.book_id, borrow.id).await?;

    sqlx::query(
        r#"
        INSERT INTO borrows (id, book_id, reader_id, date_borrow, date_return, renew_count, observation)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(borrow.id.as_string())
    .bind(borrow.book_id.as_string())
    .bind(borrow.reader_id.as_string())
    .bind(borrow.date_borrow)
    .bind(borrow.date_return)
    .bind(i64::from(borrow.renew_count))
    .bind(&borrow.observation)
    .execute(&mut *tx)
    .await
    .map_err(|e| AppError::database("Failed to create borrow", e))?;

    tx.commit()
        .await
        .map_err(|e| AppError::database("Failed to commit borrow", e))?;

    Ok(())
}

/// Updates a borrow, re-validating the circulation invariants
pub async fn update_borrow(pool: &DbPool, borrow: &Borrow) -> Result<(), AppError> {
    borrow.validate()?;

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::database("Failed to start transaction", e))?;

    if borrow.is_open() {
        check_copy_not_out(&mut tx, borrow.book_id, borrow.id).await?;
    }

    sqlx::query(
        r#"
        UPDATE borrows SET
            book_id = ?, reader_id = ?, date_borrow = ?, date_return = ?,
            renew_count = ?, observation = ?
        WHERE id = ?
        "#,
    )
    .bind(borrow.book_id.as_string())
    .bind(borrow.reader_id.as_string())
    .bind(borrow.date_borrow)
    .bind(borrow.date_return)
    .bind(i64::from(borrow.renew_count))
    .bind(&borrow.observation)
    .bind(borrow.id.as_string())
    .execute(&mut *tx)
    .await
    .map_err(|e| AppError::database("Failed to update borrow", e))?;

    tx.commit()
        .await
        .map_err(|e| AppError::database("Failed to commit borrow update", e))?;

    Ok(())
}

/// Rejects the write when another open borrow exists for the same copy
async fn check_copy_not_out(
    tx: &mut Transaction<'_, Sqlite>,
    copy_id: PhysicalBookId,
    own_id: BorrowId,
) -> Result<(), AppError> {
    let open: Option<String> = sqlx::query_scalar(
        "SELECT id FROM borrows WHERE book_id = ? AND date_return IS NULL AND id != ?",
    )
    .bind(copy_id.as_string())
    .bind(own_id.as_string())
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| AppError::database("Failed to check open borrows", e))?;

    if open.is_some() {
        return Err(ValidationError::single("book", "This book is already borrowed").into());
    }

    Ok(())
}

/// Gets a borrow by ID
pub async fn get_borrow(pool: &DbPool, id: BorrowId) -> Result<Borrow, AppError> {
    let row = sqlx::query(
        "SELECT id, book_id, reader_id, date_borrow, date_return, renew_count, observation \
         FROM borrows WHERE id = ?",
    )
    .bind(id.as_string())
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::database("Failed to fetch borrow", e))?
    .ok_or_else(|| AppError::not_found("Borrow", id))?;

    row_to_borrow(row)
}

/// The open borrow for a copy, if the copy is currently out
pub async fn find_open_borrow_for(
    pool: &DbPool,
    copy_id: PhysicalBookId,
) -> Result<Option<Borrow>, AppError> {
    let row = sqlx::query(
        "SELECT id, book_id, reader_id, date_borrow, date_return, renew_count, observation \
         FROM borrows WHERE book_id = ? AND date_return IS NULL",
    )
    .bind(copy_id.as_string())
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::database("Failed to fetch open borrow", e))?;

    row.map(row_to_borrow).transpose()
}

/// Grants one more week on an open borrow
pub async fn renew_borrow(pool: &DbPool, id: BorrowId) -> Result<Borrow, AppError> {
    let mut borrow = get_borrow(pool, id).await?;

    if !borrow.is_open() {
        return Err(ValidationError::single("date_return", "Borrow is already returned").into());
    }

    borrow.renew();

    sqlx::query("UPDATE borrows SET renew_count = ? WHERE id = ?")
        .bind(i64::from(borrow.renew_count))
        .bind(id.as_string())
        .execute(pool)
        .await
        .map_err(|e| AppError::database("Failed to renew borrow", e))?;

    Ok(borrow)
}

/// Records the return of a copy
pub async fn mark_returned(
    pool: &DbPool,
    id: BorrowId,
    date_return: NaiveDate,
) -> Result<Borrow, AppError> {
    let mut borrow = get_borrow(pool, id).await?;
    borrow.mark_returned(date_return);
    borrow.validate()?;

    sqlx::query("UPDATE borrows SET date_return = ? WHERE id = ?")
        .bind(date_return)
        .bind(id.as_string())
        .execute(pool)
        .await
        .map_err(|e| AppError::database("Failed to record return", e))?;

    Ok(borrow)
}

/// Lists all borrows ordered by borrow date
pub async fn list_borrows(pool: &DbPool) -> Result<Vec<Borrow>, AppError> {
    let rows = sqlx::query(
        "SELECT id, book_id, reader_id, date_borrow, date_return, renew_count, observation \
         FROM borrows ORDER BY date_borrow",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to list borrows", e))?;

    rows.into_iter().map(row_to_borrow).collect()
}

fn row_to_borrow(row: SqliteRow) -> Result<Borrow, AppError> {
    let id_str: String = row
        .try_get("id")
        .map_err(|e| AppError::database("Missing borrow ID", e))?;
    let id =
        BorrowId::from_string(&id_str).map_err(|e| AppError::database("Invalid borrow ID", e))?;

    let book_id_str: String = row
        .try_get("book_id")
        .map_err(|e| AppError::database("Missing copy ID", e))?;
    let book_id = PhysicalBookId::from_string(&book_id_str)
        .map_err(|e| AppError::database("Invalid copy ID", e))?;

    let reader_id_str: String = row
        .try_get("reader_id")
        .map_err(|e| AppError::database("Missing reader ID", e))?;
    let reader_id = ReaderId::from_string(&reader_id_str)
        .map_err(|e| AppError::database("Invalid reader ID", e))?;

    let renew_count: i64 = row
        .try_get("renew_count")
        .map_err(|e| AppError::database("Missing renew count", e))?;

    Ok(Borrow {
        id,
        book_id,
        reader_id,
        date_borrow: row
            .try_get("date_borrow")
            .map_err(|e| AppError::database("Missing borrow date", e))?,
        date_return: row.try_get("date_return").ok().flatten(),
        renew_count: renew_count as u32,
        observation: row.try_get("observation").ok().flatten(),
    })
}
