//! Reader database operations

use crate::queries::map_delete_error;
use crate::DbPool;
use chrono::NaiveDate;
use libris_core::{AppError, Reader, ReaderId};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

/// Creates a new reader
pub async fn create_reader(pool: &DbPool, reader: &Reader) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO readers (id, name, document, contact, birthday, observation)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(reader.id.as_string())
    .bind(&reader.name)
    .bind(&reader.document)
    .bind(&reader.contact)
    .bind(reader.birthday)
    .bind(&reader.observation)
    .execute(pool)
    .await
    .map_err(|e| AppError::database("Failed to create reader", e))?;

    Ok(())
}

/// Gets a reader by ID
pub async fn get_reader(pool: &DbPool, id: ReaderId) -> Result<Reader, AppError> {
    let row = sqlx::query(
        "SELECT id, name, document, contact, birthday, observation FROM readers WHERE id = ?",
    )
    .bind(id.as_string())
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::database("Failed to fetch reader", e))?
    .ok_or_else(|| AppError::not_found("Reader", id))?;

    row_to_reader(row)
}

/// Updates an existing reader
pub async fn update_reader(pool: &DbPool, reader: &Reader) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE readers SET
            name = ?, document = ?, contact = ?, birthday = ?, observation = ?
        WHERE id = ?
        "#,
    )
    .bind(&reader.name)
    .bind(&reader.document)
    .bind(&reader.contact)
    .bind(reader.birthday)
    .bind(&reader.observation)
    .bind(reader.id.as_string())
    .execute(pool)
    .await
    .map_err(|e| AppError::database("Failed to update reader", e))?;

    Ok(())
}

/// Deletes a reader; fails with DeleteProtected while any borrow
/// references them
pub async fn delete_reader(pool: &DbPool, id: ReaderId) -> Result<(), AppError> {
    sqlx::query("DELETE FROM readers WHERE id = ?")
        .bind(id.as_string())
        .execute(pool)
        .await
        .map_err(|e| map_delete_error("Reader", id, e))?;

    Ok(())
}

/// Lists all readers ordered by name
pub async fn list_readers(pool: &DbPool) -> Result<Vec<Reader>, AppError> {
    let rows = sqlx::query(
        "SELECT id, name, document, contact, birthday, observation FROM readers ORDER BY name",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to list readers", e))?;

    rows.into_iter().map(row_to_reader).collect()
}

fn row_to_reader(row: SqliteRow) -> Result<Reader, AppError> {
    let id_str: String = row
        .try_get("id")
        .map_err(|e| AppError::database("Missing reader ID", e))?;
    let id =
        ReaderId::from_string(&id_str).map_err(|e| AppError::database("Invalid reader ID", e))?;

    let birthday: Option<NaiveDate> = row.try_get("birthday").ok().flatten();

    Ok(Reader {
        id,
        name: row
            .try_get("name")
            .map_err(|e| AppError::database("Missing reader name", e))?,
        document: row.try_get("document").ok().flatten(),
        contact: row.try_get("contact").ok().flatten(),
        birthday,
        observation: row.try_get("observation").unwrap_or_default(),
    })
}
