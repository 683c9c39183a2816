//! Publisher database operations

use crate::queries::map_delete_error;
use crate::DbPool;
use libris_core::{AppError, Publisher, PublisherId};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

/// Creates a new publisher
pub async fn create_publisher(pool: &DbPool, publisher: &Publisher) -> Result<(), AppError> {
    sqlx::query("INSERT INTO publishers (id, name) VALUES (?, ?)")
        .bind(publisher.id.as_string())
        .bind(&publisher.name)
        .execute(pool)
        .await
        .map_err(|e| AppError::database("Failed to create publisher", e))?;

    Ok(())
}

/// Gets a publisher by ID
pub async fn get_publisher(pool: &DbPool, id: PublisherId) -> Result<Publisher, AppError> {
    let row = sqlx::query("SELECT id, name FROM publishers WHERE id = ?")
        .bind(id.as_string())
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::database("Failed to fetch publisher", e))?
        .ok_or_else(|| AppError::not_found("Publisher", id))?;

    row_to_publisher(row)
}

/// Lists all publishers ordered by name
pub async fn list_publishers(pool: &DbPool) -> Result<Vec<Publisher>, AppError> {
    let rows = sqlx::query("SELECT id, name FROM publishers ORDER BY name")
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::database("Failed to list publishers", e))?;

    rows.into_iter().map(row_to_publisher).collect()
}

/// Exact-match, case-insensitive lookup by name
pub async fn find_publishers_by_name_exact(
    pool: &DbPool,
    name: &str,
) -> Result<Vec<Publisher>, AppError> {
    let rows = sqlx::query("SELECT id, name FROM publishers WHERE lower(name) = lower(?)")
        .bind(name)
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::database("Failed to look up publisher by name", e))?;

    rows.into_iter().map(row_to_publisher).collect()
}

/// Returns the existing publisher with this name, or inserts a new one.
/// The boolean is true when a record was created.
pub async fn get_or_create_publisher(
    pool: &DbPool,
    name: &str,
) -> Result<(Publisher, bool), AppError> {
    if let Some(existing) = find_publishers_by_name_exact(pool, name).await?.into_iter().next() {
        return Ok((existing, false));
    }

    let publisher = Publisher::new(name);
    create_publisher(pool, &publisher).await?;
    Ok((publisher, true))
}

/// Deletes a publisher; fails with DeleteProtected while any book
/// references it
pub async fn delete_publisher(pool: &DbPool, id: PublisherId) -> Result<(), AppError> {
    sqlx::query("DELETE FROM publishers WHERE id = ?")
        .bind(id.as_string())
        .execute(pool)
        .await
        .map_err(|e| map_delete_error("Publisher", id, e))?;

    Ok(())
}

fn row_to_publisher(row: SqliteRow) -> Result<Publisher, AppError> {
    let id_str: String = row
        .try_get("id")
        .map_err(|e| AppError::database("Missing publisher ID", e))?;
    let id = PublisherId::from_string(&id_str)
        .map_err(|e| AppError::database("Invalid publisher ID", e))?;

    Ok(Publisher {
        id,
        name: row
            .try_get("name")
            .map_err(|e| AppError::database("Missing publisher name", e))?,
    })
}
