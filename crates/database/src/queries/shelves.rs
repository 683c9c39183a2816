//! Shelf database operations

use crate::DbPool;
use libris_core::{AppError, Shelf, ShelfId};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

/// Creates a new shelf
pub async fn create_shelf(pool: &DbPool, shelf: &Shelf) -> Result<(), AppError> {
    sqlx::query("INSERT INTO shelves (id, ddc, description) VALUES (?, ?, ?)")
        .bind(shelf.id.as_string())
        .bind(&shelf.ddc)
        .bind(&shelf.description)
        .execute(pool)
        .await
        .map_err(|e| AppError::database("Failed to create shelf", e))?;

    Ok(())
}

/// Gets a shelf by ID
pub async fn get_shelf(pool: &DbPool, id: ShelfId) -> Result<Shelf, AppError> {
    let row = sqlx::query("SELECT id, ddc, description FROM shelves WHERE id = ?")
        .bind(id.as_string())
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::database("Failed to fetch shelf", e))?
        .ok_or_else(|| AppError::not_found("Shelf", id))?;

    row_to_shelf(row)
}

/// Lists all shelves ordered by classification code
pub async fn list_shelves(pool: &DbPool) -> Result<Vec<Shelf>, AppError> {
    let rows = sqlx::query("SELECT id, ddc, description FROM shelves ORDER BY ddc, description")
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::database("Failed to list shelves", e))?;

    rows.into_iter().map(row_to_shelf).collect()
}

/// Finds shelves indistinguishable from the candidate (same ddc and
/// description)
pub async fn find_shelf_equals(pool: &DbPool, candidate: &Shelf) -> Result<Vec<Shelf>, AppError> {
    let rows = sqlx::query(
        "SELECT id, ddc, description FROM shelves WHERE ddc IS ? AND description = ?",
    )
    .bind(&candidate.ddc)
    .bind(&candidate.description)
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to look up shelf duplicates", e))?;

    rows.into_iter().map(row_to_shelf).collect()
}

fn row_to_shelf(row: SqliteRow) -> Result<Shelf, AppError> {
    let id_str: String = row
        .try_get("id")
        .map_err(|e| AppError::database("Missing shelf ID", e))?;
    let id = ShelfId::from_string(&id_str).map_err(|e| AppError::database("Invalid shelf ID", e))?;

    Ok(Shelf {
        id,
        ddc: row.try_get("ddc").ok().flatten(),
        description: row
            .try_get("description")
            .map_err(|e| AppError::database("Missing shelf description", e))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::create_test_db;
    use crate::migrations::run_migrations;

    async fn setup() -> DbPool {
        let pool = create_test_db().await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_create_and_get_shelf() {
        let pool = setup().await;
        let mut shelf = Shelf::new("Brazilian literature");
        shelf.ddc = Some("869".to_string());

        create_shelf(&pool, &shelf).await.unwrap();

        let retrieved = get_shelf(&pool, shelf.id).await.unwrap();
        assert_eq!(retrieved, shelf);
    }

    #[tokio::test]
    async fn test_find_equals_matches_full_key() {
        let pool = setup().await;
        let mut shelf = Shelf::new("Philosophy");
        shelf.ddc = Some("100".to_string());
        create_shelf(&pool, &shelf).await.unwrap();

        let duplicates = find_shelf_equals(&pool, &shelf).await.unwrap();
        assert_eq!(duplicates.len(), 1);

        let mut near_miss = Shelf::new("Philosophy");
        near_miss.ddc = Some("101".to_string());
        assert!(find_shelf_equals(&pool, &near_miss).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_equals_handles_null_ddc() {
        let pool = setup().await;
        let shelf = Shelf::new("Unclassified");
        create_shelf(&pool, &shelf).await.unwrap();

        // IS ? matches NULL against NULL
        let duplicates = find_shelf_equals(&pool, &shelf).await.unwrap();
        assert_eq!(duplicates.len(), 1);
    }
}
