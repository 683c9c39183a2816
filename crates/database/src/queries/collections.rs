//! Collection database operations

use crate::DbPool;
use libris_core::{AppError, Collection, CollectionId};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

/// Creates a new collection
pub async fn create_collection(pool: &DbPool, collection: &Collection) -> Result<(), AppError> {
    sqlx::query("INSERT INTO collections (id, name) VALUES (?, ?)")
        .bind(collection.id.as_string())
        .bind(&collection.name)
        .execute(pool)
        .await
        .map_err(|e| AppError::database("Failed to create collection", e))?;

    Ok(())
}

/// Gets a collection by ID
pub async fn get_collection(pool: &DbPool, id: CollectionId) -> Result<Collection, AppError> {
    let row = sqlx::query("SELECT id, name FROM collections WHERE id = ?")
        .bind(id.as_string())
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::database("Failed to fetch collection", e))?
        .ok_or_else(|| AppError::not_found("Collection", id))?;

    row_to_collection(row)
}

/// Lists all collections ordered by name
pub async fn list_collections(pool: &DbPool) -> Result<Vec<Collection>, AppError> {
    let rows = sqlx::query("SELECT id, name FROM collections ORDER BY name")
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::database("Failed to list collections", e))?;

    rows.into_iter().map(row_to_collection).collect()
}

/// Exact-match, case-insensitive lookup by name
pub async fn find_collections_by_name_exact(
    pool: &DbPool,
    name: &str,
) -> Result<Vec<Collection>, AppError> {
    let rows = sqlx::query("SELECT id, name FROM collections WHERE lower(name) = lower(?)")
        .bind(name)
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::database("Failed to look up collection by name", e))?;

    rows.into_iter().map(row_to_collection).collect()
}

fn row_to_collection(row: SqliteRow) -> Result<Collection, AppError> {
    let id_str: String = row
        .try_get("id")
        .map_err(|e| AppError::database("Missing collection ID", e))?;
    let id = CollectionId::from_string(&id_str)
        .map_err(|e| AppError::database("Invalid collection ID", e))?;

    Ok(Collection {
        id,
        name: row
            .try_get("name")
            .map_err(|e| AppError::database("Missing collection name", e))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::create_test_db;
    use crate::migrations::run_migrations;

    #[tokio::test]
    async fn test_collection_round_trip() {
        let pool = create_test_db().await.unwrap();
        run_migrations(&pool).await.unwrap();

        let collection = Collection::new("Penguin Classics");
        create_collection(&pool, &collection).await.unwrap();

        assert_eq!(
            get_collection(&pool, collection.id).await.unwrap(),
            collection
        );
        assert_eq!(
            find_collections_by_name_exact(&pool, "penguin classics")
                .await
                .unwrap()
                .len(),
            1
        );
    }
}
