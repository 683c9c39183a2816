//! Translator database operations

use crate::DbPool;
use libris_core::{AppError, Translator, TranslatorId};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

/// Creates a new translator
pub async fn create_translator(pool: &DbPool, translator: &Translator) -> Result<(), AppError> {
    sqlx::query("INSERT INTO translators (id, name) VALUES (?, ?)")
        .bind(translator.id.as_string())
        .bind(&translator.name)
        .execute(pool)
        .await
        .map_err(|e| AppError::database("Failed to create translator", e))?;

    Ok(())
}

/// Gets a translator by ID
pub async fn get_translator(pool: &DbPool, id: TranslatorId) -> Result<Translator, AppError> {
    let row = sqlx::query("SELECT id, name FROM translators WHERE id = ?")
        .bind(id.as_string())
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::database("Failed to fetch translator", e))?
        .ok_or_else(|| AppError::not_found("Translator", id))?;

    row_to_translator(row)
}

/// Lists all translators ordered by name
pub async fn list_translators(pool: &DbPool) -> Result<Vec<Translator>, AppError> {
    let rows = sqlx::query("SELECT id, name FROM translators ORDER BY name")
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::database("Failed to list translators", e))?;

    rows.into_iter().map(row_to_translator).collect()
}

/// Exact-match, case-insensitive lookup by name
pub async fn find_translators_by_name_exact(
    pool: &DbPool,
    name: &str,
) -> Result<Vec<Translator>, AppError> {
    let rows = sqlx::query("SELECT id, name FROM translators WHERE lower(name) = lower(?)")
        .bind(name)
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::database("Failed to look up translator by name", e))?;

    rows.into_iter().map(row_to_translator).collect()
}

fn row_to_translator(row: SqliteRow) -> Result<Translator, AppError> {
    let id_str: String = row
        .try_get("id")
        .map_err(|e| AppError::database("Missing translator ID", e))?;
    let id = TranslatorId::from_string(&id_str)
        .map_err(|e| AppError::database("Invalid translator ID", e))?;

    Ok(Translator {
        id,
        name: row
            .try_get("name")
            .map_err(|e| AppError::database("Missing translator name", e))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::create_test_db;
    use crate::migrations::run_migrations;

    #[tokio::test]
    async fn test_translator_round_trip() {
        let pool = create_test_db().await.unwrap();
        run_migrations(&pool).await.unwrap();

        let translator = Translator::new("Paulo Henriques Britto");
        create_translator(&pool, &translator).await.unwrap();

        let found = find_translators_by_name_exact(&pool, "paulo henriques britto")
            .await
            .unwrap();
        assert_eq!(found, vec![translator]);
    }
}
