//! Author database operations

use crate::DbPool;
use libris_core::{AppError, Author, AuthorId};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

/// Creates a new author
pub async fn create_author(pool: &DbPool, author: &Author) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO authors (id, name, year_of_birth, year_of_death, pha, pha_label, observation)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(author.id.as_string())
    .bind(&author.name)
    .bind(&author.year_of_birth)
    .bind(&author.year_of_death)
    .bind(author.pha.map(|p| p as i64))
    .bind(&author.pha_label)
    .bind(&author.observation)
    .execute(pool)
    .await
    .map_err(|e| AppError::database("Failed to create author", e))?;

    Ok(())
}

/// Gets an author by ID
pub async fn get_author(pool: &DbPool, id: AuthorId) -> Result<Author, AppError> {
    let row = sqlx::query(
        r#"
        SELECT id, name, year_of_birth, year_of_death, pha, pha_label, observation
        FROM authors WHERE id = ?
        "#,
    )
    .bind(id.as_string())
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::database("Failed to fetch author", e))?
    .ok_or_else(|| AppError::not_found("Author", id))?;

    row_to_author(row)
}

/// Updates an existing author
pub async fn update_author(pool: &DbPool, author: &Author) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE authors SET
            name = ?, year_of_birth = ?, year_of_death = ?,
            pha = ?, pha_label = ?, observation = ?
        WHERE id = ?
        "#,
    )
    .bind(&author.name)
    .bind(&author.year_of_birth)
    .bind(&author.year_of_death)
    .bind(author.pha.map(|p| p as i64))
    .bind(&author.pha_label)
    .bind(&author.observation)
    .bind(author.id.as_string())
    .execute(pool)
    .await
    .map_err(|e| AppError::database("Failed to update author", e))?;

    Ok(())
}

/// Lists all authors ordered by name
pub async fn list_authors(pool: &DbPool) -> Result<Vec<Author>, AppError> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, year_of_birth, year_of_death, pha, pha_label, observation
        FROM authors ORDER BY name
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to list authors", e))?;

    rows.into_iter().map(row_to_author).collect()
}

/// Exact-match, case-insensitive lookup by name
pub async fn find_authors_by_name_exact(
    pool: &DbPool,
    name: &str,
) -> Result<Vec<Author>, AppError> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, year_of_birth, year_of_death, pha, pha_label, observation
        FROM authors WHERE lower(name) = lower(?)
        "#,
    )
    .bind(name)
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to look up author by name", e))?;

    rows.into_iter().map(row_to_author).collect()
}

/// Finds authors indistinguishable from the candidate across the whole
/// field set
pub async fn find_author_equals(pool: &DbPool, candidate: &Author) -> Result<Vec<Author>, AppError> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, year_of_birth, year_of_death, pha, pha_label, observation
        FROM authors
        WHERE name = ?
          AND year_of_birth IS ?
          AND year_of_death IS ?
          AND pha IS ?
          AND pha_label IS ?
          AND observation IS ?
        "#,
    )
    .bind(&candidate.name)
    .bind(&candidate.year_of_birth)
    .bind(&candidate.year_of_death)
    .bind(candidate.pha.map(|p| p as i64))
    .bind(&candidate.pha_label)
    .bind(&candidate.observation)
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to look up author duplicates", e))?;

    rows.into_iter().map(row_to_author).collect()
}

/// Returns the existing author with this name, or inserts a new one.
/// The boolean is true when a record was created.
pub async fn get_or_create_author(pool: &DbPool, name: &str) -> Result<(Author, bool), AppError> {
    if let Some(existing) = find_authors_by_name_exact(pool, name).await?.into_iter().next() {
        return Ok((existing, false));
    }

    let author = Author::new(name);
    create_author(pool, &author).await?;
    Ok((author, true))
}

pub(crate) fn row_to_author(row: SqliteRow) -> Result<Author, AppError> {
    let id_str: String = row
        .try_get("id")
        .map_err(|e| AppError::database("Missing author ID", e))?;
    let id =
        AuthorId::from_string(&id_str).map_err(|e| AppError::database("Invalid author ID", e))?;

    let pha: Option<i64> = row.try_get("pha").ok().flatten();

    Ok(Author {
        id,
        name: row
            .try_get("name")
            .map_err(|e| AppError::database("Missing author name", e))?,
        year_of_birth: row.try_get("year_of_birth").ok().flatten(),
        year_of_death: row.try_get("year_of_death").ok().flatten(),
        pha: pha.map(|p| p as u32),
        pha_label: row.try_get("pha_label").ok().flatten(),
        observation: row.try_get("observation").ok().flatten(),
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
    async fn test_create_and_get_author() {
        let pool = setup().await;

        let mut author = Author::new("Clarice Lispector");
        author.year_of_birth = Some("1920".to_string());
        author.year_of_death = Some("1977".to_string());
        author.observation = Some("Ukrainian-born".to_string());

        create_author(&pool, &author).await.unwrap();

        let retrieved = get_author(&pool, author.id).await.unwrap();
        assert_eq!(retrieved, author);
    }

    #[tokio::test]
    async fn test_update_author() {
        let pool = setup().await;
        let mut author = Author::new("G. Ramos");
        create_author(&pool, &author).await.unwrap();

        author.name = "Graciliano Ramos".to_string();
        author.pha = Some(12);
        update_author(&pool, &author).await.unwrap();

        let retrieved = get_author(&pool, author.id).await.unwrap();
        assert_eq!(retrieved.name, "Graciliano Ramos");
        assert_eq!(retrieved.pha, Some(12));
    }

    #[tokio::test]
    async fn test_find_by_name_exact_ignores_case_only() {
        let pool = setup().await;
        create_author(&pool, &Author::new("J. R. R. Tolkien")).await.unwrap();

        assert_eq!(
            find_authors_by_name_exact(&pool, "j. r. r. tolkien")
                .await
                .unwrap()
                .len(),
            1
        );
        assert!(find_authors_by_name_exact(&pool, "Tolkien")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_find_equals_requires_full_field_match() {
        let pool = setup().await;

        let mut author = Author::new("Jorge Amado");
        author.year_of_birth = Some("1912".to_string());
        create_author(&pool, &author).await.unwrap();

        assert_eq!(find_author_equals(&pool, &author).await.unwrap().len(), 1);

        // same name, different birth year: not a duplicate
        let namesake = Author::new("Jorge Amado");
        assert!(find_author_equals(&pool, &namesake).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_or_create_author() {
        let pool = setup().await;

        let (first, created) = get_or_create_author(&pool, "Machado de Assis").await.unwrap();
        assert!(created);

        let (second, created_again) =
            get_or_create_author(&pool, "MACHADO DE ASSIS").await.unwrap();
        assert!(!created_again);
        assert_eq!(first.id, second.id);
    }
}
