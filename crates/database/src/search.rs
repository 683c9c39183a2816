//! Catalog text search
//!
//! One query term is matched against the ISBN (exact, case-insensitive)
//! and, as a case-insensitive substring, against book titles, author
//! names, author observations and collection names. Results are
//! de-duplicated: a book matching through several authors still appears
//! once.

use crate::queries::books::hydrate_book;
use crate::DbPool;
use libris_core::{AppError, Book};

/// Minimum query length accepted by the public search endpoint
pub const MIN_QUERY_LEN: usize = 3;

/// Searches books by text query
pub async fn search_books_by_text(pool: &DbPool, query: &str) -> Result<Vec<Book>, AppError> {
    let rows = sqlx::query(
        r#"
        SELECT DISTINCT b.id, b.isbn, b.title, b.collection_id, b.volume, b.edition,
                        b.local, b.publisher_id, b.year, b.page_count, b.pha
        FROM books b
        LEFT JOIN book_authors ba ON ba.book_id = b.id
        LEFT JOIN authors a ON a.id = ba.author_id
        LEFT JOIN collections c ON c.id = b.collection_id
        WHERE lower(b.isbn) = lower(?1)
           OR instr(lower(b.title), lower(?1)) > 0
           OR instr(lower(a.name), lower(?1)) > 0
           OR instr(lower(a.observation), lower(?1)) > 0
           OR instr(lower(c.name), lower(?1)) > 0
        ORDER BY b.title
        "#,
    )
    .bind(query)
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to search books", e))?;

    let mut books = Vec::with_capacity(rows.len());
    for row in rows {
        books.push(hydrate_book(pool, row).await?);
    }
    Ok(books)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::create_test_db;
    use crate::migrations::run_migrations;
    use crate::queries::authors::create_author;
    use crate::queries::books::create_book;
    use crate::queries::collections::create_collection;
    use libris_core::{Author, Collection};

    async fn setup() -> DbPool {
        let pool = create_test_db().await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    async fn add_book(
        pool: &DbPool,
        title: &str,
        isbn: Option<&str>,
        author: Option<Author>,
        collection: Option<Collection>,
    ) -> Book {
        let mut book = Book::new(title);
        book.isbn = isbn.map(str::to_string);
        if let Some(author) = author {
            create_author(pool, &author).await.unwrap();
            book.authors.push(author);
        }
        if let Some(collection) = collection {
            create_collection(pool, &collection).await.unwrap();
            book.collection = Some(collection);
        }
        create_book(pool, &book).await.unwrap();
        book
    }

    #[tokio::test]
    async fn test_search_by_author_name() {
        let pool = setup().await;
        let hobbit = add_book(
            &pool,
            "The Hobbit",
            None,
            Some(Author::new("J. R. R. Tolkien")),
            None,
        )
        .await;
        add_book(&pool, "Dom Casmurro", None, Some(Author::new("Machado de Assis")), None).await;

        let results = search_books_by_text(&pool, "Tolkien").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, hobbit.id);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let pool = setup().await;
        add_book(&pool, "The Hobbit", None, Some(Author::new("J. R. R. Tolkien")), None).await;

        assert_eq!(search_books_by_text(&pool, "tolkien").await.unwrap().len(), 1);
        assert_eq!(search_books_by_text(&pool, "hobbit").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_search_isbn_is_exact_only() {
        let pool = setup().await;
        add_book(&pool, "Untitled", Some("978-0261103344"), None, None).await;

        assert_eq!(
            search_books_by_text(&pool, "978-0261103344").await.unwrap().len(),
            1
        );
        // substring of the ISBN does not match
        assert!(search_books_by_text(&pool, "0261103344").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_by_collection_and_observation() {
        let pool = setup().await;

        let mut observed = Author::new("Anonymous");
        observed.observation = Some("wrote under the pen name Saki".to_string());
        add_book(&pool, "Short Stories", None, Some(observed), None).await;

        add_book(
            &pool,
            "Emma",
            None,
            None,
            Some(Collection::new("Penguin Classics")),
        )
        .await;

        assert_eq!(search_books_by_text(&pool, "Saki").await.unwrap().len(), 1);
        assert_eq!(search_books_by_text(&pool, "Penguin").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_search_deduplicates_multi_author_matches() {
        let pool = setup().await;

        let first = Author::new("Ana Souza");
        let second = Author::new("Ana Pereira");
        create_author(&pool, &first).await.unwrap();
        create_author(&pool, &second).await.unwrap();

        let mut book = Book::new("Coletânea");
        book.authors.push(first);
        book.authors.push(second);
        create_book(&pool, &book).await.unwrap();

        // both authors match "Ana"; the book must appear once
        let results = search_books_by_text(&pool, "Ana").await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_search_misses_return_empty() {
        let pool = setup().await;
        add_book(&pool, "The Hobbit", None, None, None).await;

        assert!(search_books_by_text(&pool, "Proust").await.unwrap().is_empty());
    }
}
