//! Book database operations
//!
//! Books are stored across the `books` row and the author/translator
//! join tables; readers of this module always get fully hydrated
//! [`Book`] values with their relations loaded.

use crate::queries::authors::row_to_author;
use crate::queries::map_delete_error;
use crate::DbPool;
use libris_core::{
    AppError, Author, Book, BookId, Collection, CollectionId, Publisher, PublisherId, Translator,
    TranslatorId,
};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};

const BOOK_COLUMNS: &str = "id, isbn, title, collection_id, volume, edition, local, \
                            publisher_id, year, page_count, pha";

/// Creates a new book together with its author/translator links.
/// The referenced authors, translators, collection and publisher must
/// already be persisted.
pub async fn create_book(pool: &DbPool, book: &Book) -> Result<(), AppError> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::database("Failed to start transaction", e))?;

    sqlx::query(
        r#"
        INSERT INTO books (
            id, isbn, title, collection_id, volume, edition, local,
            publisher_id, year, page_count, pha
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(book.id.as_string())
    .bind(&book.isbn)
    .bind(&book.title)
    .bind(book.collection.as_ref().map(|c| c.id.as_string()))
    .bind(&book.volume)
    .bind(book.edition.map(|e| e as i64))
    .bind(&book.local)
    .bind(book.publisher.as_ref().map(|p| p.id.as_string()))
    .bind(book.year)
    .bind(&book.page_count)
    .bind(&book.pha)
    .execute(&mut *tx)
    .await
    .map_err(|e| AppError::database("Failed to create book", e))?;

    for (position, author) in book.authors.iter().enumerate() {
        sqlx::query("INSERT INTO book_authors (book_id, author_id, position) VALUES (?, ?, ?)")
            .bind(book.id.as_string())
            .bind(author.id.as_string())
            .bind(position as i64)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database("Failed to link author", e))?;
    }

    for (position, translator) in book.translators.iter().enumerate() {
        sqlx::query(
            "INSERT INTO book_translators (book_id, translator_id, position) VALUES (?, ?, ?)",
        )
        .bind(book.id.as_string())
        .bind(translator.id.as_string())
        .bind(position as i64)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database("Failed to link translator", e))?;
    }

    tx.commit()
        .await
        .map_err(|e| AppError::database("Failed to commit book", e))?;

    Ok(())
}

/// Gets a book by ID with relations loaded
pub async fn get_book(pool: &DbPool, id: BookId) -> Result<Book, AppError> {
    let row = sqlx::query(&format!("SELECT {} FROM books WHERE id = ?", BOOK_COLUMNS))
        .bind(id.as_string())
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::database("Failed to fetch book", e))?
        .ok_or_else(|| AppError::not_found("Book", id))?;

    hydrate_book(pool, row).await
}

/// Updates a book and rewrites its relation links
pub async fn update_book(pool: &DbPool, book: &Book) -> Result<(), AppError> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::database("Failed to start transaction", e))?;

    sqlx::query(
        r#"
        UPDATE books SET
            isbn = ?, title = ?, collection_id = ?, volume = ?, edition = ?,
            local = ?, publisher_id = ?, year = ?, page_count = ?, pha = ?
        WHERE id = ?
        "#,
    )
    .bind(&book.isbn)
    .bind(&book.title)
    .bind(book.collection.as_ref().map(|c| c.id.as_string()))
    .bind(&book.volume)
    .bind(book.edition.map(|e| e as i64))
    .bind(&book.local)
    .bind(book.publisher.as_ref().map(|p| p.id.as_string()))
    .bind(book.year)
    .bind(&book.page_count)
    .bind(&book.pha)
    .bind(book.id.as_string())
    .execute(&mut *tx)
    .await
    .map_err(|e| AppError::database("Failed to update book", e))?;

    sqlx::query("DELETE FROM book_authors WHERE book_id = ?")
        .bind(book.id.as_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database("Failed to unlink authors", e))?;

    sqlx::query("DELETE FROM book_translators WHERE book_id = ?")
        .bind(book.id.as_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database("Failed to unlink translators", e))?;

    for (position, author) in book.authors.iter().enumerate() {
        sqlx::query("INSERT INTO book_authors (book_id, author_id, position) VALUES (?, ?, ?)")
            .bind(book.id.as_string())
            .bind(author.id.as_string())
            .bind(position as i64)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database("Failed to link author", e))?;
    }

    for (position, translator) in book.translators.iter().enumerate() {
        sqlx::query(
            "INSERT INTO book_translators (book_id, translator_id, position) VALUES (?, ?, ?)",
        )
        .bind(book.id.as_string())
        .bind(translator.id.as_string())
        .bind(position as i64)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database("Failed to link translator", e))?;
    }

    tx.commit()
        .await
        .map_err(|e| AppError::database("Failed to commit book update", e))?;

    Ok(())
}

/// Deletes a book; fails with DeleteProtected while any physical copy
/// references it
pub async fn delete_book(pool: &DbPool, id: BookId) -> Result<(), AppError> {
    sqlx::query("DELETE FROM books WHERE id = ?")
        .bind(id.as_string())
        .execute(pool)
        .await
        .map_err(|e| map_delete_error("Book", id, e))?;

    Ok(())
}

/// Lists all books ordered by title
pub async fn list_books(pool: &DbPool) -> Result<Vec<Book>, AppError> {
    let rows = sqlx::query(&format!("SELECT {} FROM books ORDER BY title", BOOK_COLUMNS))
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::database("Failed to list books", e))?;

    let mut books = Vec::with_capacity(rows.len());
    for row in rows {
        books.push(hydrate_book(pool, row).await?);
    }
    Ok(books)
}

/// Finds books indistinguishable from the candidate.
///
/// Matches every bibliographic field the record actually has; when the
/// candidate lists authors or translators, the persisted book must share
/// at least one of those names.
pub async fn find_book_equals(pool: &DbPool, candidate: &Book) -> Result<Vec<Book>, AppError> {
    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {} FROM books b WHERE ", BOOK_COLUMNS));

    builder.push("b.title = ").push_bind(&candidate.title);
    builder
        .push(" AND b.collection_id IS ")
        .push_bind(candidate.collection.as_ref().map(|c| c.id.as_string()));
    builder.push(" AND b.volume IS ").push_bind(&candidate.volume);
    builder
        .push(" AND b.edition IS ")
        .push_bind(candidate.edition.map(|e| e as i64));
    builder.push(" AND b.local IS ").push_bind(&candidate.local);
    builder
        .push(" AND b.publisher_id IS ")
        .push_bind(candidate.publisher.as_ref().map(|p| p.id.as_string()));
    builder.push(" AND b.year IS ").push_bind(candidate.year);
    builder
        .push(" AND b.page_count IS ")
        .push_bind(&candidate.page_count);
    builder.push(" AND b.isbn IS ").push_bind(&candidate.isbn);
    builder.push(" AND b.pha IS ").push_bind(&candidate.pha);

    if !candidate.authors.is_empty() {
        builder.push(
            " AND EXISTS (SELECT 1 FROM book_authors ba \
             JOIN authors a ON a.id = ba.author_id \
             WHERE ba.book_id = b.id AND a.name IN (",
        );
        let mut separated = builder.separated(", ");
        for author in &candidate.authors {
            separated.push_bind(&author.name);
        }
        builder.push("))");
    }

    if !candidate.translators.is_empty() {
        builder.push(
            " AND EXISTS (SELECT 1 FROM book_translators bt \
             JOIN translators t ON t.id = bt.translator_id \
             WHERE bt.book_id = b.id AND t.name IN (",
        );
        let mut separated = builder.separated(", ");
        for translator in &candidate.translators {
            separated.push_bind(&translator.name);
        }
        builder.push("))");
    }

    let rows = builder
        .build()
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::database("Failed to look up book duplicates", e))?;

    let mut books = Vec::with_capacity(rows.len());
    for row in rows {
        books.push(hydrate_book(pool, row).await?);
    }
    Ok(books)
}

/// Loads a book's relations and assembles the domain value
pub(crate) async fn hydrate_book(pool: &DbPool, row: SqliteRow) -> Result<Book, AppError> {
    let id_str: String = row
        .try_get("id")
        .map_err(|e| AppError::database("Missing book ID", e))?;
    let id = BookId::from_string(&id_str).map_err(|e| AppError::database("Invalid book ID", e))?;

    let authors = book_authors(pool, &id_str).await?;
    let translators = book_translators(pool, &id_str).await?;

    let collection = match row.try_get::<Option<String>, _>("collection_id").ok().flatten() {
        Some(cid) => {
            let cid = CollectionId::from_string(&cid)
                .map_err(|e| AppError::database("Invalid collection ID", e))?;
            Some(crate::queries::collections::get_collection(pool, cid).await?)
        }
        None => None,
    };

    let publisher = match row.try_get::<Option<String>, _>("publisher_id").ok().flatten() {
        Some(pid) => {
            let pid = PublisherId::from_string(&pid)
                .map_err(|e| AppError::database("Invalid publisher ID", e))?;
            Some(crate::queries::publishers::get_publisher(pool, pid).await?)
        }
        None => None,
    };

    let edition: Option<i64> = row.try_get("edition").ok().flatten();

    Ok(Book {
        id,
        isbn: row.try_get("isbn").ok().flatten(),
        title: row
            .try_get("title")
            .map_err(|e| AppError::database("Missing book title", e))?,
        authors,
        translators,
        collection,
        volume: row.try_get("volume").ok().flatten(),
        edition: edition.map(|e| e as u32),
        local: row.try_get("local").ok().flatten(),
        publisher,
        year: row.try_get("year").ok().flatten(),
        page_count: row.try_get("page_count").ok().flatten(),
        pha: row.try_get("pha").ok().flatten(),
    })
}

async fn book_authors(pool: &DbPool, book_id: &str) -> Result<Vec<Author>, AppError> {
    let rows = sqlx::query(
        r#"
        SELECT a.id, a.name, a.year_of_birth, a.year_of_death, a.pha, a.pha_label, a.observation
        FROM authors a
        JOIN book_authors ba ON ba.author_id = a.id
        WHERE ba.book_id = ?
        ORDER BY ba.position
        "#,
    )
    .bind(book_id)
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to load book authors", e))?;

    rows.into_iter().map(row_to_author).collect()
}

async fn book_translators(pool: &DbPool, book_id: &str) -> Result<Vec<Translator>, AppError> {
    let rows = sqlx::query(
        r#"
        SELECT t.id, t.name
        FROM translators t
        JOIN book_translators bt ON bt.translator_id = t.id
        WHERE bt.book_id = ?
        ORDER BY bt.position
        "#,
    )
    .bind(book_id)
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to load book translators", e))?;

    rows.into_iter()
        .map(|row| {
            let id_str: String = row
                .try_get("id")
                .map_err(|e| AppError::database("Missing translator ID", e))?;
            Ok(Translator {
                id: TranslatorId::from_string(&id_str)
                    .map_err(|e| AppError::database("Invalid translator ID", e))?,
                name: row
                    .try_get("name")
                    .map_err(|e| AppError::database("Missing translator name", e))?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::create_test_db;
    use crate::migrations::run_migrations;
    use crate::queries::authors::create_author;
    use crate::queries::collections::create_collection;
    use crate::queries::publishers::create_publisher;
    use crate::queries::translators::create_translator;

    async fn setup() -> DbPool {
        let pool = create_test_db().await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    async fn persisted_book(pool: &DbPool, title: &str, author_name: &str) -> Book {
        let author = Author::new(author_name);
        create_author(pool, &author).await.unwrap();

        let mut book = Book::new(title);
        book.authors.push(author);
        create_book(pool, &book).await.unwrap();
        book
    }

    #[tokio::test]
    async fn test_create_and_get_book_with_relations() {
        let pool = setup().await;

        let author = Author::new("Machado de Assis");
        create_author(&pool, &author).await.unwrap();
        let translator = Translator::new("Gregory Rabassa");
        create_translator(&pool, &translator).await.unwrap();
        let collection = Collection::new("Clássicos");
        create_collection(&pool, &collection).await.unwrap();
        let publisher = Publisher::new("Companhia das Letras");
        create_publisher(&pool, &publisher).await.unwrap();

        let mut book = Book::new("Dom Casmurro");
        book.isbn = Some("9788535910663".to_string());
        book.year = Some(1899);
        book.authors.push(author);
        book.translators.push(translator);
        book.collection = Some(collection);
        book.publisher = Some(publisher);

        create_book(&pool, &book).await.unwrap();

        let retrieved = get_book(&pool, book.id).await.unwrap();
        assert_eq!(retrieved, book);
        assert_eq!(retrieved.authors_str(), "Machado de Assis");
    }

    #[tokio::test]
    async fn test_book_without_copies_or_relations() {
        let pool = setup().await;

        let book = Book::new("Anonymous pamphlet");
        create_book(&pool, &book).await.unwrap();

        let retrieved = get_book(&pool, book.id).await.unwrap();
        assert!(retrieved.authors.is_empty());
        assert!(retrieved.publisher.is_none());
    }

    #[tokio::test]
    async fn test_update_book_rewrites_author_links() {
        let pool = setup().await;
        let mut book = persisted_book(&pool, "Quincas Borba", "Machado de Assis").await;

        let second = Author::new("Editor Anônimo");
        create_author(&pool, &second).await.unwrap();
        book.authors.push(second);
        book.edition = Some(2);
        update_book(&pool, &book).await.unwrap();

        let retrieved = get_book(&pool, book.id).await.unwrap();
        assert_eq!(retrieved.authors.len(), 2);
        assert_eq!(retrieved.edition, Some(2));
    }

    #[tokio::test]
    async fn test_delete_book_removes_join_rows() {
        let pool = setup().await;
        let book = persisted_book(&pool, "Descartável", "Autor Qualquer").await;

        delete_book(&pool, book.id).await.unwrap();

        let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_authors")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(links, 0);
    }

    #[tokio::test]
    async fn test_find_equals_matches_identical_record() {
        let pool = setup().await;
        let book = persisted_book(&pool, "Memórias Póstumas", "Machado de Assis").await;

        let duplicates = find_book_equals(&pool, &book).await.unwrap();
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].id, book.id);
    }

    #[tokio::test]
    async fn test_find_equals_distinguishes_editions() {
        let pool = setup().await;
        let book = persisted_book(&pool, "Memórias Póstumas", "Machado de Assis").await;

        let mut other_edition = book.clone();
        other_edition.edition = Some(5);
        assert!(find_book_equals(&pool, &other_edition)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_find_equals_considers_author_names() {
        let pool = setup().await;
        persisted_book(&pool, "Contos", "Machado de Assis").await;

        // same scalar fields, different author: not a duplicate
        let stranger = Author::new("Lima Barreto");
        let mut candidate = Book::new("Contos");
        candidate.authors.push(stranger);

        assert!(find_book_equals(&pool, &candidate).await.unwrap().is_empty());
    }
}
