//! Database query operations organized by entity
//!
//! Every lookup the application performs is a named function here; there
//! is no dynamic filter building. Deduplication helpers (`find_by_name_
//! exact`, `find_equals`) return the full set of indistinguishable rows
//! so callers can warn before inserting a duplicate.

pub mod authors;
pub mod books;
pub mod borrows;
pub mod collections;
pub mod copies;
pub mod publishers;
pub mod readers;
pub mod shelves;
pub mod translators;

use libris_core::AppError;
use sqlx::error::ErrorKind;

/// Translates a foreign-key RESTRICT failure on delete into the
/// user-visible delete-protection error; anything else stays a database
/// error.
pub(crate) fn map_delete_error(
    entity: &str,
    identifier: impl std::fmt::Display,
    err: sqlx::Error,
) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.kind() == ErrorKind::ForeignKeyViolation {
            return AppError::DeleteProtected {
                entity: entity.to_string(),
                identifier: identifier.to_string(),
            };
        }
    }
    AppError::database(format!("Failed to delete {}", entity), err)
}

/// True when the error is a UNIQUE constraint violation; used to turn
/// physical-id allocation races into validation errors instead of
/// opaque database failures.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.kind() == ErrorKind::UniqueViolation)
}

// Re-export commonly used query functions
pub use authors::{
    create_author, find_author_equals, find_authors_by_name_exact, get_author,
    get_or_create_author, list_authors, update_author,
};
pub use books::{create_book, delete_book, find_book_equals, get_book, list_books, update_book};
pub use borrows::{
    create_borrow, find_open_borrow_for, get_borrow, list_borrows, mark_returned, renew_borrow,
    update_borrow,
};
pub use collections::{
    create_collection, find_collections_by_name_exact, get_collection, list_collections,
};
pub use copies::{
    create_copy, find_copy_equals, get_copy, get_copy_by_physical_id, list_copies,
    next_physical_id, update_copy,
};
pub use publishers::{
    create_publisher, delete_publisher, find_publishers_by_name_exact, get_or_create_publisher,
    get_publisher, list_publishers,
};
pub use readers::{create_reader, delete_reader, get_reader, list_readers, update_reader};
pub use shelves::{create_shelf, find_shelf_equals, get_shelf, list_shelves};
pub use translators::{create_translator, find_translators_by_name_exact, get_translator, list_translators};
