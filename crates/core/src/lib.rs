pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, Result, ValidationError};
pub use types::{
    bound_text, expected_return, Author, AuthorId, Book, BookId, Borrow, BorrowId, BorrowStatus,
    Collection, CollectionId, CopyStatus, PhysicalBook, PhysicalBookId, Publisher, PublisherId,
    Reader, ReaderId, Shelf, ShelfId, Translator, TranslatorId, Validator,
};
