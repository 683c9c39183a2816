//! Domain types for Libris
//!
//! Models are organized by responsibility:
//! - `catalog`: reference records (publishers, shelves, translators,
//!   collections, authors)
//! - `book`: bibliographic records
//! - `copy`: physical circulation copies
//! - `reader`: library patrons
//! - `borrow`: borrow transactions and derived status
//! - `ids`: entity id newtypes
//! - `common`: shared traits and helpers

mod book;
mod borrow;
mod catalog;
mod common;
mod copy;
mod ids;
mod reader;

pub use book::Book;
pub use borrow::{expected_return, Borrow, BorrowStatus};
pub use catalog::{Author, Collection, Publisher, Shelf, Translator};
pub use common::{bound_text, Validator};
pub use copy::{CopyStatus, PhysicalBook};
pub use ids::{
    AuthorId, BookId, BorrowId, CollectionId, PhysicalBookId, PublisherId, ReaderId, ShelfId,
    TranslatorId,
};
pub use reader::Reader;
