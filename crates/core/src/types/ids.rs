//! Entity identifiers
//!
//! Every persisted entity gets its own UUID newtype so ids cannot be
//! mixed up across tables. The circulation number (`physical_id`) is a
//! separate sequential integer and lives on [`crate::PhysicalBook`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random id
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parses an id from its string form
            pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
                Ok(Self(Uuid::parse_str(s)?))
            }

            /// Returns the id as a string
            pub fn as_string(&self) -> String {
                self.0.to_string()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Unique identifier for a publisher
    PublisherId
);
entity_id!(
    /// Unique identifier for a shelf
    ShelfId
);
entity_id!(
    /// Unique identifier for a translator
    TranslatorId
);
entity_id!(
    /// Unique identifier for a collection
    CollectionId
);
entity_id!(
    /// Unique identifier for an author
    AuthorId
);
entity_id!(
    /// Unique identifier for a bibliographic record
    BookId
);
entity_id!(
    /// Unique identifier for a physical copy
    PhysicalBookId
);
entity_id!(
    /// Unique identifier for a reader
    ReaderId
);
entity_id!(
    /// Unique identifier for a borrow transaction
    BorrowId
);
