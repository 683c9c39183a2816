//! Physical circulation copies

use crate::error::ValidationError;
use crate::types::common::Validator;
use crate::types::ids::{BookId, PhysicalBookId, ShelfId};
use serde::{Deserialize, Serialize};

/// Circulation status of a physical copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyStatus {
    Circulant,
    Archived,
    LostByUser,
    Defective,
    NotCirculant,
}

impl CopyStatus {
    /// Stable string form used in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Circulant => "circulant",
            Self::Archived => "archived",
            Self::LostByUser => "lost_by_user",
            Self::Defective => "defective",
            Self::NotCirculant => "not_circulant",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "circulant" => Some(Self::Circulant),
            "archived" => Some(Self::Archived),
            "lost_by_user" => Some(Self::LostByUser),
            "defective" => Some(Self::Defective),
            "not_circulant" => Some(Self::NotCirculant),
            _ => None,
        }
    }
}

impl Default for CopyStatus {
    fn default() -> Self {
        Self::Circulant
    }
}

impl std::fmt::Display for CopyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Circulant => "Circulant",
            Self::Archived => "Archived",
            Self::LostByUser => "Downed / Lost by user",
            Self::Defective => "Downed / Defective book",
            Self::NotCirculant => "Not circulant",
        };
        write!(f, "{}", label)
    }
}

/// One tangible copy of a book, tracked for circulation
///
/// The `physical_id` is the number stamped on the copy itself. It is
/// allocated sequentially, unique across the library, and never changes
/// once assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalBook {
    pub id: PhysicalBookId,
    pub physical_id: i64,
    pub book_id: BookId,
    pub shelf_id: Option<ShelfId>,
    pub observations: Option<String>,
    pub status: CopyStatus,
}

impl PhysicalBook {
    pub fn new(physical_id: i64, book_id: BookId) -> Self {
        Self {
            id: PhysicalBookId::new(),
            physical_id,
            book_id,
            shelf_id: None,
            observations: None,
            status: CopyStatus::default(),
        }
    }
}

impl Validator for PhysicalBook {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        if self.physical_id < 1 {
            errors.add("physical_id", "Physical ID must be positive");
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            CopyStatus::Circulant,
            CopyStatus::Archived,
            CopyStatus::LostByUser,
            CopyStatus::Defective,
            CopyStatus::NotCirculant,
        ] {
            assert_eq!(CopyStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(CopyStatus::parse("on_the_moon"), None);
    }

    #[test]
    fn test_new_copy_defaults_to_circulant() {
        let copy = PhysicalBook::new(1, BookId::new());
        assert_eq!(copy.status, CopyStatus::Circulant);
        assert!(copy.shelf_id.is_none());
    }

    #[test]
    fn test_physical_id_must_be_positive() {
        let copy = PhysicalBook::new(0, BookId::new());
        let err = copy.validate().unwrap_err();
        assert!(!err.field("physical_id").is_empty());
    }
}
