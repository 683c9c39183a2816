//! Catalog reference entities
//!
//! Publishers, shelves, translators, collections and authors are simple
//! records keyed by a natural name. None of them enforce uniqueness in
//! the database; staff tooling is expected to call the exact-match
//! lookups before inserting to avoid duplicates.

use crate::error::ValidationError;
use crate::types::common::{bound_text, Validator};
use crate::types::ids::{AuthorId, CollectionId, PublisherId, ShelfId, TranslatorId};
use serde::{Deserialize, Serialize};

/// A publishing house
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publisher {
    pub id: PublisherId,
    pub name: String,
}

impl Publisher {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PublisherId::new(),
            name: name.into(),
        }
    }

    /// Label for list display
    pub fn label(&self) -> String {
        bound_text(&self.name, 100)
    }
}

impl Validator for Publisher {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        if self.name.trim().is_empty() {
            errors.add("name", "Name cannot be empty");
        }
        errors.into_result()
    }
}

/// A shelf location, optionally classified with a Dewey decimal code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shelf {
    pub id: ShelfId,
    pub ddc: Option<String>,
    pub description: String,
}

impl Shelf {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: ShelfId::new(),
            ddc: None,
            description: description.into(),
        }
    }

    pub fn label(&self) -> String {
        let text = match &self.ddc {
            Some(ddc) => format!("{} - {}", ddc, self.description),
            None => self.description.clone(),
        };
        bound_text(&text, 100)
    }
}

impl Validator for Shelf {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        if self.description.trim().is_empty() {
            errors.add("description", "Description cannot be empty");
        }
        errors.into_result()
    }
}

/// A translator credited on books
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translator {
    pub id: TranslatorId,
    pub name: String,
}

impl Translator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TranslatorId::new(),
            name: name.into(),
        }
    }
}

impl Validator for Translator {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        if self.name.trim().is_empty() {
            errors.add("name", "Name cannot be empty");
        }
        errors.into_result()
    }
}

/// A named collection or series a book belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,
    pub name: String,
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CollectionId::new(),
            name: name.into(),
        }
    }
}

impl Validator for Collection {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        if self.name.trim().is_empty() {
            errors.add("name", "Name cannot be empty");
        }
        errors.into_result()
    }
}

/// An author record
///
/// Only the name is required; birth/death years are kept textual because
/// historical catalogs contain values like "c. 1520".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: AuthorId,
    pub name: String,
    pub year_of_birth: Option<String>,
    pub year_of_death: Option<String>,
    pub pha: Option<u32>,
    pub pha_label: Option<String>,
    pub observation: Option<String>,
}

impl Author {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: AuthorId::new(),
            name: name.into(),
            year_of_birth: None,
            year_of_death: None,
            pha: None,
            pha_label: None,
            observation: None,
        }
    }
}

impl Validator for Author {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        if self.name.trim().is_empty() {
            errors.add("name", "Name cannot be empty");
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publisher_label_bounds_long_names() {
        let publisher = Publisher::new("P".repeat(200));
        assert!(publisher.label().ends_with("..."));
    }

    #[test]
    fn test_publisher_requires_name() {
        let publisher = Publisher::new("   ");
        let err = publisher.validate().unwrap_err();
        assert_eq!(err.field("name"), ["Name cannot be empty"]);
    }

    #[test]
    fn test_shelf_label_with_and_without_ddc() {
        let mut shelf = Shelf::new("Brazilian literature");
        assert_eq!(shelf.label(), "Brazilian literature");

        shelf.ddc = Some("869".to_string());
        assert_eq!(shelf.label(), "869 - Brazilian literature");
    }

    #[test]
    fn test_author_defaults_are_empty() {
        let author = Author::new("Machado de Assis");
        assert!(author.year_of_birth.is_none());
        assert!(author.observation.is_none());
        assert!(author.is_valid());
    }

    #[test]
    fn test_collection_and_translator_validate_names() {
        assert!(!Collection::new("").is_valid());
        assert!(!Translator::new(" ").is_valid());
        assert!(Collection::new("Penguin Classics").is_valid());
    }
}
