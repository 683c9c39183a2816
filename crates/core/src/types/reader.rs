//! Library patrons

use crate::error::ValidationError;
use crate::types::common::Validator;
use crate::types::ids::ReaderId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A registered library patron
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reader {
    pub id: ReaderId,
    pub name: String,
    pub document: Option<String>,
    pub contact: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub observation: String,
}

impl Reader {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ReaderId::new(),
            name: name.into(),
            document: None,
            contact: None,
            birthday: None,
            observation: String::new(),
        }
    }

    /// Label for list display
    pub fn label(&self) -> String {
        format!("{} | {}", self.id, self.name)
    }
}

impl Validator for Reader {
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
    fn test_reader_label_includes_id_and_name() {
        let reader = Reader::new("Capitu");
        let label = reader.label();
        assert!(label.contains(&reader.id.as_string()));
        assert!(label.ends_with("| Capitu"));
    }

    #[test]
    fn test_reader_requires_name() {
        assert!(!Reader::new("").is_valid());
        assert!(Reader::new("Bentinho").is_valid());
    }
}
