//! Bibliographic records
//!
//! A [`Book`] is the bibliographic description; physical circulation
//! copies are tracked separately. A book may exist with no copies at all.

use crate::error::ValidationError;
use crate::types::catalog::{Author, Collection, Publisher, Translator};
use crate::types::common::Validator;
use crate::types::ids::BookId;
use serde::{Deserialize, Serialize};

/// A bibliographic record with its loaded relations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub isbn: Option<String>,
    pub title: String,
    pub authors: Vec<Author>,
    pub translators: Vec<Translator>,
    pub collection: Option<Collection>,
    pub volume: Option<String>,
    pub edition: Option<u32>,
    pub local: Option<String>,
    pub publisher: Option<Publisher>,
    pub year: Option<i32>,
    pub page_count: Option<String>,
    pub pha: Option<String>,
}

impl Book {
    /// Creates a new book with the required title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: BookId::new(),
            isbn: None,
            title: title.into(),
            authors: Vec::new(),
            translators: Vec::new(),
            collection: None,
            volume: None,
            edition: None,
            local: None,
            publisher: None,
            year: None,
            page_count: None,
            pha: None,
        }
    }

    /// Composed title for list display: "Title | Volume V | Edition E"
    pub fn title_str(&self) -> String {
        let mut parts = vec![self.title.clone()];

        if let Some(volume) = &self.volume {
            parts.push(format!("Volume {}", volume));
        }

        if let Some(edition) = self.edition {
            parts.push(format!("Edition {}", edition));
        }

        parts.join(" | ")
    }

    /// Author names joined for list display
    pub fn authors_str(&self) -> String {
        self.authors
            .iter()
            .map(|author| author.name.as_str())
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// Translator names joined for list display
    pub fn translators_str(&self) -> String {
        self.translators
            .iter()
            .map(|translator| translator.name.as_str())
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// Detail lines for the public search results
    pub fn infos(&self) -> Vec<String> {
        let mut infos = Vec::new();

        if let Some(isbn) = &self.isbn {
            infos.push(format!("ISBN: {}", isbn));
        }

        if let Some(publisher) = &self.publisher {
            infos.push(format!("Publisher: {}", publisher.name));
        }

        if let Some(collection) = &self.collection {
            infos.push(format!("Collection: {}", collection.name));
        }

        if !self.translators.is_empty() {
            let prefix = if self.translators.len() == 1 {
                "Translator"
            } else {
                "Translators"
            };
            infos.push(format!("{}: {}", prefix, self.translators_str()));
        }

        infos
    }
}

impl std::fmt::Display for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title_str())
    }
}

impl Validator for Book {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();

        if self.title.trim().is_empty() {
            errors.add("title", "Title cannot be empty");
        }

        if let Some(year) = self.year {
            if year > 3000 {
                errors.add("year", "Year is out of range");
            }
        }

        errors.into_result()
    }
}
