//! Shared traits and display helpers

use crate::error::ValidationError;

/// Trait for types that can validate themselves before a write
pub trait Validator {
    /// Validates the instance, collecting per-field messages
    fn validate(&self) -> Result<(), ValidationError>;

    /// Returns true if the instance is valid
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Caps a label for list display, appending an ellipsis when truncated
pub fn bound_text(text: &str, limit: usize) -> String {
    if text.chars().count() < limit {
        text.to_string()
    } else {
        let head: String = text.chars().take(limit).collect();
        format!("{}...", head)
    }
}
