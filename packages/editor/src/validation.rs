//! # Field Validation
//!
//! Every admin form is checked locally before anything reaches the store.
//! Rules are per field (minimum lengths, enums, email format) and the first
//! failing rule of each field wins, so a form reports at most one message per
//! field.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field name to first error message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` unless `field` already has one
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First message in field order
    pub fn first(&self) -> Option<&str> {
        self.0.values().next().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok` when nothing was recorded
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Prefix every field with `prefix.` and fold into `self`
    pub fn extend_nested(&mut self, prefix: &str, nested: FieldErrors) {
        for (field, message) in nested.0 {
            self.add(format!("{}.{}", prefix, field), message);
        }
    }

    pub fn min_len(&mut self, field: &str, value: &str, min: usize, message: &str) -> &mut Self {
        if value.chars().count() < min {
            self.add(field, message);
        }
        self
    }

    pub fn required(&mut self, field: &str, value: &str, message: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.add(field, message);
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str, message: &str) -> &mut Self {
        if !is_email(value) {
            self.add(field, message);
        }
        self
    }

    pub fn one_of(&mut self, field: &str, value: &str, allowed: &[&str], message: &str) -> &mut Self {
        if !allowed.contains(&value) {
            self.add(field, message);
        }
        self
    }
}

pub trait Validate {
    fn validate(&self) -> Result<(), FieldErrors>;
}

/// `local@domain.tld` with no whitespace
pub fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_message_wins() {
        let mut errors = FieldErrors::new();
        errors
            .required("name", "", "Name is required")
            .min_len("name", "", 3, "Name must be at least 3 characters.");

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("name"), Some("Name is required"));
    }

    #[test]
    fn test_min_len_counts_chars() {
        let mut errors = FieldErrors::new();
        errors.min_len("name", "Zöe", 3, "too short");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_email() {
        assert!(is_email("sales@pharmasite.in"));
        assert!(!is_email("sales@pharmasite"));
        assert!(!is_email("@pharmasite.in"));
        assert!(!is_email("sales pharmasite.in"));
        assert!(!is_email("a@b@c.in"));
        assert!(!is_email("sales@.in"));
    }

    #[test]
    fn test_nested() {
        let mut inner = FieldErrors::new();
        inner.add("href", "Href is required");

        let mut outer = FieldErrors::new();
        outer.extend_nested("navLinks.0", inner);
        assert_eq!(outer.get("navLinks.0.href"), Some("Href is required"));
    }
}
