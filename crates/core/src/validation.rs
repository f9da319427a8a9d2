//! Input validation performed before any network call
//!
//! Provides validation for:
//! - Listing drafts (title, description, tags, location, coordinates)
//! - Upload sizes
//! - Generic field rules through the fluent [`Validator`]
//!
//! # Example
//!
//! ```rust
//! use gigmap_core::validation::Validator;
//!
//! let result = Validator::new()
//!     .required("title", "Plumber available")
//!     .min_length("title", "Plumber available", 3)
//!     .max_length("title", "Plumber available", 80)
//!     .validate();
//!
//! assert!(result.is_valid());
//! ```

use crate::error::{Error, ErrorCode, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

static PINCODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[1-9][0-9]{5}$").expect("valid regex"));

/// Maximum title length accepted for a listing
pub const MAX_TITLE_LEN: usize = 80;

/// Maximum description length accepted for a listing
pub const MAX_DESCRIPTION_LEN: usize = 2000;

/// Maximum number of tags on one listing
pub const MAX_TAGS: usize = 10;

/// Validation error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field that failed validation
    pub field: String,
    /// Error message
    pub message: String,
    /// Error code
    pub code: String,
    /// Expected value (if applicable)
    pub expected: Option<String>,
    /// Actual value (if applicable)
    pub actual: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// Create a new empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get all errors
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Add an error
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Merge another result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
    }

    /// Convert to Result type
    pub fn to_result(self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            let messages: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
            Err(Error::new(
                ErrorCode::ValidationError,
                format!("Validation failed: {}", messages.join("; ")),
            ))
        }
    }
}

/// Fluent validator builder
#[derive(Default)]
pub struct Validator {
    result: ValidationResult,
}

impl Validator {
    /// Create a new validator
    pub fn new() -> Self {
        Self::default()
    }

    fn fail(
        mut self,
        field: &str,
        message: impl Into<String>,
        code: &str,
        expected: Option<String>,
        actual: Option<String>,
    ) -> Self {
        self.result.add_error(ValidationError {
            field: field.to_string(),
            message: message.into(),
            code: code.to_string(),
            expected,
            actual,
        });
        self
    }

    /// Validate that a field is not empty
    pub fn required(self, field: &str, value: &str) -> Self {
        if value.trim().is_empty() {
            return self.fail(
                field,
                "Field is required",
                "REQUIRED",
                Some("non-empty value".to_string()),
                Some("empty".to_string()),
            );
        }
        self
    }

    /// Validate minimum length in characters
    pub fn min_length(self, field: &str, value: &str, min: usize) -> Self {
        let len = value.trim().chars().count();
        if len < min {
            return self.fail(
                field,
                format!("Must be at least {min} characters"),
                "MIN_LENGTH",
                Some(format!(">= {min} chars")),
                Some(format!("{len} chars")),
            );
        }
        self
    }

    /// Validate maximum length in characters
    pub fn max_length(self, field: &str, value: &str, max: usize) -> Self {
        let len = value.chars().count();
        if len > max {
            return self.fail(
                field,
                format!("Must be at most {max} characters"),
                "MAX_LENGTH",
                Some(format!("<= {max} chars")),
                Some(format!("{len} chars")),
            );
        }
        self
    }

    /// Validate a numeric range
    pub fn range<T: PartialOrd + std::fmt::Display>(self, field: &str, value: T, min: T, max: T) -> Self {
        if value < min || value > max {
            return self.fail(
                field,
                format!("Must be between {min} and {max}"),
                "RANGE",
                Some(format!("{min} - {max}")),
                Some(value.to_string()),
            );
        }
        self
    }

    /// Validate that a coordinate string parses to a finite number within bounds
    pub fn coordinate(self, field: &str, value: &str, limit: f64) -> Self {
        match value.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => self.range(field, v, -limit, limit),
            _ => self.fail(
                field,
                "Must be a number",
                "INVALID_COORDINATE",
                Some("decimal degrees".to_string()),
                Some(value.to_string()),
            ),
        }
    }

    /// Validate a six digit postal index number
    pub fn pincode(self, field: &str, value: &str) -> Self {
        if !PINCODE_RE.is_match(value.trim()) {
            return self.fail(
                field,
                "Must be a 6 digit pincode",
                "PATTERN",
                Some("6 digits".to_string()),
                Some(value.to_string()),
            );
        }
        self
    }

    /// Validate that no value repeats (case-insensitive, trimmed)
    pub fn unique(self, field: &str, values: &[String]) -> Self {
        let mut seen = HashSet::new();
        let duplicate = values
            .iter()
            .map(|v| v.trim().to_lowercase())
            .find(|v| !seen.insert(v.clone()));

        match duplicate {
            Some(dup) => self.fail(
                field,
                format!("Duplicate value: {dup}"),
                "DUPLICATE",
                None,
                Some(dup),
            ),
            None => self,
        }
    }

    /// Validate a byte size against a limit
    pub fn max_bytes(self, field: &str, size: usize, limit: usize) -> Self {
        if size > limit {
            return self.fail(
                field,
                format!("File exceeds {} KB", limit / 1024),
                "FILE_TOO_LARGE",
                Some(format!("<= {limit} bytes")),
                Some(format!("{size} bytes")),
            );
        }
        self
    }

    /// Add a custom validation
    pub fn custom<F>(self, field: &str, f: F) -> Self
    where
        F: FnOnce() -> Option<String>,
    {
        match f() {
            Some(message) => self.fail(field, message, "CUSTOM", None, None),
            None => self,
        }
    }

    /// Complete validation and return result
    pub fn validate(self) -> ValidationResult {
        self.result
    }
}

/// Listing form contents as typed by the user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingDraft {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub area: String,
    pub city: String,
    pub pincode: String,
    pub landmark: String,
    pub latitude: String,
    pub longitude: String,
    /// Sizes of the images attached to the draft, in bytes
    pub image_sizes: Vec<usize>,
}

/// Validate a listing draft before it is posted or saved
pub fn validate_listing_draft(draft: &ListingDraft, max_upload_bytes: usize) -> ValidationResult {
    let mut validator = Validator::new()
        .required("title", &draft.title)
        .min_length("title", &draft.title, 3)
        .max_length("title", &draft.title, MAX_TITLE_LEN)
        .required("description", &draft.description)
        .max_length("description", &draft.description, MAX_DESCRIPTION_LEN)
        .range("tags", draft.tags.len(), 1, MAX_TAGS)
        .unique("tags", &draft.tags)
        .required("city", &draft.city)
        .pincode("pincode", &draft.pincode)
        .coordinate("latitude", &draft.latitude, 90.0)
        .coordinate("longitude", &draft.longitude, 180.0);

    for (i, size) in draft.image_sizes.iter().enumerate() {
        validator = validator.max_bytes(&format!("images[{i}]"), *size, max_upload_bytes);
    }

    validator.validate()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_draft() -> ListingDraft {
        ListingDraft {
            title: "Electrician for home repairs".to_string(),
            description: "Wiring, fans, switchboards".to_string(),
            tags: vec!["electrician".to_string(), "repair".to_string()],
            area: "Indiranagar".to_string(),
            city: "Bengaluru".to_string(),
            pincode: "560038".to_string(),
            landmark: "Near metro".to_string(),
            latitude: "12.9716".to_string(),
            longitude: "77.5946".to_string(),
            image_sizes: vec![200 * 1024],
        }
    }

    #[test]
    fn test_required_validation() {
        let result = Validator::new().required("name", "  ").validate();
        assert!(!result.is_valid());
        assert_eq!(result.errors()[0].code, "REQUIRED");
    }

    #[test]
    fn test_range_validation() {
        let result = Validator::new().range("rating", 6, 1, 5).validate();
        assert!(!result.is_valid());
        assert_eq!(result.errors()[0].code, "RANGE");
    }

    #[test]
    fn test_valid_draft() {
        assert!(validate_listing_draft(&valid_draft(), 5 * 1024 * 1024).is_valid());
    }

    #[test]
    fn test_duplicate_tags() {
        let mut draft = valid_draft();
        draft.tags.push(" Repair ".to_string());
        let result = validate_listing_draft(&draft, 5 * 1024 * 1024);
        assert!(result.errors().iter().any(|e| e.code == "DUPLICATE"));
    }

    #[test]
    fn test_malformed_coordinate() {
        let mut draft = valid_draft();
        draft.latitude = "abc".to_string();
        let result = validate_listing_draft(&draft, 5 * 1024 * 1024);
        assert_eq!(result.errors()[0].code, "INVALID_COORDINATE");
    }

    #[test]
    fn test_out_of_range_coordinate() {
        let result = Validator::new().coordinate("longitude", "181.5", 180.0).validate();
        assert_eq!(result.errors()[0].code, "RANGE");
    }

    #[test]
    fn test_oversized_image() {
        let mut draft = valid_draft();
        draft.image_sizes.push(6 * 1024 * 1024);
        let result = validate_listing_draft(&draft, 5 * 1024 * 1024);
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.errors()[0].field, "images[1]");
    }

    #[test]
    fn test_bad_pincode() {
        let result = Validator::new().pincode("pincode", "05603").validate();
        assert!(!result.is_valid());
    }

    #[test]
    fn test_to_result_joins_messages() {
        let err = Validator::new()
            .required("title", "")
            .required("city", "")
            .validate()
            .to_result()
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("title"));
        assert!(err.message.contains("city"));
    }
}
