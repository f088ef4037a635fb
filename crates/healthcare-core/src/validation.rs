//! Field-level validation for record inputs.
//!
//! Every failing field is collected rather than stopping at the first, so a
//! caller can report all problems with a submission at once.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// Upper bound for a patient's age in years.
pub const MAX_AGE: u32 = 150;

/// A single constraint violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// All constraint violations found on one record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// A failure on exactly one field.
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError {
                field: field.to_string(),
                message: message.into(),
            }],
        }
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Names of the failing fields, in the order they were checked.
    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        f.write_str(&rendered.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Accumulates field checks for one record.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    /// Field must contain something other than whitespace.
    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.fail(field, "is required");
        }
        self
    }

    /// Optional field must not be present-but-blank.
    pub fn optional(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            if value.trim().is_empty() {
                self.fail(field, "must not be blank when provided");
            }
        }
        self
    }

    /// Required field holding an email address.
    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.fail(field, "is required");
        } else if !email_pattern().is_match(value.trim()) {
            self.fail(field, "must be a valid email address");
        }
        self
    }

    /// Required field holding a phone number.
    pub fn phone(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.fail(field, "is required");
        } else if !phone_pattern().is_match(value.trim()) {
            self.fail(field, "must be a phone number");
        }
        self
    }

    /// Numeric field with an inclusive upper bound (the lower bound is 0).
    pub fn at_most(&mut self, field: &str, value: u32, max: u32) -> &mut Self {
        if value > max {
            self.fail(field, format!("must be between 0 and {}", max));
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors {
                errors: std::mem::take(&mut self.errors),
            })
        }
    }
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
    })
}

fn phone_pattern() -> &'static Regex {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    PHONE.get_or_init(|| Regex::new(r"^\+?[0-9(][0-9 ()\-.]{5,}$").expect("phone pattern is valid"))
}
