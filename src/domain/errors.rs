//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";

/// Per-field validation messages, serialized as `{"field": ["message", ...]}`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn extend(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Returns `value` when no error was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, field_errors) in errors.field_errors() {
            let field = field.to_string();
            for error in field_errors.iter() {
                out.add(&field, length_message(error));
            }
        }
        out
    }
}

/// Maps a `length` violation onto the message a client expects to see.
fn length_message(error: &validator::ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }
    let value_len = error
        .params
        .get("value")
        .and_then(|v| v.as_str())
        .map(|s| s.chars().count())
        .unwrap_or(0);
    if value_len == 0 {
        return BLANK.to_string();
    }
    match error.params.get("max").and_then(|m| m.as_u64()) {
        Some(max) => format!("Ensure this field has no more than {} characters.", max),
        None => format!("Invalid value ({}).", error.code),
    }
}

#[derive(Debug, Error)]
pub enum DomainError {
    /// Resource not found
    #[error("Resource not found")]
    NotFound,
    /// Field-level validation failure
    #[error("Validation error: {0}")]
    Validation(FieldErrors),
    /// A related entity named in a request body does not exist
    #[error("{0} does not exist in database.")]
    ReferenceNotFound(&'static str),
    /// Delete refused because dependents still reference the target
    #[error("{0}")]
    ReferentialConflict(String),
    /// Database/persistence error
    #[error("Database error: {0}")]
    Database(String),
    /// Media storage error
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<FieldErrors> for DomainError {
    fn from(errors: FieldErrors) -> Self {
        DomainError::Validation(errors)
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DomainError::Validation(errors.into())
    }
}

// Conversion from SeaORM errors (used in infrastructure layer)
impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        DomainError::Database(e.to_string())
    }
}
