//! Wire representations of catalog records
//!
//! Write payloads arrive as loosely typed structs (every field optional) and
//! are checked here before they become domain inputs. Read representations
//! carry a `url` next to the id and encode relations by name unless the
//! request asks for them to be expanded.

pub mod author;
pub mod book;
pub mod book_copy;
pub mod category;
pub mod publisher;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::FieldErrors;
use crate::domain::errors::{BLANK, REQUIRED};

pub const API_PREFIX: &str = "/api";

pub fn resource_url(collection: &str, id: impl std::fmt::Display) -> String {
    format!("{}/{}/{}", API_PREFIX, collection, id)
}

/// Relations requested through `?expand=a,b.c`
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Expand(BTreeSet<String>);

impl Expand {
    pub fn parse(raw: Option<&str>) -> Self {
        Expand(
            raw.unwrap_or_default()
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// True when `field` or any path below it was requested
    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|path| {
            path == field
                || path
                    .strip_prefix(field)
                    .is_some_and(|rest| rest.starts_with('.'))
        })
    }

    /// Paths below `field`, relative to it
    pub fn nested(&self, field: &str) -> Expand {
        Expand(
            self.0
                .iter()
                .filter_map(|path| path.strip_prefix(field)?.strip_prefix('.'))
                .map(str::to_string)
                .collect(),
        )
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ExpandQuery {
    pub expand: Option<String>,
}

impl From<ExpandQuery> for Expand {
    fn from(query: ExpandQuery) -> Self {
        Expand::parse(query.expand.as_deref())
    }
}

/// A relation rendered either as its slug/id or as the full nested record
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Field<R, E> {
    Reference(R),
    Expanded(E),
}

/// Write payload of the name-only resources
#[derive(Debug, Default, Deserialize)]
pub struct NamedWrite {
    pub name: Option<String>,
}

impl NamedWrite {
    /// Trimmed name, reported as missing when absent
    pub fn required_name(self) -> Result<String, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = required(&mut errors, "name", self.name.map(trimmed));
        errors.into_result(name.unwrap_or_default())
    }

    pub fn optional_name(self) -> Option<String> {
        self.name.map(trimmed)
    }
}

pub(crate) fn trimmed(value: String) -> String {
    value.trim().to_string()
}

/// Records "This field is required." when `value` is missing
pub(crate) fn required<T>(errors: &mut FieldErrors, field: &str, value: Option<T>) -> Option<T> {
    if value.is_none() {
        errors.add(field, REQUIRED);
    }
    value
}

/// Records "This field may not be blank." for an empty string
pub(crate) fn not_blank(errors: &mut FieldErrors, field: &str, value: Option<String>) -> Option<String> {
    match value {
        Some(v) if v.is_empty() => {
            errors.add(field, BLANK);
            None
        }
        other => other,
    }
}
