use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::author::AuthorRead;
use super::category::CategoryRead;
use super::{Expand, Field, required, resource_url, trimmed};
use crate::domain::{AuthorRef, Book, BookChanges, FieldErrors, NewBook};

#[derive(Debug, Default, Deserialize)]
pub struct BookWrite {
    pub title: Option<String>,
    /// Author ids or names
    pub authors: Option<Vec<String>>,
    /// Category name; an explicit `null` clears it
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub category: Option<Option<String>>,
}

/// A UUID-shaped entry names an existing author, anything else is a name
fn author_ref(raw: String) -> AuthorRef {
    let raw = trimmed(raw);
    match Uuid::parse_str(&raw) {
        Ok(id) => AuthorRef::Id(id),
        Err(_) => AuthorRef::Name(raw),
    }
}

/// An empty category behaves like `null`
fn category_name(value: Option<String>) -> Option<String> {
    value.map(trimmed).filter(|name| !name.is_empty())
}

impl BookWrite {
    /// Body of a create: `title` is required
    pub fn into_new(self) -> Result<NewBook, FieldErrors> {
        let mut errors = FieldErrors::new();
        let title = required(&mut errors, "title", self.title.map(trimmed));
        errors.into_result(NewBook {
            title: title.unwrap_or_default(),
            authors: self
                .authors
                .unwrap_or_default()
                .into_iter()
                .map(author_ref)
                .collect(),
            category: category_name(self.category.flatten()),
        })
    }

    /// Body of a full update: omitted relations are cleared
    pub fn into_replacement(self) -> Result<BookChanges, FieldErrors> {
        let new = self.into_new()?;
        Ok(BookChanges {
            title: Some(new.title),
            authors: Some(new.authors),
            category: Some(new.category),
        })
    }

    /// Body of a partial update: omitted fields are kept
    pub fn into_changes(self) -> BookChanges {
        BookChanges {
            title: self.title.map(trimmed),
            authors: self
                .authors
                .map(|authors| authors.into_iter().map(author_ref).collect()),
            category: self.category.map(category_name),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BookRead {
    pub url: String,
    pub id: Uuid,
    pub title: String,
    pub authors: Vec<Field<String, AuthorRead>>,
    pub category: Option<Field<String, CategoryRead>>,
}

impl BookRead {
    pub fn new(book: Book, expand: &Expand) -> Self {
        let expand_authors = expand.has("authors");
        let expand_category = expand.has("category");
        BookRead {
            url: resource_url("books", book.id),
            id: book.id,
            title: book.title,
            authors: book
                .authors
                .into_iter()
                .map(|author| {
                    if expand_authors {
                        Field::Expanded(author.into())
                    } else {
                        Field::Reference(author.name)
                    }
                })
                .collect(),
            category: book.category.map(|category| {
                if expand_category {
                    Field::Expanded(category.into())
                } else {
                    Field::Reference(category.name)
                }
            }),
        }
    }
}
