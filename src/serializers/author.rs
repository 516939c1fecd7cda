use serde::Serialize;
use uuid::Uuid;

use super::{NamedWrite, resource_url};
use crate::domain::{Author, AuthorChanges, FieldErrors, NewAuthor};

#[derive(Debug, Serialize)]
pub struct AuthorRead {
    pub url: String,
    pub id: Uuid,
    pub name: String,
}

impl From<Author> for AuthorRead {
    fn from(author: Author) -> Self {
        AuthorRead {
            url: resource_url("authors", author.id),
            id: author.id,
            name: author.name,
        }
    }
}

impl TryFrom<NamedWrite> for NewAuthor {
    type Error = FieldErrors;

    fn try_from(payload: NamedWrite) -> Result<Self, Self::Error> {
        Ok(NewAuthor {
            name: payload.required_name()?,
        })
    }
}

impl From<NamedWrite> for AuthorChanges {
    fn from(payload: NamedWrite) -> Self {
        AuthorChanges {
            name: payload.optional_name(),
        }
    }
}

impl From<NewAuthor> for AuthorChanges {
    fn from(input: NewAuthor) -> Self {
        AuthorChanges {
            name: Some(input.name),
        }
    }
}
