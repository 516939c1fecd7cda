use serde::Serialize;

use super::{NamedWrite, resource_url};
use crate::domain::{Category, CategoryChanges, FieldErrors, NewCategory};

#[derive(Debug, Serialize)]
pub struct CategoryRead {
    pub url: String,
    pub id: i32,
    pub name: String,
}

impl From<Category> for CategoryRead {
    fn from(category: Category) -> Self {
        CategoryRead {
            url: resource_url("categories", category.id),
            id: category.id,
            name: category.name,
        }
    }
}

impl TryFrom<NamedWrite> for NewCategory {
    type Error = FieldErrors;

    fn try_from(payload: NamedWrite) -> Result<Self, Self::Error> {
        Ok(NewCategory {
            name: payload.required_name()?,
        })
    }
}

impl From<NamedWrite> for CategoryChanges {
    fn from(payload: NamedWrite) -> Self {
        CategoryChanges {
            name: payload.optional_name(),
        }
    }
}

impl From<NewCategory> for CategoryChanges {
    fn from(input: NewCategory) -> Self {
        CategoryChanges {
            name: Some(input.name),
        }
    }
}
