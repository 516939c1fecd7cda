use serde::Serialize;

use super::{NamedWrite, resource_url};
use crate::domain::{Publisher, PublisherChanges, FieldErrors, NewPublisher};

#[derive(Debug, Serialize)]
pub struct PublisherRead {
    pub url: String,
    pub id: i32,
    pub name: String,
}

impl From<Publisher> for PublisherRead {
    fn from(publisher: Publisher) -> Self {
        PublisherRead {
            url: resource_url("publishers", publisher.id),
            id: publisher.id,
            name: publisher.name,
        }
    }
}

impl TryFrom<NamedWrite> for NewPublisher {
    type Error = FieldErrors;

    fn try_from(payload: NamedWrite) -> Result<Self, Self::Error> {
        Ok(NewPublisher {
            name: payload.required_name()?,
        })
    }
}

impl From<NamedWrite> for PublisherChanges {
    fn from(payload: NamedWrite) -> Self {
        PublisherChanges {
            name: payload.optional_name(),
        }
    }
}

impl From<NewPublisher> for PublisherChanges {
    fn from(input: NewPublisher) -> Self {
        PublisherChanges {
            name: Some(input.name),
        }
    }
}
