use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDate;
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::book::BookRead;
use super::publisher::PublisherRead;
use super::{Expand, Field, not_blank, required, resource_url, trimmed};
use crate::domain::errors::REQUIRED;
use crate::domain::{Book, BookCopy, BookCopyChanges, DomainError, FieldErrors, NewBookCopy};
use crate::infrastructure::media::MediaStorage;

pub const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";
pub const INVALID_DATE: &str =
    "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.";

/// Cover as it arrived on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverSource {
    /// Base64 text, optionally wrapped in a `data:` URI
    Base64(String),
    /// Raw bytes of a multipart file part
    Upload(Vec<u8>),
}

/// A decoded cover ready to be stored
#[derive(Debug, Clone)]
pub struct CoverImage {
    pub bytes: Vec<u8>,
    pub extension: &'static str,
}

/// Accepts JPEG and PNG payloads that fully decode.
pub fn decode_cover(source: CoverSource) -> Result<CoverImage, FieldErrors> {
    let invalid = || FieldErrors::single("cover", INVALID_IMAGE);

    let bytes = match source {
        CoverSource::Upload(bytes) => bytes,
        CoverSource::Base64(text) => {
            let data = match text.trim().strip_prefix("data:") {
                Some(uri) => uri.split_once(',').map(|(_, data)| data).ok_or_else(invalid)?,
                None => text.trim(),
            };
            let data: String = data.split_whitespace().collect();
            STANDARD.decode(data).map_err(|_| invalid())?
        }
    };

    let format = image::guess_format(&bytes).map_err(|_| invalid())?;
    let extension = match format {
        ImageFormat::Jpeg => "jpg",
        ImageFormat::Png => "png",
        _ => return Err(invalid()),
    };
    image::load_from_memory_with_format(&bytes, format).map_err(|_| invalid())?;

    Ok(CoverImage { bytes, extension })
}

/// JSON body of a copy write
#[derive(Debug, Default, Deserialize)]
pub struct BookCopyJson {
    pub book: Option<String>,
    pub date_published: Option<String>,
    pub publisher: Option<String>,
    /// Base64 image; an explicit `null` removes the cover
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub cover: Option<Option<String>>,
}

/// Copy write payload, whichever encoding it came in
#[derive(Debug, Default)]
pub struct BookCopyWrite {
    pub book: Option<String>,
    pub date_published: Option<String>,
    pub publisher: Option<String>,
    pub cover: Option<Option<CoverSource>>,
}

impl From<BookCopyJson> for BookCopyWrite {
    fn from(json: BookCopyJson) -> Self {
        BookCopyWrite {
            book: json.book,
            date_published: json.date_published,
            publisher: json.publisher,
            cover: json.cover.map(|c| c.map(CoverSource::Base64)),
        }
    }
}

/// Cover part of a checked write: `None` keeps, `Some(None)` clears
pub type CoverChange = Option<Option<CoverImage>>;

struct Checked {
    book: Option<Uuid>,
    date_published: Option<NaiveDate>,
    publisher: Option<String>,
    cover: CoverChange,
}

impl BookCopyWrite {
    fn check(self, partial: bool) -> Result<Checked, DomainError> {
        let mut errors = FieldErrors::new();

        let (book, date_published, publisher) = if partial {
            (self.book, self.date_published, self.publisher)
        } else {
            (
                required(&mut errors, "book", self.book),
                required(&mut errors, "date_published", self.date_published),
                required(&mut errors, "publisher", self.publisher),
            )
        };

        let date_published = date_published.and_then(|raw| {
            match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.add("date_published", INVALID_DATE);
                    None
                }
            }
        });
        let publisher = not_blank(&mut errors, "publisher", publisher.map(trimmed));
        let cover = match self.cover {
            Some(Some(source)) => match decode_cover(source) {
                Ok(image) => Some(Some(image)),
                Err(e) => {
                    errors.extend(e);
                    None
                }
            },
            Some(None) => Some(None),
            None => None,
        };

        if !errors.is_empty() {
            return Err(errors.into());
        }

        // An id that cannot be parsed cannot exist either
        let book = book
            .map(|raw| Uuid::parse_str(raw.trim()).map_err(|_| DomainError::ReferenceNotFound("Book")))
            .transpose()?;

        Ok(Checked {
            book,
            date_published,
            publisher,
            cover,
        })
    }

    /// Body of a create; the stored cover name is filled in by the caller
    pub fn into_new(self) -> Result<(NewBookCopy, CoverChange), DomainError> {
        let checked = self.check(false)?;
        let (Some(book), Some(date_published), Some(publisher)) =
            (checked.book, checked.date_published, checked.publisher)
        else {
            return Err(FieldErrors::single("book", REQUIRED).into());
        };
        Ok((
            NewBookCopy {
                book,
                date_published,
                publisher,
                cover: None,
            },
            checked.cover,
        ))
    }

    /// Body of an update; `partial` lifts the required-field checks
    pub fn into_changes(self, partial: bool) -> Result<(BookCopyChanges, CoverChange), DomainError> {
        let checked = self.check(partial)?;
        Ok((
            BookCopyChanges {
                book: checked.book,
                date_published: checked.date_published,
                publisher: checked.publisher,
                cover: None,
            },
            checked.cover,
        ))
    }
}

#[derive(Debug, Serialize)]
pub struct BookCopyRead {
    pub url: String,
    pub id: Uuid,
    pub book: Field<Uuid, BookRead>,
    pub date_published: NaiveDate,
    pub publisher: Field<String, PublisherRead>,
    pub cover: Option<String>,
}

impl BookCopyRead {
    /// `book` is only used when the expansion asks for it
    pub fn new(copy: BookCopy, book: Option<Book>, media: &MediaStorage, expand: &Expand) -> Self {
        let book = match book {
            Some(book) if expand.has("book") => {
                Field::Expanded(BookRead::new(book, &expand.nested("book")))
            }
            _ => Field::Reference(copy.book_id),
        };
        let publisher = if expand.has("publisher") {
            Field::Expanded(copy.publisher.into())
        } else {
            Field::Reference(copy.publisher.name)
        };

        BookCopyRead {
            url: resource_url("book_copies", copy.id),
            id: copy.id,
            book,
            date_published: copy.date_published,
            publisher,
            cover: copy.cover.as_deref().map(|name| media.url(name)),
        }
    }
}
