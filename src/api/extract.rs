//! Request extractors that answer with [`ApiError`] bodies

use std::str::FromStr;

use axum::async_trait;
use axum::extract::multipart::MultipartError;
use axum::extract::{FromRequest, FromRequestParts, Multipart, Path, Query, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use serde::de::DeserializeOwned;
use serde_path_to_error::Segment;

use super::error::ApiError;
use crate::domain::{DomainError, FieldErrors};
use crate::serializers::book_copy::{BookCopyJson, BookCopyWrite, CoverSource};

pub const NON_FIELD_ERRORS: &str = "non_field_errors";
pub const TOO_LARGE: &str = "Request body is too large.";

fn rejected(status: StatusCode, message: String) -> ApiError {
    let message = if status == StatusCode::PAYLOAD_TOO_LARGE {
        TOO_LARGE.to_string()
    } else {
        message
    };
    ApiError::Rejected { status, message }
}

/// Client-facing name of the JSON type serde reported
fn json_type_name(unexpected: &str) -> &str {
    match unexpected.split_whitespace().next().unwrap_or_default() {
        "string" => "str",
        "integer" => "int",
        "floating" => "float",
        "boolean" => "bool",
        "map" => "dict",
        "sequence" => "list",
        "unit" => "NoneType",
        other => other,
    }
}

fn not_a_dictionary(got: &str) -> FieldErrors {
    FieldErrors::single(
        NON_FIELD_ERRORS,
        format!("Invalid data. Expected a dictionary, but got {}.", got),
    )
}

/// Turns a typed deserialization failure into an error on the offending field
fn field_error(error: serde_path_to_error::Error<serde_json::Error>) -> FieldErrors {
    let field = match error.path().iter().next() {
        Some(Segment::Map { key }) => Some(key.clone()),
        _ => None,
    };
    let message = error.into_inner().to_string();

    let Some((got, expected)) = message
        .strip_prefix("invalid type: ")
        .and_then(|rest| rest.rsplit_once(", expected "))
    else {
        return FieldErrors::single(field.as_deref().unwrap_or(NON_FIELD_ERRORS), message);
    };
    let got = json_type_name(got);

    match field {
        None => not_a_dictionary(got),
        Some(field) if expected.contains("sequence") => FieldErrors::single(
            &field,
            format!("Expected a list of items but got type \"{}\".", got),
        ),
        Some(field) if expected.contains("string") => {
            FieldErrors::single(&field, "Not a valid string.")
        }
        Some(field) => FieldErrors::single(&field, format!("Invalid value, expected {}.", expected)),
    }
}

/// JSON object body; type mismatches become per-field validation errors
pub struct Payload<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<serde_json::Value>::from_request(req, state)
            .await
            .map_err(|rejection| rejected(rejection.status(), rejection.body_text()))?;

        // Derived structs would also accept a positional array
        let got = match &value {
            serde_json::Value::Object(_) => None,
            serde_json::Value::Array(_) => Some("list"),
            serde_json::Value::String(_) => Some("str"),
            serde_json::Value::Number(n) if n.is_f64() => Some("float"),
            serde_json::Value::Number(_) => Some("int"),
            serde_json::Value::Bool(_) => Some("bool"),
            serde_json::Value::Null => Some("NoneType"),
        };
        if let Some(got) = got {
            return Err(not_a_dictionary(got).into());
        }

        serde_path_to_error::deserialize(value)
            .map(Payload)
            .map_err(|e| field_error(e).into())
    }
}

/// Query string
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        Ok(QueryParams(value))
    }
}

/// Path id; a value that does not parse cannot name an existing record
pub struct IdPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for IdPath<T>
where
    S: Send + Sync,
    T: FromStr,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Domain(DomainError::NotFound))?;
        raw.parse()
            .map(IdPath)
            .map_err(|_| ApiError::Domain(DomainError::NotFound))
    }
}

/// Book copy body, as JSON or as `multipart/form-data`
pub struct BookCopyForm(pub BookCopyWrite);

#[async_trait]
impl<S> FromRequest<S> for BookCopyForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("multipart/form-data"));

        if !is_multipart {
            let Payload(json) = Payload::<BookCopyJson>::from_request(req, state).await?;
            return Ok(BookCopyForm(json.into()));
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|rejection| rejected(rejection.status(), rejection.body_text()))?;

        let malformed = |e: MultipartError| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                rejected(StatusCode::PAYLOAD_TOO_LARGE, e.body_text())
            } else {
                ApiError::bad_request(format!("Multipart form parse error - {}", e))
            }
        };

        let mut write = BookCopyWrite::default();
        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            match name.as_str() {
                "book" => write.book = Some(field.text().await.map_err(malformed)?),
                "date_published" => {
                    write.date_published = Some(field.text().await.map_err(malformed)?)
                }
                "publisher" => write.publisher = Some(field.text().await.map_err(malformed)?),
                "cover" => {
                    // File parts carry raw bytes, plain parts base64 text
                    let source = if field.file_name().is_some() {
                        let bytes = field.bytes().await.map_err(malformed)?;
                        (!bytes.is_empty()).then(|| CoverSource::Upload(bytes.to_vec()))
                    } else {
                        let text = field.text().await.map_err(malformed)?;
                        (!text.trim().is_empty()).then_some(CoverSource::Base64(text))
                    };
                    write.cover = Some(source);
                }
                _ => {}
            }
        }

        Ok(BookCopyForm(write))
    }
}
