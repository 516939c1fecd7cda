//! Domain layer - Pure business abstractions
//!
//! This layer contains NO framework dependencies (no SeaORM, no Axum).
//! Only records, trait definitions, the permission rule and domain error types.

pub mod errors;
pub mod permissions;
pub mod repositories;

pub use errors::{DomainError, FieldErrors};
pub use permissions::{Access, Identity, PermissionPolicy, StaffOrReadOnly};
pub use repositories::*;
