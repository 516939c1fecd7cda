use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use super::error::ApiError;
use crate::domain::Access;
use crate::infrastructure::AppState;
use crate::infrastructure::auth::identity_from_headers;

/// Runs the configured permission policy before the handler sees the body.
pub async fn enforce_permission(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = identity_from_headers(req.headers(), &state.settings.jwt_secret)?;
    let access = if req.method().is_safe() {
        Access::Read
    } else {
        Access::Write
    };

    if !state.permissions.has_permission(access, identity.as_ref()) {
        tracing::debug!(
            "Denied {} {} to {}",
            req.method(),
            req.uri().path(),
            identity.as_ref().map_or("anonymous", |i| i.subject.as_str())
        );
        return Err(ApiError::PermissionDenied);
    }

    if let Some(identity) = identity {
        req.extensions_mut().insert(identity);
    }
    Ok(next.run(req).await)
}
