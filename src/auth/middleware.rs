use crate::{error::AppError, AppState};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or(AppError::Unauthorized)?
        .to_str()
        .map_err(|_| AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AppError::Unauthorized)?;

    Ok(token.to_string())
}

/// Resolve the bearer session and attach the caller's
/// [`AuthenticatedProfile`](crate::models::AuthenticatedProfile) to the
/// request extensions.
pub async fn require_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&headers)?;
    let caller = state.auth_service.validate_session(&token).await.map_err(|e| {
        tracing::debug!(error = %e, "session rejected");
        AppError::from(e)
    })?;

    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}
