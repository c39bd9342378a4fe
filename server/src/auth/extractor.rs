use crate::api::ErrorResponse;
use crate::AppState;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use foodgram_core::{CurrentUser, IdentityStore};

/// Resolves the caller from the Authorization header.
///
/// A request without the header is anonymous. A header that is present but
/// malformed, or carries an unknown or expired token, is rejected with 401
/// rather than silently downgraded. Both `Bearer <token>` and the legacy
/// `Token <token>` schemes are accepted.
///
/// Handlers that need a signed-in user let the core services enforce it, so
/// anonymous access is reported through the same error path everywhere.
pub struct Viewer(pub CurrentUser);

#[derive(Debug)]
pub enum AuthError {
    InvalidHeader,
    InvalidFormat,
    InvalidToken,
    Unavailable,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::InvalidHeader => (StatusCode::UNAUTHORIZED, "Invalid Authorization header"),
            AuthError::InvalidFormat => (
                StatusCode::UNAUTHORIZED,
                "Invalid Authorization header format",
            ),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
            AuthError::Unavailable => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Could not verify credentials",
            ),
        };

        (
            status,
            Json(ErrorResponse {
                error: message.to_string(),
            }),
        )
            .into_response()
    }
}

fn parse_token(value: &str) -> Option<&str> {
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("Token "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) else {
            return Ok(Viewer(CurrentUser::anonymous()));
        };

        let auth_str = auth_header.to_str().map_err(|_| AuthError::InvalidHeader)?;
        let token = parse_token(auth_str).ok_or(AuthError::InvalidFormat)?;

        let state = AppState::from_ref(state);
        let user = state.store.current_user(Some(token)).map_err(|e| {
            tracing::error!(error = %e, "session lookup failed");
            AuthError::Unavailable
        })?;

        if !user.is_authenticated() {
            return Err(AuthError::InvalidToken);
        }
        Ok(Viewer(user))
    }
}
