//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use livestock_core::{PortError, ServiceError};
use std::sync::Arc;
use tracing::{error, warn};
use uuid::Uuid;

use crate::error::HttpError;
use crate::web::state::AppState;

/// The caller's identity, inserted by `require_auth`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub Uuid);

/// Reads the session token from `Authorization: Bearer` or the `session` cookie.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|c| c.trim().strip_prefix("session="))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Middleware that validates the session token and records the caller.
///
/// If valid, inserts an `AuthenticatedUser` into the request extensions.
/// Otherwise the request ends here with 401 and no store lookup for the route runs.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, HttpError> {
    let locale = state.config.locales.resolve(req.headers(), req.uri());
    let unauthorized = || state.http_error(ServiceError::NotAuthorized, locale);

    let token = session_token(req.headers()).ok_or_else(|| {
        warn!(path = %req.uri().path(), "Request without a session token.");
        unauthorized()
    })?;

    let user_id = state
        .accounts
        .validate_auth_session(&token)
        .await
        .map_err(|e| {
            match e {
                PortError::Unauthorized => warn!("Rejected an invalid or expired session."),
                other => error!(error = %other, "Failed to validate auth session."),
            }
            unauthorized()
        })?;

    req.extensions_mut().insert(AuthenticatedUser(user_id));
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert(header::COOKIE, HeaderValue::from_static("session=xyz"));
        assert_eq!(session_token(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn session_cookie_is_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("i18next=hi; session=xyz; theme=dark"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn missing_or_empty_token_is_none() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_token(&headers), None);
        headers.insert(header::COOKIE, HeaderValue::from_static("session="));
        assert_eq!(session_token(&headers), None);
    }
}
