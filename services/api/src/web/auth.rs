//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for user signup, login, and logout.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{Duration, Utc};
use livestock_core::{PortError, ServiceError, User};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::HttpError;
use crate::i18n::MessageKey;
use crate::web::extract::ApiJson;
use crate::web::locale::RequestLocale;
use crate::web::middleware::session_token;
use crate::web::state::AppState;

const MIN_PASSWORD_LEN: usize = 6;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    /// Opaque session token; send it back as `Authorization: Bearer <token>`.
    pub token: String,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

//=========================================================================================
// Session Helpers
//=========================================================================================

/// Creates a session for `user` and builds the response with its cookie.
async fn open_session(
    state: &AppState,
    locale: RequestLocale,
    user: User,
    status: StatusCode,
) -> Result<impl IntoResponse, HttpError> {
    let token = Uuid::new_v4().to_string();
    let lifetime = Duration::days(state.config.auth_session_days);

    state
        .accounts
        .create_auth_session(&token, user.user_id, Utc::now() + lifetime)
        .await
        .map_err(|e| {
            error!(user_id = %user.user_id, error = %e, "Failed to create auth session.");
            state
                .http_error(ServiceError::from_store(e), locale.0)
                .with_message(MessageKey::ServerError)
        })?;

    let cookie = format!(
        "session={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        token,
        lifetime.num_seconds()
    );
    let response = AuthResponse {
        user_id: user.user_id,
        name: user.name,
        email: user.email,
        token,
    };
    Ok((status, [(header::SET_COOKIE, cookie)], Json(response)))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/auth/signup - Create a new user account
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created successfully", body = AuthResponse),
        (status = 400, description = "Invalid request or email already registered"),
        (status = 500, description = "Internal server error")
    ),
    tag = "auth"
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    locale: RequestLocale,
    ApiJson(req): ApiJson<SignupRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let name = req.name.trim();
    let email = normalize_email(&req.email);
    if name.is_empty() || !email.contains('@') || req.password.len() < MIN_PASSWORD_LEN {
        return Err(state.http_error(
            ServiceError::Validation(format!(
                "name, a valid email and a password of at least {} characters are required",
                MIN_PASSWORD_LEN
            )),
            locale.0,
        ));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            state
                .http_error(ServiceError::Persistence(e.to_string()), locale.0)
                .with_message(MessageKey::ServerError)
        })?
        .to_string();

    let user = state
        .accounts
        .create_user(name, &email, &password_hash)
        .await
        .map_err(|e| {
            let message = match e {
                PortError::Conflict(_) => MessageKey::UserExists,
                _ => MessageKey::ServerError,
            };
            state
                .http_error(ServiceError::from_store(e), locale.0)
                .with_message(message)
        })?;

    info!(user_id = %user.user_id, "User signed up.");
    open_session(&state, locale, user, StatusCode::CREATED).await
}

/// POST /api/auth/login - Login with existing account
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    locale: RequestLocale,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let invalid = || {
        state
            .http_error(ServiceError::NotAuthorized, locale.0)
            .with_message(MessageKey::InvalidCredentials)
    };

    let creds = match state.accounts.get_user_by_email(&normalize_email(&req.email)).await {
        Ok(creds) => creds,
        Err(PortError::NotFound(_)) => {
            warn!("Login attempt for an unknown email.");
            return Err(invalid());
        }
        Err(e) => {
            error!(error = %e, "Failed to look up user.");
            return Err(state
                .http_error(ServiceError::from_store(e), locale.0)
                .with_message(MessageKey::ServerError));
        }
    };

    let parsed_hash = PasswordHash::new(&creds.hashed_password).map_err(|e| {
        error!(user_id = %creds.user.user_id, "Failed to parse password hash: {:?}", e);
        state
            .http_error(ServiceError::Persistence(e.to_string()), locale.0)
            .with_message(MessageKey::ServerError)
    })?;

    if Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        warn!(user_id = %creds.user.user_id, "Login with a wrong password.");
        return Err(invalid());
    }

    open_session(&state, locale, creds.user, StatusCode::OK).await
}

/// POST /api/auth/logout - Logout and invalidate session
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "No active session")
    ),
    tag = "auth"
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    locale: RequestLocale,
    headers: HeaderMap,
) -> Result<impl IntoResponse, HttpError> {
    let token = session_token(&headers)
        .ok_or_else(|| state.http_error(ServiceError::NotAuthorized, locale.0))?;

    state
        .accounts
        .delete_auth_session(&token)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to delete auth session.");
            state
                .http_error(ServiceError::from_store(e), locale.0)
                .with_message(MessageKey::ServerError)
        })?;

    let cookie = "session=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0";
    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie.to_string())]))
}
