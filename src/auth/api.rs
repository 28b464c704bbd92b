//! Authentication API Endpoints
//! Mission: Signup, login, and token refresh handlers

use crate::auth::{
    jwt::TokenService,
    models::{
        response_timestamp, GreetingResponse, LoginRequest, SignupRequest, SignupResponse,
        TokenResponse, User, UserSummary,
    },
    password::{hash_password, verify_password},
    user_store::{UserStore, UserStoreError},
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub user_store: Arc<UserStore>,
    pub tokens: Arc<TokenService>,
}

/// Signup endpoint - POST /auth/signup
pub async fn signup(
    State(state): State<AuthState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), AuthApiError> {
    let password_hash = hash_password(&payload.password)?;

    let user = state
        .user_store
        .create(&payload.username, &payload.email, &password_hash)?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            detail: format!("User created successfully, user ID {}!", user.id),
            user: UserSummary::from_user(&user),
            date_time: response_timestamp(),
        }),
    ))
}

/// Login endpoint - POST /auth/login
pub async fn login(
    State(state): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AuthApiError> {
    info!("🔐 Login attempt: {}", payload.username);

    let user = state
        .user_store
        .find_by_username(&payload.username)?
        .ok_or_else(|| {
            warn!("❌ Login with unknown username: {}", payload.username);
            AuthApiError::InvalidUsername
        })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!("❌ Failed login attempt: {}", payload.username);
        return Err(AuthApiError::InvalidPassword);
    }

    let token = state.tokens.issue(&user.username)?;

    info!("✅ Login successful: {}", user.username);

    Ok(Json(TokenResponse {
        detail: "Login successful".to_string(),
        date_time: response_timestamp(),
        token,
    }))
}

/// Hello endpoint - GET /auth/
pub async fn auth_index() -> Json<GreetingResponse> {
    Json(GreetingResponse {
        message: "Hello World".to_string(),
        date_time: response_timestamp(),
        user: None,
    })
}

/// Protected hello endpoint - GET /auth/message
///
/// Returns the greeting plus the user the token resolved to.
pub async fn auth_message(Extension(user): Extension<User>) -> Json<GreetingResponse> {
    Json(GreetingResponse {
        message: "Hello World".to_string(),
        date_time: response_timestamp(),
        user: Some(user.username),
    })
}

/// Token refresh endpoint - GET /auth/refresh
///
/// Any currently valid token re-issues a fresh pair for the same subject;
/// the password is not required again.
pub async fn refresh_token(
    State(state): State<AuthState>,
    Extension(user): Extension<User>,
) -> Result<Json<TokenResponse>, AuthApiError> {
    let token = state.tokens.issue(&user.username)?;

    Ok(Json(TokenResponse {
        detail: "Token is refreshed".to_string(),
        date_time: response_timestamp(),
        token,
    }))
}

/// Auth API errors
#[derive(Debug)]
pub enum AuthApiError {
    DuplicateUsername(String),
    DuplicateEmail(String),
    InvalidUsername,
    InvalidPassword,
    Internal(anyhow::Error),
}

impl From<UserStoreError> for AuthApiError {
    fn from(err: UserStoreError) -> Self {
        match err {
            UserStoreError::DuplicateUsername(name) => AuthApiError::DuplicateUsername(name),
            UserStoreError::DuplicateEmail(email) => AuthApiError::DuplicateEmail(email),
            UserStoreError::Database(err) => AuthApiError::Internal(err),
        }
    }
}

impl From<anyhow::Error> for AuthApiError {
    fn from(err: anyhow::Error) -> Self {
        AuthApiError::Internal(err)
    }
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthApiError::DuplicateUsername(name) => (
                StatusCode::BAD_REQUEST,
                format!("Username: {}, already registered", name),
            ),
            AuthApiError::DuplicateEmail(email) => (
                StatusCode::BAD_REQUEST,
                format!("Email ID: {}, already registered", email),
            ),
            AuthApiError::InvalidUsername => {
                (StatusCode::BAD_REQUEST, "Invalid username".to_string())
            }
            AuthApiError::InvalidPassword => {
                (StatusCode::BAD_REQUEST, "Invalid password".to_string())
            }
            AuthApiError::Internal(err) => {
                error!("Auth API error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "detail": message }))).into_response()
    }
}
