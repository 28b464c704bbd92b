//! Authentication Models
//! Mission: Define user and token data structures for the API

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// User account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub is_active: bool,
    pub is_staff: bool,
}

/// JWT Claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // subject (username)
    pub exp: usize,  // expiration timestamp
}

/// Access + refresh token pair returned by login and refresh
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub token_type: String, // always "bearer"
    pub access_token: String,
    pub refresh_token: String,
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Signup request body
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

/// User response (sanitized)
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub username: String,
    pub email: String,
}

impl UserSummary {
    pub fn from_user(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

/// Signup response
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub detail: String,
    pub user: UserSummary,
    pub date_time: String,
}

/// Login and refresh response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub detail: String,
    pub date_time: String,
    pub token: TokenPair,
}

/// Greeting response for the hello endpoints
#[derive(Debug, Serialize)]
pub struct GreetingResponse {
    pub message: String,
    pub date_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

/// Timestamp string used in response bodies.
pub fn response_timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
