//! Authentication Middleware
//! Mission: Resolve bearer tokens to live user records on every protected request

use crate::auth::api::AuthState;
use crate::auth::jwt::TokenError;
use crate::auth::models::User;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Middleware guarding the protected routes.
///
/// Extracts the bearer token, resolves its subject, and loads the matching
/// user record. Handlers behind this layer read the resolved [`User`] from
/// request extensions. Any failure short-circuits before the handler runs.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = extract_token(req.headers()).ok_or(AuthError::MissingToken)?;

    let subject = state.tokens.resolve(&token).map_err(|err| match err {
        TokenError::Expired => AuthError::TokenExpired,
        TokenError::Invalid => AuthError::TokenInvalid,
    })?;

    let user = state
        .user_store
        .find_by_username(&subject)
        .map_err(AuthError::Internal)?
        .ok_or(AuthError::UnknownUser)?;

    if !user.is_active {
        return Err(AuthError::InactiveUser);
    }

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Pull the bearer token out of the request headers.
///
/// Clients send the raw `token` header; a standard `Authorization: Bearer`
/// header is accepted as well.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get("token") {
        if let Ok(raw) = value.to_str() {
            return Some(raw.trim().to_string());
        }
    }

    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
}

/// Role gate for staff-only endpoints, checked explicitly by handlers after
/// authentication.
pub fn require_staff(user: &User) -> Result<(), AuthError> {
    if user.is_staff {
        Ok(())
    } else {
        Err(AuthError::NotStaff)
    }
}

/// Auth failures raised before any handler logic runs.
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    TokenExpired,
    TokenInvalid,
    UnknownUser,
    InactiveUser,
    NotStaff,
    Internal(anyhow::Error),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthError::MissingToken => {
                (StatusCode::UNAUTHORIZED, "Missing authentication token")
            }
            AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token has expired"),
            AuthError::TokenInvalid => {
                (StatusCode::UNAUTHORIZED, "Could not validate credentials")
            }
            AuthError::UnknownUser => (StatusCode::UNAUTHORIZED, "User not found."),
            AuthError::InactiveUser => (StatusCode::UNAUTHORIZED, "User account is inactive"),
            AuthError::NotStaff => (StatusCode::FORBIDDEN, "You are not a superuser."),
            AuthError::Internal(err) => {
                error!("Auth middleware database error: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, Json(json!({ "detail": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn test_user(is_staff: bool) -> User {
        User {
            id: 1,
            username: "testuser".to_string(),
            email: "t@x.com".to_string(),
            password_hash: "hash".to_string(),
            is_active: true,
            is_staff,
        }
    }

    #[test]
    fn test_extract_raw_token_header() {
        let mut headers = HeaderMap::new();
        headers.insert("token", HeaderValue::from_static("abc.def.ghi"));
        assert_eq!(extract_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_extract_bearer_authorization() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Authorization",
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );
        assert_eq!(extract_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_raw_token_header_wins() {
        let mut headers = HeaderMap::new();
        headers.insert("token", HeaderValue::from_static("raw-token"));
        headers.insert(
            "Authorization",
            HeaderValue::from_static("Bearer bearer-token"),
        );
        assert_eq!(extract_token(&headers).unwrap(), "raw-token");
    }

    #[test]
    fn test_no_token_extracted() {
        let headers = HeaderMap::new();
        assert!(extract_token(&headers).is_none());

        // Authorization without the Bearer scheme is not a token carrier
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Basic abc"));
        assert!(extract_token(&headers).is_none());
    }

    #[test]
    fn test_require_staff() {
        assert!(require_staff(&test_user(true)).is_ok());
        assert!(matches!(
            require_staff(&test_user(false)),
            Err(AuthError::NotStaff)
        ));
    }

    #[test]
    fn test_auth_error_responses() {
        let missing = AuthError::MissingToken.into_response();
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

        let expired = AuthError::TokenExpired.into_response();
        assert_eq!(expired.status(), StatusCode::UNAUTHORIZED);

        let invalid = AuthError::TokenInvalid.into_response();
        assert_eq!(invalid.status(), StatusCode::UNAUTHORIZED);

        let not_staff = AuthError::NotStaff.into_response();
        assert_eq!(not_staff.status(), StatusCode::FORBIDDEN);

        let internal = AuthError::Internal(anyhow::anyhow!("boom")).into_response();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
