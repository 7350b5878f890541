//! Bearer JWT 검증. 토큰은 외부 인증 서버가 발급하고, 여기서는 서명과 만료만 확인합니다.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::routes::AppState;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user id
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
}

/// 인증된 사용자. 핸들러 인자로 받으면 토큰 검증이 먼저 실행됩니다.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthError::MissingToken)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidToken)?;

        let claims = verify_access_token(token, &state.jwt_secret)?;
        if claims.sub.trim().is_empty() {
            return Err(AuthError::InvalidToken);
        }

        Ok(AuthUser {
            user_id: claims.sub,
        })
    }
}

#[derive(Debug, PartialEq)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AuthError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "missing_token",
                "Authorization token is required",
            ),
            AuthError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "invalid_token",
                "Invalid authorization token",
            ),
            AuthError::ExpiredToken => (
                StatusCode::UNAUTHORIZED,
                "expired_token",
                "Authorization token has expired",
            ),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

pub fn verify_access_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            tracing::debug!("Rejected expired token");
            AuthError::ExpiredToken
        }
        _ => {
            tracing::debug!(error = %e, "Rejected invalid token");
            AuthError::InvalidToken
        }
    })?;

    Ok(token_data.claims)
}

/// 테스트용 토큰 발급
#[cfg(test)]
pub fn create_access_token(
    user_id: &str,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    sign_claims(user_id, secret, chrono::Duration::minutes(15))
}

#[cfg(test)]
fn sign_claims(
    user_id: &str,
    secret: &str,
    ttl: chrono::Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let now = chrono::Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: Some(now.timestamp()),
        exp: (now + ttl).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_token_yields_subject() {
        let token = create_access_token("alice", "s3cret").unwrap();
        let claims = verify_access_token(&token, "s3cret").unwrap();
        assert_eq!(claims.sub, "alice");
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let token = create_access_token("alice", "s3cret").unwrap();
        assert_eq!(verify_access_token(&token, "other").unwrap_err(), AuthError::InvalidToken);
        assert_eq!(verify_access_token("garbage", "s3cret").unwrap_err(), AuthError::InvalidToken);
    }

    #[test]
    fn test_expired_token_is_reported() {
        // beyond the default 60s leeway
        let token = sign_claims("alice", "s3cret", chrono::Duration::minutes(-10)).unwrap();
        assert_eq!(verify_access_token(&token, "s3cret").unwrap_err(), AuthError::ExpiredToken);
    }
}
