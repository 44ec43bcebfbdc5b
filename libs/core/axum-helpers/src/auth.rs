//! JWT issuing and verification for staff sessions.
//!
//! Access and refresh tokens are HS256-signed with two separate secrets, so
//! one cannot stand in for the other.

use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use core_config::jwt::JwtConfig;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Access tokens live 30 days, refresh tokens 7.
pub const ACCESS_TOKEN_TTL_HOURS: i64 = 720;
pub const REFRESH_TOKEN_TTL_HOURS: i64 = 168;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authorization header missing or malformed")]
    MissingToken,

    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

/// Claims carried in both token kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    #[serde(rename = "firstname")]
    pub first_name: String,
    #[serde(rename = "lastname")]
    pub last_name: String,
    pub mobile_number: String,
    pub is_active: bool,
    pub exp: i64,
}

/// What the login endpoint hands back.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub token: String,
    #[serde(rename = "refresh")]
    pub refresh_token: String,
}

/// Authenticated staff identity the middleware attaches to each request.
///
/// Handlers read it through `Extension<AuthUser>` to stamp audit columns;
/// `GET /person/me` returns it as-is.
#[derive(Debug, Clone, Serialize)]
pub struct AuthUser {
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub mobile_number: String,
    pub is_active: bool,
}

/// Identity snapshot used to mint tokens.
#[derive(Debug, Clone)]
pub struct TokenUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub mobile_number: String,
    pub is_active: bool,
}

/// Signing and verification keys for both token kinds.
#[derive(Clone)]
pub struct TokenKeys {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
}

impl TokenKeys {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(config.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
        }
    }

    /// Mint an access + refresh token pair for a logged-in user.
    pub fn issue_pair(&self, user: &TokenUser) -> Result<TokenPair, AuthError> {
        let token = self.issue(user, ACCESS_TOKEN_TTL_HOURS, &self.access_encoding)?;
        let refresh_token = self.issue(user, REFRESH_TOKEN_TTL_HOURS, &self.refresh_encoding)?;
        Ok(TokenPair {
            token,
            refresh_token,
        })
    }

    fn issue(
        &self,
        user: &TokenUser,
        ttl_hours: i64,
        key: &EncodingKey,
    ) -> Result<String, AuthError> {
        let claims = Claims {
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            mobile_number: user.mobile_number.clone(),
            is_active: user.is_active,
            exp: (Utc::now() + Duration::hours(ttl_hours)).timestamp(),
        };

        let header = Header {
            alg: jsonwebtoken::Algorithm::HS256,
            ..Default::default()
        };

        Ok(encode(&header, &claims, key)?)
    }

    pub fn verify_access(&self, token: &str) -> Result<Claims, AuthError> {
        Ok(decode::<Claims>(token, &self.access_decoding, &Validation::default())?.claims)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<Claims, AuthError> {
        Ok(decode::<Claims>(token, &self.refresh_decoding, &Validation::default())?.claims)
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn keys() -> TokenKeys {
        TokenKeys::new(&JwtConfig::new(
            "access-secret-access-secret-access-secret",
            "refresh-secret-refresh-secret-refresh-secret",
        ))
    }

    fn user() -> TokenUser {
        TokenUser {
            username: "admin".to_string(),
            first_name: "Бат".to_string(),
            last_name: "Дорж".to_string(),
            mobile_number: "99112233".to_string(),
            is_active: true,
        }
    }

    #[test]
    fn access_token_round_trips() {
        let keys = keys();
        let pair = keys.issue_pair(&user()).unwrap();

        let claims = keys.verify_access(&pair.token).unwrap();
        assert_eq!(claims.username, "admin");
        assert_eq!(claims.first_name, "Бат");
        assert!(claims.is_active);
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn refresh_token_round_trips() {
        let keys = keys();
        let pair = keys.issue_pair(&user()).unwrap();
        let claims = keys.verify_refresh(&pair.refresh_token).unwrap();
        assert_eq!(claims.username, "admin");
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let keys = keys();
        let pair = keys.issue_pair(&user()).unwrap();
        assert!(keys.verify_access(&pair.refresh_token).is_err());
        assert!(keys.verify_refresh(&pair.token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(keys().verify_access("not.a.token").is_err());
    }

    #[test]
    fn bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_err());

        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        assert!(bearer_token(&headers).is_err());
    }

    #[test]
    fn access_ttl_is_longer_than_refresh_ttl() {
        let keys = keys();
        let pair = keys.issue_pair(&user()).unwrap();
        let access = keys.verify_access(&pair.token).unwrap();
        let refresh = keys.verify_refresh(&pair.refresh_token).unwrap();
        assert!(access.exp > refresh.exp);
    }
}
