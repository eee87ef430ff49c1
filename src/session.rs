//! Stateless session tokens.
//!
//! A login signs a short-lived token carrying the user id and role.
//! Nothing is stored server side, expiry comes from the `exp` claim.
//!
//! TODO: refresh-token rotation, sessions currently just expire.
use cookie::{CookieBuilder, SameSite};
use hyper::header::{HeaderValue, AUTHORIZATION, COOKIE};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context;
use crate::error::AppError;
use crate::users::Role;

pub const COOKIE_NAME: &str = "access_token";
pub const SESSION_MINUTES: i64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    role: Role,
    iat: i64,
    exp: i64,
}

pub fn sign(session: &Session, secret: &str) -> Result<String, AppError> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: session.user_id,
        role: session.role,
        iat: now,
        exp: now + SESSION_MINUTES * 60,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(AppError::unexpected)
}

pub fn verify(token: &str, secret: &str) -> Option<Session> {
    // The default validation checks `exp` with a small leeway.
    let validation = Validation::default();
    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation).ok()?;
    Some(Session {
        user_id: data.claims.sub,
        role: data.claims.role,
    })
}

pub fn token(session: &Session) -> Result<String, AppError> {
    sign(session, context::secret())
}

fn get_cookie(value: &HeaderValue) -> Option<&str> {
    let value = value.to_str().ok()?;
    regex!(r"(?:^|;\s*)access_token=([^;]+)")
        .captures(value)?
        .get(1)
        .map(|m| m.as_str())
}

/// Reads the session from the `access_token` cookie, or from an
/// `Authorization` header for non-browser clients.
pub fn authenticate(req: &hyper::Request<hyper::Body>) -> Result<Session, AppError> {
    let headers = req.headers();
    let token = if let Some(authorization) = headers.get(AUTHORIZATION) {
        let value = authorization.to_str().map_err(|_| AppError::Unauthenticated)?;
        value.strip_prefix("Bearer ").unwrap_or(value)
    } else {
        headers
            .get(COOKIE)
            .and_then(get_cookie)
            .ok_or(AppError::Unauthenticated)?
    };
    verify(token, context::secret()).ok_or(AppError::Unauthenticated)
}

fn build_cookie(token: &str, secure: bool) -> String {
    CookieBuilder::new(COOKIE_NAME, token)
        .same_site(SameSite::Strict)
        .secure(secure)
        .http_only(true)
        .path("/")
        .max_age(time::Duration::minutes(SESSION_MINUTES))
        .finish()
        .to_string()
}

pub fn session_cookie(token: &str) -> String {
    build_cookie(token, !context::debug())
}

pub fn expired_cookie() -> String {
    CookieBuilder::new(COOKIE_NAME, "")
        .http_only(true)
        .path("/")
        .expires(time::OffsetDateTime::now_utc())
        .finish()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "deep in the dungeon";

    fn session() -> Session {
        Session {
            user_id: Uuid::new_v4(),
            role: Role::Standard,
        }
    }

    #[test]
    fn token_round_trip() {
        let session = session();
        let token = sign(&session, SECRET).unwrap();
        let verified = verify(&token, SECRET).unwrap();
        assert_eq!(verified, session);
    }

    #[test]
    fn wrong_secret_fails() {
        let token = sign(&session(), SECRET).unwrap();
        assert!(verify(&token, "another secret").is_none());
    }

    #[test]
    fn tampered_token_fails() {
        let token = sign(&session(), SECRET).unwrap();
        let mut tampered = token.into_bytes();
        let last = tampered.len() - 1;
        tampered[last] = if tampered[last] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(tampered).unwrap();
        assert!(verify(&tampered, SECRET).is_none());
    }

    #[test]
    fn expired_token_fails() {
        // Well past the validation leeway.
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            role: Role::Admin,
            iat: now - 400,
            exp: now - 300,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert!(verify(&token, SECRET).is_none());
    }

    #[test]
    fn cookie_extraction() {
        let value = HeaderValue::from_static("access_token=abc.def.ghi");
        assert_eq!(get_cookie(&value), Some("abc.def.ghi"));
        let value = HeaderValue::from_static("theme=dark; access_token=xyz; lang=en");
        assert_eq!(get_cookie(&value), Some("xyz"));
        let value = HeaderValue::from_static("theme=dark");
        assert_eq!(get_cookie(&value), None);
    }

    #[test]
    fn cookie_attributes() {
        let cookie = build_cookie("sometoken", true);
        assert!(cookie.starts_with("access_token=sometoken"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Max-Age=1200"));
        assert!(cookie.contains("Path=/"));

        let expired = expired_cookie();
        assert!(expired.starts_with("access_token=;"));
        assert!(expired.contains("Expires="));
    }
}
