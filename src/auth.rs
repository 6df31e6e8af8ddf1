//! Bearer-token identity extraction.
//!
//! The identity provider validates the token's signature upstream; this
//! layer only decodes the JWT payload (base64url, unverified) to recover
//! `sub`/`email`, mirroring the trust model in §6 Auth.

use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use base64::Engine;
use serde::Deserialize;

#[derive(Deserialize)]
struct TokenClaims {
    sub: Option<String>,
    email: Option<String>,
}

/// The caller's identity, extracted from a required `Authorization: Bearer`
/// header. Rejects the request with 401 if the header is missing,
/// malformed, or lacks a `sub` claim.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
}

/// Same extraction, but absent/invalid credentials resolve to `None`
/// instead of rejecting — used by the analytics endpoints, whose auth is
/// optional (§4.8).
#[derive(Clone, Debug, Default)]
pub struct OptionalAuthUser(pub Option<AuthUser>);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

fn decode_claims(token: &str) -> Option<TokenClaims> {
    let payload_segment = token.split('.').nth(1)?;
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(payload_segment).ok()?;
    serde_json::from_slice(&bytes).ok()
}

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or((StatusCode::UNAUTHORIZED, "missing bearer token"))?;
        let claims = decode_claims(token).ok_or((StatusCode::UNAUTHORIZED, "malformed token"))?;
        let id = claims.sub.ok_or((StatusCode::UNAUTHORIZED, "token missing sub claim"))?;
        Ok(AuthUser { id, email: claims.email })
    }
}

impl<S: Send + Sync> FromRequestParts<S> for OptionalAuthUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = bearer_token(parts)
            .and_then(decode_claims)
            .and_then(|claims| claims.sub.map(|id| AuthUser { id, email: claims.email }));
        Ok(OptionalAuthUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_token(payload_json: &str) -> String {
        let header = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode("{\"alg\":\"none\"}");
        let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(payload_json);
        format!("{header}.{payload}.sig")
    }

    #[test]
    fn decode_claims_extracts_sub_and_email() {
        let token = make_token(r#"{"sub":"user-1","email":"a@b.com"}"#);
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("user-1"));
        assert_eq!(claims.email.as_deref(), Some("a@b.com"));
    }

    #[test]
    fn decode_claims_none_on_garbage() {
        assert!(decode_claims("not-a-jwt").is_none());
    }
}
