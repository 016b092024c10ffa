//! Caller identity.
//!
//! The user id is opaque and issued elsewhere; it arrives in the `userId`
//! cookie or, for non-browser clients, the `x-user-id` header.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use axum::http::request::Parts;

use crate::error::ServerError;

pub const USER_COOKIE: &str = "userId";
pub const USER_HEADER: &str = "x-user-id";

/// Extractor that rejects the request with 401 when no user id is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(pub String);

impl<S: Send + Sync> FromRequestParts<S> for UserId {
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        user_id(&parts.headers)
            .map(UserId)
            .ok_or(ServerError::Unauthorized)
    }
}

fn user_id(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == USER_COOKIE)
        .map(|(_, value)| value.trim().to_owned());

    from_cookie
        .or_else(|| {
            headers
                .get(USER_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim().to_owned())
        })
        .filter(|id| !id.is_empty())
}
