use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{Claims, TokenVerifier};
use crate::error::ApiError;

/// Cookie carrying the identity provider's session token
const SESSION_COOKIE: &str = "__session";

/// Authenticated user context extracted from the session token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
        }
    }
}

/// Rejects requests without a valid session token and injects `AuthUser`
/// into the request extensions for the handlers.
pub async fn jwt_auth_middleware(
    State(verifier): State<Arc<TokenVerifier>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(request.headers()).map_err(|msg| {
        tracing::debug!("Rejecting {} {}: {}", request.method(), request.uri().path(), msg);
        ApiError::unauthorized("Unauthenticated")
    })?;

    let claims = verifier.verify(&token).map_err(|e| {
        tracing::debug!("Rejecting {} {}: {}", request.method(), request.uri().path(), e);
        ApiError::unauthorized("Unauthenticated")
    })?;

    let auth_user = AuthUser::from(claims);
    tracing::debug!("Authenticated {}", auth_user.user_id);
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Token from `Authorization: Bearer <token>`, falling back to the session cookie
fn extract_token(headers: &HeaderMap) -> Result<String, &'static str> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| "Invalid Authorization header format")?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or("Authorization header must use Bearer token format")?
            .trim();
        if token.is_empty() {
            return Err("Empty bearer token");
        }
        return Ok(token.to_string());
    }

    session_cookie(headers).ok_or("Missing session token")
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}
