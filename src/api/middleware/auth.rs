//! Bearer token authentication middleware.
//!
//! Extracts `Authorization: Bearer <token>`, verifies it through the
//! authorization gate, and injects `Principal` and `BearerToken` into
//! request extensions for downstream handlers.

use axum::http::{header, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, BearerToken};
use crate::authorization::{self, AuthError};

/// Require a valid, unrevoked bearer credential.
///
/// Accesses `ApiContext` from request extensions (injected by Extension layer).
pub async fn require_auth(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_auth_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

fn bearer_token(req: &Request<axum::body::Body>) -> Result<String, AuthError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::Missing)?;
    let token = value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or(AuthError::Malformed)?;
    if token.is_empty() {
        return Err(AuthError::Missing);
    }
    Ok(token.to_string())
}

async fn require_auth_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let token = bearer_token(&req)?;

    let principal = {
        let conn = ctx.open_db()?;
        authorization::authenticate(&conn, ctx.core.jwt_secret(), &token)
    }; // Connection dropped here, before any .await

    let principal = principal.map_err(|e| {
        tracing::debug!(error = %e, path = %req.uri().path(), "Rejected credential");
        ApiError::from(e)
    })?;

    req.extensions_mut().insert(principal);
    req.extensions_mut().insert(BearerToken(token));

    let mut response = next.run(req).await;
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

    Ok(response)
}
