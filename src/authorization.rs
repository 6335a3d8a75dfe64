//! Authorization gate: bearer credential verification, role checks and
//! logout revocation.
//!
//! Credentials are HS256 JWTs issued by the identity service. The gate
//! verifies signature and expiry, then consults the revocation list keyed by
//! the SHA-256 of the raw token. Role checks are exact equality; there is no
//! role hierarchy.

use chrono::{TimeZone, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::db::{self, DatabaseError, TIMESTAMP_FORMAT};
use crate::models::enums::Role;

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No credential presented")]
    Missing,
    #[error("Credential is malformed or has an invalid signature")]
    Malformed,
    #[error("Credential has expired")]
    Expired,
    #[error("Credential has been revoked")]
    Revoked,
    #[error("Role {actual} may not perform this action")]
    Forbidden { actual: Role },
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// JWT payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: i64,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    /// Unique token id so two tokens issued in the same second differ.
    pub jti: String,
}

/// The authenticated caller, resolved once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i64,
    pub role: Role,
}

// ═══════════════════════════════════════════════════════════
// Gate
// ═══════════════════════════════════════════════════════════

/// Hex SHA-256 of a raw bearer token; the only form stored server-side.
pub fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

/// Issue a signed credential. Used by the identity service and tests.
pub fn issue_token(
    secret: &str,
    user_id: i64,
    role: Role,
    ttl: chrono::Duration,
) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        role,
        iat: now,
        exp: now + ttl.num_seconds(),
        jti: Uuid::new_v4().to_string(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::Malformed)
}

fn decode_claims(secret: &str, token: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::default();
    validation.leeway = 0;
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => AuthError::Malformed,
        })
}

/// Verify a credential and resolve the caller.
pub fn authenticate(conn: &Connection, secret: &str, token: &str) -> Result<Principal, AuthError> {
    if token.trim().is_empty() {
        return Err(AuthError::Missing);
    }
    let claims = decode_claims(secret, token)?;
    if db::is_token_revoked(conn, &hash_token(token))? {
        return Err(AuthError::Revoked);
    }
    Ok(Principal {
        user_id: claims.sub,
        role: claims.role,
    })
}

/// Exact role check.
pub fn authorize(principal: &Principal, required: Role) -> Result<(), AuthError> {
    if principal.role == required {
        Ok(())
    } else {
        Err(AuthError::Forbidden {
            actual: principal.role,
        })
    }
}

/// Record the credential as revoked (logout). The stored expiry lets the
/// entry be purged once the token could no longer verify anyway.
pub fn revoke(conn: &Connection, secret: &str, token: &str) -> Result<(), AuthError> {
    let claims = decode_claims(secret, token)?;
    let expires_at = Utc
        .timestamp_opt(claims.exp, 0)
        .single()
        .map(|t| t.format(TIMESTAMP_FORMAT).to_string());
    db::insert_revoked_token(conn, &hash_token(token), expires_at.as_deref())?;
    tracing::info!(user_id = claims.sub, "Credential revoked");
    Ok(())
}
