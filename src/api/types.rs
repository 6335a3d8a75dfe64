//! Shared types for the API layer.

use std::sync::Arc;

use axum::extract::{FromRequest, Request};
use axum::Json;
use rusqlite::Connection;
use serde::de::DeserializeOwned;

use crate::api::error::ApiError;
use crate::core_state::CoreState;
use crate::models::enums::Role;

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }

    /// Request-scoped database connection.
    pub fn open_db(&self) -> Result<Connection, ApiError> {
        Ok(self.core.open_db()?)
    }
}

// ═══════════════════════════════════════════════════════════
// Request extensions
// ═══════════════════════════════════════════════════════════

/// Role a route group is mounted for (`/api/{role}s/...`).
/// Injected as an `Extension` on each scoped notification router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleScope(pub Role);

/// Raw bearer credential of the current request. Needed by logout.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// JSON request body whose rejections use the API error envelope
/// (`400 BAD_REQUEST`) instead of axum's plain-text 4xx.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// `{msg}` acknowledgement body.
#[derive(Debug, serde::Serialize)]
pub struct Message {
    pub msg: String,
}

impl Message {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}
