//! API endpoint handlers.
//!
//! Handlers are thin: open a request-scoped connection, resolve the caller,
//! call into `workflow`/`notifications`/`admin`, and map errors.

pub mod admin;
pub mod appointments;
pub mod directory;
pub mod health;
pub mod notifications;
pub mod submissions;
pub mod users;

use rusqlite::Connection;

use crate::api::error::ApiError;
use crate::authorization::Principal;
use crate::models::enums::Role;
use crate::workflow::{self, Actor};

/// Resolve the caller as an active `role` profile.
pub(crate) fn actor(conn: &Connection, principal: &Principal, role: Role) -> Result<Actor, ApiError> {
    Ok(workflow::resolve_actor(conn, principal, role)?)
}
