//! Role-gated domain actions.
//!
//! Every action follows the same shape: validate input before touching the
//! database, resolve the caller's role profile, mutate only rows the caller
//! owns, then derive one semantic event and its recipients and hand them to
//! a `NotificationSink`. Delivery is best-effort and never fails the action.

pub mod appointments;
pub mod recipients;
pub mod submissions;

use rusqlite::Connection;
use thiserror::Error;

use crate::authorization::{self, AuthError, Principal};
use crate::db::{self, DatabaseError};
use crate::models::enums::Role;

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: String, id: String },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Cannot move {entity} {id} from {from} to {to}")]
    InvalidTransition {
        entity: &'static str,
        id: i64,
        from: String,
        to: String,
    },

    #[error(transparent)]
    Database(DatabaseError),
}

impl From<DatabaseError> for WorkflowError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity_type, id } => Self::NotFound {
                entity: entity_type,
                id,
            },
            DatabaseError::ConstraintViolation(msg) => Self::Validation(msg),
            other => Self::Database(other),
        }
    }
}

impl From<AuthError> for WorkflowError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Database(e) => e.into(),
            other => Self::Forbidden(other.to_string()),
        }
    }
}

impl WorkflowError {
    pub(crate) fn not_found(entity: &str, id: i64) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }
}

/// A patient, doctor or lab acting through its role profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i64,
    pub profile_id: i64,
    pub role: Role,
    pub name: String,
}

/// Check the caller holds `required` and load its active profile.
///
/// The stored role is checked as well as the token's, so an admin role
/// change or deactivation takes effect before the token expires.
pub fn resolve_actor(
    conn: &Connection,
    principal: &Principal,
    required: Role,
) -> Result<Actor, WorkflowError> {
    authorization::authorize(principal, required)?;

    let user = match db::get_user(conn, principal.user_id) {
        Ok(user) => user,
        Err(DatabaseError::NotFound { .. }) => {
            return Err(WorkflowError::Forbidden("account no longer exists".into()))
        }
        Err(e) => return Err(e.into()),
    };
    if !user.is_active {
        return Err(WorkflowError::Forbidden("account is deactivated".into()));
    }
    if user.role != required {
        return Err(WorkflowError::Forbidden(format!("account role is now {}", user.role)));
    }

    let profile_id = db::profile_id_for(conn, user.id, required)?
        .ok_or_else(|| WorkflowError::Forbidden(format!("no {required} profile for this account")))?;

    Ok(Actor {
        user_id: user.id,
        profile_id,
        role: required,
        name: user.name,
    })
}

/// Trimmed, non-empty text field.
pub(crate) fn required_text(field: &str, value: &str) -> Result<String, WorkflowError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(WorkflowError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Blank optional text is treated as absent.
pub(crate) fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Shared seeding helpers for workflow and API tests.

    use rusqlite::Connection;

    use super::*;
    use crate::models::{NewAccount, ProfileDetails};

    pub fn account(conn: &Connection, name: &str, profile: ProfileDetails) -> Actor {
        let role = profile.role();
        let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
        let (user_id, profile_id) = db::create_account(
            conn,
            &NewAccount {
                name: name.into(),
                email,
                profile,
            },
        )
        .unwrap();
        let profile_id = profile_id.unwrap_or(0);
        if matches!(role, Role::Doctor | Role::Lab) {
            db::verify_profile(conn, role, profile_id, 0).unwrap();
        }
        Actor {
            user_id,
            profile_id,
            role,
            name: name.into(),
        }
    }

    pub fn patient(conn: &Connection, name: &str) -> Actor {
        account(conn, name, ProfileDetails::Patient { date_of_birth: None })
    }

    pub fn doctor(conn: &Connection, name: &str) -> Actor {
        account(
            conn,
            name,
            ProfileDetails::Doctor {
                specialty: "Dermatology".into(),
                clinic_address: None,
            },
        )
    }

    pub fn lab(conn: &Connection, name: &str) -> Actor {
        account(
            conn,
            name,
            ProfileDetails::Lab {
                lab_address: None,
                available_tests: vec!["CBC".into()],
            },
        )
    }

    pub fn notifications_for(conn: &Connection, user_id: i64) -> Vec<crate::models::Notification> {
        crate::notifications::list_notifications(conn, user_id, false, None).unwrap()
    }

    pub fn total_notifications(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM notifications", [], |r| r.get(0))
            .unwrap()
    }
}
