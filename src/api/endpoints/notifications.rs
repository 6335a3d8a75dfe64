//! Notification inbox endpoints, mounted once per role scope.
//!
//! - `GET /api/{role}s/notifications?unread_only=bool&limit=n`
//! - `GET /api/{role}s/notifications/unread-count`
//! - `PUT /api/{role}s/notifications/:id/read`
//! - `PUT /api/{role}s/notifications/read-all`

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, Message, RoleScope};
use crate::authorization::{self, Principal};
use crate::models::Notification;
use crate::notifications;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<u32>,
}

#[derive(Serialize)]
pub struct CountResponse {
    pub count: i64,
}

#[derive(Serialize)]
pub struct ReadAllResponse {
    pub msg: String,
    pub count: usize,
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(scope): Extension<RoleScope>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    authorization::authorize(&principal, scope.0)?;
    let conn = ctx.open_db()?;
    let items =
        notifications::list_notifications(&conn, principal.user_id, query.unread_only, query.limit)?;
    Ok(Json(items))
}

pub async fn unread_count(
    State(ctx): State<ApiContext>,
    Extension(scope): Extension<RoleScope>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<CountResponse>, ApiError> {
    authorization::authorize(&principal, scope.0)?;
    let conn = ctx.open_db()?;
    let count = notifications::unread_count(&conn, principal.user_id)?;
    Ok(Json(CountResponse { count }))
}

pub async fn mark_read(
    State(ctx): State<ApiContext>,
    Extension(scope): Extension<RoleScope>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> Result<Json<Message>, ApiError> {
    authorization::authorize(&principal, scope.0)?;
    let conn = ctx.open_db()?;
    if !notifications::mark_as_read(&conn, id, principal.user_id)? {
        return Err(ApiError::NotFound("Notification not found".into()));
    }
    Ok(Json(Message::new("Notification marked as read")))
}

pub async fn mark_all_read(
    State(ctx): State<ApiContext>,
    Extension(scope): Extension<RoleScope>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ReadAllResponse>, ApiError> {
    authorization::authorize(&principal, scope.0)?;
    let conn = ctx.open_db()?;
    let count = notifications::mark_all_as_read(&conn, principal.user_id)?;
    Ok(Json(ReadAllResponse {
        msg: "All notifications marked as read".into(),
        count,
    }))
}
