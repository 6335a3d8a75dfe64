//! Account endpoints shared by every role.

use axum::extract::State;
use axum::{Extension, Json};
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, BearerToken, Message};
use crate::authorization::{self, Principal};
use crate::db;
use crate::models::User;

#[derive(Serialize)]
pub struct MeResponse {
    #[serde(flatten)]
    pub user: User,
    pub profile_id: Option<i64>,
}

/// `GET /api/users/me`
pub async fn me(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<MeResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let user = match db::get_user(&conn, principal.user_id) {
        Ok(user) => user,
        Err(db::DatabaseError::NotFound { .. }) => {
            return Err(ApiError::NotFound("User not found".into()))
        }
        Err(e) => return Err(e.into()),
    };
    let profile_id = db::profile_id_for(&conn, user.id, user.role)?;
    Ok(Json(MeResponse { user, profile_id }))
}

/// `POST /api/users/logout`: revoke the presented credential.
pub async fn logout(
    State(ctx): State<ApiContext>,
    Extension(token): Extension<BearerToken>,
) -> Result<Json<Message>, ApiError> {
    let conn = ctx.open_db()?;
    authorization::revoke(&conn, ctx.core.jwt_secret(), &token.0)?;
    Ok(Json(Message::new("Logged out")))
}
