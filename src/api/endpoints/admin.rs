//! Admin endpoints under `/api/admins`.

use axum::extract::{Path, State};
use axum::{Extension, Json};

use crate::admin;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson, Message};
use crate::authorization::Principal;
use crate::models::enums::Role;
use crate::models::{
    Appointment, AppointmentEdit, LabTest, LabTestEdit, PendingVerification, User, UserUpdate,
};

pub async fn pending(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<PendingVerification>>, ApiError> {
    let conn = ctx.open_db()?;
    admin::require_admin(&conn, &principal)?;
    Ok(Json(admin::pending_verifications(&conn)?))
}

async fn verify(ctx: ApiContext, principal: Principal, role: Role, id: i64) -> Result<Json<Message>, ApiError> {
    let conn = ctx.open_db()?;
    let me = admin::require_admin(&conn, &principal)?;
    admin::verify_provider(&conn, &me, role, id)?;
    Ok(Json(Message::new(format!("{role} verified"))))
}

pub async fn verify_doctor(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> Result<Json<Message>, ApiError> {
    verify(ctx, principal, Role::Doctor, id).await
}

pub async fn verify_lab(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> Result<Json<Message>, ApiError> {
    verify(ctx, principal, Role::Lab, id).await
}

pub async fn update_user(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
    ApiJson(update): ApiJson<UserUpdate>,
) -> Result<Json<User>, ApiError> {
    let conn = ctx.open_db()?;
    let me = admin::require_admin(&conn, &principal)?;
    Ok(Json(admin::edit_user(&conn, &me, id, &update)?))
}

/// Soft delete: the account is deactivated, not removed.
pub async fn deactivate_user(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> Result<Json<Message>, ApiError> {
    let conn = ctx.open_db()?;
    let me = admin::require_admin(&conn, &principal)?;
    admin::deactivate_user(&conn, &me, id)?;
    Ok(Json(Message::new("User deactivated")))
}

pub async fn delete_submission(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> Result<Json<Message>, ApiError> {
    let conn = ctx.open_db()?;
    let me = admin::require_admin(&conn, &principal)?;
    admin::delete_submission(&conn, &me, id)?;
    Ok(Json(Message::new("Submission deleted")))
}

pub async fn update_appointment(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
    ApiJson(edit): ApiJson<AppointmentEdit>,
) -> Result<Json<Appointment>, ApiError> {
    let conn = ctx.open_db()?;
    let me = admin::require_admin(&conn, &principal)?;
    Ok(Json(admin::edit_appointment(&conn, &me, id, &edit)?))
}

pub async fn delete_appointment(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> Result<Json<Message>, ApiError> {
    let conn = ctx.open_db()?;
    let me = admin::require_admin(&conn, &principal)?;
    admin::delete_appointment(&conn, &me, id)?;
    Ok(Json(Message::new("Appointment deleted")))
}

pub async fn update_lab_test(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
    ApiJson(edit): ApiJson<LabTestEdit>,
) -> Result<Json<LabTest>, ApiError> {
    let conn = ctx.open_db()?;
    let me = admin::require_admin(&conn, &principal)?;
    Ok(Json(admin::edit_lab_test(&conn, &me, id, &edit)?))
}

pub async fn delete_lab_test(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> Result<Json<Message>, ApiError> {
    let conn = ctx.open_db()?;
    let me = admin::require_admin(&conn, &principal)?;
    admin::delete_lab_test(&conn, &me, id)?;
    Ok(Json(Message::new("Lab test deleted")))
}
