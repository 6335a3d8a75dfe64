//! Browse endpoints: verified providers for patients, linked patients for doctors.

use axum::extract::State;
use axum::{Extension, Json};

use super::actor;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::authorization::Principal;
use crate::db;
use crate::models::enums::Role;
use crate::models::{DoctorListing, LabListing, LinkedPatient};

/// `GET /api/patients/doctors`
pub async fn doctors(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<DoctorListing>>, ApiError> {
    let conn = ctx.open_db()?;
    actor(&conn, &principal, Role::Patient)?;
    Ok(Json(db::list_verified_doctors(&conn)?))
}

/// `GET /api/patients/labs`
pub async fn labs(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<LabListing>>, ApiError> {
    let conn = ctx.open_db()?;
    actor(&conn, &principal, Role::Patient)?;
    Ok(Json(db::list_verified_labs(&conn)?))
}

/// `GET /api/doctors/patients`
pub async fn linked_patients(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<LinkedPatient>>, ApiError> {
    let conn = ctx.open_db()?;
    let doctor = actor(&conn, &principal, Role::Doctor)?;
    Ok(Json(db::list_linked_patients(&conn, doctor.profile_id)?))
}
