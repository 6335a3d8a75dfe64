//! Appointment endpoints.
//!
//! - `POST /api/patients/appointments`: book with a verified doctor or lab
//! - `GET /api/{patients,doctors}/my-appointments`, `GET /api/labs/appointments`
//! - `PUT /api/doctors/appointments/:id/status`, `PUT /api/labs/appointments/:id`

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use super::actor;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson, RoleScope};
use crate::authorization::Principal;
use crate::models::enums::Role;
use crate::models::{Appointment, AppointmentView};
use crate::notifications::StoreSink;
use crate::workflow::appointments::{self, BookingRequest, StatusUpdate};

pub async fn book(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
    ApiJson(request): ApiJson<BookingRequest>,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    let conn = ctx.open_db()?;
    let patient = actor(&conn, &principal, Role::Patient)?;
    let appointment = appointments::book_appointment(&conn, &StoreSink::new(&conn), &patient, &request)?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

pub async fn list_mine(
    State(ctx): State<ApiContext>,
    Extension(scope): Extension<RoleScope>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<AppointmentView>>, ApiError> {
    let conn = ctx.open_db()?;
    let me = actor(&conn, &principal, scope.0)?;
    Ok(Json(appointments::list_appointments(&conn, &me)?))
}

/// Provider status/notes update; the scope decides doctor or lab rules.
pub async fn update_status(
    State(ctx): State<ApiContext>,
    Extension(scope): Extension<RoleScope>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
    ApiJson(update): ApiJson<StatusUpdate>,
) -> Result<Json<Appointment>, ApiError> {
    let conn = ctx.open_db()?;
    let provider = actor(&conn, &principal, scope.0)?;
    let appointment =
        appointments::update_appointment(&conn, &StoreSink::new(&conn), &provider, id, &update)?;
    Ok(Json(appointment))
}
