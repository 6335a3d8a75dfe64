//! Submission endpoints.
//!
//! - `POST /api/patients/submissions`: upload an image reference
//! - `GET /api/patients/my-submissions`
//! - `POST /api/patients/submissions/:id/feedback-request`
//! - `PUT /api/doctors/submissions/:id/feedback`
//! - `POST /api/doctors/submissions/:id/feedback-request`

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use super::actor;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson, Message};
use crate::authorization::Principal;
use crate::models::enums::Role;
use crate::models::Submission;
use crate::notifications::StoreSink;
use crate::workflow::submissions;

#[derive(Debug, Deserialize)]
pub struct CreateSubmission {
    pub image_ref: String,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackBody {
    pub feedback: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedbackRequestBody {
    pub doctor_id: Option<i64>,
}

#[derive(Serialize)]
pub struct FeedbackRequestResponse {
    pub msg: String,
    pub notified: usize,
}

pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
    ApiJson(body): ApiJson<CreateSubmission>,
) -> Result<(StatusCode, Json<Submission>), ApiError> {
    let conn = ctx.open_db()?;
    let patient = actor(&conn, &principal, Role::Patient)?;
    let submission = submissions::create_submission(
        &conn,
        &StoreSink::new(&conn),
        ctx.core.classifier(),
        &patient,
        &body.image_ref,
    )?;
    Ok((StatusCode::CREATED, Json(submission)))
}

pub async fn list_mine(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<Submission>>, ApiError> {
    let conn = ctx.open_db()?;
    let patient = actor(&conn, &principal, Role::Patient)?;
    Ok(Json(submissions::list_submissions(&conn, &patient)?))
}

/// Body is optional: an absent or empty body asks every linked doctor.
pub async fn request_doctor_feedback(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
    body: Option<ApiJson<FeedbackRequestBody>>,
) -> Result<Json<FeedbackRequestResponse>, ApiError> {
    let doctor_id = body.and_then(|ApiJson(b)| b.doctor_id);
    let conn = ctx.open_db()?;
    let patient = actor(&conn, &principal, Role::Patient)?;
    let notified =
        submissions::request_doctor_feedback(&conn, &StoreSink::new(&conn), &patient, id, doctor_id)?;
    Ok(Json(FeedbackRequestResponse {
        msg: "Feedback requested".into(),
        notified,
    }))
}

pub async fn write_feedback(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<FeedbackBody>,
) -> Result<Json<Submission>, ApiError> {
    let conn = ctx.open_db()?;
    let doctor = actor(&conn, &principal, Role::Doctor)?;
    let submission =
        submissions::write_feedback(&conn, &StoreSink::new(&conn), &doctor, id, &body.feedback)?;
    Ok(Json(submission))
}

pub async fn request_patient_feedback(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> Result<Json<Message>, ApiError> {
    let conn = ctx.open_db()?;
    let doctor = actor(&conn, &principal, Role::Doctor)?;
    submissions::request_patient_feedback(&conn, &StoreSink::new(&conn), &doctor, id)?;
    Ok(Json(Message::new("Feedback requested")))
}
