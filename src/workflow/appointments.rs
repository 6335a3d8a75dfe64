//! Appointment booking and provider status updates.

use rusqlite::Connection;
use serde::Deserialize;

use super::recipients::patient_owner;
use super::{optional_text, required_text, Actor, WorkflowError};
use crate::db;
use crate::models::*;
use crate::notifications::{self, NotificationEvent, NotificationSink, ProviderVoice};

#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    pub doctor_id: Option<i64>,
    pub lab_id: Option<i64>,
    pub appointment_time: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusUpdate {
    pub status: Option<AppointmentStatus>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Statuses from which a provider of `role` may move an appointment to `to`.
/// Empty means the transition is never allowed.
pub fn allowed_from(role: Role, to: AppointmentStatus) -> &'static [AppointmentStatus] {
    use AppointmentStatus::*;
    match (role, to) {
        (Role::Doctor, Confirmed) => &[Pending, Confirmed],
        (Role::Doctor, Cancelled) => &[Pending],
        (Role::Lab, Confirmed) => &[Pending, Confirmed],
        (Role::Lab, Cancelled) => &[Pending, Confirmed],
        (Role::Lab, Completed) => &[Confirmed],
        _ => &[],
    }
}

fn provider_of(actor: &Actor) -> Result<Provider, WorkflowError> {
    match actor.role {
        Role::Doctor => Ok(Provider::Doctor(actor.profile_id)),
        Role::Lab => Ok(Provider::Lab(actor.profile_id)),
        other => Err(WorkflowError::Forbidden(format!("{other} accounts do not own appointments"))),
    }
}

/// Patient books with a verified doctor or lab; the provider is notified.
pub fn book_appointment(
    conn: &Connection,
    sink: &dyn NotificationSink,
    patient: &Actor,
    request: &BookingRequest,
) -> Result<Appointment, WorkflowError> {
    let provider = match (request.doctor_id, request.lab_id) {
        (Some(doctor_id), None) => Provider::Doctor(doctor_id),
        (None, Some(lab_id)) => Provider::Lab(lab_id),
        _ => {
            return Err(WorkflowError::Validation(
                "exactly one of doctor_id or lab_id is required".into(),
            ))
        }
    };
    let appointment_time = required_text("appointment_time", &request.appointment_time)?;
    let notes = optional_text(request.notes.as_deref());

    if !db::is_verified(conn, provider.role(), provider.id())? {
        return Err(WorkflowError::not_found(provider.role().as_str(), provider.id()));
    }

    let appointment = db::insert_appointment(
        conn,
        patient.profile_id,
        provider,
        &appointment_time,
        notes.as_deref(),
    )?;
    tracing::info!(
        appointment_id = appointment.id,
        provider = %provider.role(),
        "Appointment booked"
    );

    notifications::notify_with(sink, || {
        let owner = db::profile_owner(conn, provider.role(), provider.id())?;
        let event = match provider {
            Provider::Doctor(_) => NotificationEvent::AppointmentBooked {
                patient: patient.name.clone(),
                appointment_id: appointment.id,
            },
            Provider::Lab(_) => NotificationEvent::LabAppointmentBooked {
                patient: patient.name.clone(),
                appointment_id: appointment.id,
            },
        };
        Ok((event, vec![owner.user_id]))
    });

    Ok(appointment)
}

/// Provider changes status and/or writes notes on its own appointment.
///
/// The status change is a conditional update, so a concurrent change that
/// wins the race makes this call fail with `InvalidTransition` instead of
/// overwriting it.
pub fn update_appointment(
    conn: &Connection,
    sink: &dyn NotificationSink,
    actor: &Actor,
    appointment_id: i64,
    update: &StatusUpdate,
) -> Result<Appointment, WorkflowError> {
    let provider = provider_of(actor)?;
    let notes = optional_text(update.notes.as_deref());
    if update.status.is_none() && notes.is_none() {
        return Err(WorkflowError::Validation("status or notes is required".into()));
    }

    let current = db::get_provider_appointment(conn, appointment_id, provider)?;

    match update.status {
        Some(to) => {
            let from = allowed_from(actor.role, to);
            let invalid = |from_status: AppointmentStatus| WorkflowError::InvalidTransition {
                entity: "appointment",
                id: appointment_id,
                from: from_status.to_string(),
                to: to.to_string(),
            };
            if !from.contains(&current.status) {
                return Err(invalid(current.status));
            }
            if !db::transition_appointment(conn, appointment_id, provider, to, from, notes.as_deref())? {
                let latest = db::get_appointment(conn, appointment_id)?;
                return Err(invalid(latest.status));
            }
        }
        None => {
            if let Some(notes) = &notes {
                db::set_appointment_notes(conn, appointment_id, provider, notes)?;
            }
        }
    }

    let appointment = db::get_appointment(conn, appointment_id)?;
    tracing::info!(
        appointment_id,
        status = %appointment.status,
        with_notes = notes.is_some(),
        "Appointment updated"
    );

    let patient_id = appointment.patient_id;
    if update.status == Some(AppointmentStatus::Confirmed) {
        notifications::notify_with(sink, || {
            let patient = patient_owner(conn, patient_id)?;
            let event = match provider {
                Provider::Doctor(_) => NotificationEvent::DoctorConfirmedAppointment {
                    doctor: actor.name.clone(),
                    appointment_id,
                },
                Provider::Lab(_) => NotificationEvent::LabConfirmedAppointment {
                    lab: actor.name.clone(),
                    appointment_id,
                },
            };
            Ok((event, vec![patient.user_id]))
        });
    }
    if notes.is_some() {
        notifications::notify_with(sink, || {
            let patient = patient_owner(conn, patient_id)?;
            let voice = match provider {
                Provider::Doctor(_) => ProviderVoice::Doctor(actor.name.clone()),
                Provider::Lab(_) => ProviderVoice::Lab(actor.name.clone()),
            };
            let event = NotificationEvent::AppointmentNotes {
                provider: voice,
                appointment_id,
            };
            Ok((event, vec![patient.user_id]))
        });
    }

    Ok(appointment)
}

/// Appointments of the caller, from whichever side it is on.
pub fn list_appointments(conn: &Connection, actor: &Actor) -> Result<Vec<AppointmentView>, WorkflowError> {
    let views = match actor.role {
        Role::Patient => db::list_patient_appointments(conn, actor.profile_id)?,
        _ => db::list_provider_appointments(conn, provider_of(actor)?)?,
    };
    Ok(views)
}
