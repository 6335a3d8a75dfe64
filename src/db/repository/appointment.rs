use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::DatabaseError;
use crate::models::*;

const APPOINTMENT_COLUMNS: &str =
    "a.id, a.patient_id, a.doctor_id, a.lab_id, a.appointment_time, a.status, a.notes, a.created_at";

type AppointmentRow = (i64, i64, Option<i64>, Option<i64>, String, String, Option<String>, String);

fn read_row(row: &Row<'_>) -> rusqlite::Result<AppointmentRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn into_appointment(raw: AppointmentRow) -> Result<Appointment, DatabaseError> {
    let (id, patient_id, doctor_id, lab_id, appointment_time, status, notes, created_at) = raw;
    Ok(Appointment {
        id,
        patient_id,
        doctor_id,
        lab_id,
        appointment_time,
        status: AppointmentStatus::from_str(&status)?,
        notes,
        created_at,
    })
}

pub fn insert_appointment(
    conn: &Connection,
    patient_id: i64,
    provider: Provider,
    appointment_time: &str,
    notes: Option<&str>,
) -> Result<Appointment, DatabaseError> {
    conn.execute(
        &format!(
            "INSERT INTO appointments (patient_id, {}, appointment_time, notes)
             VALUES (?1, ?2, ?3, ?4)",
            provider.column()
        ),
        params![patient_id, provider.id(), appointment_time, notes],
    )?;
    get_appointment(conn, conn.last_insert_rowid())
}

pub fn get_appointment(conn: &Connection, id: i64) -> Result<Appointment, DatabaseError> {
    let raw = conn
        .query_row(
            &format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments a WHERE a.id = ?1"),
            params![id],
            read_row,
        )
        .optional()?
        .ok_or_else(|| DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: id.to_string(),
        })?;
    into_appointment(raw)
}

/// Fetch an appointment only if it belongs to the given provider.
pub fn get_provider_appointment(
    conn: &Connection,
    id: i64,
    provider: Provider,
) -> Result<Appointment, DatabaseError> {
    let raw = conn
        .query_row(
            &format!(
                "SELECT {APPOINTMENT_COLUMNS} FROM appointments a WHERE a.id = ?1 AND a.{} = ?2",
                provider.column()
            ),
            params![id, provider.id()],
            read_row,
        )
        .optional()?
        .ok_or_else(|| DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: id.to_string(),
        })?;
    into_appointment(raw)
}

/// Conditional status change: applies only while the current status is one of
/// `allowed_from`. Notes are replaced when provided. Returns whether a row changed.
pub fn transition_appointment(
    conn: &Connection,
    id: i64,
    provider: Provider,
    to: AppointmentStatus,
    allowed_from: &[AppointmentStatus],
    notes: Option<&str>,
) -> Result<bool, DatabaseError> {
    if allowed_from.is_empty() {
        return Ok(false);
    }
    let placeholders = allowed_from
        .iter()
        .map(|s| format!("'{}'", s.as_str()))
        .collect::<Vec<_>>()
        .join(", ");

    let changed = conn.execute(
        &format!(
            "UPDATE appointments SET status = ?3, notes = COALESCE(?4, notes)
             WHERE id = ?1 AND {} = ?2 AND status IN ({placeholders})",
            provider.column()
        ),
        params![id, provider.id(), to.as_str(), notes],
    )?;
    Ok(changed > 0)
}

/// Replace the notes of an appointment owned by the provider.
pub fn set_appointment_notes(
    conn: &Connection,
    id: i64,
    provider: Provider,
    notes: &str,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        &format!(
            "UPDATE appointments SET notes = ?3 WHERE id = ?1 AND {} = ?2",
            provider.column()
        ),
        params![id, provider.id(), notes],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

fn list_views(
    conn: &Connection,
    filter_column: &str,
    filter_id: i64,
) -> Result<Vec<AppointmentView>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS}, pu.name, COALESCE(du.name, lu.name, '')
         FROM appointments a
         JOIN patients p ON p.id = a.patient_id
         JOIN users pu ON pu.id = p.user_id
         LEFT JOIN doctors d ON d.id = a.doctor_id
         LEFT JOIN users du ON du.id = d.user_id
         LEFT JOIN labs l ON l.id = a.lab_id
         LEFT JOIN users lu ON lu.id = l.user_id
         WHERE a.{filter_column} = ?1
         ORDER BY a.appointment_time DESC, a.id DESC"
    ))?;

    let rows = stmt.query_map(params![filter_id], |row| {
        Ok((read_row(row)?, row.get::<_, String>(8)?, row.get::<_, String>(9)?))
    })?;

    let mut views = Vec::new();
    for row in rows {
        let (raw, patient_name, provider_name) = row?;
        views.push(AppointmentView {
            appointment: into_appointment(raw)?,
            patient_name,
            provider_name,
        });
    }
    Ok(views)
}

pub fn list_patient_appointments(
    conn: &Connection,
    patient_id: i64,
) -> Result<Vec<AppointmentView>, DatabaseError> {
    list_views(conn, "patient_id", patient_id)
}

pub fn list_provider_appointments(
    conn: &Connection,
    provider: Provider,
) -> Result<Vec<AppointmentView>, DatabaseError> {
    list_views(conn, provider.column(), provider.id())
}

/// Unconditional admin edit: no ownership or transition checks.
pub fn edit_appointment(
    conn: &Connection,
    id: i64,
    edit: &AppointmentEdit,
) -> Result<Appointment, DatabaseError> {
    let changed = conn.execute(
        "UPDATE appointments SET
            appointment_time = COALESCE(?2, appointment_time),
            status = COALESCE(?3, status),
            notes = COALESCE(?4, notes)
         WHERE id = ?1",
        params![
            id,
            edit.appointment_time,
            edit.status.map(|s| s.as_str()),
            edit.notes
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: id.to_string(),
        });
    }
    get_appointment(conn, id)
}

/// Hard delete. Notifications referencing the appointment are kept.
pub fn delete_appointment(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let changed = conn.execute("DELETE FROM appointments WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}
