use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::DatabaseError;
use crate::models::*;

fn map_submission(row: &Row<'_>) -> rusqlite::Result<Submission> {
    Ok(Submission {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        image_ref: row.get(2)?,
        ai_prediction: row.get(3)?,
        ai_confidence: row.get(4)?,
        doctor_feedback: row.get(5)?,
        submitted_at: row.get(6)?,
    })
}

pub fn insert_submission(
    conn: &Connection,
    patient_id: i64,
    image_ref: &str,
    ai_prediction: &str,
    ai_confidence: f64,
) -> Result<Submission, DatabaseError> {
    conn.execute(
        "INSERT INTO submissions (patient_id, image_ref, ai_prediction, ai_confidence)
         VALUES (?1, ?2, ?3, ?4)",
        params![patient_id, image_ref, ai_prediction, ai_confidence],
    )?;
    get_submission(conn, conn.last_insert_rowid())
}

pub fn get_submission(conn: &Connection, id: i64) -> Result<Submission, DatabaseError> {
    conn.query_row(
        "SELECT id, patient_id, image_ref, ai_prediction, ai_confidence, doctor_feedback, submitted_at
         FROM submissions WHERE id = ?1",
        params![id],
        map_submission,
    )
    .optional()?
    .ok_or_else(|| DatabaseError::NotFound {
        entity_type: "Submission".into(),
        id: id.to_string(),
    })
}

pub fn list_patient_submissions(
    conn: &Connection,
    patient_id: i64,
) -> Result<Vec<Submission>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, image_ref, ai_prediction, ai_confidence, doctor_feedback, submitted_at
         FROM submissions WHERE patient_id = ?1
         ORDER BY submitted_at DESC, id DESC",
    )?;
    let rows = stmt.query_map(params![patient_id], map_submission)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Write or overwrite the doctor's feedback on a submission.
pub fn set_submission_feedback(
    conn: &Connection,
    id: i64,
    feedback: &str,
) -> Result<Submission, DatabaseError> {
    let changed = conn.execute(
        "UPDATE submissions SET doctor_feedback = ?2 WHERE id = ?1",
        params![id, feedback],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Submission".into(),
            id: id.to_string(),
        });
    }
    get_submission(conn, id)
}

/// Hard delete. Notifications referencing the submission are kept.
pub fn delete_submission(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let changed = conn.execute("DELETE FROM submissions WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Submission".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}
