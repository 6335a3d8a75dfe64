use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::DatabaseError;
use crate::models::*;

const LAB_TEST_COLUMNS: &str = "id, patient_id, lab_id, requested_by_doctor_id, test_type, status,
     results_ref, doctor_feedback, requested_at";

type LabTestRow = (i64, i64, i64, i64, String, String, Option<String>, Option<String>, String);

fn read_row(row: &Row<'_>) -> rusqlite::Result<LabTestRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
    ))
}

fn into_lab_test(raw: LabTestRow) -> Result<LabTest, DatabaseError> {
    let (id, patient_id, lab_id, requested_by_doctor_id, test_type, status, results_ref, doctor_feedback, requested_at) =
        raw;
    Ok(LabTest {
        id,
        patient_id,
        lab_id,
        requested_by_doctor_id,
        test_type,
        status: LabTestStatus::from_str(&status)?,
        results_ref,
        doctor_feedback,
        requested_at,
    })
}

fn not_found(id: i64) -> DatabaseError {
    DatabaseError::NotFound {
        entity_type: "LabTest".into(),
        id: id.to_string(),
    }
}

pub fn insert_lab_test(
    conn: &Connection,
    patient_id: i64,
    lab_id: i64,
    doctor_id: i64,
    test_type: &str,
) -> Result<LabTest, DatabaseError> {
    conn.execute(
        "INSERT INTO lab_tests (patient_id, lab_id, requested_by_doctor_id, test_type)
         VALUES (?1, ?2, ?3, ?4)",
        params![patient_id, lab_id, doctor_id, test_type],
    )?;
    get_lab_test(conn, conn.last_insert_rowid())
}

pub fn get_lab_test(conn: &Connection, id: i64) -> Result<LabTest, DatabaseError> {
    let raw = conn
        .query_row(
            &format!("SELECT {LAB_TEST_COLUMNS} FROM lab_tests WHERE id = ?1"),
            params![id],
            read_row,
        )
        .optional()?
        .ok_or_else(|| not_found(id))?;
    into_lab_test(raw)
}

/// Fetch a test only if it was sent to the given lab.
pub fn get_lab_test_for_lab(conn: &Connection, id: i64, lab_id: i64) -> Result<LabTest, DatabaseError> {
    let test = get_lab_test(conn, id)?;
    if test.lab_id != lab_id {
        return Err(not_found(id));
    }
    Ok(test)
}

/// Tests sent to a lab, newest request first.
pub fn list_lab_queue(conn: &Connection, lab_id: i64) -> Result<Vec<LabTest>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {LAB_TEST_COLUMNS} FROM lab_tests WHERE lab_id = ?1
         ORDER BY requested_at DESC, id DESC"
    ))?;
    let rows = stmt.query_map(params![lab_id], read_row)?;

    let mut tests = Vec::new();
    for row in rows {
        tests.push(into_lab_test(row?)?);
    }
    Ok(tests)
}

/// Conditional status change scoped to the owning lab.
pub fn transition_lab_test(
    conn: &Connection,
    id: i64,
    lab_id: i64,
    to: LabTestStatus,
    from: LabTestStatus,
) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "UPDATE lab_tests SET status = ?3 WHERE id = ?1 AND lab_id = ?2 AND status = ?4",
        params![id, lab_id, to.as_str(), from.as_str()],
    )?;
    Ok(changed > 0)
}

/// Attach results and complete the test. Applies while the test is
/// requested or scheduled; returns whether a row changed.
pub fn complete_lab_test(
    conn: &Connection,
    id: i64,
    lab_id: i64,
    results_ref: &str,
) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "UPDATE lab_tests SET status = 'completed', results_ref = ?3
         WHERE id = ?1 AND lab_id = ?2 AND status IN ('requested', 'scheduled')",
        params![id, lab_id, results_ref],
    )?;
    Ok(changed > 0)
}

/// Requesting doctor's comment on completed results.
pub fn set_lab_test_feedback(
    conn: &Connection,
    id: i64,
    doctor_id: i64,
    feedback: &str,
) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "UPDATE lab_tests SET doctor_feedback = ?3
         WHERE id = ?1 AND requested_by_doctor_id = ?2 AND status = 'completed'",
        params![id, doctor_id, feedback],
    )?;
    Ok(changed > 0)
}

/// Unconditional admin edit. An empty `results_ref` clears the stored one.
pub fn edit_lab_test(conn: &Connection, id: i64, edit: &LabTestEdit) -> Result<LabTest, DatabaseError> {
    let clear_results = matches!(edit.results_ref.as_deref(), Some(""));
    let results_ref = edit.results_ref.as_deref().filter(|r| !r.is_empty());
    let changed = conn.execute(
        "UPDATE lab_tests SET
            test_type = COALESCE(?2, test_type),
            status = COALESCE(?3, status),
            results_ref = CASE WHEN ?5 THEN NULL ELSE COALESCE(?4, results_ref) END
         WHERE id = ?1",
        params![
            id,
            edit.test_type,
            edit.status.map(|s| s.as_str()),
            results_ref,
            clear_results
        ],
    )?;
    if changed == 0 {
        return Err(not_found(id));
    }
    get_lab_test(conn, id)
}

/// Hard delete. Notifications referencing the test are kept.
pub fn delete_lab_test(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let changed = conn.execute("DELETE FROM lab_tests WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(not_found(id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::users::create_account;
    use crate::db::sqlite::open_memory_database;

    fn seed(conn: &Connection) -> (i64, i64, i64) {
        let mut ids = Vec::new();
        for (name, profile) in [
            ("Pat", ProfileDetails::Patient { date_of_birth: None }),
            (
                "Grey",
                ProfileDetails::Doctor {
                    specialty: "GP".into(),
                    clinic_address: None,
                },
            ),
            (
                "City Lab",
                ProfileDetails::Lab {
                    lab_address: None,
                    available_tests: vec![],
                },
            ),
        ] {
            let account = NewAccount {
                name: name.into(),
                email: format!("{}@example.com", name.replace(' ', "")),
                profile,
            };
            ids.push(create_account(conn, &account).unwrap().1.unwrap());
        }
        (ids[0], ids[1], ids[2])
    }

    #[test]
    fn lifecycle_requested_scheduled_completed() {
        let conn = open_memory_database().unwrap();
        let (patient, doctor, lab) = seed(&conn);
        let test = insert_lab_test(&conn, patient, lab, doctor, "Iron panel").unwrap();
        assert_eq!(test.status, LabTestStatus::Requested);

        assert!(transition_lab_test(&conn, test.id, lab, LabTestStatus::Scheduled, LabTestStatus::Requested).unwrap());
        assert!(!transition_lab_test(&conn, test.id, lab, LabTestStatus::Scheduled, LabTestStatus::Requested).unwrap());

        assert!(complete_lab_test(&conn, test.id, lab, "results/1.pdf").unwrap());
        let done = get_lab_test(&conn, test.id).unwrap();
        assert_eq!(done.status, LabTestStatus::Completed);
        assert_eq!(done.results_ref.as_deref(), Some("results/1.pdf"));

        // Completed tests cannot be completed twice
        assert!(!complete_lab_test(&conn, test.id, lab, "results/2.pdf").unwrap());
    }

    #[test]
    fn feedback_requires_completion_and_requesting_doctor() {
        let conn = open_memory_database().unwrap();
        let (patient, doctor, lab) = seed(&conn);
        let test = insert_lab_test(&conn, patient, lab, doctor, "CBC").unwrap();

        assert!(!set_lab_test_feedback(&conn, test.id, doctor, "early").unwrap());
        complete_lab_test(&conn, test.id, lab, "r.pdf").unwrap();
        assert!(!set_lab_test_feedback(&conn, test.id, doctor + 1, "stranger").unwrap());
        assert!(set_lab_test_feedback(&conn, test.id, doctor, "Normal range").unwrap());
    }

    #[test]
    fn queue_is_lab_scoped() {
        let conn = open_memory_database().unwrap();
        let (patient, doctor, lab) = seed(&conn);
        insert_lab_test(&conn, patient, lab, doctor, "CBC").unwrap();

        assert_eq!(list_lab_queue(&conn, lab).unwrap().len(), 1);
        assert!(list_lab_queue(&conn, lab + 1).unwrap().is_empty());
        assert!(get_lab_test_for_lab(&conn, 1, lab + 1).is_err());
    }
}
