//! Recipient derivation.
//!
//! A doctor is *linked* to a patient when at least one appointment exists
//! between them, in any status. Every "notify the patient's doctors" rule
//! goes through this one join.

use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{self, DatabaseError, ProfileOwner};
use crate::models::enums::Role;

/// User ids of all active doctors linked to the patient, ascending.
pub fn linked_doctor_user_ids(conn: &Connection, patient_id: i64) -> Result<Vec<i64>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT u.id
         FROM appointments a
         JOIN doctors d ON d.id = a.doctor_id
         JOIN users u ON u.id = d.user_id
         WHERE a.patient_id = ?1 AND u.is_active = 1
         ORDER BY u.id",
    )?;
    let rows = stmt.query_map(params![patient_id], |row| row.get::<_, i64>(0))?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// User id of one doctor if, and only if, it is linked to the patient.
pub fn linked_doctor_user_id(
    conn: &Connection,
    patient_id: i64,
    doctor_id: i64,
) -> Result<Option<i64>, DatabaseError> {
    let user_id = conn
        .query_row(
            "SELECT u.id
             FROM doctors d
             JOIN users u ON u.id = d.user_id
             WHERE d.id = ?2 AND u.is_active = 1
               AND EXISTS (SELECT 1 FROM appointments a WHERE a.patient_id = ?1 AND a.doctor_id = d.id)",
            params![patient_id, doctor_id],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(user_id)
}

pub fn is_linked(conn: &Connection, patient_id: i64, doctor_id: i64) -> Result<bool, DatabaseError> {
    let found: i64 = conn.query_row(
        "SELECT COUNT(*) FROM appointments WHERE patient_id = ?1 AND doctor_id = ?2",
        params![patient_id, doctor_id],
        |row| row.get(0),
    )?;
    Ok(found > 0)
}

/// Account behind a patient profile.
pub fn patient_owner(conn: &Connection, patient_id: i64) -> Result<ProfileOwner, DatabaseError> {
    db::profile_owner(conn, Role::Patient, patient_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::Provider;
    use crate::workflow::fixtures::*;

    #[test]
    fn linked_doctors_are_distinct_across_statuses() {
        let conn = open_memory_database().unwrap();
        let pat = patient(&conn, "Ana");
        let a = doctor(&conn, "A");
        let b = doctor(&conn, "B");
        let unrelated = doctor(&conn, "C");

        db::insert_appointment(&conn, pat.profile_id, Provider::Doctor(a.profile_id), "t1", None).unwrap();
        db::insert_appointment(&conn, pat.profile_id, Provider::Doctor(a.profile_id), "t2", None).unwrap();
        let appt = db::insert_appointment(&conn, pat.profile_id, Provider::Doctor(b.profile_id), "t3", None).unwrap();
        db::transition_appointment(
            &conn,
            appt.id,
            Provider::Doctor(b.profile_id),
            crate::models::AppointmentStatus::Cancelled,
            &[crate::models::AppointmentStatus::Pending],
            None,
        )
        .unwrap();

        let ids = linked_doctor_user_ids(&conn, pat.profile_id).unwrap();
        assert_eq!(ids, vec![a.user_id, b.user_id]);
        assert!(!ids.contains(&unrelated.user_id));
    }

    #[test]
    fn lab_appointments_do_not_link() {
        let conn = open_memory_database().unwrap();
        let pat = patient(&conn, "Ana");
        let l = lab(&conn, "City Lab");
        db::insert_appointment(&conn, pat.profile_id, Provider::Lab(l.profile_id), "t", None).unwrap();
        assert!(linked_doctor_user_ids(&conn, pat.profile_id).unwrap().is_empty());
    }

    #[test]
    fn single_doctor_lookup_requires_link() {
        let conn = open_memory_database().unwrap();
        let pat = patient(&conn, "Ana");
        let a = doctor(&conn, "A");
        let b = doctor(&conn, "B");
        db::insert_appointment(&conn, pat.profile_id, Provider::Doctor(a.profile_id), "t", None).unwrap();

        assert_eq!(linked_doctor_user_id(&conn, pat.profile_id, a.profile_id).unwrap(), Some(a.user_id));
        assert_eq!(linked_doctor_user_id(&conn, pat.profile_id, b.profile_id).unwrap(), None);
        assert!(is_linked(&conn, pat.profile_id, a.profile_id).unwrap());
        assert!(!is_linked(&conn, pat.profile_id, b.profile_id).unwrap());
    }
}
