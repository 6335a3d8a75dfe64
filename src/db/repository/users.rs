use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{now_timestamp, DatabaseError};
use crate::models::*;

/// Owner of a role profile: the account behind a patient, doctor or lab id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileOwner {
    pub user_id: i64,
    pub name: String,
}

/// Create a user and its role profile in one transaction.
/// Returns `(user_id, profile_id)`; admins have no profile.
pub fn create_account(
    conn: &Connection,
    account: &NewAccount,
) -> Result<(i64, Option<i64>), DatabaseError> {
    let role = account.profile.role();
    let tx = conn.unchecked_transaction()?;

    tx.execute(
        "INSERT INTO users (name, email, role) VALUES (?1, ?2, ?3)",
        params![account.name, account.email, role.as_str()],
    )
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            DatabaseError::ConstraintViolation(format!("email already registered: {}", account.email))
        }
        other => other.into(),
    })?;
    let user_id = tx.last_insert_rowid();

    let profile_id = match &account.profile {
        ProfileDetails::Patient { date_of_birth } => {
            tx.execute(
                "INSERT INTO patients (user_id, date_of_birth) VALUES (?1, ?2)",
                params![user_id, date_of_birth],
            )?;
            Some(tx.last_insert_rowid())
        }
        ProfileDetails::Doctor { specialty, clinic_address } => {
            tx.execute(
                "INSERT INTO doctors (user_id, specialty, clinic_address) VALUES (?1, ?2, ?3)",
                params![user_id, specialty, clinic_address],
            )?;
            Some(tx.last_insert_rowid())
        }
        ProfileDetails::Lab { lab_address, available_tests } => {
            let tests_json =
                serde_json::to_string(available_tests).unwrap_or_else(|_| "[]".to_string());
            tx.execute(
                "INSERT INTO labs (user_id, lab_address, available_tests) VALUES (?1, ?2, ?3)",
                params![user_id, lab_address, tests_json],
            )?;
            Some(tx.last_insert_rowid())
        }
        ProfileDetails::Admin => None,
    };

    tx.commit()?;
    Ok((user_id, profile_id))
}

pub fn get_user(conn: &Connection, id: i64) -> Result<User, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, name, email, role, is_active, created_at FROM users WHERE id = ?1",
            params![id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, bool>(4)?,
                    row.get::<_, String>(5)?,
                ))
            },
        )
        .optional()?;

    let (id, name, email, role, is_active, created_at) = row.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "User".into(),
        id: id.to_string(),
    })?;

    Ok(User {
        id,
        name,
        email,
        role: Role::from_str(&role)?,
        is_active,
        created_at,
    })
}

/// Profile id of the given user within the role's profile table.
pub fn profile_id_for(
    conn: &Connection,
    user_id: i64,
    role: Role,
) -> Result<Option<i64>, DatabaseError> {
    let Some(table) = role.profile_table() else {
        return Ok(None);
    };
    let id = conn
        .query_row(
            &format!("SELECT id FROM {table} WHERE user_id = ?1"),
            params![user_id],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(id)
}

/// Resolve a profile id back to the owning account.
pub fn profile_owner(
    conn: &Connection,
    role: Role,
    profile_id: i64,
) -> Result<ProfileOwner, DatabaseError> {
    let not_found = || DatabaseError::NotFound {
        entity_type: role.as_str().into(),
        id: profile_id.to_string(),
    };
    let table = role.profile_table().ok_or_else(not_found)?;

    conn.query_row(
        &format!(
            "SELECT u.id, u.name FROM {table} p JOIN users u ON u.id = p.user_id WHERE p.id = ?1"
        ),
        params![profile_id],
        |row| {
            Ok(ProfileOwner {
                user_id: row.get(0)?,
                name: row.get(1)?,
            })
        },
    )
    .optional()?
    .ok_or_else(not_found)
}

/// Whether a doctor or lab profile has been verified by an admin.
/// Missing profiles are reported as unverified.
pub fn is_verified(conn: &Connection, role: Role, profile_id: i64) -> Result<bool, DatabaseError> {
    let table = match role {
        Role::Doctor => "doctors",
        Role::Lab => "labs",
        _ => return Ok(false),
    };
    let verified = conn
        .query_row(
            &format!(
                "SELECT p.verified FROM {table} p JOIN users u ON u.id = p.user_id
                 WHERE p.id = ?1 AND u.is_active = 1"
            ),
            params![profile_id],
            |row| row.get::<_, bool>(0),
        )
        .optional()?;
    Ok(verified.unwrap_or(false))
}

/// Apply an admin edit. A role change creates the new role's profile row
/// if the user does not have one yet.
pub fn update_user(conn: &Connection, id: i64, update: &UserUpdate) -> Result<User, DatabaseError> {
    let tx = conn.unchecked_transaction()?;

    let changed = tx.execute(
        "UPDATE users SET
            name = COALESCE(?2, name),
            role = COALESCE(?3, role),
            is_active = COALESCE(?4, is_active)
         WHERE id = ?1",
        params![
            id,
            update.name,
            update.role.map(|r| r.as_str()),
            update.is_active,
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "User".into(),
            id: id.to_string(),
        });
    }

    if let Some(table) = update.role.and_then(|r| r.profile_table()) {
        tx.execute(
            &format!("INSERT OR IGNORE INTO {table} (user_id) VALUES (?1)"),
            params![id],
        )?;
    }

    tx.commit()?;
    get_user(conn, id)
}

/// Soft delete: the account stays for referential history but can no longer act.
pub fn deactivate_user(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let changed = conn.execute("UPDATE users SET is_active = 0 WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "User".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Mark a doctor or lab profile verified.
pub fn verify_profile(
    conn: &Connection,
    role: Role,
    profile_id: i64,
    verified_by: i64,
) -> Result<(), DatabaseError> {
    let table = match role {
        Role::Doctor => "doctors",
        Role::Lab => "labs",
        other => {
            return Err(DatabaseError::ConstraintViolation(format!(
                "{other} profiles are not subject to verification"
            )))
        }
    };
    let changed = conn.execute(
        &format!("UPDATE {table} SET verified = 1, verified_at = ?2, verified_by = ?3 WHERE id = ?1"),
        params![profile_id, now_timestamp(), verified_by],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: role.as_str().into(),
            id: profile_id.to_string(),
        });
    }
    Ok(())
}

pub fn list_pending_verifications(
    conn: &Connection,
) -> Result<Vec<PendingVerification>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT 'doctor', d.id, u.id, u.name, u.email, u.created_at
         FROM doctors d JOIN users u ON u.id = d.user_id
         WHERE d.verified = 0 AND u.is_active = 1
         UNION ALL
         SELECT 'lab', l.id, u.id, u.name, u.email, u.created_at
         FROM labs l JOIN users u ON u.id = l.user_id
         WHERE l.verified = 0 AND u.is_active = 1
         ORDER BY 6, 3",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, i64>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
        ))
    })?;

    let mut pending = Vec::new();
    for row in rows {
        let (kind, profile_id, user_id, name, email, created_at) = row?;
        pending.push(PendingVerification {
            kind: Role::from_str(&kind)?,
            profile_id,
            user_id,
            name,
            email,
            created_at,
        });
    }
    Ok(pending)
}

pub fn list_verified_doctors(conn: &Connection) -> Result<Vec<DoctorListing>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT d.id, u.name, d.specialty, d.clinic_address
         FROM doctors d JOIN users u ON u.id = d.user_id
         WHERE d.verified = 1 AND u.is_active = 1
         ORDER BY u.name, d.id",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(DoctorListing {
            doctor_id: row.get(0)?,
            name: row.get(1)?,
            specialty: row.get(2)?,
            clinic_address: row.get(3)?,
        })
    })?;

    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn list_verified_labs(conn: &Connection) -> Result<Vec<LabListing>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT l.id, u.name, l.lab_address, l.available_tests
         FROM labs l JOIN users u ON u.id = l.user_id
         WHERE l.verified = 1 AND u.is_active = 1
         ORDER BY u.name, l.id",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, String>(3)?,
        ))
    })?;

    let mut labs = Vec::new();
    for row in rows {
        let (lab_id, name, lab_address, tests_json) = row?;
        labs.push(LabListing {
            lab_id,
            name,
            lab_address,
            available_tests: serde_json::from_str(&tests_json).unwrap_or_default(),
        });
    }
    Ok(labs)
}

/// Patients with at least one appointment with the doctor.
pub fn list_linked_patients(
    conn: &Connection,
    doctor_id: i64,
) -> Result<Vec<LinkedPatient>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT p.id, u.name, u.email
         FROM appointments a
         JOIN patients p ON p.id = a.patient_id
         JOIN users u ON u.id = p.user_id
         WHERE a.doctor_id = ?1
         ORDER BY u.name, p.id",
    )?;

    let rows = stmt.query_map(params![doctor_id], |row| {
        Ok(LinkedPatient {
            patient_id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
        })
    })?;

    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn doctor(name: &str, email: &str) -> NewAccount {
        NewAccount {
            name: name.into(),
            email: email.into(),
            profile: ProfileDetails::Doctor {
                specialty: "Dermatology".into(),
                clinic_address: Some("12 Main St".into()),
            },
        }
    }

    #[test]
    fn create_account_inserts_user_and_profile() {
        let conn = open_memory_database().unwrap();
        let (user_id, profile_id) = create_account(&conn, &doctor("Grey", "grey@example.com")).unwrap();

        let user = get_user(&conn, user_id).unwrap();
        assert_eq!(user.role, Role::Doctor);
        assert!(user.is_active);
        assert_eq!(profile_id_for(&conn, user_id, Role::Doctor).unwrap(), profile_id);
    }

    #[test]
    fn duplicate_email_is_constraint_violation() {
        let conn = open_memory_database().unwrap();
        create_account(&conn, &doctor("A", "dup@example.com")).unwrap();
        let err = create_account(&conn, &doctor("B", "dup@example.com")).unwrap_err();
        assert!(matches!(err, DatabaseError::ConstraintViolation(_)));
    }

    #[test]
    fn admin_has_no_profile() {
        let conn = open_memory_database().unwrap();
        let (user_id, profile_id) = create_account(
            &conn,
            &NewAccount {
                name: "Root".into(),
                email: "root@example.com".into(),
                profile: ProfileDetails::Admin,
            },
        )
        .unwrap();
        assert_eq!(profile_id, None);
        assert_eq!(profile_id_for(&conn, user_id, Role::Admin).unwrap(), None);
    }

    #[test]
    fn get_user_missing_is_not_found() {
        let conn = open_memory_database().unwrap();
        assert!(matches!(get_user(&conn, 99), Err(DatabaseError::NotFound { .. })));
    }

    #[test]
    fn verification_gates_listing() {
        let conn = open_memory_database().unwrap();
        let (_, doctor_id) = create_account(&conn, &doctor("Grey", "grey@example.com")).unwrap();
        let doctor_id = doctor_id.unwrap();

        assert!(list_verified_doctors(&conn).unwrap().is_empty());
        assert_eq!(list_pending_verifications(&conn).unwrap().len(), 1);
        assert!(!is_verified(&conn, Role::Doctor, doctor_id).unwrap());

        verify_profile(&conn, Role::Doctor, doctor_id, 1).unwrap();

        let listed = list_verified_doctors(&conn).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].doctor_id, doctor_id);
        assert!(list_pending_verifications(&conn).unwrap().is_empty());
        assert!(is_verified(&conn, Role::Doctor, doctor_id).unwrap());
    }

    #[test]
    fn verify_unknown_profile_is_not_found() {
        let conn = open_memory_database().unwrap();
        let err = verify_profile(&conn, Role::Lab, 42, 1).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn lab_tests_round_trip_as_json() {
        let conn = open_memory_database().unwrap();
        let (_, lab_id) = create_account(
            &conn,
            &NewAccount {
                name: "City Lab".into(),
                email: "lab@example.com".into(),
                profile: ProfileDetails::Lab {
                    lab_address: None,
                    available_tests: vec!["CBC".into(), "Iron panel".into()],
                },
            },
        )
        .unwrap();
        verify_profile(&conn, Role::Lab, lab_id.unwrap(), 1).unwrap();

        let labs = list_verified_labs(&conn).unwrap();
        assert_eq!(labs[0].available_tests, vec!["CBC", "Iron panel"]);
    }

    #[test]
    fn deactivated_doctor_is_hidden_and_unbookable() {
        let conn = open_memory_database().unwrap();
        let (user_id, doctor_id) = create_account(&conn, &doctor("Grey", "grey@example.com")).unwrap();
        verify_profile(&conn, Role::Doctor, doctor_id.unwrap(), 1).unwrap();

        deactivate_user(&conn, user_id).unwrap();

        assert!(!get_user(&conn, user_id).unwrap().is_active);
        assert!(list_verified_doctors(&conn).unwrap().is_empty());
        assert!(!is_verified(&conn, Role::Doctor, doctor_id.unwrap()).unwrap());
    }

    #[test]
    fn role_change_creates_missing_profile() {
        let conn = open_memory_database().unwrap();
        let (user_id, _) = create_account(&conn, &doctor("Grey", "grey@example.com")).unwrap();

        let user = update_user(
            &conn,
            user_id,
            &UserUpdate {
                role: Some(Role::Lab),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(user.role, Role::Lab);
        assert!(profile_id_for(&conn, user_id, Role::Lab).unwrap().is_some());
    }

    #[test]
    fn profile_owner_resolves_account() {
        let conn = open_memory_database().unwrap();
        let (user_id, doctor_id) = create_account(&conn, &doctor("Grey", "grey@example.com")).unwrap();
        let owner = profile_owner(&conn, Role::Doctor, doctor_id.unwrap()).unwrap();
        assert_eq!(owner, ProfileOwner { user_id, name: "Grey".into() });
    }
}
