//! Admin operations: provider verification, account management and
//! direct edits or deletes of workflow records.

use rusqlite::Connection;

use crate::authorization::{self, Principal};
use crate::db::{self, DatabaseError};
use crate::models::*;
use crate::workflow::WorkflowError;

/// Check the caller is an active admin.
pub fn require_admin(conn: &Connection, principal: &Principal) -> Result<User, WorkflowError> {
    authorization::authorize(principal, Role::Admin)?;
    let user = match db::get_user(conn, principal.user_id) {
        Ok(user) => user,
        Err(DatabaseError::NotFound { .. }) => {
            return Err(WorkflowError::Forbidden("account no longer exists".into()))
        }
        Err(e) => return Err(e.into()),
    };
    if !user.is_active || user.role != Role::Admin {
        return Err(WorkflowError::Forbidden("admin access revoked".into()));
    }
    Ok(user)
}

pub fn pending_verifications(conn: &Connection) -> Result<Vec<PendingVerification>, WorkflowError> {
    Ok(db::list_pending_verifications(conn)?)
}

/// Verify a doctor or lab so patients can find and book it.
pub fn verify_provider(
    conn: &Connection,
    admin: &User,
    role: Role,
    profile_id: i64,
) -> Result<(), WorkflowError> {
    if !matches!(role, Role::Doctor | Role::Lab) {
        return Err(WorkflowError::Validation(format!("{role} profiles are not verified")));
    }
    db::verify_profile(conn, role, profile_id, admin.id)?;
    tracing::info!(admin_id = admin.id, %role, profile_id, "Provider verified");
    Ok(())
}

pub fn edit_user(
    conn: &Connection,
    admin: &User,
    user_id: i64,
    update: &UserUpdate,
) -> Result<User, WorkflowError> {
    if update.is_empty() {
        return Err(WorkflowError::Validation("nothing to update".into()));
    }
    if matches!(&update.name, Some(name) if name.trim().is_empty()) {
        return Err(WorkflowError::Validation("name cannot be blank".into()));
    }
    if user_id == admin.id && (update.is_active == Some(false) || update.role.is_some_and(|r| r != Role::Admin)) {
        return Err(WorkflowError::Validation("admins cannot demote or deactivate themselves".into()));
    }

    let normalized = UserUpdate {
        name: update.name.as_deref().map(|n| n.trim().to_string()),
        ..update.clone()
    };
    let user = db::update_user(conn, user_id, &normalized)?;
    tracing::info!(admin_id = admin.id, user_id, "User updated");
    Ok(user)
}

/// Soft delete.
pub fn deactivate_user(conn: &Connection, admin: &User, user_id: i64) -> Result<(), WorkflowError> {
    if user_id == admin.id {
        return Err(WorkflowError::Validation("admins cannot deactivate themselves".into()));
    }
    db::deactivate_user(conn, user_id)?;
    tracing::info!(admin_id = admin.id, user_id, "User deactivated");
    Ok(())
}

/// Direct edit with no transition or ownership checks. Sends no notifications.
pub fn edit_appointment(
    conn: &Connection,
    admin: &User,
    appointment_id: i64,
    edit: &AppointmentEdit,
) -> Result<Appointment, WorkflowError> {
    if edit.is_empty() {
        return Err(WorkflowError::Validation("nothing to update".into()));
    }
    if matches!(&edit.appointment_time, Some(time) if time.trim().is_empty()) {
        return Err(WorkflowError::Validation("appointment_time cannot be blank".into()));
    }

    let normalized = AppointmentEdit {
        appointment_time: edit.appointment_time.as_deref().map(|t| t.trim().to_string()),
        ..edit.clone()
    };
    let appointment = db::edit_appointment(conn, appointment_id, &normalized)?;
    tracing::info!(admin_id = admin.id, appointment_id, status = %appointment.status, "Appointment edited");
    Ok(appointment)
}

/// Direct edit with no transition or ownership checks. Sends no notifications.
pub fn edit_lab_test(
    conn: &Connection,
    admin: &User,
    lab_test_id: i64,
    edit: &LabTestEdit,
) -> Result<LabTest, WorkflowError> {
    if edit.is_empty() {
        return Err(WorkflowError::Validation("nothing to update".into()));
    }
    if matches!(&edit.test_type, Some(test_type) if test_type.trim().is_empty()) {
        return Err(WorkflowError::Validation("test_type cannot be blank".into()));
    }

    let normalized = LabTestEdit {
        test_type: edit.test_type.as_deref().map(|t| t.trim().to_string()),
        results_ref: edit.results_ref.as_deref().map(|r| r.trim().to_string()),
        ..edit.clone()
    };
    let test = db::edit_lab_test(conn, lab_test_id, &normalized)?;
    tracing::info!(admin_id = admin.id, lab_test_id, status = %test.status, "Lab test edited");
    Ok(test)
}

/// Hard delete. Notifications that point at the record stay in their inboxes.
pub fn delete_submission(conn: &Connection, admin: &User, submission_id: i64) -> Result<(), WorkflowError> {
    db::delete_submission(conn, submission_id)?;
    tracing::info!(admin_id = admin.id, submission_id, "Submission deleted");
    Ok(())
}

pub fn delete_appointment(conn: &Connection, admin: &User, appointment_id: i64) -> Result<(), WorkflowError> {
    db::delete_appointment(conn, appointment_id)?;
    tracing::info!(admin_id = admin.id, appointment_id, "Appointment deleted");
    Ok(())
}

pub fn delete_lab_test(conn: &Connection, admin: &User, lab_test_id: i64) -> Result<(), WorkflowError> {
    db::delete_lab_test(conn, lab_test_id)?;
    tracing::info!(admin_id = admin.id, lab_test_id, "Lab test deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::notifications::{self, NotificationEvent, StoreSink};
    use crate::workflow::appointments::{book_appointment, update_appointment, BookingRequest, StatusUpdate};
    use crate::workflow::{fixtures, Actor};

    fn admin(conn: &Connection) -> User {
        let (id, _) = db::create_account(
            conn,
            &NewAccount {
                name: "Root".into(),
                email: "root@example.com".into(),
                profile: ProfileDetails::Admin,
            },
        )
        .unwrap();
        db::get_user(conn, id).unwrap()
    }

    fn unverified_doctor(conn: &Connection) -> (i64, i64) {
        let (user_id, profile_id) = db::create_account(
            conn,
            &NewAccount {
                name: "Grey".into(),
                email: "grey@example.com".into(),
                profile: ProfileDetails::Doctor {
                    specialty: "GP".into(),
                    clinic_address: None,
                },
            },
        )
        .unwrap();
        (user_id, profile_id.unwrap())
    }

    #[test]
    fn require_admin_checks_role_and_activity() {
        let conn = open_memory_database().unwrap();
        let root = admin(&conn);
        let ok = require_admin(&conn, &Principal { user_id: root.id, role: Role::Admin });
        assert!(ok.is_ok());

        let wrong = require_admin(&conn, &Principal { user_id: root.id, role: Role::Doctor });
        assert!(matches!(wrong, Err(WorkflowError::Forbidden(_))));

        let ghost = require_admin(&conn, &Principal { user_id: 404, role: Role::Admin });
        assert!(matches!(ghost, Err(WorkflowError::Forbidden(_))));
    }

    #[test]
    fn verification_clears_pending_list() {
        let conn = open_memory_database().unwrap();
        let root = admin(&conn);
        let (_, doctor_id) = unverified_doctor(&conn);

        assert_eq!(pending_verifications(&conn).unwrap().len(), 1);
        verify_provider(&conn, &root, Role::Doctor, doctor_id).unwrap();
        assert!(pending_verifications(&conn).unwrap().is_empty());
        assert!(db::is_verified(&conn, Role::Doctor, doctor_id).unwrap());
    }

    #[test]
    fn verify_missing_provider_is_not_found() {
        let conn = open_memory_database().unwrap();
        let root = admin(&conn);
        let err = verify_provider(&conn, &root, Role::Lab, 77).unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound { .. }));
    }

    #[test]
    fn edit_user_trims_and_applies() {
        let conn = open_memory_database().unwrap();
        let root = admin(&conn);
        let (user_id, _) = unverified_doctor(&conn);

        let user = edit_user(
            &conn,
            &root,
            user_id,
            &UserUpdate {
                name: Some("  Meredith Grey ".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(user.name, "Meredith Grey");
    }

    #[test]
    fn empty_edit_is_rejected() {
        let conn = open_memory_database().unwrap();
        let root = admin(&conn);
        let err = edit_user(&conn, &root, root.id, &UserUpdate::default()).unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[test]
    fn admin_cannot_deactivate_self() {
        let conn = open_memory_database().unwrap();
        let root = admin(&conn);
        assert!(matches!(
            deactivate_user(&conn, &root, root.id),
            Err(WorkflowError::Validation(_))
        ));
    }

    #[test]
    fn deactivate_other_user() {
        let conn = open_memory_database().unwrap();
        let root = admin(&conn);
        let (user_id, _) = unverified_doctor(&conn);
        deactivate_user(&conn, &root, user_id).unwrap();
        assert!(!db::get_user(&conn, user_id).unwrap().is_active);
        assert!(matches!(
            deactivate_user(&conn, &root, 999),
            Err(WorkflowError::NotFound { .. })
        ));
    }

    fn booked_appointment(conn: &Connection) -> (Actor, Actor, Appointment) {
        let pat = fixtures::patient(conn, "Ana");
        let doc = fixtures::doctor(conn, "Meredith");
        let appointment = book_appointment(
            conn,
            &StoreSink::new(conn),
            &pat,
            &BookingRequest {
                doctor_id: Some(doc.profile_id),
                lab_id: None,
                appointment_time: "2025-06-01 10:00".into(),
                notes: None,
            },
        )
        .unwrap();
        (pat, doc, appointment)
    }

    #[test]
    fn deleted_appointment_leaves_notifications_in_place() {
        let conn = open_memory_database().unwrap();
        let root = admin(&conn);
        let (pat, doc, appointment) = booked_appointment(&conn);
        update_appointment(
            &conn,
            &StoreSink::new(&conn),
            &doc,
            appointment.id,
            &StatusUpdate {
                status: None,
                notes: Some("Bring previous scans".into()),
            },
        )
        .unwrap();

        delete_appointment(&conn, &root, appointment.id).unwrap();
        assert!(matches!(
            db::get_appointment(&conn, appointment.id),
            Err(DatabaseError::NotFound { .. })
        ));

        let inbox = fixtures::notifications_for(&conn, pat.user_id);
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].kind, NotificationType::AppointmentFeedback);
        assert_eq!(inbox[0].related_id, Some(appointment.id));
        assert_eq!(inbox[0].related_type, Some(RelatedType::Appointment));

        assert!(matches!(
            delete_appointment(&conn, &root, appointment.id),
            Err(WorkflowError::NotFound { .. })
        ));
    }

    #[test]
    fn edit_appointment_ignores_transition_table() {
        let conn = open_memory_database().unwrap();
        let root = admin(&conn);
        let (pat, _, appointment) = booked_appointment(&conn);

        let edited = edit_appointment(
            &conn,
            &root,
            appointment.id,
            &AppointmentEdit {
                status: Some(AppointmentStatus::Completed),
                appointment_time: Some(" 2025-07-01 09:30 ".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(edited.status, AppointmentStatus::Completed);
        assert_eq!(edited.appointment_time, "2025-07-01 09:30");
        assert_eq!(edited.notes, None);
        assert!(fixtures::notifications_for(&conn, pat.user_id).is_empty());

        let blank = AppointmentEdit {
            appointment_time: Some("  ".into()),
            ..Default::default()
        };
        assert!(matches!(
            edit_appointment(&conn, &root, appointment.id, &blank),
            Err(WorkflowError::Validation(_))
        ));
        assert!(matches!(
            edit_appointment(&conn, &root, appointment.id, &AppointmentEdit::default()),
            Err(WorkflowError::Validation(_))
        ));
    }

    #[test]
    fn edit_and_delete_lab_test() {
        let conn = open_memory_database().unwrap();
        let root = admin(&conn);
        let pat = fixtures::patient(&conn, "Ana");
        let doc = fixtures::doctor(&conn, "Meredith");
        let lab = fixtures::lab(&conn, "City Lab");
        let test = db::insert_lab_test(&conn, pat.profile_id, lab.profile_id, doc.profile_id, "CBC").unwrap();
        db::complete_lab_test(&conn, test.id, lab.profile_id, "results/broken.pdf").unwrap();

        let edited = edit_lab_test(
            &conn,
            &root,
            test.id,
            &LabTestEdit {
                status: Some(LabTestStatus::Cancelled),
                results_ref: Some(String::new()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(edited.status, LabTestStatus::Cancelled);
        assert_eq!(edited.results_ref, None);
        assert_eq!(edited.test_type, "CBC");

        let blank = LabTestEdit {
            test_type: Some(" ".into()),
            ..Default::default()
        };
        assert!(matches!(
            edit_lab_test(&conn, &root, test.id, &blank),
            Err(WorkflowError::Validation(_))
        ));

        delete_lab_test(&conn, &root, test.id).unwrap();
        assert!(matches!(
            edit_lab_test(&conn, &root, test.id, &edited_status(LabTestStatus::Requested)),
            Err(WorkflowError::NotFound { .. })
        ));
    }

    fn edited_status(status: LabTestStatus) -> LabTestEdit {
        LabTestEdit {
            status: Some(status),
            ..Default::default()
        }
    }

    #[test]
    fn delete_submission_keeps_feedback_notification() {
        let conn = open_memory_database().unwrap();
        let root = admin(&conn);
        let pat = fixtures::patient(&conn, "Ana");
        let submission = db::insert_submission(&conn, pat.profile_id, "img/1.png", "eczema", 0.8).unwrap();
        notifications::notify(
            &StoreSink::new(&conn),
            &NotificationEvent::SubmissionFeedback {
                doctor: "Meredith".into(),
                submission_id: submission.id,
            },
            &[pat.user_id],
        );

        delete_submission(&conn, &root, submission.id).unwrap();
        assert!(db::get_submission(&conn, submission.id).is_err());
        let inbox = fixtures::notifications_for(&conn, pat.user_id);
        assert_eq!(inbox[0].related_id, Some(submission.id));
        assert!(matches!(
            delete_submission(&conn, &root, submission.id),
            Err(WorkflowError::NotFound { .. })
        ));
    }
}
