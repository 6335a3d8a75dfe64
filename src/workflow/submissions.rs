//! Nail-image submissions, doctor feedback and feedback requests.

use rand::seq::SliceRandom;
use rusqlite::Connection;

use super::recipients::{is_linked, linked_doctor_user_id, linked_doctor_user_ids, patient_owner};
use super::{required_text, Actor, WorkflowError};
use crate::db;
use crate::models::*;
use crate::notifications::{self, NotificationEvent, NotificationSink};

/// Label and confidence produced for one image.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub confidence: f64,
}

/// Seam for the image classifier. The model itself lives outside this crate.
pub trait Classifier: Send + Sync {
    fn classify(&self, image_ref: &str) -> Prediction;
}

/// Stand-in classifier: picks one of the known labels at random.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockClassifier;

const MOCK_LABELS: [(&str, f64); 4] = [
    ("Koilonychia (Spoon Nails)", 0.92),
    ("Terry's Nails", 0.85),
    ("Clubbing", 0.78),
    ("Healthy", 0.95),
];

impl Classifier for MockClassifier {
    fn classify(&self, _image_ref: &str) -> Prediction {
        let (label, confidence) = MOCK_LABELS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(MOCK_LABELS[3]);
        Prediction {
            label: label.to_string(),
            confidence,
        }
    }
}

/// Deterministic classifier for tests.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct FixedClassifier(pub &'static str);

#[cfg(test)]
impl Classifier for FixedClassifier {
    fn classify(&self, _image_ref: &str) -> Prediction {
        Prediction {
            label: self.0.to_string(),
            confidence: 0.9,
        }
    }
}

/// Patient uploads an image reference; every linked doctor receives the
/// prediction. A patient with no linked doctor produces no notifications.
pub fn create_submission(
    conn: &Connection,
    sink: &dyn NotificationSink,
    classifier: &dyn Classifier,
    patient: &Actor,
    image_ref: &str,
) -> Result<Submission, WorkflowError> {
    let image_ref = required_text("image_ref", image_ref)?;
    let prediction = classifier.classify(&image_ref);

    let submission = db::insert_submission(
        conn,
        patient.profile_id,
        &image_ref,
        &prediction.label,
        prediction.confidence,
    )?;

    tracing::info!(
        submission_id = submission.id,
        prediction = %prediction.label,
        "Submission created"
    );

    let report = notifications::notify_with(sink, || {
        let doctors = linked_doctor_user_ids(conn, patient.profile_id)?;
        let event = NotificationEvent::SubmissionPredicted {
            patient: patient.name.clone(),
            prediction: prediction.label.clone(),
            submission_id: submission.id,
        };
        Ok((event, doctors))
    });
    tracing::debug!(submission_id = submission.id, doctors = report.delivered.len(), "Prediction fanned out");

    Ok(submission)
}

pub fn list_submissions(conn: &Connection, patient: &Actor) -> Result<Vec<Submission>, WorkflowError> {
    Ok(db::list_patient_submissions(conn, patient.profile_id)?)
}

/// Submission visible to a doctor: only those of linked patients.
fn linked_submission(conn: &Connection, doctor: &Actor, submission_id: i64) -> Result<Submission, WorkflowError> {
    let submission = db::get_submission(conn, submission_id)?;
    if !is_linked(conn, submission.patient_id, doctor.profile_id)? {
        return Err(WorkflowError::not_found("Submission", submission_id));
    }
    Ok(submission)
}

/// Doctor writes or overwrites feedback; the patient is notified each time.
pub fn write_feedback(
    conn: &Connection,
    sink: &dyn NotificationSink,
    doctor: &Actor,
    submission_id: i64,
    feedback: &str,
) -> Result<Submission, WorkflowError> {
    let feedback = required_text("feedback", feedback)?;
    let submission = linked_submission(conn, doctor, submission_id)?;

    let updated = db::set_submission_feedback(conn, submission.id, &feedback)?;

    notifications::notify_with(sink, || {
        let patient = patient_owner(conn, submission.patient_id)?;
        let event = NotificationEvent::SubmissionFeedback {
            doctor: doctor.name.clone(),
            submission_id,
        };
        Ok((event, vec![patient.user_id]))
    });

    Ok(updated)
}

/// Patient asks for feedback on its own submission: the named doctor if
/// given (must be linked), otherwise every linked doctor. Returns how many
/// doctors were asked.
pub fn request_doctor_feedback(
    conn: &Connection,
    sink: &dyn NotificationSink,
    patient: &Actor,
    submission_id: i64,
    doctor_id: Option<i64>,
) -> Result<usize, WorkflowError> {
    let submission = db::get_submission(conn, submission_id)?;
    if submission.patient_id != patient.profile_id {
        return Err(WorkflowError::not_found("Submission", submission_id));
    }

    let recipients = match doctor_id {
        Some(doctor_id) => {
            let user_id = linked_doctor_user_id(conn, patient.profile_id, doctor_id)?
                .ok_or_else(|| WorkflowError::not_found("doctor", doctor_id))?;
            vec![user_id]
        }
        None => linked_doctor_user_ids(conn, patient.profile_id)?,
    };

    let event = NotificationEvent::PatientFeedbackRequested {
        patient: patient.name.clone(),
        submission_id,
    };
    notifications::notify(sink, &event, &recipients);

    Ok(recipients.len())
}

/// Doctor asks a linked patient for more information on a submission.
pub fn request_patient_feedback(
    conn: &Connection,
    sink: &dyn NotificationSink,
    doctor: &Actor,
    submission_id: i64,
) -> Result<(), WorkflowError> {
    let submission = linked_submission(conn, doctor, submission_id)?;

    notifications::notify_with(sink, || {
        let patient = patient_owner(conn, submission.patient_id)?;
        let event = NotificationEvent::DoctorFeedbackRequested {
            doctor: doctor.name.clone(),
            submission_id,
        };
        Ok((event, vec![patient.user_id]))
    });
    Ok(())
}
