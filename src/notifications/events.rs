//! Semantic workflow events and their recipient-facing rendering.
//!
//! Each event renders to exactly one notification type, title and message
//! template. The same event can be rendered for several recipients.

use crate::models::enums::{NotificationType, RelatedType};
use crate::models::NewNotification;

/// Who is speaking in a provider-voiced message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderVoice {
    Doctor(String),
    Lab(String),
}

impl ProviderVoice {
    fn display(&self) -> String {
        match self {
            Self::Doctor(name) => format!("Dr. {name}"),
            Self::Lab(name) => name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NotificationEvent {
    // ── Doctor / lab audience ──
    AppointmentBooked { patient: String, appointment_id: i64 },
    LabAppointmentBooked { patient: String, appointment_id: i64 },
    SubmissionPredicted { patient: String, prediction: String, submission_id: i64 },
    PatientFeedbackRequested { patient: String, submission_id: i64 },
    LabResultForDoctor { lab: String, patient: String, lab_test_id: i64 },

    // ── Patient audience ──
    DoctorConfirmedAppointment { doctor: String, appointment_id: i64 },
    LabConfirmedAppointment { lab: String, appointment_id: i64 },
    AppointmentNotes { provider: ProviderVoice, appointment_id: i64 },
    SubmissionFeedback { doctor: String, submission_id: i64 },
    DoctorFeedbackRequested { doctor: String, submission_id: i64 },
    LabTestScheduled { lab: String, lab_test_id: i64 },
    LabResultForPatient { lab: String, lab_test_id: i64 },
    LabResultFeedback { doctor: String, lab_test_id: i64 },
    LabAppointmentRequested { lab: String, lab_test_id: i64 },
}

impl NotificationEvent {
    pub fn kind(&self) -> NotificationType {
        match self {
            Self::AppointmentBooked { .. } => NotificationType::PatientAppointmentBooked,
            Self::LabAppointmentBooked { .. } => NotificationType::PatientAppointmentBookedLab,
            Self::SubmissionPredicted { .. } => NotificationType::ModelPrediction,
            Self::PatientFeedbackRequested { .. } => NotificationType::PatientFeedbackRequest,
            Self::LabResultForDoctor { .. } | Self::LabResultForPatient { .. } => {
                NotificationType::LabResult
            }
            Self::DoctorConfirmedAppointment { .. } => NotificationType::DoctorAppointmentApproval,
            Self::LabConfirmedAppointment { .. } | Self::LabTestScheduled { .. } => {
                NotificationType::LabApproval
            }
            Self::AppointmentNotes { .. } => NotificationType::AppointmentFeedback,
            Self::SubmissionFeedback { .. } => NotificationType::DoctorFeedback,
            Self::DoctorFeedbackRequested { .. } => NotificationType::DoctorFeedbackRequest,
            Self::LabResultFeedback { .. } => NotificationType::DoctorResultFeedback,
            Self::LabAppointmentRequested { .. } => NotificationType::LabAppointmentRequest,
        }
    }

    fn related(&self) -> (i64, RelatedType) {
        match self {
            Self::AppointmentBooked { appointment_id, .. }
            | Self::LabAppointmentBooked { appointment_id, .. }
            | Self::DoctorConfirmedAppointment { appointment_id, .. }
            | Self::LabConfirmedAppointment { appointment_id, .. }
            | Self::AppointmentNotes { appointment_id, .. } => (*appointment_id, RelatedType::Appointment),

            Self::SubmissionPredicted { submission_id, .. }
            | Self::PatientFeedbackRequested { submission_id, .. }
            | Self::SubmissionFeedback { submission_id, .. }
            | Self::DoctorFeedbackRequested { submission_id, .. } => (*submission_id, RelatedType::Submission),

            Self::LabResultForDoctor { lab_test_id, .. }
            | Self::LabTestScheduled { lab_test_id, .. }
            | Self::LabResultForPatient { lab_test_id, .. }
            | Self::LabResultFeedback { lab_test_id, .. }
            | Self::LabAppointmentRequested { lab_test_id, .. } => (*lab_test_id, RelatedType::LabTest),
        }
    }

    fn title(&self) -> &'static str {
        match self {
            Self::AppointmentBooked { .. } | Self::LabAppointmentBooked { .. } => "New Appointment Booking",
            Self::SubmissionPredicted { .. } => "New Nail Analysis Submission",
            Self::PatientFeedbackRequested { .. } | Self::DoctorFeedbackRequested { .. } => {
                "Feedback Requested"
            }
            Self::LabResultForDoctor { .. } | Self::LabResultForPatient { .. } => "Lab Results Available",
            Self::DoctorConfirmedAppointment { .. } | Self::LabConfirmedAppointment { .. } => {
                "Appointment Confirmed"
            }
            Self::AppointmentNotes { .. } => "Appointment Feedback",
            Self::SubmissionFeedback { .. } => "Doctor Feedback Received",
            Self::LabTestScheduled { .. } => "Lab Test Approved",
            Self::LabResultFeedback { .. } => "Doctor Feedback on Lab Results",
            Self::LabAppointmentRequested { .. } => "Lab Appointment Request",
        }
    }

    fn message(&self) -> String {
        match self {
            Self::AppointmentBooked { patient, .. } => {
                format!("{patient} has booked an appointment with you.")
            }
            Self::LabAppointmentBooked { patient, .. } => {
                format!("{patient} has booked an appointment with your lab.")
            }
            Self::SubmissionPredicted { patient, prediction, .. } => {
                format!("{patient} has uploaded a nail image. AI prediction: {prediction}")
            }
            Self::PatientFeedbackRequested { patient, .. } => {
                format!("{patient} is requesting feedback on their submission.")
            }
            Self::LabResultForDoctor { lab, patient, .. } => {
                format!("Lab results for {patient} from {lab} are now available.")
            }
            Self::DoctorConfirmedAppointment { doctor, .. } => {
                format!("Dr. {doctor} has confirmed your appointment.")
            }
            Self::LabConfirmedAppointment { lab, .. } => {
                format!("{lab} has confirmed your appointment.")
            }
            Self::AppointmentNotes { provider, .. } => {
                format!("{} has provided feedback on your appointment.", provider.display())
            }
            Self::SubmissionFeedback { doctor, .. } => {
                format!("Dr. {doctor} has provided feedback on your nail submission.")
            }
            Self::DoctorFeedbackRequested { doctor, .. } => {
                format!("Dr. {doctor} is requesting feedback on your submission.")
            }
            Self::LabTestScheduled { lab, .. } => {
                format!("{lab} has approved your lab test request.")
            }
            Self::LabResultForPatient { lab, .. } => {
                format!("Your lab test results from {lab} are now available.")
            }
            Self::LabResultFeedback { doctor, .. } => {
                format!("Dr. {doctor} has provided feedback on your lab test results.")
            }
            Self::LabAppointmentRequested { lab, .. } => {
                format!("{lab} is requesting you to book an appointment.")
            }
        }
    }

    /// Render this event for one recipient.
    pub fn render(&self, user_id: i64) -> NewNotification {
        let (related_id, related_type) = self.related();
        NewNotification {
            user_id,
            kind: self.kind(),
            title: self.title().to_string(),
            message: self.message(),
            related_id: Some(related_id),
            related_type: Some(related_type),
        }
    }
}
