use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(Role {
    Patient => "patient",
    Doctor => "doctor",
    Lab => "lab",
    Admin => "admin",
});

impl Role {
    pub const ALL: [Role; 4] = [Role::Patient, Role::Doctor, Role::Lab, Role::Admin];

    /// URL scope segment (`/api/{role}s/...`).
    pub fn scope(&self) -> &'static str {
        match self {
            Self::Patient => "patients",
            Self::Doctor => "doctors",
            Self::Lab => "labs",
            Self::Admin => "admins",
        }
    }

    /// Table holding the role profile, if the role has one.
    pub fn profile_table(&self) -> Option<&'static str> {
        match self {
            Self::Patient => Some("patients"),
            Self::Doctor => Some("doctors"),
            Self::Lab => Some("labs"),
            Self::Admin => None,
        }
    }
}

str_enum!(AppointmentStatus {
    Pending => "pending",
    Confirmed => "confirmed",
    Completed => "completed",
    Cancelled => "cancelled",
});

str_enum!(LabTestStatus {
    Requested => "requested",
    Scheduled => "scheduled",
    Completed => "completed",
    Cancelled => "cancelled",
});

str_enum!(NotificationType {
    // Patient-facing
    DoctorFeedback => "doctor_feedback",
    LabApproval => "lab_approval",
    DoctorAppointmentApproval => "doctor_appointment_approval",
    AppointmentFeedback => "appointment_feedback",
    DoctorResultFeedback => "doctor_result_feedback",
    LabResult => "lab_result",
    DoctorFeedbackRequest => "doctor_feedback_request",
    LabAppointmentRequest => "lab_appointment_request",
    // Doctor-facing
    PatientAppointmentBooked => "patient_appointment_booked",
    ModelPrediction => "model_prediction",
    PatientFeedbackRequest => "patient_feedback_request",
    // Lab-facing
    PatientAppointmentBookedLab => "patient_appointment_booked_lab",
});

str_enum!(RelatedType {
    Appointment => "appointment",
    Submission => "submission",
    LabTest => "lab_test",
});
