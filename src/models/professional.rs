use serde::{Deserialize, Serialize};

use super::enums::Role;

/// A verified doctor as shown to patients for booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorListing {
    pub doctor_id: i64,
    pub name: String,
    pub specialty: String,
    pub clinic_address: Option<String>,
}

/// A verified lab as shown to patients for booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabListing {
    pub lab_id: i64,
    pub name: String,
    pub lab_address: Option<String>,
    pub available_tests: Vec<String>,
}

/// A doctor or lab profile awaiting admin verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingVerification {
    pub kind: Role,
    pub profile_id: i64,
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub created_at: String,
}

/// Patient linked to a doctor through at least one appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedPatient {
    pub patient_id: i64,
    pub name: String,
    pub email: String,
}
