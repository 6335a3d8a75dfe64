use serde::{Deserialize, Serialize};

use super::enums::{AppointmentStatus, Role};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: Option<i64>,
    pub lab_id: Option<i64>,
    pub appointment_time: String,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: String,
}

/// Appointment joined with the display names of both parties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentView {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub patient_name: String,
    pub provider_name: String,
}

/// The provider side of an appointment: exactly one of doctor or lab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Doctor(i64),
    Lab(i64),
}

impl Provider {
    /// Column on `appointments` that references this provider.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Doctor(_) => "doctor_id",
            Self::Lab(_) => "lab_id",
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Self::Doctor(id) | Self::Lab(id) => *id,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Self::Doctor(_) => Role::Doctor,
            Self::Lab(_) => Role::Lab,
        }
    }
}

impl Appointment {
    pub fn provider(&self) -> Option<Provider> {
        match (self.doctor_id, self.lab_id) {
            (Some(d), None) => Some(Provider::Doctor(d)),
            (None, Some(l)) => Some(Provider::Lab(l)),
            _ => None,
        }
    }
}

/// Admin correction of an appointment. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentEdit {
    pub appointment_time: Option<String>,
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
}

impl AppointmentEdit {
    pub fn is_empty(&self) -> bool {
        self.appointment_time.is_none() && self.status.is_none() && self.notes.is_none()
    }
}
