use serde::{Deserialize, Serialize};

use super::enums::LabTestStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabTest {
    pub id: i64,
    pub patient_id: i64,
    pub lab_id: i64,
    pub requested_by_doctor_id: i64,
    pub test_type: String,
    pub status: LabTestStatus,
    pub results_ref: Option<String>,
    pub doctor_feedback: Option<String>,
    pub requested_at: String,
}

/// Admin correction of a lab test, e.g. cancelling it or clearing a corrupt
/// results reference (send an empty string). Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabTestEdit {
    pub test_type: Option<String>,
    pub status: Option<LabTestStatus>,
    pub results_ref: Option<String>,
}

impl LabTestEdit {
    pub fn is_empty(&self) -> bool {
        self.test_type.is_none() && self.status.is_none() && self.results_ref.is_none()
    }
}
