use serde::{Deserialize, Serialize};

/// Nail-image analysis submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: i64,
    pub patient_id: i64,
    pub image_ref: String,
    pub ai_prediction: String,
    pub ai_confidence: f64,
    pub doctor_feedback: Option<String>,
    pub submitted_at: String,
}
