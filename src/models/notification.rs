use serde::{Deserialize, Serialize};

use super::enums::{NotificationType, RelatedType};

/// A stored notification as returned to its recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    #[serde(skip_serializing)]
    pub user_id: i64,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub related_id: Option<i64>,
    pub related_type: Option<RelatedType>,
    pub is_read: bool,
    pub created_at: String,
}

/// Insert payload for the notification store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub user_id: i64,
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub related_id: Option<i64>,
    pub related_type: Option<RelatedType>,
}
