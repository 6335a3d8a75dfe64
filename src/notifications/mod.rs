//! Notification engine: the recipient-facing inbox.
//!
//! Writes come from workflows through a [`NotificationSink`]; reads are
//! polled by clients. Notifications are append-only; only `is_read` changes,
//! and every read-state operation is gated by recipient ownership.

pub mod events;
pub mod sink;

use rusqlite::Connection;

use crate::config::{DEFAULT_NOTIFICATION_LIMIT, MAX_NOTIFICATION_LIMIT};
use crate::db::{self, DatabaseError};
use crate::models::{NewNotification, Notification};

pub use events::{NotificationEvent, ProviderVoice};
pub use sink::{DeliveryReport, NotificationSink, Outgoing, StoreSink};

/// Store one notification. No deduplication.
pub fn create_notification(conn: &Connection, new: &NewNotification) -> Result<i64, DatabaseError> {
    db::insert_notification(conn, new)
}

/// Effective page size: default when absent, clamped to `1..=MAX`.
pub fn clamp_limit(limit: Option<u32>) -> u32 {
    limit
        .unwrap_or(DEFAULT_NOTIFICATION_LIMIT)
        .clamp(1, MAX_NOTIFICATION_LIMIT)
}

/// Recipient's notifications, newest first (ties broken by id).
pub fn list_notifications(
    conn: &Connection,
    user_id: i64,
    unread_only: bool,
    limit: Option<u32>,
) -> Result<Vec<Notification>, DatabaseError> {
    db::select_notifications(conn, user_id, unread_only, clamp_limit(limit))
}

/// Mark one notification read. `false` when it does not exist or belongs to
/// another user; the two cases are indistinguishable to the caller.
pub fn mark_as_read(conn: &Connection, id: i64, user_id: i64) -> Result<bool, DatabaseError> {
    db::set_notification_read(conn, id, user_id)
}

pub fn mark_all_as_read(conn: &Connection, user_id: i64) -> Result<usize, DatabaseError> {
    db::set_all_notifications_read(conn, user_id)
}

/// Same predicate as `list_notifications(.., unread_only = true, ..)`.
pub fn unread_count(conn: &Connection, user_id: i64) -> Result<i64, DatabaseError> {
    db::count_unread_notifications(conn, user_id)
}

/// Render `event` once per distinct recipient and hand the batch to `sink`.
pub fn notify(
    sink: &dyn NotificationSink,
    event: &NotificationEvent,
    recipients: &[i64],
) -> DeliveryReport {
    let mut seen = Vec::with_capacity(recipients.len());
    for &user_id in recipients {
        if !seen.contains(&user_id) {
            seen.push(user_id);
        }
    }
    if seen.is_empty() {
        return DeliveryReport::default();
    }

    let batch: Vec<Outgoing> = seen.iter().map(|&id| event.render(id)).collect();
    let report = sink.deliver(&batch);
    tracing::debug!(
        kind = %event.kind(),
        delivered = report.delivered.len(),
        failed = report.failed,
        "Notifications dispatched"
    );
    report
}

/// Like [`notify`], but the event and its recipients are looked up inside
/// the best-effort boundary. Callers use it after their write has committed:
/// a failed lookup is logged and sends nothing instead of failing the action.
pub fn notify_with<F>(sink: &dyn NotificationSink, resolve: F) -> DeliveryReport
where
    F: FnOnce() -> Result<(NotificationEvent, Vec<i64>), DatabaseError>,
{
    match resolve() {
        Ok((event, recipients)) => notify(sink, &event, &recipients),
        Err(e) => {
            tracing::warn!(error = %e, "Notification recipients could not be resolved");
            DeliveryReport::default()
        }
    }
}
