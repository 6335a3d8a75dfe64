//! Best-effort delivery boundary between workflows and the notification store.
//!
//! A sink never reports failure to its caller: the triggering domain action
//! has already committed, and a lost notification must not undo it.

use rusqlite::Connection;

use crate::db;
use crate::models::NewNotification;

/// A rendered notification awaiting delivery.
pub type Outgoing = NewNotification;

/// Outcome of one delivery batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Ids of the stored notifications, in batch order.
    pub delivered: Vec<i64>,
    pub failed: usize,
}

pub trait NotificationSink {
    fn deliver(&self, batch: &[Outgoing]) -> DeliveryReport;
}

/// Persists into the `notifications` table on the request's connection.
/// Each insert is attempted exactly once.
pub struct StoreSink<'c> {
    conn: &'c Connection,
}

impl<'c> StoreSink<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl NotificationSink for StoreSink<'_> {
    fn deliver(&self, batch: &[Outgoing]) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        for outgoing in batch {
            match db::insert_notification(self.conn, outgoing) {
                Ok(id) => report.delivered.push(id),
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        user_id = outgoing.user_id,
                        kind = %outgoing.kind,
                        error = %e,
                        "Notification delivery failed"
                    );
                }
            }
        }
        report
    }
}
