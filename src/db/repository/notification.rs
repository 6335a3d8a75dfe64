use std::str::FromStr;

use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_notification(conn: &Connection, new: &NewNotification) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO notifications (user_id, type, title, message, related_id, related_type)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            new.user_id,
            new.kind.as_str(),
            new.title,
            new.message,
            new.related_id,
            new.related_type.map(|t| t.as_str()),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Recipient's notifications, newest first. `limit` is applied as given.
pub fn select_notifications(
    conn: &Connection,
    user_id: i64,
    unread_only: bool,
    limit: u32,
) -> Result<Vec<Notification>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, type, title, message, related_id, related_type, is_read, created_at
         FROM notifications
         WHERE user_id = ?1 AND (?2 = 0 OR is_read = 0)
         ORDER BY created_at DESC, id DESC
         LIMIT ?3",
    )?;

    let rows = stmt.query_map(params![user_id, unread_only, limit], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, Option<i64>>(5)?,
            row.get::<_, Option<String>>(6)?,
            row.get::<_, bool>(7)?,
            row.get::<_, String>(8)?,
        ))
    })?;

    let mut notifications = Vec::new();
    for row in rows {
        let (id, user_id, kind, title, message, related_id, related_type, is_read, created_at) = row?;
        notifications.push(Notification {
            id,
            user_id,
            kind: NotificationType::from_str(&kind)?,
            title,
            message,
            related_id,
            related_type: related_type.as_deref().map(RelatedType::from_str).transpose()?,
            is_read,
            created_at,
        });
    }
    Ok(notifications)
}

/// Set `is_read` on a notification owned by `user_id`. Returns false when
/// the id does not exist or belongs to someone else.
pub fn set_notification_read(conn: &Connection, id: i64, user_id: i64) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "UPDATE notifications SET is_read = 1 WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
    )?;
    Ok(changed > 0)
}

/// Mark every unread notification of the recipient read; returns how many flipped.
pub fn set_all_notifications_read(conn: &Connection, user_id: i64) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE notifications SET is_read = 1 WHERE user_id = ?1 AND is_read = 0",
        params![user_id],
    )?;
    Ok(changed)
}

pub fn count_unread_notifications(conn: &Connection, user_id: i64) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM notifications WHERE user_id = ?1 AND is_read = 0",
        params![user_id],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(count)
}
