use rusqlite::{params, Connection};

use crate::db::DatabaseError;

/// Record a revoked token hash. Revoking twice is a no-op.
pub fn insert_revoked_token(
    conn: &Connection,
    token_hash: &str,
    expires_at: Option<&str>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT OR IGNORE INTO revoked_tokens (token_hash, expires_at) VALUES (?1, ?2)",
        params![token_hash, expires_at],
    )?;
    Ok(())
}

pub fn is_token_revoked(conn: &Connection, token_hash: &str) -> Result<bool, DatabaseError> {
    let found: i64 = conn.query_row(
        "SELECT COUNT(*) FROM revoked_tokens WHERE token_hash = ?1",
        params![token_hash],
        |row| row.get(0),
    )?;
    Ok(found > 0)
}

/// Drop entries whose token would have expired anyway.
pub fn purge_expired_revocations(conn: &Connection, now: &str) -> Result<usize, DatabaseError> {
    let removed = conn.execute(
        "DELETE FROM revoked_tokens WHERE expires_at IS NOT NULL AND expires_at < ?1",
        params![now],
    )?;
    Ok(removed)
}
