//! SQLite-backed snapshot store implementation.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::ticket::TicketStatus;

use super::{
    ClearedSnapshot, PendingCheckIn, SnapshotEntry, SnapshotError, SnapshotInfo, SnapshotStore,
};

/// SQLite-backed snapshot and pending-queue store.
pub struct SqliteSnapshotStore {
    conn: Mutex<Connection>,
}

impl SqliteSnapshotStore {
    /// Create a new store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, SnapshotError> {
        let conn = Connection::open(path).map_err(|e| SnapshotError::Storage(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, SnapshotError> {
        let conn =
            Connection::open_in_memory().map_err(|e| SnapshotError::Storage(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), SnapshotError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS snapshot_meta (
                event_id TEXT PRIMARY KEY,
                downloaded_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS snapshot_entries (
                event_id TEXT NOT NULL,
                code TEXT NOT NULL,
                status TEXT NOT NULL,
                participant_name TEXT NOT NULL,
                ticket_category_name TEXT,
                PRIMARY KEY (event_id, code)
            );

            CREATE TABLE IF NOT EXISTS pending_checkins (
                sequence_no INTEGER PRIMARY KEY AUTOINCREMENT,
                event_id TEXT NOT NULL,
                code TEXT NOT NULL,
                scanned_at TEXT NOT NULL,
                UNIQUE (event_id, code)
            );

            CREATE INDEX IF NOT EXISTS idx_pending_checkins_event ON pending_checkins(event_id);
            "#,
        )
        .map_err(|e| SnapshotError::Storage(e.to_string()))?;

        Ok(())
    }

    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<(String, String, Option<String>)> {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?))
    }

    fn parse_status(raw: &str) -> Result<TicketStatus, SnapshotError> {
        TicketStatus::parse(raw)
            .ok_or_else(|| SnapshotError::Storage(format!("Unknown ticket status: {}", raw)))
    }

    fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, SnapshotError> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| SnapshotError::Storage(format!("Invalid timestamp: {}", e)))
    }
}

impl SnapshotStore for SqliteSnapshotStore {
    fn replace_snapshot(
        &self,
        event_id: &str,
        entries: &[SnapshotEntry],
        downloaded_at: DateTime<Utc>,
    ) -> Result<SnapshotInfo, SnapshotError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn
            .transaction()
            .map_err(|e| SnapshotError::Storage(e.to_string()))?;

        tx.execute(
            "DELETE FROM snapshot_entries WHERE event_id = ?",
            params![event_id],
        )
        .map_err(|e| SnapshotError::Storage(e.to_string()))?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO snapshot_entries (event_id, code, status, participant_name, ticket_category_name) VALUES (?, ?, ?, ?, ?)",
                )
                .map_err(|e| SnapshotError::Storage(e.to_string()))?;

            for entry in entries {
                stmt.execute(params![
                    event_id,
                    entry.code,
                    entry.status.as_str(),
                    entry.participant_name,
                    entry.ticket_category_name,
                ])
                .map_err(|e| SnapshotError::Storage(e.to_string()))?;
            }
        }

        tx.execute(
            "INSERT INTO snapshot_meta (event_id, downloaded_at) VALUES (?, ?)
             ON CONFLICT(event_id) DO UPDATE SET downloaded_at = excluded.downloaded_at",
            params![event_id, downloaded_at.to_rfc3339()],
        )
        .map_err(|e| SnapshotError::Storage(e.to_string()))?;

        tx.commit()
            .map_err(|e| SnapshotError::Storage(e.to_string()))?;

        Ok(SnapshotInfo {
            event_id: event_id.to_string(),
            downloaded_at,
            ticket_count: entries.len(),
        })
    }

    fn clear_snapshot(&self, event_id: &str) -> Result<ClearedSnapshot, SnapshotError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn
            .transaction()
            .map_err(|e| SnapshotError::Storage(e.to_string()))?;

        let dropped_pending = tx
            .execute(
                "DELETE FROM pending_checkins WHERE event_id = ?",
                params![event_id],
            )
            .map_err(|e| SnapshotError::Storage(e.to_string()))?;

        tx.execute(
            "DELETE FROM snapshot_entries WHERE event_id = ?",
            params![event_id],
        )
        .map_err(|e| SnapshotError::Storage(e.to_string()))?;

        tx.execute(
            "DELETE FROM snapshot_meta WHERE event_id = ?",
            params![event_id],
        )
        .map_err(|e| SnapshotError::Storage(e.to_string()))?;

        tx.commit()
            .map_err(|e| SnapshotError::Storage(e.to_string()))?;

        Ok(ClearedSnapshot {
            event_id: event_id.to_string(),
            dropped_pending,
        })
    }

    fn snapshot_info(&self, event_id: &str) -> Result<Option<SnapshotInfo>, SnapshotError> {
        let conn = self.conn.lock().unwrap();

        let downloaded_at: Option<String> = conn
            .query_row(
                "SELECT downloaded_at FROM snapshot_meta WHERE event_id = ?",
                params![event_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| SnapshotError::Storage(e.to_string()))?;

        let Some(downloaded_at) = downloaded_at else {
            return Ok(None);
        };

        let ticket_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM snapshot_entries WHERE event_id = ?",
                params![event_id],
                |row| row.get(0),
            )
            .map_err(|e| SnapshotError::Storage(e.to_string()))?;

        Ok(Some(SnapshotInfo {
            event_id: event_id.to_string(),
            downloaded_at: Self::parse_timestamp(&downloaded_at)?,
            ticket_count: ticket_count as usize,
        }))
    }

    fn entry(&self, event_id: &str, code: &str) -> Result<Option<SnapshotEntry>, SnapshotError> {
        let conn = self.conn.lock().unwrap();

        let row = conn
            .query_row(
                "SELECT status, participant_name, ticket_category_name FROM snapshot_entries WHERE event_id = ? AND code = ?",
                params![event_id, code],
                Self::row_to_entry,
            )
            .optional()
            .map_err(|e| SnapshotError::Storage(e.to_string()))?;

        let Some((status, participant_name, ticket_category_name)) = row else {
            return Ok(None);
        };

        Ok(Some(SnapshotEntry {
            code: code.to_string(),
            status: Self::parse_status(&status)?,
            participant_name,
            ticket_category_name,
        }))
    }

    fn admit(
        &self,
        event_id: &str,
        code: &str,
        scanned_at: DateTime<Utc>,
    ) -> Result<PendingCheckIn, SnapshotError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn
            .transaction()
            .map_err(|e| SnapshotError::Storage(e.to_string()))?;

        let status: Option<String> = tx
            .query_row(
                "SELECT status FROM snapshot_entries WHERE event_id = ? AND code = ?",
                params![event_id, code],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| SnapshotError::Storage(e.to_string()))?;

        let Some(status) = status else {
            return Err(SnapshotError::NotAdmissible {
                code: code.to_string(),
                reason: "not in snapshot".to_string(),
            });
        };

        let status = Self::parse_status(&status)?;
        if !status.can_check_in() {
            return Err(SnapshotError::NotAdmissible {
                code: code.to_string(),
                reason: status.as_str().to_string(),
            });
        }

        // The queue must never hold two entries for the same code from this
        // device, even across a snapshot re-download that reset the entry's
        // local status.
        let already_pending: Option<i64> = tx
            .query_row(
                "SELECT sequence_no FROM pending_checkins WHERE event_id = ? AND code = ?",
                params![event_id, code],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| SnapshotError::Storage(e.to_string()))?;

        if already_pending.is_some() {
            return Err(SnapshotError::NotAdmissible {
                code: code.to_string(),
                reason: "pending admission exists".to_string(),
            });
        }

        tx.execute(
            "UPDATE snapshot_entries SET status = 'used' WHERE event_id = ? AND code = ?",
            params![event_id, code],
        )
        .map_err(|e| SnapshotError::Storage(e.to_string()))?;

        tx.execute(
            "INSERT INTO pending_checkins (event_id, code, scanned_at) VALUES (?, ?, ?)",
            params![event_id, code, scanned_at.to_rfc3339()],
        )
        .map_err(|e| SnapshotError::Storage(e.to_string()))?;

        let sequence_no = tx.last_insert_rowid();

        tx.commit()
            .map_err(|e| SnapshotError::Storage(e.to_string()))?;

        Ok(PendingCheckIn {
            sequence_no,
            code: code.to_string(),
            scanned_at,
        })
    }

    fn pending(&self, event_id: &str) -> Result<Vec<PendingCheckIn>, SnapshotError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare(
                "SELECT sequence_no, code, scanned_at FROM pending_checkins WHERE event_id = ? ORDER BY sequence_no ASC",
            )
            .map_err(|e| SnapshotError::Storage(e.to_string()))?;

        let rows = stmt
            .query_map(params![event_id], |row| {
                let sequence_no: i64 = row.get(0)?;
                let code: String = row.get(1)?;
                let scanned_at: String = row.get(2)?;
                Ok((sequence_no, code, scanned_at))
            })
            .map_err(|e| SnapshotError::Storage(e.to_string()))?;

        let mut entries = Vec::new();
        for row_result in rows {
            let (sequence_no, code, scanned_at) =
                row_result.map_err(|e| SnapshotError::Storage(e.to_string()))?;
            entries.push(PendingCheckIn {
                sequence_no,
                code,
                scanned_at: Self::parse_timestamp(&scanned_at)?,
            });
        }

        Ok(entries)
    }

    fn pending_count(&self, event_id: &str) -> Result<usize, SnapshotError> {
        let conn = self.conn.lock().unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM pending_checkins WHERE event_id = ?",
                params![event_id],
                |row| row.get(0),
            )
            .map_err(|e| SnapshotError::Storage(e.to_string()))?;

        Ok(count as usize)
    }

    fn remove_pending(&self, event_id: &str, sequence_no: i64) -> Result<(), SnapshotError> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "DELETE FROM pending_checkins WHERE event_id = ? AND sequence_no = ?",
            params![event_id, sequence_no],
        )
        .map_err(|e| SnapshotError::Storage(e.to_string()))?;

        Ok(())
    }
}
