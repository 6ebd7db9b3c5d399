//! SQLite-backed ledger.
//!
//! Schema:
//! - `user(button_id, name, created_at)`: every rename is a new row; the most
//!   recent one wins.
//! - `mug(button_id, amount_cg, mug_at, mug_day)`: one row per claimant share.
//!   `mug_day` is the local date so per-day queries use the index.
use crate::error::StoreError;
use crate::local_day;
use carafe_traits::{BoxError, ButtonId, Ledger, LedgerEntry, Totals};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS user (
    button_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS mug (
    button_id INTEGER NOT NULL,
    amount_cg INTEGER NOT NULL,
    mug_at TEXT NOT NULL,
    mug_day TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_user_button ON user(button_id, created_at);
CREATE INDEX IF NOT EXISTS idx_mug_day ON mug(button_id, mug_day);
"#;

pub struct SqliteLedger {
    conn: Connection,
}

impl SqliteLedger {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        tracing::info!(path = %path.as_ref().display(), "ledger opened");
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn today_on(&self, button: ButtonId, day: NaiveDate) -> Result<Totals, StoreError> {
        let (count, amount): (i64, i64) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(amount_cg), 0) FROM mug WHERE button_id = ?1 AND mug_day = ?2",
            params![button, day.to_string()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(totals(count, amount))
    }

    /// Every entry of `button`, oldest first.
    pub fn entries(&self, button: ButtonId) -> Result<Vec<LedgerEntry>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT amount_cg, mug_at FROM mug WHERE button_id = ?1 ORDER BY mug_at ASC, rowid ASC",
        )?;
        let rows = stmt.query_map(params![button], |row| {
            Ok((row.get::<_, i32>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut out = Vec::new();
        for row in rows {
            let (amount_cg, mug_at) = row?;
            let at = DateTime::parse_from_rfc3339(&mug_at)
                .map_err(|e| StoreError::Timestamp(format!("{mug_at}: {e}")))?
                .with_timezone(&Utc);
            out.push(LedgerEntry {
                user: button,
                amount_cg,
                at: at.into(),
            });
        }
        Ok(out)
    }
}

fn totals(count: i64, amount_cg: i64) -> Totals {
    Totals {
        count: u32::try_from(count).unwrap_or(u32::MAX),
        amount_cg,
    }
}

impl Ledger for SqliteLedger {
    fn append(&mut self, entry: &LedgerEntry) -> Result<(), BoxError> {
        let at = DateTime::<Utc>::from(entry.at);
        self.conn
            .execute(
                "INSERT INTO mug (button_id, amount_cg, mug_at, mug_day) VALUES (?1, ?2, ?3, ?4)",
                params![
                    entry.user,
                    entry.amount_cg,
                    at.to_rfc3339(),
                    local_day(entry.at).to_string()
                ],
            )
            .map_err(StoreError::from)?;
        tracing::debug!(user = entry.user, amount_cg = entry.amount_cg, "mug recorded");
        Ok(())
    }

    fn set_name(&mut self, button: ButtonId, name: &str) -> Result<(), BoxError> {
        self.conn
            .execute(
                "INSERT INTO user (button_id, name, created_at) VALUES (?1, ?2, ?3)",
                params![button, name, Utc::now().to_rfc3339()],
            )
            .map_err(StoreError::from)?;
        Ok(())
    }

    fn name(&self, button: ButtonId) -> Result<Option<String>, BoxError> {
        let name = self
            .conn
            .query_row(
                "SELECT name FROM user WHERE button_id = ?1 ORDER BY created_at DESC, rowid DESC LIMIT 1",
                params![button],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(StoreError::from)?;
        Ok(name)
    }

    fn today(&self, button: ButtonId) -> Result<Totals, BoxError> {
        Ok(self.today_on(button, crate::local_today())?)
    }

    fn totals(&self) -> Result<Totals, BoxError> {
        let (count, amount): (i64, i64) = self
            .conn
            .query_row(
                "SELECT COUNT(*), COALESCE(SUM(amount_cg), 0) FROM mug",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map_err(StoreError::from)?;
        Ok(totals(count, amount))
    }
}
