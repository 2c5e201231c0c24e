use std::collections::HashMap;
use std::sync::Arc;

use prizedesk_core::ServiceError;
use prizedesk_sql::{Row, SQLError, SQLExecutor, SQLStore, SQLTransaction, Value};

use crate::model::PrizeAward;

/// SQL schema for the roster and award tables.
///
/// The unique indexes are the authoritative guards for the award rules:
/// - `employee_id` UNIQUE: an employee holds at most one prize.
/// - `(prize_name, slot)` UNIQUE: two attempts that both counted N existing
///   awards both write slot N+1, and only one of them can commit.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS employees (
    employee_id   TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    department    TEXT NOT NULL,
    import_order  INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_employee_import_order ON employees(import_order);

CREATE TABLE IF NOT EXISTS prize_awards (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    employee_id   TEXT NOT NULL REFERENCES employees(employee_id),
    prize_name    TEXT NOT NULL,
    prize_amount  TEXT NOT NULL,
    slot          INTEGER NOT NULL CHECK (slot >= 1),
    awarded_at    TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_award_employee ON prize_awards(employee_id);
CREATE UNIQUE INDEX IF NOT EXISTS idx_award_prize_slot ON prize_awards(prize_name, slot);
CREATE INDEX IF NOT EXISTS idx_award_prize_time ON prize_awards(prize_name, awarded_at);
";

const AWARD_COLUMNS: &str = "id, employee_id, prize_name, prize_amount, slot, awarded_at";

/// Create both tables and their indexes if missing.
pub fn init_schema(db: &dyn SQLStore) -> Result<(), ServiceError> {
    db.exec_batch(SCHEMA)
        .map_err(|e| ServiceError::Storage(format!("award schema init: {e}")))
}

/// An award about to be inserted.
pub(crate) struct NewAward<'a> {
    pub employee_id: &'a str,
    pub prize_name: &'a str,
    pub prize_amount: &'a str,
    pub slot: i64,
    pub awarded_at: &'a str,
}

/// Persistent storage for prize awards, backed by SQLStore (SQLite).
pub struct AwardStore {
    db: Arc<dyn SQLStore>,
}

impl AwardStore {
    /// Create a new AwardStore and initialise the schema.
    pub fn new(db: Arc<dyn SQLStore>) -> Result<Self, ServiceError> {
        init_schema(db.as_ref())?;
        Ok(Self { db })
    }

    /// Open a write transaction for one allocation.
    pub(crate) fn begin(&self) -> Result<Box<dyn SQLTransaction + '_>, ServiceError> {
        self.db
            .begin()
            .map_err(|e| ServiceError::Storage(e.to_string()))
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Employee IDs that won `prize_name`, most recent first.
    pub fn winners_for_prize(&self, prize_name: &str) -> Result<Vec<String>, ServiceError> {
        let rows = self
            .db
            .query(
                "SELECT employee_id FROM prize_awards WHERE prize_name = ?1 \
                 ORDER BY awarded_at DESC, id DESC",
                &[Value::from(prize_name)],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        rows.iter()
            .map(|row| {
                row.get_str("employee_id")
                    .map(str::to_string)
                    .ok_or_else(|| ServiceError::Storage("missing employee_id column".into()))
            })
            .collect()
    }

    /// Every award, grouped by prize name, most recent first within a prize.
    pub fn all(&self) -> Result<Vec<PrizeAward>, ServiceError> {
        let rows = self
            .db
            .query(
                &format!(
                    "SELECT {AWARD_COLUMNS} FROM prize_awards \
                     ORDER BY prize_name ASC, awarded_at DESC, id DESC"
                ),
                &[],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        rows.iter().map(row_to_award).collect()
    }

    /// The award held by an employee, if any.
    pub fn find_by_employee(&self, employee_id: &str) -> Result<Option<PrizeAward>, ServiceError> {
        find_by_employee(self.db.as_ref(), employee_id)
            .map_err(|e| ServiceError::Storage(e.to_string()))
    }

    /// Award count per prize name.
    pub fn counts_by_prize(&self) -> Result<HashMap<String, u32>, ServiceError> {
        let rows = self
            .db
            .query(
                "SELECT prize_name, COUNT(*) AS cnt FROM prize_awards GROUP BY prize_name",
                &[],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        Ok(rows
            .iter()
            .filter_map(|row| {
                let name = row.get_str("prize_name")?;
                let count = row.get_i64("cnt")?;
                Some((name.to_string(), count as u32))
            })
            .collect())
    }

    /// Number of awards issued for `prize_name`.
    pub fn count_for_prize(&self, prize_name: &str) -> Result<u32, ServiceError> {
        count_for_prize(self.db.as_ref(), prize_name)
            .map_err(|e| ServiceError::Storage(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Statement helpers, usable on the store or inside a transaction
// ---------------------------------------------------------------------------

pub(crate) fn count_for_prize<E>(db: &E, prize_name: &str) -> Result<u32, SQLError>
where
    E: SQLExecutor + ?Sized,
{
    let rows = db.query(
        "SELECT COUNT(*) AS cnt FROM prize_awards WHERE prize_name = ?1",
        &[Value::from(prize_name)],
    )?;
    Ok(rows.first().and_then(|r| r.get_i64("cnt")).unwrap_or(0) as u32)
}

pub(crate) fn find_by_employee<E>(db: &E, employee_id: &str) -> Result<Option<PrizeAward>, SQLError>
where
    E: SQLExecutor + ?Sized,
{
    let rows = db.query(
        &format!("SELECT {AWARD_COLUMNS} FROM prize_awards WHERE employee_id = ?1"),
        &[Value::from(employee_id)],
    )?;
    match rows.first() {
        Some(row) => row_to_award(row)
            .map(Some)
            .map_err(|e| SQLError::Query(e.to_string())),
        None => Ok(None),
    }
}

pub(crate) fn insert_award<E>(db: &E, award: &NewAward<'_>) -> Result<(), SQLError>
where
    E: SQLExecutor + ?Sized,
{
    db.exec(
        "INSERT INTO prize_awards (employee_id, prize_name, prize_amount, slot, awarded_at) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        &[
            Value::from(award.employee_id),
            Value::from(award.prize_name),
            Value::from(award.prize_amount),
            Value::Integer(award.slot),
            Value::from(award.awarded_at),
        ],
    )?;
    Ok(())
}

fn row_to_award(row: &Row) -> Result<PrizeAward, ServiceError> {
    let text = |name: &str| {
        row.get_str(name)
            .map(str::to_string)
            .ok_or_else(|| ServiceError::Storage(format!("missing {name} column")))
    };
    let int = |name: &str| {
        row.get_i64(name)
            .ok_or_else(|| ServiceError::Storage(format!("missing {name} column")))
    };

    Ok(PrizeAward {
        id: int("id")?,
        employee_id: text("employee_id")?,
        prize_name: text("prize_name")?,
        prize_amount: text("prize_amount")?,
        slot: int("slot")?,
        awarded_at: text("awarded_at")?,
    })
}
