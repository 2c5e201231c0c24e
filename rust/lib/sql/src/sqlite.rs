use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, ErrorCode};
use tracing::warn;

use crate::error::SQLError;
use crate::traits::{Row, SQLExecutor, SQLStore, SQLTransaction, Value};

/// How long a writer waits for another connection's write lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SqliteStore is a SQLStore implementation backed by rusqlite (bundled SQLite).
///
/// One store owns one connection. Several stores may open the same file; they
/// coordinate through SQLite's own locking, not through this process.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a SQLite database at the given path.
    pub fn open(path: &Path) -> Result<Self, SQLError> {
        let conn = Connection::open(path).map_err(|e| SQLError::Connection(e.to_string()))?;

        // WAL lets readers proceed while a writer holds the lock.
        conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get::<_, String>(0))
            .map_err(|e| SQLError::Connection(e.to_string()))?;
        configure(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite database (useful for tests).
    pub fn open_in_memory() -> Result<Self, SQLError> {
        let conn =
            Connection::open_in_memory().map_err(|e| SQLError::Connection(e.to_string()))?;
        configure(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SQLError> {
        self.conn
            .lock()
            .map_err(|e| SQLError::Connection(e.to_string()))
    }
}

fn configure(conn: &Connection) -> Result<(), SQLError> {
    conn.busy_timeout(BUSY_TIMEOUT)
        .map_err(|e| SQLError::Connection(e.to_string()))?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")
        .map_err(|e| SQLError::Connection(e.to_string()))
}

impl SQLExecutor for SqliteStore {
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, SQLError> {
        let conn = self.lock()?;
        query_on(&conn, sql, params)
    }

    fn exec(&self, sql: &str, params: &[Value]) -> Result<u64, SQLError> {
        let conn = self.lock()?;
        exec_on(&conn, sql, params)
    }

    fn exec_batch(&self, sql: &str) -> Result<(), SQLError> {
        self.lock()?
            .execute_batch(sql)
            .map_err(|e| classify(e, SQLError::Execution))
    }
}

impl SQLStore for SqliteStore {
    fn begin(&self) -> Result<Box<dyn SQLTransaction + '_>, SQLError> {
        let conn = self.lock()?;
        conn.execute_batch("BEGIN IMMEDIATE")
            .map_err(|e| SQLError::Execution(format!("begin: {e}")))?;
        Ok(Box::new(SqliteTransaction {
            conn,
            finished: false,
        }))
    }
}

/// A `BEGIN IMMEDIATE` transaction holding this store's connection.
struct SqliteTransaction<'a> {
    conn: MutexGuard<'a, Connection>,
    finished: bool,
}

impl SQLExecutor for SqliteTransaction<'_> {
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, SQLError> {
        query_on(&self.conn, sql, params)
    }

    fn exec(&self, sql: &str, params: &[Value]) -> Result<u64, SQLError> {
        exec_on(&self.conn, sql, params)
    }

    fn exec_batch(&self, sql: &str) -> Result<(), SQLError> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| classify(e, SQLError::Execution))
    }
}

impl SQLTransaction for SqliteTransaction<'_> {
    fn commit(mut self: Box<Self>) -> Result<(), SQLError> {
        self.conn
            .execute_batch("COMMIT")
            .map_err(|e| classify(e, SQLError::Execution))?;
        self.finished = true;
        Ok(())
    }
}

impl Drop for SqliteTransaction<'_> {
    fn drop(&mut self) {
        if self.finished || self.conn.is_autocommit() {
            return;
        }
        if let Err(e) = self.conn.execute_batch("ROLLBACK") {
            warn!("sqlite rollback failed: {e}");
        }
    }
}

/// Convert our Value enum to rusqlite's ToSql.
fn bind_params(params: &[Value]) -> Vec<Box<dyn rusqlite::types::ToSql + '_>> {
    params
        .iter()
        .map(|v| -> Box<dyn rusqlite::types::ToSql + '_> {
            match v {
                Value::Null => Box::new(rusqlite::types::Null),
                Value::Integer(i) => Box::new(*i),
                Value::Real(f) => Box::new(*f),
                Value::Text(s) => Box::new(s.as_str()),
                Value::Blob(b) => Box::new(b.as_slice()),
            }
        })
        .collect()
}

fn query_on(conn: &Connection, sql: &str, params: &[Value]) -> Result<Vec<Row>, SQLError> {
    let bound = bind_params(params);
    let param_refs: Vec<&dyn rusqlite::types::ToSql> = bound.iter().map(|b| b.as_ref()).collect();

    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| classify(e, SQLError::Query))?;

    let column_names: Vec<String> = stmt
        .column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    let rows = stmt
        .query_map(param_refs.as_slice(), |row| {
            let mut columns = Vec::with_capacity(column_names.len());
            for (i, name) in column_names.iter().enumerate() {
                columns.push((name.clone(), row_value_at(row, i)?));
            }
            Ok(Row { columns })
        })
        .map_err(|e| classify(e, SQLError::Query))?;

    rows.map(|row| row.map_err(|e| classify(e, SQLError::Query)))
        .collect()
}

fn exec_on(conn: &Connection, sql: &str, params: &[Value]) -> Result<u64, SQLError> {
    let bound = bind_params(params);
    let param_refs: Vec<&dyn rusqlite::types::ToSql> = bound.iter().map(|b| b.as_ref()).collect();

    let affected = conn
        .execute(sql, param_refs.as_slice())
        .map_err(|e| classify(e, SQLError::Execution))?;

    Ok(affected as u64)
}

/// Extract a Value from a rusqlite row at a given column index.
fn row_value_at(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Value> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Real(f),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Blob(b.to_vec()),
    })
}

/// Map constraint failures to [`SQLError::Constraint`], everything else to `other`.
fn classify(e: rusqlite::Error, other: fn(String) -> SQLError) -> SQLError {
    if e.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) {
        SQLError::Constraint(e.to_string())
    } else {
        other(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = "
        CREATE TABLE parent (id TEXT PRIMARY KEY);
        CREATE TABLE child (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            parent_id TEXT NOT NULL UNIQUE REFERENCES parent(id),
            label     TEXT
        );
    ";

    fn store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store.exec_batch(SCHEMA).unwrap();
        store
            .exec("INSERT INTO parent (id) VALUES (?1), (?2)", &["p1".into(), "p2".into()])
            .unwrap();
        store
    }

    fn child_count(db: &dyn SQLStore) -> i64 {
        db.query("SELECT COUNT(*) AS cnt FROM child", &[]).unwrap()[0]
            .get_i64("cnt")
            .unwrap()
    }

    #[test]
    fn query_returns_typed_columns() {
        let db = store();
        db.exec(
            "INSERT INTO child (parent_id, label) VALUES (?1, ?2)",
            &["p1".into(), Value::Null],
        )
        .unwrap();

        let rows = db
            .query("SELECT id, parent_id, label FROM child", &[])
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_i64("id"), Some(1));
        assert_eq!(rows[0].get_str("parent_id"), Some("p1"));
        assert_eq!(rows[0].get("label"), Some(&Value::Null));
    }

    #[test]
    fn numeric_looking_text_stays_text() {
        let db = store();
        db.exec("INSERT INTO parent (id) VALUES (?1)", &["1001".into()])
            .unwrap();
        let rows = db
            .query("SELECT id FROM parent WHERE id = ?1", &["1001".into()])
            .unwrap();
        assert_eq!(rows[0].get_str("id"), Some("1001"));
    }

    #[test]
    fn commit_makes_writes_visible() {
        let db = store();
        let tx = db.begin().unwrap();
        tx.exec("INSERT INTO child (parent_id) VALUES (?1)", &["p1".into()])
            .unwrap();
        tx.commit().unwrap();

        assert_eq!(child_count(&db), 1);
    }

    #[test]
    fn drop_without_commit_rolls_back() {
        let db = store();
        {
            let tx = db.begin().unwrap();
            tx.exec("INSERT INTO child (parent_id) VALUES (?1)", &["p1".into()])
                .unwrap();
            let inside = tx.query("SELECT COUNT(*) AS cnt FROM child", &[]).unwrap();
            assert_eq!(inside[0].get_i64("cnt"), Some(1));
        }
        assert_eq!(child_count(&db), 0);

        // The connection is usable for a new transaction afterwards.
        let tx = db.begin().unwrap();
        tx.commit().unwrap();
    }

    #[test]
    fn unique_violation_is_constraint_error() {
        let db = store();
        db.exec("INSERT INTO child (parent_id) VALUES (?1)", &["p1".into()])
            .unwrap();
        let err = db
            .exec("INSERT INTO child (parent_id) VALUES (?1)", &["p1".into()])
            .unwrap_err();
        assert!(err.is_constraint(), "got {err:?}");
    }

    #[test]
    fn foreign_key_violation_is_constraint_error() {
        let db = store();
        let err = db
            .exec("INSERT INTO child (parent_id) VALUES (?1)", &["missing".into()])
            .unwrap_err();
        assert!(err.is_constraint(), "got {err:?}");
    }

    #[test]
    fn syntax_error_is_not_constraint() {
        let db = store();
        let err = db.query("SELEC nothing", &[]).unwrap_err();
        assert!(matches!(err, SQLError::Query(_)));
    }

    #[test]
    fn constraint_inside_transaction_rolls_back_everything() {
        let db = store();
        {
            let tx = db.begin().unwrap();
            tx.exec("INSERT INTO child (parent_id) VALUES (?1)", &["p2".into()])
                .unwrap();
            let err = tx
                .exec("INSERT INTO child (parent_id) VALUES (?1)", &["p2".into()])
                .unwrap_err();
            assert!(err.is_constraint());
        }
        assert_eq!(child_count(&db), 0);
    }

    #[test]
    fn file_store_shares_data_between_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.sqlite");

        let a = SqliteStore::open(&path).unwrap();
        a.exec_batch(SCHEMA).unwrap();
        a.exec("INSERT INTO parent (id) VALUES (?1)", &["p1".into()])
            .unwrap();

        let b = SqliteStore::open(&path).unwrap();
        let tx = b.begin().unwrap();
        tx.exec("INSERT INTO child (parent_id) VALUES (?1)", &["p1".into()])
            .unwrap();
        tx.commit().unwrap();

        assert_eq!(child_count(&a), 1);
    }
}
