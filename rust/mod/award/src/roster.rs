use std::collections::HashSet;
use std::sync::Arc;

use prizedesk_core::ServiceError;
use prizedesk_sql::{Row, SQLError, SQLStore, Value};
use tracing::info;

use crate::model::{
    Employee, ImportSummary, MAX_DEPARTMENT_LEN, MAX_EMPLOYEE_ID_LEN, MAX_EMPLOYEE_NAME_LEN,
    NewEmployee,
};

/// Resolve a scanned code to a rostered employee.
///
/// This is all the allocation engine needs from the roster.
pub trait RosterLookup: Send + Sync {
    fn lookup_employee(&self, code: &str) -> Result<Option<Employee>, ServiceError>;
}

/// The employee roster, stored in the `employees` table.
pub struct RosterStore {
    db: Arc<dyn SQLStore>,
}

impl RosterStore {
    /// The schema is owned by [`crate::store::init_schema`].
    pub fn new(db: Arc<dyn SQLStore>) -> Self {
        Self { db }
    }

    /// Get one employee by ID.
    pub fn get(&self, employee_id: &str) -> Result<Option<Employee>, ServiceError> {
        let rows = self
            .db
            .query(
                "SELECT employee_id, name, department, import_order FROM employees \
                 WHERE employee_id = ?1",
                &[Value::from(employee_id)],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        rows.first().map(row_to_employee).transpose()
    }

    /// All employees in import order.
    pub fn list(&self) -> Result<Vec<Employee>, ServiceError> {
        let rows = self
            .db
            .query(
                "SELECT employee_id, name, department, import_order FROM employees \
                 ORDER BY import_order ASC",
                &[],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        rows.iter().map(row_to_employee).collect()
    }

    /// Replace the whole roster in one transaction.
    ///
    /// Existing awards are deleted with the old roster: a new import starts
    /// a new draw. Rows with a blank ID or name are skipped. When an ID
    /// repeats, the later row overwrites the earlier one and counts as
    /// updated. `import_order` is the row's 1-based position in `rows`.
    ///
    /// An import with no usable rows, or with a field over its length limit,
    /// is rejected before anything is deleted.
    pub fn replace_all(&self, rows: &[NewEmployee]) -> Result<ImportSummary, ServiceError> {
        let mut summary = ImportSummary::default();
        let mut accepted = Vec::with_capacity(rows.len());

        for (i, row) in rows.iter().enumerate() {
            let id = row.employee_id.trim();
            let name = row.name.trim();
            let department = row.department.trim();
            if id.is_empty() || name.is_empty() {
                summary.skipped += 1;
                continue;
            }
            check_len(i + 1, "employee ID", id, MAX_EMPLOYEE_ID_LEN)?;
            check_len(i + 1, "name", name, MAX_EMPLOYEE_NAME_LEN)?;
            check_len(i + 1, "department", department, MAX_DEPARTMENT_LEN)?;
            accepted.push((i as i64 + 1, id, name, department));
        }

        if accepted.is_empty() {
            return Err(ServiceError::Validation(
                "roster import has no employee rows with an ID and a name".into(),
            ));
        }

        let storage = |e: SQLError| ServiceError::Storage(e.to_string());

        let tx = self.db.begin().map_err(storage)?;
        tx.exec("DELETE FROM prize_awards", &[]).map_err(storage)?;
        tx.exec("DELETE FROM employees", &[]).map_err(storage)?;

        let mut seen = HashSet::new();
        for (order, id, name, department) in accepted {
            tx.exec(
                "INSERT INTO employees (employee_id, name, department, import_order) \
                 VALUES (?1, ?2, ?3, ?4) \
                 ON CONFLICT(employee_id) DO UPDATE SET \
                 name = excluded.name, department = excluded.department, \
                 import_order = excluded.import_order",
                &[
                    Value::from(id),
                    Value::from(name),
                    Value::from(department),
                    Value::Integer(order),
                ],
            )
            .map_err(storage)?;

            if seen.insert(id) {
                summary.added += 1;
            } else {
                summary.updated += 1;
            }
        }

        tx.commit().map_err(storage)?;

        info!(
            "roster replaced: added {}, updated {}, skipped {}",
            summary.added, summary.updated, summary.skipped
        );
        Ok(summary)
    }
}

fn check_len(row: usize, field: &str, value: &str, max: usize) -> Result<(), ServiceError> {
    if value.chars().count() > max {
        return Err(ServiceError::Validation(format!(
            "row {row}: {field} is longer than {max} characters"
        )));
    }
    Ok(())
}

impl RosterLookup for RosterStore {
    fn lookup_employee(&self, code: &str) -> Result<Option<Employee>, ServiceError> {
        self.get(code)
    }
}

fn row_to_employee(row: &Row) -> Result<Employee, ServiceError> {
    let text = |name: &str| {
        row.get_str(name)
            .map(str::to_string)
            .ok_or_else(|| ServiceError::Storage(format!("missing {name} column")))
    };

    Ok(Employee {
        employee_id: text("employee_id")?,
        name: text("name")?,
        department: text("department")?,
        import_order: row
            .get_i64("import_order")
            .ok_or_else(|| ServiceError::Storage("missing import_order column".into()))?,
    })
}
