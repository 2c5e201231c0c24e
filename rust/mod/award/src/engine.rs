use std::sync::Arc;

use prizedesk_core::{ServiceError, now_rfc3339};
use prizedesk_sql::SQLError;
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::model::{AllocationResult, MAX_PRIZE_AMOUNT_LEN, MAX_PRIZE_NAME_LEN};
use crate::roster::RosterLookup;
use crate::store::{self, AwardStore, NewAward};

// ---------------------------------------------------------------------------
// AllocationEngine: award attempts as one check-and-insert transaction
// ---------------------------------------------------------------------------

/// Assigns prize slots to employees.
///
/// The engine keeps no counters of its own. Each attempt counts existing
/// awards inside a write transaction and inserts with the next slot number;
/// the unique indexes on `(prize_name, slot)` and `employee_id` reject any
/// insert that lost a race, so quotas and the one-prize-per-person rule hold
/// regardless of how many handlers, connections or processes award at once.
pub struct AllocationEngine {
    store: Arc<AwardStore>,
    roster: Arc<dyn RosterLookup>,
    catalog: Arc<Catalog>,
}

impl AllocationEngine {
    pub fn new(store: Arc<AwardStore>, roster: Arc<dyn RosterLookup>, catalog: Arc<Catalog>) -> Self {
        Self {
            store,
            roster,
            catalog,
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Try to award `prize_name` to the employee whose badge was scanned.
    ///
    /// Business rejections come back as `Ok(AllocationResult::..)` and leave
    /// the store unchanged. `Err` means the request itself was malformed or
    /// storage failed.
    ///
    /// Surrounding whitespace is stripped from the prize name, scanned code
    /// and amount before anything else; the catalog lookup then matches the
    /// trimmed name exactly.
    pub fn attempt_award(
        &self,
        prize_name: &str,
        prize_amount: &str,
        scanned_code: &str,
    ) -> Result<AllocationResult, ServiceError> {
        let prize_name = prize_name.trim();
        if prize_name.is_empty() {
            return Err(ServiceError::Validation("prize name is required".into()));
        }
        if prize_name.chars().count() > MAX_PRIZE_NAME_LEN {
            return Err(ServiceError::Validation(format!(
                "prize name is longer than {MAX_PRIZE_NAME_LEN} characters"
            )));
        }
        if prize_amount.trim().chars().count() > MAX_PRIZE_AMOUNT_LEN {
            return Err(ServiceError::Validation(format!(
                "prize amount is longer than {MAX_PRIZE_AMOUNT_LEN} characters"
            )));
        }

        let code = scanned_code.trim();
        if code.is_empty() {
            return Ok(AllocationResult::EmptyCode);
        }

        let Some(employee) = self.roster.lookup_employee(code)? else {
            debug!("award rejected: no employee {code}");
            return Ok(AllocationResult::EmployeeNotFound {
                code: code.to_string(),
            });
        };

        let quota = self.catalog.quota_for(prize_name);
        let prize_amount = match prize_amount.trim() {
            "" => self.catalog.display_amount_for(prize_name).unwrap_or_default(),
            amount => amount,
        };

        // Dropping `tx` on any early return rolls back.
        let tx = self.store.begin()?;

        // A prior win is reported ahead of a full quota, so re-scanning a
        // winner always names the prize they already hold.
        if let Some(existing) =
            store::find_by_employee(&*tx, &employee.employee_id).map_err(storage)?
        {
            debug!(
                "award rejected: {} already won {}",
                employee.employee_id, existing.prize_name
            );
            return Ok(AllocationResult::AlreadyWon {
                existing_prize_name: existing.prize_name,
            });
        }

        let current = store::count_for_prize(&*tx, prize_name).map_err(storage)?;
        if current >= quota {
            debug!("award rejected: {prize_name} at quota {current}/{quota}");
            return Ok(AllocationResult::QuotaExceeded {
                prize_name: prize_name.to_string(),
                quota,
                current_count: current,
            });
        }

        let new_count = current + 1;
        let awarded_at = now_rfc3339();
        let inserted = store::insert_award(
            &*tx,
            &NewAward {
                employee_id: &employee.employee_id,
                prize_name,
                prize_amount,
                slot: i64::from(new_count),
                awarded_at: &awarded_at,
            },
        );

        match inserted.and_then(|()| tx.commit()) {
            Ok(()) => {}
            Err(SQLError::Constraint(msg)) => {
                warn!(
                    "award of {prize_name} to {} lost a race: {msg}",
                    employee.employee_id
                );
                return Ok(AllocationResult::ConcurrentConflict);
            }
            Err(e) => return Err(storage(e)),
        }

        info!(
            "awarded {prize_name} to {} ({new_count}/{quota})",
            employee.employee_id
        );
        Ok(AllocationResult::Success { new_count, quota })
    }

    /// [`Self::attempt_award`], re-run once if the first attempt hit a
    /// concurrent conflict. The second run re-reads quota and prior wins, so
    /// it reports whatever the winning attempt changed.
    pub fn attempt_award_with_retry(
        &self,
        prize_name: &str,
        prize_amount: &str,
        scanned_code: &str,
    ) -> Result<AllocationResult, ServiceError> {
        match self.attempt_award(prize_name, prize_amount, scanned_code)? {
            AllocationResult::ConcurrentConflict => {
                debug!("retrying award of {prize_name} after conflict");
                self.attempt_award(prize_name, prize_amount, scanned_code)
            }
            result => Ok(result),
        }
    }
}

fn storage(e: SQLError) -> ServiceError {
    ServiceError::Storage(e.to_string())
}
