use std::sync::Arc;

use prizedesk_core::ServiceError;

use crate::catalog::Catalog;
use crate::model::{PrizeAward, PrizeTally, SelfCheck};
use crate::roster::RosterStore;
use crate::store::AwardStore;

/// Read paths over the award table: live tallies, the leaderboard and the
/// public "did I win" check. Nothing here writes.
pub struct AwardQuery {
    store: Arc<AwardStore>,
    roster: Arc<RosterStore>,
    catalog: Arc<Catalog>,
}

impl AwardQuery {
    pub fn new(store: Arc<AwardStore>, roster: Arc<RosterStore>, catalog: Arc<Catalog>) -> Self {
        Self {
            store,
            roster,
            catalog,
        }
    }

    /// Employee IDs that won `prize_name`, most recent first.
    pub fn winners_for_prize(&self, prize_name: &str) -> Result<Vec<String>, ServiceError> {
        self.store.winners_for_prize(prize_name.trim())
    }

    /// Every award, by prize name, most recent first within each prize.
    pub fn all_winners(&self) -> Result<Vec<PrizeAward>, ServiceError> {
        self.store.all()
    }

    pub fn find_award_by_employee(
        &self,
        employee_id: &str,
    ) -> Result<Option<PrizeAward>, ServiceError> {
        self.store.find_by_employee(employee_id.trim())
    }

    /// Award and display name for the public lookup page.
    pub fn self_check(&self, employee_id: &str) -> Result<SelfCheck, ServiceError> {
        let employee_id = employee_id.trim();
        if employee_id.is_empty() {
            return Err(ServiceError::Validation("employee ID is required".into()));
        }

        let award = self.store.find_by_employee(employee_id)?;
        let employee_name = self.roster.get(employee_id)?.map(|e| e.name);

        Ok(SelfCheck {
            employee_id: employee_id.to_string(),
            employee_name,
            award,
        })
    }

    /// Awarded and remaining counts for each catalog tier, in catalog order.
    pub fn tally(&self) -> Result<Vec<PrizeTally>, ServiceError> {
        let counts = self.store.counts_by_prize()?;

        Ok(self
            .catalog
            .tiers()
            .iter()
            .map(|tier| {
                let awarded = counts.get(&tier.name).copied().unwrap_or(0);
                PrizeTally {
                    prize_name: tier.name.clone(),
                    display_amount: tier.amount.clone(),
                    quota: tier.quota,
                    awarded,
                    remaining: tier.quota.saturating_sub(awarded),
                }
            })
            .collect())
    }
}
