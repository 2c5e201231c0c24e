use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Quota applied to prize names the catalog does not list.
///
/// Unlisted names are accepted so staff can run an ad-hoc prize, but each
/// one can be awarded only once. Deployments that want to refuse unknown
/// prizes should check [`Catalog::contains`] before awarding.
pub const DEFAULT_QUOTA: u32 = 1;

/// One prize tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrizeTier {
    pub name: String,
    /// Display text shown with the prize, e.g. "เงินรางวัล 10,000 บาท".
    pub amount: String,
    /// Maximum number of awards ever issued for this prize.
    pub quota: u32,
}

impl PrizeTier {
    pub fn new(name: &str, amount: &str, quota: u32) -> Self {
        Self {
            name: name.to_string(),
            amount: amount.to_string(),
            quota,
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog has no prize tiers")]
    Empty,

    #[error("prize tier #{0} has an empty name")]
    EmptyName(usize),

    #[error("prize tier '{0}' is listed more than once")]
    Duplicate(String),

    #[error("prize tier '{0}' has quota 0")]
    ZeroQuota(String),
}

/// The fixed table of prize tiers for one event.
///
/// Built once at startup and shared read-only; there are no mutation
/// operations. `version` identifies which table a deployment ran with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    version: u32,
    tiers: Vec<PrizeTier>,
}

impl Catalog {
    /// Validate and build a catalog. Tier order is display order.
    pub fn new(version: u32, tiers: Vec<PrizeTier>) -> Result<Self, CatalogError> {
        if tiers.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for (i, tier) in tiers.iter().enumerate() {
            if tier.name.trim().is_empty() {
                return Err(CatalogError::EmptyName(i + 1));
            }
            if tier.quota == 0 {
                return Err(CatalogError::ZeroQuota(tier.name.clone()));
            }
            if !seen.insert(tier.name.as_str()) {
                return Err(CatalogError::Duplicate(tier.name.clone()));
            }
        }

        Ok(Self { version, tiers })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn tiers(&self) -> &[PrizeTier] {
        &self.tiers
    }

    pub fn get(&self, prize_name: &str) -> Option<&PrizeTier> {
        self.tiers.iter().find(|t| t.name == prize_name)
    }

    pub fn contains(&self, prize_name: &str) -> bool {
        self.get(prize_name).is_some()
    }

    /// Quota for a prize, by exact name match. Unlisted names get [`DEFAULT_QUOTA`].
    pub fn quota_for(&self, prize_name: &str) -> u32 {
        match self.get(prize_name) {
            Some(tier) => tier.quota,
            None => {
                warn!("prize '{prize_name}' is not in catalog v{}, using quota {DEFAULT_QUOTA}", self.version);
                DEFAULT_QUOTA
            }
        }
    }

    pub fn display_amount_for(&self, prize_name: &str) -> Option<&str> {
        self.get(prize_name).map(|t| t.amount.as_str())
    }
}

impl Default for Catalog {
    /// The four tiers of the staff party draw.
    fn default() -> Self {
        Self {
            version: 1,
            tiers: vec![
                PrizeTier::new("รางวัลที่ 1", "เงินรางวัล 10,000 บาท", 1),
                PrizeTier::new("รางวัลที่ 2", "เงินรางวัล 8,000 บาท", 1),
                PrizeTier::new("รางวัลที่ 3", "เงินรางวัล 6,000 บาท", 10),
                PrizeTier::new("รางวัลที่ 4", "เงินรางวัล 5,000 บาท", 20),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_quotas() {
        let catalog = Catalog::default();
        assert_eq!(catalog.quota_for("รางวัลที่ 1"), 1);
        assert_eq!(catalog.quota_for("รางวัลที่ 2"), 1);
        assert_eq!(catalog.quota_for("รางวัลที่ 3"), 10);
        assert_eq!(catalog.quota_for("รางวัลที่ 4"), 20);
        assert_eq!(catalog.tiers().len(), 4);
    }

    #[test]
    fn unlisted_prize_gets_default_quota() {
        let catalog = Catalog::default();
        assert!(!catalog.contains("Lucky bonus"));
        assert_eq!(catalog.quota_for("Lucky bonus"), DEFAULT_QUOTA);
        assert_eq!(catalog.display_amount_for("Lucky bonus"), None);
    }

    #[test]
    fn lookup_is_exact_match() {
        let catalog = Catalog::default();
        assert_eq!(catalog.quota_for("รางวัลที่ 3 "), DEFAULT_QUOTA);
        assert_eq!(
            catalog.display_amount_for("รางวัลที่ 3"),
            Some("เงินรางวัล 6,000 บาท")
        );
    }

    #[test]
    fn rejects_invalid_tables() {
        assert_eq!(Catalog::new(1, vec![]), Err(CatalogError::Empty));
        assert_eq!(
            Catalog::new(1, vec![PrizeTier::new(" ", "x", 1)]),
            Err(CatalogError::EmptyName(1))
        );
        assert_eq!(
            Catalog::new(1, vec![PrizeTier::new("A", "x", 0)]),
            Err(CatalogError::ZeroQuota("A".into()))
        );
        assert_eq!(
            Catalog::new(
                2,
                vec![PrizeTier::new("A", "x", 1), PrizeTier::new("A", "y", 3)]
            ),
            Err(CatalogError::Duplicate("A".into()))
        );
    }

    #[test]
    fn custom_catalog_keeps_version_and_order() {
        let catalog = Catalog::new(
            7,
            vec![PrizeTier::new("Grand", "TV", 1), PrizeTier::new("Minor", "Mug", 50)],
        )
        .unwrap();
        assert_eq!(catalog.version(), 7);
        assert_eq!(catalog.tiers()[1].name, "Minor");
        assert_eq!(catalog.quota_for("Minor"), 50);
    }
}
