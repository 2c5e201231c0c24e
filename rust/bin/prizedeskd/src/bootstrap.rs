//! Startup checks and construction of the catalog and event gate from config.

use award::{Catalog, EventWindow, PrizeTier};
use chrono::Utc;

use crate::config::ServerConfig;

/// Refuse to start on a config that cannot serve an event.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.storage.data_dir.trim().is_empty() {
        anyhow::bail!("Storage data_dir is empty in configuration.");
    }
    build_catalog(config)?;
    Ok(())
}

/// The configured prize catalog, or the built-in one.
pub fn build_catalog(config: &ServerConfig) -> anyhow::Result<Catalog> {
    let Some(catalog) = &config.catalog else {
        return Ok(Catalog::default());
    };

    let tiers = catalog
        .tiers
        .iter()
        .map(|t| PrizeTier::new(t.name.trim(), t.amount.trim(), t.quota))
        .collect();
    Catalog::new(catalog.version, tiers)
        .map_err(|e| anyhow::anyhow!("invalid prize catalog: {}", e))
}

pub fn build_gate(config: &ServerConfig) -> EventWindow {
    EventWindow::new(config.event.ends_at.map(|t| t.with_timezone(&Utc)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CatalogConfig, EventConfig, StorageConfig, TierConfig};

    fn config(data_dir: &str, catalog: Option<CatalogConfig>) -> ServerConfig {
        ServerConfig {
            storage: StorageConfig {
                data_dir: data_dir.to_string(),
            },
            event: EventConfig::default(),
            catalog,
        }
    }

    fn tier(name: &str, quota: u32) -> TierConfig {
        TierConfig {
            name: name.to_string(),
            amount: String::new(),
            quota,
        }
    }

    #[test]
    fn empty_data_dir_is_rejected() {
        assert!(verify_config(&config("  ", None)).is_err());
        assert!(verify_config(&config("/tmp", None)).is_ok());
    }

    #[test]
    fn default_catalog_when_unset() {
        let catalog = build_catalog(&config("/tmp", None)).unwrap();
        assert_eq!(catalog.tiers().len(), Catalog::default().tiers().len());
    }

    #[test]
    fn configured_catalog() {
        let catalog = build_catalog(&config(
            "/tmp",
            Some(CatalogConfig {
                version: 7,
                tiers: vec![tier("Grand", 1), tier("Lucky", 30)],
            }),
        ))
        .unwrap();
        assert_eq!(catalog.version(), 7);
        assert_eq!(catalog.quota_for("Lucky"), 30);
    }

    #[test]
    fn invalid_catalog_fails_verification() {
        let zero = config(
            "/tmp",
            Some(CatalogConfig {
                version: 1,
                tiers: vec![tier("Grand", 0)],
            }),
        );
        assert!(verify_config(&zero).is_err());

        let empty = config(
            "/tmp",
            Some(CatalogConfig {
                version: 1,
                tiers: vec![],
            }),
        );
        assert!(verify_config(&empty).is_err());
    }

    #[test]
    fn gate_follows_event_end() {
        let mut cfg = config("/tmp", None);
        assert!(build_gate(&cfg).ends_at().is_none());

        cfg.event.ends_at = Some("2020-01-01T00:00:00+07:00".parse().unwrap());
        let gate = build_gate(&cfg);
        assert_eq!(
            gate.ends_at().unwrap().to_rfc3339(),
            "2019-12-31T17:00:00+00:00"
        );
        assert!(!gate.is_open_at(Utc::now()));
    }
}
