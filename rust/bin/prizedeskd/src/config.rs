//! Server configuration, read from `/etc/prizedesk/<name>.toml`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

/// Top-level server configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub storage: StorageConfig,

    #[serde(default)]
    pub event: EventConfig,

    /// Prize tiers. The built-in catalog is used when absent.
    #[serde(default)]
    pub catalog: Option<CatalogConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventConfig {
    /// End of the event as a quoted RFC 3339 string. Awards and roster
    /// imports are refused afterwards. Unset means no end.
    #[serde(default)]
    pub ends_at: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_version")]
    pub version: u32,
    #[serde(default)]
    pub tiers: Vec<TierConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TierConfig {
    pub name: String,
    #[serde(default)]
    pub amount: String,
    pub quota: u32,
}

fn default_catalog_version() -> u32 {
    1
}

impl ServerConfig {
    /// Resolve a context name or path to a config file.
    ///
    /// Anything containing `/` or `.` is taken as a path; a bare name maps
    /// to `/etc/prizedesk/<name>.toml`.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from(format!("/etc/prizedesk/{name_or_path}.toml"))
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_name_and_path() {
        assert_eq!(
            ServerConfig::resolve_path("party"),
            PathBuf::from("/etc/prizedesk/party.toml")
        );
        assert_eq!(
            ServerConfig::resolve_path("./local.toml"),
            PathBuf::from("./local.toml")
        );
    }

    #[test]
    fn minimal_config() {
        let config = ServerConfig::parse("[storage]\ndata_dir = \"/var/lib/prizedesk\"\n").unwrap();
        assert_eq!(config.storage.data_dir, "/var/lib/prizedesk");
        assert!(config.event.ends_at.is_none());
        assert!(config.catalog.is_none());
    }

    #[test]
    fn full_config() {
        let config = ServerConfig::parse(
            r#"
[storage]
data_dir = "/data"

[event]
ends_at = "2026-12-24T23:00:00+07:00"

[catalog]
version = 2

[[catalog.tiers]]
name = "Grand"
amount = "50,000 THB"
quota = 1

[[catalog.tiers]]
name = "Runner-up"
quota = 5
"#,
        )
        .unwrap();

        let ends_at = config.event.ends_at.unwrap();
        assert_eq!(ends_at.to_rfc3339(), "2026-12-24T23:00:00+07:00");

        let catalog = config.catalog.unwrap();
        assert_eq!(catalog.version, 2);
        assert_eq!(catalog.tiers.len(), 2);
        assert_eq!(catalog.tiers[1].amount, "");
        assert_eq!(catalog.tiers[1].quota, 5);
    }

    #[test]
    fn missing_storage_is_error() {
        assert!(ServerConfig::parse("[event]\n").is_err());
    }

    #[test]
    fn load_missing_file_is_error() {
        assert!(ServerConfig::load(Path::new("/nonexistent/prizedesk.toml")).is_err());
    }
}
