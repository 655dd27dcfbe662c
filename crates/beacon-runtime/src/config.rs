//! TOML configuration for the dashboard runtime.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use beacon_dashboard::{AlertThresholds, DashboardSnapshot, DEFAULT_CELEBRATION_COOLDOWN_MS};
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:5050";
pub const DEFAULT_TICKET_TYPE_SLUG: &str = "helpdesk";
pub const DEFAULT_AUTO_REFRESH_MS: u64 = 60_000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_OUTPUT_PATH: &str = "beacon-dashboard.html";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BeaconDashboardConfig {
    pub app_name: String,
    pub api_base: String,
    pub ticket_type_slug: String,
    /// Poll period; `0` disables the timer so only explicit refreshes fetch.
    pub auto_refresh_ms: u64,
    pub request_timeout_ms: u64,
    pub retry_max_attempts: usize,
    pub retry_base_delay_ms: u64,
    pub ticket_url_template: Option<String>,
    pub alert_thresholds: AlertThresholds,
    pub celebration_cooldown_ms: u64,
    pub selected_agent_id: Option<String>,
    pub initial_snapshot_path: Option<PathBuf>,
    pub output_path: PathBuf,
    pub preferences_path: Option<PathBuf>,
}

impl Default for BeaconDashboardConfig {
    fn default() -> Self {
        Self {
            app_name: "TheBeacon".to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            ticket_type_slug: DEFAULT_TICKET_TYPE_SLUG.to_string(),
            auto_refresh_ms: DEFAULT_AUTO_REFRESH_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            retry_max_attempts: 1,
            retry_base_delay_ms: 500,
            ticket_url_template: None,
            alert_thresholds: AlertThresholds::default(),
            celebration_cooldown_ms: DEFAULT_CELEBRATION_COOLDOWN_MS,
            selected_agent_id: None,
            initial_snapshot_path: None,
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            preferences_path: None,
        }
    }
}

impl BeaconDashboardConfig {
    /// Reads `path`, or returns defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("invalid beacon dashboard config")
    }

    pub fn validate(&self) -> Result<()> {
        let api_base = Url::parse(self.api_base.trim())
            .with_context(|| format!("invalid api_base '{}'", self.api_base))?;
        if !matches!(api_base.scheme(), "http" | "https") {
            bail!(
                "api_base '{}' must use http or https, found '{}'",
                self.api_base,
                api_base.scheme()
            );
        }
        let slug = self.ticket_type_slug.trim();
        if slug.is_empty() || slug.contains('/') {
            bail!(
                "ticket_type_slug '{}' must be a single non-empty path segment",
                self.ticket_type_slug
            );
        }
        if self.request_timeout_ms == 0 {
            bail!("request_timeout_ms must be greater than 0");
        }
        if self.retry_max_attempts == 0 {
            bail!("retry_max_attempts must be at least 1");
        }
        if self.output_path.as_os_str().is_empty() {
            bail!("output_path must not be empty");
        }
        self.alert_thresholds
            .validate()
            .context("invalid alert_thresholds")?;
        Ok(())
    }

    pub fn poll_interval(&self) -> Option<Duration> {
        (self.auto_refresh_ms > 0).then(|| Duration::from_millis(self.auto_refresh_ms))
    }

    /// Loads the optional pre-fetched snapshot rendered before the first poll.
    pub fn load_initial_snapshot(&self) -> Result<Option<DashboardSnapshot>> {
        let Some(path) = self.initial_snapshot_path.as_deref() else {
            return Ok(None);
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read initial snapshot {}", path.display()))?;
        let snapshot = serde_json::from_str::<DashboardSnapshot>(&raw)
            .with_context(|| format!("failed to parse initial snapshot {}", path.display()))?;
        Ok(Some(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tempfile::tempdir;

    use super::BeaconDashboardConfig;

    #[test]
    fn unit_default_config_is_valid_and_polls_every_minute() {
        let config = BeaconDashboardConfig::default();
        config.validate().expect("defaults validate");
        assert_eq!(config.poll_interval(), Some(Duration::from_secs(60)));
        assert_eq!(config.request_timeout_ms, 30_000);
        assert_eq!(config.alert_thresholds.emergency, 110);
    }

    #[test]
    fn functional_from_toml_str_applies_per_field_defaults() {
        let config = BeaconDashboardConfig::from_toml_str(
            r#"
api_base = "https://beacon.example.com"
ticket_type_slug = "service"
auto_refresh_ms = 0
ticket_url_template = "https://desk.example.com/tickets/{id}"

[alert_thresholds]
warning = 95
"#,
        )
        .expect("config");
        config.validate().expect("valid");
        assert_eq!(config.poll_interval(), None);
        assert_eq!(config.alert_thresholds.warning, 95);
        assert_eq!(config.alert_thresholds.calm, 50);
        assert_eq!(config.retry_max_attempts, 1);
        assert_eq!(config.app_name, "TheBeacon");
    }

    #[test]
    fn regression_validate_rejects_bad_thresholds_and_endpoints() {
        let mut config = BeaconDashboardConfig::default();
        config.alert_thresholds.good = 10;
        let error = config.validate().expect_err("thresholds out of order");
        assert!(format!("{error:#}").contains("alert_thresholds"));

        let config = BeaconDashboardConfig {
            api_base: "ftp://beacon".to_string(),
            ..BeaconDashboardConfig::default()
        };
        assert!(config.validate().is_err());

        let config = BeaconDashboardConfig {
            ticket_type_slug: "a/b".to_string(),
            ..BeaconDashboardConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn regression_from_toml_str_rejects_unknown_keys() {
        assert!(BeaconDashboardConfig::from_toml_str("refresh_interval = 5").is_err());
    }

    #[test]
    fn functional_load_reads_file_and_initial_snapshot() {
        let temp = tempdir().expect("tempdir");
        let snapshot_path = temp.path().join("initial.json");
        std::fs::write(&snapshot_path, r#"{"s1_items": [{"id": 1}], "total_active_items": 1}"#)
            .expect("write snapshot");
        let config_path = temp.path().join("beacon.toml");
        std::fs::write(
            &config_path,
            format!(
                "initial_snapshot_path = {:?}\n",
                snapshot_path.display().to_string()
            ),
        )
        .expect("write config");

        let config = BeaconDashboardConfig::load(Some(&config_path)).expect("load");
        let snapshot = config
            .load_initial_snapshot()
            .expect("snapshot io")
            .expect("snapshot present");
        assert_eq!(snapshot.total_active_items(), 1);
        assert!(BeaconDashboardConfig::load(Some(&temp.path().join("missing.toml"))).is_err());
        assert_eq!(
            BeaconDashboardConfig::load(None).expect("defaults"),
            BeaconDashboardConfig::default()
        );
    }
}
