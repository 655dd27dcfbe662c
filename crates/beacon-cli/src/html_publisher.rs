use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use beacon_core::write_text_atomic;
use beacon_dashboard::{ClientPreferences, DashboardDocument};
use beacon_dashboard_ui::{render_beacon_dashboard_page, BeaconDashboardShellContext};
use beacon_runtime::DashboardPublisher;

/// Writes each rendered document to a standalone HTML page.
pub(crate) struct HtmlFilePublisher {
    path: PathBuf,
    auto_reload_seconds: Option<u64>,
}

impl HtmlFilePublisher {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self {
            path,
            auto_reload_seconds: None,
        }
    }

    /// Browsers viewing the page reload on the poll period, rounded up to whole seconds.
    pub(crate) fn with_reload_interval(mut self, interval: Option<Duration>) -> Self {
        self.auto_reload_seconds = interval.map(|interval| {
            let millis = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
            millis.div_ceil(1_000)
        });
        self
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl DashboardPublisher for HtmlFilePublisher {
    fn publish(&self, document: &DashboardDocument, preferences: &ClientPreferences) -> Result<()> {
        let context = BeaconDashboardShellContext::new(document, preferences)
            .with_auto_reload_seconds(self.auto_reload_seconds);
        let page = render_beacon_dashboard_page(context);
        write_text_atomic(&self.path, &page)
            .with_context(|| format!("failed to write dashboard page {}", self.path.display()))?;
        tracing::debug!(path = %self.path.display(), bytes = page.len(), "dashboard page written");
        Ok(())
    }
}
