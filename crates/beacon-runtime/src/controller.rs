//! The refresh controller: owns the cached snapshot and drives every render pass.

use std::sync::Arc;

use anyhow::Result;
use beacon_client::{BeaconApiError, TicketFeed};
use beacon_core::{current_unix_timestamp_ms, elapsed_at_least_ms};
use beacon_dashboard::date_format::format_in_zone;
use beacon_dashboard::{
    build_ticket_detail, detect_new_ticket_ids, sort_items, update_item_section,
    AgentReconcileOutcome, AlertIndicator, AlertStateMachine, ClientPreferencesStore,
    DashboardAction, DashboardDocument, DashboardSnapshot, DisplayZone, FormatOptions,
    RowRenderContext, SectionId, SectionSortStates,
};

use crate::config::BeaconDashboardConfig;
use crate::signals::DashboardSignals;

pub const NETWORK_ERROR_BANNER: &str = "Network error: Unable to connect to server";
pub const REFRESH_STATUS_CLEAR_MS: u64 = 3_000;

pub type Clock = Arc<dyn Fn() -> u64 + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPhase {
    Idle,
    Refreshing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Rendered {
        new_tickets: usize,
        application_error: Option<String>,
    },
    Failed {
        banner: String,
    },
}

impl CycleOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Rerendered,
    RefreshRequested,
    PreferencesChanged,
    Ignored(String),
    Shutdown,
}

impl DispatchOutcome {
    pub fn needs_publish(&self) -> bool {
        matches!(self, Self::Rerendered | Self::PreferencesChanged)
    }
}

/// Banner text for a failed fetch. Malformed bodies read as connectivity failures.
pub fn banner_for_fetch_error(error: &BeaconApiError) -> String {
    match error {
        BeaconApiError::HttpStatus { status, .. } => {
            format!("Failed to fetch ticket data (HTTP {status})")
        }
        BeaconApiError::Network { .. } | BeaconApiError::Decode { .. } => {
            NETWORK_ERROR_BANNER.to_string()
        }
    }
}

pub struct DashboardController {
    feed: Arc<dyn TicketFeed>,
    signals: Arc<dyn DashboardSignals>,
    preferences: ClientPreferencesStore,
    ticket_type_slug: String,
    row_context: RowRenderContext,
    phase: RefreshPhase,
    snapshot: Option<DashboardSnapshot>,
    /// Set when the agent scope changed; the next snapshot is not compared
    /// against data fetched under the old scope.
    baseline_stale: bool,
    sort_states: SectionSortStates,
    alert: AlertStateMachine,
    document: DashboardDocument,
    refresh_status_set_at_ms: Option<u64>,
    clock: Clock,
}

impl DashboardController {
    pub fn new(
        config: &BeaconDashboardConfig,
        feed: Arc<dyn TicketFeed>,
        signals: Arc<dyn DashboardSignals>,
        preferences: ClientPreferencesStore,
    ) -> Self {
        let mut document = DashboardDocument::new(config.app_name.clone());
        document
            .agent_filter
            .select(config.selected_agent_id.clone());
        Self {
            feed,
            signals,
            preferences,
            ticket_type_slug: config.ticket_type_slug.trim().to_string(),
            row_context: RowRenderContext {
                ticket_url_template: config.ticket_url_template.clone(),
                zone: DisplayZone::Local,
            },
            phase: RefreshPhase::Idle,
            snapshot: None,
            baseline_stale: false,
            sort_states: SectionSortStates::default(),
            alert: AlertStateMachine::new(config.alert_thresholds, config.celebration_cooldown_ms),
            document,
            refresh_status_set_at_ms: None,
            clock: Arc::new(current_unix_timestamp_ms),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_display_zone(mut self, zone: DisplayZone) -> Self {
        self.row_context.zone = zone;
        self
    }

    pub fn phase(&self) -> RefreshPhase {
        self.phase
    }

    pub fn document(&self) -> &DashboardDocument {
        &self.document
    }

    pub fn snapshot(&self) -> Option<&DashboardSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn preferences(&self) -> &ClientPreferencesStore {
        &self.preferences
    }

    pub fn sort_states(&self) -> &SectionSortStates {
        &self.sort_states
    }

    /// Renders a pre-fetched snapshot without touching the network.
    pub fn load_initial_snapshot(&mut self, snapshot: DashboardSnapshot) -> CycleOutcome {
        self.apply_snapshot(snapshot)
    }

    /// One fetch-validate-render cycle. A failure only touches the banner.
    pub async fn refresh(&mut self) -> CycleOutcome {
        self.phase = RefreshPhase::Refreshing;
        let agent_id = self.document.agent_filter.selected().map(str::to_string);
        tracing::debug!(
            slug = %self.ticket_type_slug,
            agent_id = agent_id.as_deref(),
            "refreshing ticket data"
        );
        let fetched = self
            .feed
            .fetch_tickets(&self.ticket_type_slug, agent_id.as_deref())
            .await;
        let outcome = match fetched {
            Ok(snapshot) => self.apply_snapshot(snapshot),
            Err(error) => {
                let banner = banner_for_fetch_error(&error);
                tracing::warn!(error = %error, banner = %banner, "ticket refresh failed");
                self.document.banner = Some(banner.clone());
                CycleOutcome::Failed { banner }
            }
        };
        self.expire_refresh_status();
        self.phase = RefreshPhase::Idle;
        outcome
    }

    /// Applies one user action. Fetching is left to the caller when
    /// [`DispatchOutcome::RefreshRequested`] is returned.
    pub async fn dispatch(&mut self, action: DashboardAction) -> Result<DispatchOutcome> {
        let outcome = match action {
            DashboardAction::Refresh => DispatchOutcome::RefreshRequested,
            DashboardAction::ForceRefresh => self.force_refresh().await,
            DashboardAction::SortColumn { section, key } => self.sort_section(section, &key),
            DashboardAction::SelectAgent(agent_id) => {
                let previous = self.document.agent_filter.selected().map(str::to_string);
                self.document.agent_filter.select(agent_id);
                if self.document.agent_filter.selected() != previous.as_deref() {
                    self.baseline_stale = true;
                }
                DispatchOutcome::RefreshRequested
            }
            DashboardAction::OpenTicketDetail { section, item_id } => {
                let detail = self.snapshot.as_ref().and_then(|snapshot| {
                    build_ticket_detail(snapshot, section, &item_id, self.row_context.zone)
                });
                match detail {
                    Some(detail) => {
                        self.document.ticket_detail = Some(detail);
                        DispatchOutcome::Rerendered
                    }
                    None => DispatchOutcome::Ignored(format!(
                        "ticket {item_id} is not listed in section {section}"
                    )),
                }
            }
            DashboardAction::CloseTicketDetail => {
                if self.document.ticket_detail.take().is_some() {
                    DispatchOutcome::Rerendered
                } else {
                    DispatchOutcome::Ignored("no ticket detail is open".to_string())
                }
            }
            DashboardAction::ToggleTheme => {
                let theme = self.preferences.toggle_theme()?;
                tracing::debug!(theme = theme.as_str(), "theme toggled");
                DispatchOutcome::PreferencesChanged
            }
            DashboardAction::SetColorTheme(color_theme) => {
                self.preferences.set_color_theme(color_theme)?;
                DispatchOutcome::PreferencesChanged
            }
            DashboardAction::ToggleSidebar => {
                self.preferences.toggle_sidebar()?;
                DispatchOutcome::PreferencesChanged
            }
            DashboardAction::Shutdown => DispatchOutcome::Shutdown,
        };
        Ok(outcome)
    }

    async fn force_refresh(&mut self) -> DispatchOutcome {
        let (status, refetch) = match self.feed.force_refresh().await {
            Ok(response) if response.success => (
                format!("Refreshed ({} tickets)", response.ticket_count.unwrap_or(0)),
                true,
            ),
            Ok(response) => (
                response
                    .error
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or_else(|| "Refresh failed".to_string()),
                false,
            ),
            Err(BeaconApiError::Network { source, .. }) => {
                tracing::warn!(error = %source, "force refresh request failed");
                ("Network error".to_string(), false)
            }
            Err(error) => {
                tracing::warn!(error = %error, "force refresh rejected");
                ("Refresh failed".to_string(), false)
            }
        };
        self.document.refresh_status = Some(status);
        self.refresh_status_set_at_ms = Some((self.clock)());
        if refetch {
            DispatchOutcome::RefreshRequested
        } else {
            DispatchOutcome::Rerendered
        }
    }

    fn sort_section(&mut self, section: SectionId, key: &str) -> DispatchOutcome {
        let Some(snapshot) = self.snapshot.as_ref() else {
            return DispatchOutcome::Ignored("no ticket data loaded yet".to_string());
        };
        let sort = self.sort_states.apply_click(section, key).clone();
        let items = sort_items(snapshot.items(section).to_vec(), &sort);
        update_item_section(
            &mut self.document,
            section,
            &items,
            &sort,
            &self.row_context,
        );
        DispatchOutcome::Rerendered
    }

    fn expire_refresh_status(&mut self) {
        if self.refresh_status_set_at_ms.is_some()
            && elapsed_at_least_ms(
                self.refresh_status_set_at_ms,
                (self.clock)(),
                REFRESH_STATUS_CLEAR_MS,
            )
        {
            self.document.refresh_status = None;
            self.refresh_status_set_at_ms = None;
        }
    }

    fn apply_snapshot(&mut self, snapshot: DashboardSnapshot) -> CycleOutcome {
        let application_error = snapshot.application_error().map(str::to_string);
        if let Some(message) = application_error.as_deref() {
            tracing::warn!(error = %message, "backend reported an application error");
        }
        self.document.banner = application_error.clone();

        let fresh_baseline = std::mem::take(&mut self.baseline_stale);
        if fresh_baseline {
            tracing::debug!("agent scope changed; skipping arrival and regression checks");
            self.alert.reset_baseline();
        }

        let agent_outcome = self
            .document
            .agent_filter
            .reconcile(snapshot.agent_mapping.as_ref());
        tracing::debug!(outcome = ?agent_outcome, "agent filter reconciled");
        if matches!(
            agent_outcome,
            AgentReconcileOutcome::Rebuilt {
                selection_kept: false
            }
        ) {
            self.baseline_stale = true;
        }

        let previous_s1 = self
            .snapshot
            .as_ref()
            .filter(|_| !fresh_baseline)
            .map(|previous| previous.items(SectionId::S1))
            .unwrap_or_default();
        let new_ids = detect_new_ticket_ids(previous_s1, snapshot.items(SectionId::S1));
        if !new_ids.is_empty() {
            self.signals.new_tickets_arrived(&new_ids);
        }

        let total = snapshot.total_active_items();
        self.snapshot = Some(snapshot);
        self.render_all_sections();

        let transition = self.alert.observe(total, (self.clock)());
        self.document.alert = Some(AlertIndicator::new(total, transition.level));
        if transition.level_changed() {
            self.signals.alert_level_changed(&transition);
        }
        if let Some(kind) = transition.celebration {
            self.signals.celebrate(kind);
        }

        CycleOutcome::Rendered {
            new_tickets: new_ids.len(),
            application_error,
        }
    }

    fn render_all_sections(&mut self) {
        let Some(snapshot) = self.snapshot.as_ref() else {
            return;
        };
        for section in SectionId::ALL {
            let sort = self.sort_states.get(section);
            let items = sort_items(snapshot.items(section).to_vec(), sort);
            update_item_section(&mut self.document, section, &items, sort, &self.row_context);
        }
        self.document.apply_section_titles(snapshot);
        self.document.view_name = snapshot.view.clone();
        if let Some(generated) = snapshot.dashboard_generated_time_iso.as_deref() {
            self.document.generated_time_display =
                format_in_zone(Some(generated), FormatOptions::default(), self.row_context.zone);
        }
        if let Some(open) = self.document.ticket_detail.as_ref() {
            if let Some(detail) =
                build_ticket_detail(snapshot, open.section, &open.item_id, self.row_context.zone)
            {
                self.document.ticket_detail = Some(detail);
            }
        }
    }
}
