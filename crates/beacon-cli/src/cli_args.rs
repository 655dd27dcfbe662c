use std::path::PathBuf;

use beacon_runtime::BeaconDashboardConfig;
use clap::{ArgAction, Parser};

#[derive(Debug, Parser)]
#[command(
    name = "beacon",
    about = "Polls the helpdesk ticket backend and renders the Beacon dashboard page",
    version
)]
pub(crate) struct Cli {
    #[arg(
        long,
        env = "BEACON_CONFIG",
        help = "TOML config file; built-in defaults apply when omitted"
    )]
    pub(crate) config: Option<PathBuf>,

    #[arg(
        long,
        env = "BEACON_API_BASE",
        help = "Backend base URL, e.g. http://127.0.0.1:5050"
    )]
    pub(crate) api_base: Option<String>,

    #[arg(
        long,
        env = "BEACON_TICKET_TYPE",
        help = "Ticket type slug polled at /api/tickets/<slug>"
    )]
    pub(crate) ticket_type: Option<String>,

    #[arg(
        long,
        env = "BEACON_AGENT_ID",
        help = "Agent id to filter by on the first fetch"
    )]
    pub(crate) agent_id: Option<String>,

    #[arg(
        long,
        env = "BEACON_REFRESH_INTERVAL_MS",
        help = "Poll period in milliseconds; 0 disables timed refreshes"
    )]
    pub(crate) refresh_interval_ms: Option<u64>,

    #[arg(
        long,
        env = "BEACON_OUTPUT",
        help = "Where the rendered dashboard HTML is written"
    )]
    pub(crate) output: Option<PathBuf>,

    #[arg(
        long,
        env = "BEACON_PREFERENCES",
        help = "JSON file holding theme and sidebar preferences"
    )]
    pub(crate) preferences: Option<PathBuf>,

    #[arg(
        long,
        env = "BEACON_INITIAL_SNAPSHOT",
        help = "Pre-fetched snapshot JSON rendered before the first poll"
    )]
    pub(crate) initial_snapshot: Option<PathBuf>,

    #[arg(long, help = "Run a single refresh cycle, write the page, and exit")]
    pub(crate) once: bool,

    #[arg(long, help = "Ring the terminal bell when new tickets arrive")]
    pub(crate) bell: bool,

    #[arg(long, help = "Do not read dashboard actions from stdin")]
    pub(crate) no_actions: bool,

    #[arg(
        short,
        long,
        action = ArgAction::Count,
        help = "Raise log verbosity (-v info, -vv debug); RUST_LOG overrides"
    )]
    pub(crate) verbose: u8,
}

impl Cli {
    /// Command-line values win over the config file.
    pub(crate) fn apply_overrides(&self, config: &mut BeaconDashboardConfig) {
        if let Some(api_base) = &self.api_base {
            config.api_base = api_base.clone();
        }
        if let Some(ticket_type) = &self.ticket_type {
            config.ticket_type_slug = ticket_type.clone();
        }
        if let Some(agent_id) = self.agent_id.as_deref().map(str::trim) {
            config.selected_agent_id = (!agent_id.is_empty()).then(|| agent_id.to_string());
        }
        if let Some(refresh_interval_ms) = self.refresh_interval_ms {
            config.auto_refresh_ms = refresh_interval_ms;
        }
        if let Some(output) = &self.output {
            config.output_path = output.clone();
        }
        if let Some(preferences) = &self.preferences {
            config.preferences_path = Some(preferences.clone());
        }
        if let Some(initial_snapshot) = &self.initial_snapshot {
            config.initial_snapshot_path = Some(initial_snapshot.clone());
        }
    }

    pub(crate) fn reads_actions(&self) -> bool {
        !self.once && !self.no_actions
    }
}
