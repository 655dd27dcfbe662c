mod action_input;
mod bootstrap_helpers;
mod cli_args;
mod html_publisher;
mod terminal_signals;

use std::sync::Arc;

use anyhow::{bail, Result};
use beacon_client::BeaconApiClient;
use beacon_dashboard::{ClientPreferences, ClientPreferencesStore};
use beacon_runtime::{
    run_dashboard_loop, BeaconDashboardConfig, DashboardController, DashboardPublisher,
    PollLoopOptions,
};
use clap::Parser;
use tokio::sync::mpsc;

use crate::action_input::{spawn_stdin_action_reader, ACTION_CHANNEL_CAPACITY};
use crate::bootstrap_helpers::init_tracing;
use crate::cli_args::Cli;
use crate::html_publisher::HtmlFilePublisher;
use crate::terminal_signals::TerminalSignals;

fn resolve_config(cli: &Cli) -> Result<BeaconDashboardConfig> {
    let mut config = BeaconDashboardConfig::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

fn open_preferences(config: &BeaconDashboardConfig) -> Result<ClientPreferencesStore> {
    match config.preferences_path.clone() {
        Some(path) => ClientPreferencesStore::load(path),
        None => Ok(ClientPreferencesStore::in_memory(ClientPreferences::default())),
    }
}

async fn run_cli(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;
    let client = BeaconApiClient::new(
        config.api_base.clone(),
        config.request_timeout_ms,
        config.retry_max_attempts,
        config.retry_base_delay_ms,
    )?;
    let preferences = open_preferences(&config)?;
    let mut controller = DashboardController::new(
        &config,
        Arc::new(client),
        Arc::new(TerminalSignals::new(cli.bell)),
        preferences,
    );
    let publisher = HtmlFilePublisher::new(config.output_path.clone())
        .with_reload_interval(config.poll_interval());
    tracing::info!(
        api_base = %config.api_base,
        ticket_type = %config.ticket_type_slug,
        output = %publisher.path().display(),
        "starting beacon dashboard"
    );

    if let Some(snapshot) = config.load_initial_snapshot()? {
        controller.load_initial_snapshot(snapshot);
        publisher.publish(controller.document(), controller.preferences().preferences())?;
    }

    let (sender, receiver) = mpsc::channel(ACTION_CHANNEL_CAPACITY);
    if cli.reads_actions() {
        spawn_stdin_action_reader(sender)?;
    } else {
        drop(sender);
    }

    let report = run_dashboard_loop(
        &mut controller,
        &publisher,
        receiver,
        PollLoopOptions {
            poll_interval: config.poll_interval(),
            run_once: cli.once,
        },
    )
    .await?;
    tracing::info!(
        cycles = report.cycles,
        failed_cycles = report.failed_cycles,
        actions = report.actions_handled,
        "beacon dashboard stopped"
    );

    if cli.once && report.failed_cycles > 0 {
        let banner = controller
            .document()
            .banner
            .clone()
            .unwrap_or_else(|| "refresh failed".to_string());
        bail!("dashboard refresh failed: {banner}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run_cli(cli).await
}
