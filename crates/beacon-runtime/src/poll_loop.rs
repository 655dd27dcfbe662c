use std::future::pending;
use std::time::Duration;

use anyhow::Result;
use beacon_dashboard::DashboardAction;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio::time::Instant;

use crate::controller::{DashboardController, DispatchOutcome};
use crate::signals::DashboardPublisher;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollLoopOptions {
    /// `None` disables timed refreshes.
    pub poll_interval: Option<Duration>,
    pub run_once: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollLoopReport {
    pub cycles: usize,
    pub failed_cycles: usize,
    pub actions_handled: usize,
    pub coalesced_triggers: usize,
}

enum WaitOutcome {
    Refresh,
    Stop,
}

async fn next_action(
    actions: &mut Option<mpsc::Receiver<DashboardAction>>,
) -> Option<DashboardAction> {
    match actions {
        Some(receiver) => receiver.recv().await,
        None => pending().await,
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => pending().await,
    }
}

fn publish(
    controller: &DashboardController,
    publisher: &dyn DashboardPublisher,
) {
    if let Err(error) = publisher.publish(
        controller.document(),
        controller.preferences().preferences(),
    ) {
        tracing::warn!(error = %format!("{error:#}"), "failed to publish dashboard");
    }
}

/// Drives refresh cycles until shutdown.
///
/// Refresh triggers that pile up while a cycle runs are collapsed into a single
/// follow-up cycle, and the timer is re-armed only once a cycle has finished.
/// A failing action is logged and polling carries on.
pub async fn run_dashboard_loop(
    controller: &mut DashboardController,
    publisher: &dyn DashboardPublisher,
    actions: mpsc::Receiver<DashboardAction>,
    options: PollLoopOptions,
) -> Result<PollLoopReport> {
    let mut report = PollLoopReport::default();
    let mut actions = Some(actions);
    loop {
        let outcome = controller.refresh().await;
        report.cycles = report.cycles.saturating_add(1);
        if outcome.is_failure() {
            report.failed_cycles = report.failed_cycles.saturating_add(1);
        }
        publish(controller, publisher);
        tracing::debug!(cycle = report.cycles, outcome = ?outcome, "dashboard cycle complete");
        if options.run_once {
            return Ok(report);
        }

        let deadline = options.poll_interval.map(|interval| Instant::now() + interval);
        match wait_for_trigger(controller, publisher, &mut actions, deadline, &mut report).await {
            WaitOutcome::Refresh => {}
            WaitOutcome::Stop => return Ok(report),
        }
    }
}

async fn wait_for_trigger(
    controller: &mut DashboardController,
    publisher: &dyn DashboardPublisher,
    actions: &mut Option<mpsc::Receiver<DashboardAction>>,
    deadline: Option<Instant>,
    report: &mut PollLoopReport,
) -> WaitOutcome {
    loop {
        if actions.is_none() && deadline.is_none() {
            tracing::info!("no refresh source left; stopping dashboard loop");
            return WaitOutcome::Stop;
        }
        let action = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("dashboard shutdown requested");
                return WaitOutcome::Stop;
            }
            _ = wait_until(deadline) => return WaitOutcome::Refresh,
            action = next_action(actions) => action,
        };
        let Some(action) = action else {
            *actions = None;
            continue;
        };

        let mut refresh_requested = false;
        let mut pending_action = Some(action);
        while let Some(action) = pending_action.take() {
            report.actions_handled = report.actions_handled.saturating_add(1);
            match controller.dispatch(action).await {
                Err(error) => {
                    tracing::warn!(error = %format!("{error:#}"), "dashboard action failed");
                }
                Ok(DispatchOutcome::Shutdown) => return WaitOutcome::Stop,
                Ok(DispatchOutcome::RefreshRequested) => {
                    if refresh_requested {
                        report.coalesced_triggers = report.coalesced_triggers.saturating_add(1);
                    }
                    refresh_requested = true;
                }
                Ok(DispatchOutcome::Ignored(reason)) => {
                    tracing::info!(reason = %reason, "dashboard action ignored");
                }
                Ok(outcome) if outcome.needs_publish() => publish(controller, publisher),
                Ok(_) => {}
            }
            if !refresh_requested {
                break;
            }
            if let Some(receiver) = actions.as_mut() {
                match receiver.try_recv() {
                    Ok(next) => pending_action = Some(next),
                    Err(TryRecvError::Empty) => {}
                    Err(TryRecvError::Disconnected) => *actions = None,
                }
            }
        }
        if refresh_requested {
            return WaitOutcome::Refresh;
        }
    }
}
