//! Line-oriented action input read from stdin on a dedicated thread.

use std::io::BufRead;

use anyhow::{Context, Result};
use beacon_dashboard::{parse_dashboard_action, DashboardAction};
use tokio::sync::mpsc;

pub(crate) const ACTION_CHANNEL_CAPACITY: usize = 32;

/// Forwards parsed actions until `reader` hits EOF or the loop drops its receiver.
/// Returns how many actions were forwarded.
pub(crate) fn forward_actions<R: BufRead>(
    reader: R,
    sender: &mpsc::Sender<DashboardAction>,
) -> usize {
    let mut forwarded = 0usize;
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(error) => {
                tracing::warn!(error = %error, "failed to read action input");
                break;
            }
        };
        match parse_dashboard_action(&line) {
            Ok(Some(action)) => {
                if sender.blocking_send(action).is_err() {
                    break;
                }
                forwarded = forwarded.saturating_add(1);
            }
            Ok(None) => {}
            Err(message) => tracing::warn!(input = %line.trim(), "{message}"),
        }
    }
    forwarded
}

/// Spawns the stdin reader. A plain thread keeps a blocked read from holding up
/// runtime shutdown.
pub(crate) fn spawn_stdin_action_reader(sender: mpsc::Sender<DashboardAction>) -> Result<()> {
    std::thread::Builder::new()
        .name("beacon-actions".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            let forwarded = forward_actions(stdin.lock(), &sender);
            tracing::debug!(forwarded, "action input closed");
        })
        .context("failed to spawn action input thread")?;
    Ok(())
}
