//! Refresh controller, poll loop, and configuration for the Beacon dashboard.

pub mod config;
pub mod controller;
pub mod poll_loop;
pub mod signals;

pub use config::BeaconDashboardConfig;
pub use controller::{
    banner_for_fetch_error, Clock, CycleOutcome, DashboardController, DispatchOutcome,
    RefreshPhase, NETWORK_ERROR_BANNER,
};
pub use poll_loop::{run_dashboard_loop, PollLoopOptions, PollLoopReport};
pub use signals::{DashboardPublisher, DashboardSignals, TracingSignals};
