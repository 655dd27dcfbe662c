//! Atomic output writes and unix-clock helpers for the Beacon crates.

pub mod atomic_io;
pub mod time_utils;

pub use atomic_io::{write_json_pretty_atomic, write_text_atomic};
pub use time_utils::{current_unix_timestamp_ms, elapsed_at_least_ms};
