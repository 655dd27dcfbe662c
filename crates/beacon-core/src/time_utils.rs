use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock milliseconds since the unix epoch; `0` if the clock predates it.
pub fn current_unix_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Returns true when no previous mark exists or at least `window_ms` has passed since it.
pub fn elapsed_at_least_ms(last_unix_ms: Option<u64>, now_unix_ms: u64, window_ms: u64) -> bool {
    match last_unix_ms {
        None => true,
        Some(last) => now_unix_ms
            .checked_sub(last)
            .is_some_and(|elapsed| elapsed >= window_ms),
    }
}
