use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};

/// Upper bound for any single wait, including server-requested ones.
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How many times a request is sent and how long to wait in between.
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(1, 500)
    }
}

impl RetryPolicy {
    /// A zero attempt count still sends once; a zero delay waits one millisecond.
    pub fn new(max_attempts: usize, base_delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::from_millis(base_delay_ms.max(1)),
        }
    }

    pub fn allows_another(&self, attempts_made: usize) -> bool {
        attempts_made < self.max_attempts
    }

    /// Doubling backoff after `attempts_made` sends. A server hint replaces the
    /// backoff but never undercuts the base delay.
    pub fn backoff(&self, attempts_made: usize, server_hint: Option<Duration>) -> Duration {
        let wait = match server_hint {
            Some(hint) => hint.max(self.base_delay),
            None => {
                let doublings = attempts_made.saturating_sub(1).min(10) as u32;
                self.base_delay.saturating_mul(1_u32 << doublings)
            }
        };
        wait.min(MAX_RETRY_DELAY)
    }
}

/// `Retry-After` in whole seconds. HTTP-date values are ignored.
pub(crate) fn server_retry_hint(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

pub(crate) fn status_is_transient(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

pub(crate) fn transport_error_is_transient(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect()
}

/// First `max_chars` characters of a response body, marked when cut.
pub(crate) fn error_excerpt(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};

    use super::{
        error_excerpt, server_retry_hint, status_is_transient, RetryPolicy, MAX_RETRY_DELAY,
    };

    #[test]
    fn unit_retry_policy_clamps_zero_inputs() {
        let policy = RetryPolicy::new(0, 0);
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.base_delay, Duration::from_millis(1));
        assert!(!policy.allows_another(1));
    }

    #[test]
    fn unit_backoff_doubles_per_attempt() {
        let policy = RetryPolicy::new(4, 250);
        assert!(policy.allows_another(3));
        assert_eq!(policy.backoff(1, None), Duration::from_millis(250));
        assert_eq!(policy.backoff(2, None), Duration::from_millis(500));
        assert_eq!(policy.backoff(3, None), Duration::from_millis(1_000));
    }

    #[test]
    fn functional_backoff_prefers_server_hint_above_base_delay() {
        let policy = RetryPolicy::new(3, 250);
        assert_eq!(
            policy.backoff(2, Some(Duration::from_millis(50))),
            Duration::from_millis(250)
        );
        assert_eq!(
            policy.backoff(2, Some(Duration::from_secs(3))),
            Duration::from_secs(3)
        );
    }

    #[test]
    fn regression_backoff_never_exceeds_cap() {
        let policy = RetryPolicy::new(20, 5_000);
        assert_eq!(policy.backoff(15, None), MAX_RETRY_DELAY);
        assert_eq!(
            policy.backoff(1, Some(Duration::from_secs(3_600))),
            MAX_RETRY_DELAY
        );
    }

    #[test]
    fn unit_server_retry_hint_reads_whole_seconds_only() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static(" 7 "));
        assert_eq!(server_retry_hint(&headers), Some(Duration::from_secs(7)));

        headers.insert(
            RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(server_retry_hint(&headers), None);
        assert_eq!(server_retry_hint(&HeaderMap::new()), None);
    }

    #[test]
    fn unit_status_is_transient_covers_rate_limit_and_server_errors() {
        assert!(status_is_transient(429));
        assert!(status_is_transient(503));
        assert!(!status_is_transient(404));
        assert!(!status_is_transient(600));
    }

    #[test]
    fn unit_error_excerpt_cuts_on_char_boundaries() {
        assert_eq!(error_excerpt("ok", 10), "ok");
        assert_eq!(error_excerpt("ééééé", 2), "éé...");
        assert_eq!(error_excerpt("abc", 3), "abc");
    }
}
