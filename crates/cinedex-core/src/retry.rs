//! Retry classification and backoff shared by the HTTP clients.

use std::time::Duration;

use reqwest::StatusCode;

/// Statuses worth retrying: throttling and server-side failures.
pub fn should_retry(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Transport errors worth retrying (timeouts, refused connections, broken
/// bodies). Anything else is a caller bug and surfaces immediately.
pub fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request() || err.is_body() || err.is_decode()
}

/// Exponential backoff: 500ms doubling per attempt, capped at `2^5`.
pub fn backoff(attempt: usize) -> Duration {
    let capped = attempt.min(5) as u32;
    Duration::from_millis(500 * (1 << capped))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttling_and_server_errors_are_retryable() {
        assert!(should_retry(StatusCode::TOO_MANY_REQUESTS));
        assert!(should_retry(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(should_retry(StatusCode::SERVICE_UNAVAILABLE));
        assert!(should_retry(StatusCode::BAD_GATEWAY));
    }

    #[test]
    fn client_errors_are_not_retryable() {
        assert!(!should_retry(StatusCode::BAD_REQUEST));
        assert!(!should_retry(StatusCode::UNAUTHORIZED));
        assert!(!should_retry(StatusCode::NOT_FOUND));
        assert!(!should_retry(StatusCode::OK));
    }

    #[test]
    fn backoff_doubles_and_caps() {
        assert_eq!(backoff(0), Duration::from_millis(500));
        assert_eq!(backoff(1), Duration::from_millis(1000));
        assert_eq!(backoff(2), Duration::from_millis(2000));
        assert_eq!(backoff(5), Duration::from_millis(16000));
        // Attempts past the cap keep the ceiling
        assert_eq!(backoff(6), Duration::from_millis(16000));
        assert_eq!(backoff(100), Duration::from_millis(16000));
    }
}
