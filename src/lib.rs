pub mod config;
pub mod ctfd;
pub mod dashboard;
pub mod detector;
pub mod error;
pub mod monitor;
pub mod ntfy;
pub mod reporter;
pub mod state;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

use std::time::Duration;

/// Per-request timeout for CTFd and ntfy calls.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// ntfy server used when none is configured.
pub const DEFAULT_NTFY_BASE: &str = "https://ntfy.sh";

/// Build the shared HTTP client. Certificate checks are only skipped when the
/// operator asked for it.
pub(crate) fn http_client(insecure_skip_verify: bool) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .danger_accept_invalid_certs(insecure_skip_verify)
        .build()
}
