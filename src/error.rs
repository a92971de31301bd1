use std::path::PathBuf;
use thiserror::Error;

/// Error types for BPM Supreme automation.
///
/// Faults local to a single item (a missing download control, a click that
/// did not land) are caught by the orchestrator and degrade to a `Failed`
/// record for that item only. Session-level faults (navigation, login,
/// WebDriver transport) propagate and stop the run.
#[derive(Error, Debug)]
pub enum BpmError {
    /// Bad values supplied at construction time.
    ///
    /// Empty credentials, a malformed genre URL, a zero retry bound. Fatal;
    /// surfaced immediately, never retried.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An inventory path does not exist or is not a directory.
    #[error("invalid path: {}", .0.display())]
    InvalidPath(PathBuf),

    /// Login form submission did not transition away from the login URL.
    ///
    /// # Common Causes
    /// - Invalid username/password
    /// - Account locked or suspended
    /// - A captcha interstitial the driver cannot pass
    #[error("authentication failed: {0}")]
    Auth(String),

    /// A required page element did not exist.
    ///
    /// Where the absence is expected (no loader spinner, a history row
    /// without edition tags) this is recovered locally; otherwise the
    /// current item is marked failed and the walk continues.
    #[error("element not found: {0}")]
    ElementNotFound(String),

    /// A bounded wait expired before its condition held.
    #[error("timed out after {waited_ms}ms waiting for {condition}")]
    Timeout {
        /// Human-readable description of what was being waited for
        condition: String,
        /// How long the wait ran before giving up
        waited_ms: u64,
    },

    /// The download-limit popup could not be dismissed.
    ///
    /// The resolver's retry bound (3 close attempts) was exhausted. The
    /// triggering download is recorded as failed; further downloads are
    /// likely to fail too until the server-side limit clears.
    #[error("download limit popup could not be dismissed")]
    PopupUnresolved,

    /// Transport-level WebDriver failures.
    ///
    /// Lost session, protocol errors, driver crashes. These are never
    /// retried per-item; they end the run.
    #[error("webdriver error: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),

    /// File system I/O errors while scanning inventory directories.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
