use crate::{BpmError, Result};
use std::fmt;
use std::time::Duration;

/// Tunable timeouts, pacing and retry bounds for a crawl session.
///
/// All waits in the crate are bounded by values from this structure; there is
/// no module-level timing state. The defaults mirror how the site actually
/// behaves: page loads can be very slow behind the loader overlay, scroll
/// settles within a few seconds, and downloads need a couple of seconds of
/// spacing to stay under the server's rate limiter.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Base URL of the marketing/login site
    pub base_url: String,
    /// Base URL of the logged-in application
    pub app_url: String,
    /// Upper bound for page loads and element appearance waits
    pub page_load_timeout: Duration,
    /// How long a scroll gets to grow the page before it counts as stalled
    pub scroll_settle_timeout: Duration,
    /// Interval between condition checks inside bounded waits
    pub poll_interval: Duration,
    /// How long to watch for a popup after triggering a download
    pub popup_poll_timeout: Duration,
    /// Pause between popup close attempts
    pub popup_retry_pause: Duration,
    /// Close attempts before the popup counts as unresolvable
    pub popup_retries: u32,
    /// Fixed delay between consecutive download triggers
    pub download_pacing: Duration,
    /// Artist/title separator used in local filenames
    pub separator: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.bpmsupreme.com".to_string(),
            app_url: "https://app.bpmsupreme.com".to_string(),
            page_load_timeout: Duration::from_secs(120),
            scroll_settle_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(250),
            popup_poll_timeout: Duration::from_millis(1250),
            popup_retry_pause: Duration::from_millis(500),
            popup_retries: 3,
            download_pacing: Duration::from_secs(2),
            separator: " - ".to_string(),
        }
    }
}

impl FetchConfig {
    /// Validate the configuration.
    ///
    /// Called by [`BpmClient::new`](crate::BpmClient::new); invalid values
    /// are rejected up front rather than surfacing mid-crawl.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() || self.app_url.is_empty() {
            return Err(BpmError::InvalidConfiguration(
                "base_url and app_url must be set".to_string(),
            ));
        }
        if self.popup_retries == 0 {
            return Err(BpmError::InvalidConfiguration(
                "popup_retries must be at least 1".to_string(),
            ));
        }
        if self.separator.is_empty() {
            return Err(BpmError::InvalidConfiguration(
                "separator must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Account credentials for the site login form.
///
/// The password is intentionally unreadable through `Debug` so credential
/// values never end up in logs.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        let username = username.into();
        let password = password.into();
        if username.is_empty() {
            return Err(BpmError::InvalidConfiguration(
                "username must not be empty".to_string(),
            ));
        }
        if password.is_empty() {
            return Err(BpmError::InvalidConfiguration(
                "password must not be empty".to_string(),
            ));
        }
        Ok(Self { username, password })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
