//! Bounded-retry dismissal of the site's blocking "Download Limit" popup.

use crate::config::FetchConfig;
use crate::selectors;
use crate::surface::{BrowserSurface, OverlayInfo};
use crate::Result;
use std::time::Duration;
use tokio::time::Instant;

/// How a popup check after a download trigger ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupOutcome {
    /// No overlay appeared within the watch window
    NoPopup,
    /// The download-limit popup appeared and was dismissed
    Resolved {
        /// Close attempts it took (1-based)
        attempts: u32,
    },
    /// An overlay appeared but its title is not the download-limit popup.
    /// It is left untouched for the operator.
    Unknown { title: String },
    /// The download-limit popup survived every close attempt
    Unresolved,
}

/// Dismisses the rate-limit overlay with a bounded number of close attempts.
///
/// This is the only retry loop in the crate. The state machine is
/// `NoPopup -> PopupDetected -> Resolving -> Resolved | Unresolved`, with
/// unrelated overlays routed out early so they are never clicked blindly.
#[derive(Debug, Clone)]
pub struct PopupResolver {
    poll_timeout: Duration,
    poll_interval: Duration,
    retry_pause: Duration,
    max_attempts: u32,
}

impl PopupResolver {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            poll_timeout: config.popup_poll_timeout,
            poll_interval: config.poll_interval,
            retry_pause: config.popup_retry_pause,
            max_attempts: config.popup_retries,
        }
    }

    /// Watch for an overlay after a download trigger and resolve it.
    ///
    /// Transport faults propagate; every popup-shaped outcome is a value so
    /// the caller decides how the pending download is recorded.
    pub async fn resolve<B: BrowserSurface + ?Sized>(&self, surface: &B) -> Result<PopupOutcome> {
        let Some(mut overlay) = self.watch_for_overlay(surface).await? else {
            return Ok(PopupOutcome::NoPopup);
        };

        if overlay.title != selectors::DOWNLOAD_LIMIT_TITLE {
            return Ok(PopupOutcome::Unknown {
                title: overlay.title,
            });
        }

        log::warn!("download limit popup detected, attempting to dismiss");
        for attempt in 1..=self.max_attempts {
            surface.click(&overlay.close).await?;
            tokio::time::sleep(self.retry_pause).await;
            match surface.detect_overlay().await? {
                None => {
                    log::debug!("popup dismissed after {attempt} attempt(s)");
                    return Ok(PopupOutcome::Resolved { attempts: attempt });
                }
                // Still up; retry with the freshly minted close handle.
                Some(next) => overlay = next,
            }
        }
        Ok(PopupOutcome::Unresolved)
    }

    async fn watch_for_overlay<B: BrowserSurface + ?Sized>(
        &self,
        surface: &B,
    ) -> Result<Option<OverlayInfo>> {
        let deadline = Instant::now() + self.poll_timeout;
        loop {
            if let Some(overlay) = surface.detect_overlay().await? {
                return Ok(Some(overlay));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
