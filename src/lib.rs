//! Duplicate-aware download automation for the BPM Supreme record pool.
//!
//! The crate drives a WebDriver-controlled browser through the site's
//! download-history, new-releases, exclusives and genre lists, skipping
//! tracks already present in a local directory and picking one preferred
//! edition per track through a priority table.
//!
//! The crawl core ([`PageWalker`], [`Crawl`], [`PopupResolver`]) only talks
//! to the browser through the [`BrowserSurface`] trait, so everything above
//! the driver is testable without a browser.

pub mod client;
pub mod config;
pub mod crawl;
pub mod error;
pub mod inventory;
pub mod login;
pub mod popup;
pub mod selector;
pub mod selectors;
pub mod surface;
pub mod types;
pub mod walker;
pub mod webdriver;

pub use client::BpmClient;
pub use config::{Credentials, FetchConfig};
pub use crawl::{Crawl, CrawlTarget, SelectionPolicy};
pub use error::BpmError;
pub use inventory::Inventory;
pub use popup::{PopupOutcome, PopupResolver};
pub use selector::{select, select_primary, Pick, PriorityTable, SelectionResult, Tier};
pub use surface::{BrowserSurface, ElementHandle, OverlayInfo, WaitCondition};
pub use types::{DownloadOutcome, DownloadRecord, Edition, ItemKey, RunReport, TrackRow};
pub use walker::{Advance, PageWalker, WalkMode, WalkerState};
pub use webdriver::WebDriverSurface;

#[cfg(any(test, feature = "mock"))]
pub use surface::MockBrowserSurface;

pub type Result<T> = std::result::Result<T, BpmError>;
