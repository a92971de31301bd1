//! The capability interface the crawl consumes instead of a concrete
//! browser driver. Everything the walker, login flow and popup resolver do
//! goes through [`BrowserSurface`], so all of them can be exercised against
//! a fake without a real browser.

use crate::Result;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

/// Opaque reference to a rendered element.
///
/// Handles are only meaningful to the surface that minted them, and only
/// until the page re-renders. A virtualized list may recycle DOM nodes on
/// scroll, so holding a handle across a walker advance is not valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub u64);

/// Condition a bounded wait can poll for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitCondition {
    /// At least one element matches the selector
    ElementPresent(String),
    /// No element matches the selector
    ElementAbsent(String),
    /// The page URL is no longer the given one
    UrlChangedFrom(String),
}

impl WaitCondition {
    pub fn element_present(selector: &str) -> Self {
        WaitCondition::ElementPresent(selector.to_string())
    }

    pub fn element_absent(selector: &str) -> Self {
        WaitCondition::ElementAbsent(selector.to_string())
    }

    pub fn url_changed_from(url: &str) -> Self {
        WaitCondition::UrlChangedFrom(url.to_string())
    }
}

impl fmt::Display for WaitCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitCondition::ElementPresent(selector) => write!(f, "element {selector:?} to appear"),
            WaitCondition::ElementAbsent(selector) => write!(f, "element {selector:?} to clear"),
            WaitCondition::UrlChangedFrom(url) => write!(f, "navigation away from {url}"),
        }
    }
}

/// A blocking overlay currently covering the page.
#[derive(Debug, Clone)]
pub struct OverlayInfo {
    /// The overlay's title text, empty when it has none
    pub title: String,
    /// Handle of the overlay's close control
    pub close: ElementHandle,
}

/// Browser automation surface.
///
/// The production implementation is [`WebDriverSurface`](crate::WebDriverSurface);
/// tests substitute fakes or, with the `mock` feature, `MockBrowserSurface`.
///
/// Implementations are expected to map "no such element" driver errors to
/// [`BpmError::ElementNotFound`](crate::BpmError::ElementNotFound) so callers
/// can tell a recoverable absence from a broken session.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait(?Send)]
pub trait BrowserSurface {
    async fn navigate(&self, url: &str) -> Result<()>;

    async fn current_url(&self) -> Result<String>;

    /// Every element matching `selector`, in document order. Empty when none
    /// match; this is not an error.
    async fn find_elements(&self, selector: &str) -> Result<Vec<ElementHandle>>;

    /// First element matching `selector`, or `ElementNotFound`.
    async fn find_element(&self, selector: &str) -> Result<ElementHandle>;

    /// First descendant of `parent` matching `selector`, or `ElementNotFound`.
    async fn find_child(&self, parent: &ElementHandle, selector: &str) -> Result<ElementHandle>;

    /// Every descendant of `parent` matching `selector`. Empty when none match.
    async fn find_children(
        &self,
        parent: &ElementHandle,
        selector: &str,
    ) -> Result<Vec<ElementHandle>>;

    /// The element's rendered text content.
    async fn element_text(&self, handle: &ElementHandle) -> Result<String>;

    async fn click(&self, handle: &ElementHandle) -> Result<()>;

    /// Type text into an element. Key codes (Enter) may be embedded.
    async fn send_text(&self, handle: &ElementHandle, text: &str) -> Result<()>;

    /// Run a script in page context and return its JSON-converted result.
    async fn run_script(
        &self,
        code: &str,
        args: &[serde_json::Value],
    ) -> Result<serde_json::Value>;

    /// Poll until `condition` holds. Returns `Ok(false)` when `timeout`
    /// elapses first; transport faults are errors.
    async fn wait_until(&self, condition: WaitCondition, timeout: Duration) -> Result<bool>;

    /// Current scrollable extent of the page body, in pixels.
    async fn scroll_extent(&self) -> Result<i64>;

    /// The blocking overlay currently shown, if any.
    async fn detect_overlay(&self) -> Result<Option<OverlayInfo>>;
}
