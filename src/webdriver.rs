//! Production [`BrowserSurface`] backed by a `thirtyfour` WebDriver session.

use crate::selectors;
use crate::surface::{BrowserSurface, ElementHandle, OverlayInfo, WaitCondition};
use crate::{BpmError, Result};
use async_trait::async_trait;
use std::cell::RefCell;
use std::time::Duration;
use thirtyfour::error::WebDriverError;
use thirtyfour::{By, WebDriver, WebElement};
use tokio::time::Instant;

/// Adapter from the crate's capability trait to a live WebDriver session.
///
/// Element handles are indices into an interior table of `WebElement`s. The
/// table is cleared on navigation; between navigations it only grows, which
/// is bounded by the size of a single crawl's scans. Handles never outlive
/// the page they were minted on, matching the staleness contract of
/// [`ElementHandle`].
pub struct WebDriverSurface {
    driver: WebDriver,
    elements: RefCell<Vec<WebElement>>,
}

impl WebDriverSurface {
    pub fn new(driver: WebDriver) -> Self {
        Self {
            driver,
            elements: RefCell::new(Vec::new()),
        }
    }

    /// Shut the underlying browser session down.
    pub async fn quit(self) -> Result<()> {
        let Self { driver, .. } = self;
        driver.quit().await.map_err(BpmError::from)
    }

    fn register(&self, element: WebElement) -> ElementHandle {
        let mut table = self.elements.borrow_mut();
        table.push(element);
        ElementHandle(table.len() as u64 - 1)
    }

    fn lookup(&self, handle: &ElementHandle) -> Result<WebElement> {
        self.elements
            .borrow()
            .get(handle.0 as usize)
            .cloned()
            .ok_or_else(|| BpmError::ElementNotFound(format!("stale element handle {}", handle.0)))
    }

    async fn matches(&self, condition: &WaitCondition) -> Result<bool> {
        match condition {
            WaitCondition::ElementPresent(selector) => {
                let found = self
                    .driver
                    .find_all(By::Css(selector.as_str()))
                    .await
                    .map_err(map_driver_error)?;
                Ok(!found.is_empty())
            }
            WaitCondition::ElementAbsent(selector) => {
                let found = self
                    .driver
                    .find_all(By::Css(selector.as_str()))
                    .await
                    .map_err(map_driver_error)?;
                Ok(found.is_empty())
            }
            WaitCondition::UrlChangedFrom(url) => {
                let current = self.current_url().await?;
                Ok(&current != url)
            }
        }
    }
}

#[async_trait(?Send)]
impl BrowserSurface for WebDriverSurface {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.elements.borrow_mut().clear();
        self.driver.goto(url).await.map_err(map_driver_error)
    }

    async fn current_url(&self) -> Result<String> {
        let url = self.driver.current_url().await.map_err(map_driver_error)?;
        Ok(url.to_string())
    }

    async fn find_elements(&self, selector: &str) -> Result<Vec<ElementHandle>> {
        let found = self
            .driver
            .find_all(By::Css(selector))
            .await
            .map_err(map_driver_error)?;
        Ok(found.into_iter().map(|e| self.register(e)).collect())
    }

    async fn find_element(&self, selector: &str) -> Result<ElementHandle> {
        let element = self
            .driver
            .find(By::Css(selector))
            .await
            .map_err(|e| map_find_error(e, selector))?;
        Ok(self.register(element))
    }

    async fn find_child(&self, parent: &ElementHandle, selector: &str) -> Result<ElementHandle> {
        let parent = self.lookup(parent)?;
        let element = parent
            .find(By::Css(selector))
            .await
            .map_err(|e| map_find_error(e, selector))?;
        Ok(self.register(element))
    }

    async fn find_children(
        &self,
        parent: &ElementHandle,
        selector: &str,
    ) -> Result<Vec<ElementHandle>> {
        let parent = self.lookup(parent)?;
        let found = parent
            .find_all(By::Css(selector))
            .await
            .map_err(map_driver_error)?;
        Ok(found.into_iter().map(|e| self.register(e)).collect())
    }

    async fn element_text(&self, handle: &ElementHandle) -> Result<String> {
        let element = self.lookup(handle)?;
        element.text().await.map_err(map_driver_error)
    }

    async fn click(&self, handle: &ElementHandle) -> Result<()> {
        let element = self.lookup(handle)?;
        element.click().await.map_err(|e| match e {
            WebDriverError::NoSuchElement(_) => {
                BpmError::ElementNotFound(format!("stale element handle {}", handle.0))
            }
            other => map_driver_error(other),
        })
    }

    async fn send_text(&self, handle: &ElementHandle, text: &str) -> Result<()> {
        let element = self.lookup(handle)?;
        element.send_keys(text).await.map_err(map_driver_error)
    }

    async fn run_script(
        &self,
        code: &str,
        args: &[serde_json::Value],
    ) -> Result<serde_json::Value> {
        let ret = self
            .driver
            .execute(code, args.to_vec())
            .await
            .map_err(map_driver_error)?;
        Ok(ret.json().clone())
    }

    async fn wait_until(&self, condition: WaitCondition, timeout: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.matches(&condition).await? {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
    }

    async fn scroll_extent(&self) -> Result<i64> {
        let ret = self
            .driver
            .execute("return document.body.scrollHeight;", Vec::new())
            .await
            .map_err(map_driver_error)?;
        ret.convert().map_err(map_driver_error)
    }

    async fn detect_overlay(&self) -> Result<Option<OverlayInfo>> {
        let popups = self
            .driver
            .find_all(By::Css(selectors::POPUP))
            .await
            .map_err(map_driver_error)?;
        let Some(popup) = popups.into_iter().next() else {
            return Ok(None);
        };
        let title = match popup.find(By::Css(selectors::POPUP_TITLE)).await {
            Ok(element) => element.text().await.map_err(map_driver_error)?,
            Err(WebDriverError::NoSuchElement(_)) => String::new(),
            Err(err) => return Err(map_driver_error(err)),
        };
        let close = popup
            .find(By::Css(selectors::POPUP_CLOSE))
            .await
            .map_err(|e| map_find_error(e, selectors::POPUP_CLOSE))?;
        Ok(Some(OverlayInfo {
            title,
            close: self.register(close),
        }))
    }
}

fn map_driver_error(err: WebDriverError) -> BpmError {
    BpmError::WebDriver(err)
}

fn map_find_error(err: WebDriverError, selector: &str) -> BpmError {
    match err {
        WebDriverError::NoSuchElement(_) => {
            BpmError::ElementNotFound(selector.to_string())
        }
        other => BpmError::WebDriver(other),
    }
}
