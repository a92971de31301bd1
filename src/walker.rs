//! Incremental traversal of the site's dynamically loading track lists.
//!
//! The walker owns the scroll/pagination position and the render-epoch
//! bookkeeping; it never triggers downloads itself.

use crate::config::FetchConfig;
use crate::selectors;
use crate::surface::{BrowserSurface, ElementHandle, WaitCondition};
use crate::types::{Edition, TrackRow};
use crate::{BpmError, Result};
use tokio::time::Instant;

/// How the current list grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkMode {
    /// The list appends rows when scrolled to the bottom
    InfiniteScroll,
    /// The list is split into pages with a next-page control
    Paginated,
}

/// Result of one attempt to advance the walk position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// New content rendered; previously issued handles may now be stale
    MoreContent,
    /// Nothing changed within the settle timeout. Ambiguous: may be the end
    /// of content or a slow network. A second consecutive stall is reported
    /// as `EndOfPages`.
    NoChange,
    /// No further content exists; the walk is done
    EndOfPages,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkerState {
    Idle,
    Scanning,
    Scrolling,
    Done,
}

/// Drives discovery over an infinite-scroll or paginated grid.
///
/// Rows are identified positionally: both list styles render discovered
/// rows in a stable document order within a page, so the walker keeps a
/// cursor of how many rows it has already returned and only yields rows
/// beyond it. Every advance that re-renders content bumps the render epoch;
/// handles minted under an older epoch must not be reused.
pub struct PageWalker<'a, B: BrowserSurface + ?Sized> {
    surface: &'a B,
    mode: WalkMode,
    config: &'a FetchConfig,
    state: WalkerState,
    epoch: u64,
    cursor: usize,
    discovered: u64,
    stalls: u32,
    last_extent: i64,
}

impl<'a, B: BrowserSurface + ?Sized> PageWalker<'a, B> {
    pub fn new(surface: &'a B, mode: WalkMode, config: &'a FetchConfig) -> Self {
        Self {
            surface,
            mode,
            config,
            state: WalkerState::Idle,
            epoch: 0,
            cursor: 0,
            discovered: 0,
            stalls: 0,
            last_extent: 0,
        }
    }

    pub fn state(&self) -> WalkerState {
        self.state
    }

    /// Current render epoch. Incremented on every `MoreContent` advance.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Last scroll extent observed by an advance, in pixels.
    pub fn last_extent(&self) -> i64 {
        self.last_extent
    }

    /// Scrape rows that appeared since the last call, in document order.
    ///
    /// Returns an empty vector when the list has not rendered yet (a
    /// transient load state the caller rides out by advancing again).
    pub async fn discover_new_items(&mut self) -> Result<Vec<TrackRow>> {
        if self.state == WalkerState::Done {
            return Ok(Vec::new());
        }
        self.state = WalkerState::Scanning;

        let rows = match self.surface.find_elements(selectors::ROW_ITEM).await {
            Ok(rows) => rows,
            Err(BpmError::ElementNotFound(_)) => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };

        let mut items = Vec::new();
        for row in rows.into_iter().skip(self.cursor) {
            items.push(self.scrape_row(row).await?);
            self.cursor += 1;
        }
        self.state = WalkerState::Idle;
        Ok(items)
    }

    /// Advance the walk position and wait for the page to settle.
    pub async fn advance(&mut self) -> Result<Advance> {
        if self.state == WalkerState::Done {
            return Ok(Advance::EndOfPages);
        }
        self.state = WalkerState::Scrolling;

        let advance = match self.mode {
            WalkMode::InfiniteScroll => self.scroll_to_bottom().await?,
            WalkMode::Paginated => self.next_page().await?,
        };

        match advance {
            Advance::MoreContent => {
                self.stalls = 0;
                self.epoch += 1;
                if self.mode == WalkMode::Paginated {
                    self.cursor = 0;
                }
                self.state = WalkerState::Idle;
                Ok(Advance::MoreContent)
            }
            Advance::NoChange => {
                self.stalls += 1;
                if self.stalls >= 2 {
                    log::debug!("page extent stalled twice, treating as end of content");
                    self.state = WalkerState::Done;
                    Ok(Advance::EndOfPages)
                } else {
                    self.state = WalkerState::Idle;
                    Ok(Advance::NoChange)
                }
            }
            Advance::EndOfPages => {
                self.state = WalkerState::Done;
                Ok(Advance::EndOfPages)
            }
        }
    }

    async fn scroll_to_bottom(&mut self) -> Result<Advance> {
        let before = self.surface.scroll_extent().await?;
        self.surface
            .run_script(selectors::SCROLL_TO_BOTTOM, &[])
            .await?;

        let deadline = Instant::now() + self.config.scroll_settle_timeout;
        loop {
            let extent = self.surface.scroll_extent().await?;
            if extent > before {
                self.last_extent = extent;
                return Ok(Advance::MoreContent);
            }
            if Instant::now() >= deadline {
                self.last_extent = extent;
                return Ok(Advance::NoChange);
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    async fn next_page(&mut self) -> Result<Advance> {
        let items = match self.surface.find_elements(selectors::PAGINATION_ITEM).await {
            Ok(items) => items,
            Err(BpmError::ElementNotFound(_)) => return Ok(Advance::EndOfPages),
            Err(err) => return Err(err),
        };

        for item in items {
            let text = self.surface.element_text(&item).await?;
            if text.trim() != selectors::NEXT_PAGE_GLYPH {
                continue;
            }
            self.surface.click(&item).await?;
            let rendered = self
                .surface
                .wait_until(
                    WaitCondition::element_present(selectors::ROW_ITEM),
                    self.config.page_load_timeout,
                )
                .await?;
            if !rendered {
                return Ok(Advance::NoChange);
            }
            return Ok(Advance::MoreContent);
        }
        Ok(Advance::EndOfPages)
    }

    async fn scrape_row(&mut self, row: ElementHandle) -> Result<TrackRow> {
        let title = match self.surface.find_child(&row, selectors::ROW_TITLE).await {
            Ok(element) => self.surface.element_text(&element).await?.trim().to_string(),
            Err(BpmError::ElementNotFound(_)) => {
                log::warn!("row {} has no readable track title", self.discovered);
                "Unknown".to_string()
            }
            Err(err) => return Err(err),
        };

        let mut artists = Vec::new();
        for link in self
            .surface
            .find_children(&row, selectors::ROW_ARTIST_LINK)
            .await?
        {
            let name = self.surface.element_text(&link).await?.trim().to_string();
            if !name.is_empty() {
                artists.push(name);
            }
        }

        let mut editions = Vec::new();
        for tag in self
            .surface
            .find_children(&row, selectors::EDITION_TAG)
            .await?
        {
            let label = self.surface.element_text(&tag).await?;
            // Labels outside the known vocabulary are ignored.
            if let Some(edition) = Edition::from_label(label.trim()) {
                editions.push((edition, tag));
            }
        }

        let primary = match self.surface.find_child(&row, selectors::ROW_DOWNLOAD).await {
            Ok(element) => Some(element),
            Err(BpmError::ElementNotFound(_)) => None,
            Err(err) => return Err(err),
        };

        let index = self.discovered;
        self.discovered += 1;
        Ok(TrackRow {
            row,
            epoch: self.epoch,
            index,
            title,
            artists,
            editions,
            primary,
        })
    }
}
