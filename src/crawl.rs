//! The download orchestrator: ties the walker, inventory, variant selector
//! and popup resolver together into one sequential crawl.

use crate::config::FetchConfig;
use crate::inventory::Inventory;
use crate::popup::{PopupOutcome, PopupResolver};
use crate::selector::{self, PriorityTable, SelectionResult};
use crate::selectors;
use crate::surface::{BrowserSurface, WaitCondition};
use crate::types::{DownloadOutcome, DownloadRecord, ItemKey, RunReport, TrackRow};
use crate::walker::{Advance, PageWalker, WalkMode};
use crate::{BpmError, Result};
use chrono::Utc;
use std::collections::HashSet;

/// How editions are chosen for each discovered row.
#[derive(Debug, Clone)]
pub enum SelectionPolicy {
    /// Use the row's single unnamed download control (download history)
    Primary,
    /// Pick editions through a priority table (new releases, exclusives,
    /// genre grids)
    Tiered(PriorityTable),
}

/// One crawlable list: where it lives, how it grows, how to pick editions.
#[derive(Debug, Clone)]
pub struct CrawlTarget {
    pub url: String,
    pub mode: WalkMode,
    pub policy: SelectionPolicy,
}

impl CrawlTarget {
    /// The account's download-history list.
    pub fn download_history(config: &FetchConfig) -> Self {
        Self {
            url: format!("{}/account/download-history", config.app_url),
            mode: WalkMode::InfiniteScroll,
            policy: SelectionPolicy::Primary,
        }
    }

    /// The new-releases grid, optionally narrowed to a genre segment.
    pub fn new_releases(config: &FetchConfig, genre: Option<&str>) -> Self {
        let segment = urlencoding::encode(genre.unwrap_or("hip-hop-r&b")).into_owned();
        Self {
            url: format!("{}/new-releases/audio/{segment}", config.app_url),
            mode: WalkMode::Paginated,
            policy: SelectionPolicy::Tiered(PriorityTable::standard()),
        }
    }

    /// The exclusives grid.
    pub fn exclusives(config: &FetchConfig) -> Self {
        Self {
            url: format!("{}/new-releases/audio/exclusives", config.app_url),
            mode: WalkMode::Paginated,
            policy: SelectionPolicy::Tiered(PriorityTable::exclusives()),
        }
    }

    /// An arbitrary genre page. The URL must live under the application
    /// origin; anything else is rejected up front.
    pub fn genre(config: &FetchConfig, url: &str) -> Result<Self> {
        if !url.starts_with(&config.app_url) {
            return Err(BpmError::InvalidConfiguration(format!(
                "genre URL {url} is not under {}",
                config.app_url
            )));
        }
        Ok(Self {
            url: url.to_string(),
            mode: WalkMode::Paginated,
            policy: SelectionPolicy::Tiered(PriorityTable::standard()),
        })
    }
}

/// A single sequential crawl over one target.
///
/// Faults local to one item degrade to a `Failed` record; session-level
/// faults propagate and end the run.
pub struct Crawl<'a, B: BrowserSurface + ?Sized> {
    surface: &'a B,
    inventory: &'a Inventory,
    config: &'a FetchConfig,
    target: CrawlTarget,
    resolver: PopupResolver,
}

impl<'a, B: BrowserSurface + ?Sized> Crawl<'a, B> {
    pub fn new(
        surface: &'a B,
        inventory: &'a Inventory,
        config: &'a FetchConfig,
        target: CrawlTarget,
    ) -> Self {
        Self {
            surface,
            inventory,
            config,
            target,
            resolver: PopupResolver::from_config(config),
        }
    }

    /// Walk the target list and download everything new.
    ///
    /// `limit` bounds the number of discover/advance iterations (pages for a
    /// paginated grid, scroll steps for an infinite list); `None` walks to
    /// the end of content.
    pub async fn run(self, limit: Option<u32>) -> Result<RunReport> {
        let started_at = Utc::now();
        log::info!("crawling {}", self.target.url);
        self.surface.navigate(&self.target.url).await?;

        let rendered = self
            .surface
            .wait_until(
                WaitCondition::element_present(selectors::TABLE_MEDIA),
                self.config.page_load_timeout,
            )
            .await?;
        if !rendered {
            // Never rendered a track list: wrong URL or a dead session.
            return Err(BpmError::ElementNotFound(selectors::TABLE_MEDIA.to_string()));
        }

        let mut walker = PageWalker::new(self.surface, self.target.mode, self.config);
        let mut processed: HashSet<ItemKey> = HashSet::new();
        let mut records: Vec<DownloadRecord> = Vec::new();
        let mut without_editions = 0usize;
        let mut iterations: u32 = 0;

        loop {
            for item in walker.discover_new_items().await? {
                // Mark the item processed before the first await of its
                // download sequence so a retried loop never double-handles it.
                if !processed.insert(item.key()) {
                    continue;
                }
                self.process_item(&item, &mut records, &mut without_editions)
                    .await?;
            }

            iterations += 1;
            if limit.is_some_and(|bound| iterations >= bound) {
                log::info!("stopping after {iterations} page(s), as requested");
                break;
            }
            match walker.advance().await? {
                Advance::EndOfPages => break,
                Advance::MoreContent | Advance::NoChange => {}
            }
        }

        let report = RunReport::new(
            records,
            without_editions,
            iterations,
            started_at,
            Utc::now(),
        );
        log::info!("crawl finished: {}", report.summary());
        Ok(report)
    }

    async fn process_item(
        &self,
        item: &TrackRow,
        records: &mut Vec<DownloadRecord>,
        without_editions: &mut usize,
    ) -> Result<()> {
        let selection: SelectionResult = match &self.target.policy {
            SelectionPolicy::Primary => selector::select_primary(item, self.inventory),
            SelectionPolicy::Tiered(table) => selector::select(item, table, self.inventory),
        };
        let artists = item.artist_line();

        for display_title in &selection.duplicates {
            log::info!("Skipped duplicate: {artists} - {display_title}");
            records.push(DownloadRecord {
                key: item.key(),
                display_title: display_title.clone(),
                artists: artists.clone(),
                outcome: DownloadOutcome::SkippedDuplicate,
                note: None,
            });
        }

        if selection.picks.is_empty() {
            if selection.duplicates.is_empty() {
                *without_editions += 1;
                log::debug!("no known edition offered for {artists} - {}", item.title);
            }
            return Ok(());
        }

        for pick in selection.picks {
            tokio::time::sleep(self.config.download_pacing).await;
            log::info!("Downloading: {artists} - {}", pick.display_title);

            if let Err(err) = self.surface.click(&pick.action).await {
                match err {
                    BpmError::ElementNotFound(_) | BpmError::Timeout { .. } => {
                        log::warn!(
                            "could not trigger download for {artists} - {}: {err}",
                            pick.display_title
                        );
                        records.push(DownloadRecord {
                            key: item.key(),
                            display_title: pick.display_title,
                            artists: artists.clone(),
                            outcome: DownloadOutcome::Failed,
                            note: Some(err.to_string()),
                        });
                        continue;
                    }
                    fatal => return Err(fatal),
                }
            }

            let outcome = match self.resolver.resolve(self.surface).await? {
                PopupOutcome::NoPopup | PopupOutcome::Resolved { .. } => {
                    (DownloadOutcome::Downloaded, None)
                }
                PopupOutcome::Unknown { title } => {
                    log::warn!("unexpected popup {title:?} left open; continuing");
                    (DownloadOutcome::Downloaded, Some(format!("popup left open: {title}")))
                }
                PopupOutcome::Unresolved => {
                    let note = BpmError::PopupUnresolved.to_string();
                    log::warn!(
                        "{note}; further downloads are likely to fail until the limit clears"
                    );
                    (DownloadOutcome::Failed, Some(note))
                }
            };
            records.push(DownloadRecord {
                key: item.key(),
                display_title: pick.display_title,
                artists: artists.clone(),
                outcome: outcome.0,
                note: outcome.1,
            });
        }
        Ok(())
    }
}
