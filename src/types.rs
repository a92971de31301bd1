//! Core data types: the edition vocabulary, discovered rows, and run reports.

use crate::surface::ElementHandle;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A named track edition offered for download.
///
/// The vocabulary is closed and site-defined; tag labels outside it are
/// dropped at row-scrape time rather than surfaced as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Edition {
    IntroDirty,
    QuickHitDirty,
    IntroClean,
    QuickHitClean,
    Dirty,
    Clean,
    DirtyShortEdit,
    DirtyExtended,
    CleanShortEdit,
    CleanExtended,
}

impl Edition {
    /// Every known edition, in no particular order.
    pub const ALL: [Edition; 10] = [
        Edition::IntroDirty,
        Edition::QuickHitDirty,
        Edition::IntroClean,
        Edition::QuickHitClean,
        Edition::Dirty,
        Edition::Clean,
        Edition::DirtyShortEdit,
        Edition::DirtyExtended,
        Edition::CleanShortEdit,
        Edition::CleanExtended,
    ];

    /// The label as it appears on the site's version tags.
    pub fn label(&self) -> &'static str {
        match self {
            Edition::IntroDirty => "Intro Dirty",
            Edition::QuickHitDirty => "Quick Hit Dirty",
            Edition::IntroClean => "Intro Clean",
            Edition::QuickHitClean => "Quick Hit Clean",
            Edition::Dirty => "Dirty",
            Edition::Clean => "Clean",
            Edition::DirtyShortEdit => "Dirty Short Edit",
            Edition::DirtyExtended => "Dirty Extended",
            Edition::CleanShortEdit => "Clean Short Edit",
            Edition::CleanExtended => "Clean Extended",
        }
    }

    /// Parse a tag label. Returns `None` for labels outside the vocabulary.
    pub fn from_label(label: &str) -> Option<Edition> {
        Edition::ALL.iter().copied().find(|e| e.label() == label)
    }
}

impl fmt::Display for Edition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Stable identity for once-only processing of a discovered item.
///
/// Row element handles are only valid within a single render epoch, so they
/// cannot identify an item across scrolls. The display title survives
/// re-renders but collapses legitimately distinct same-titled rows; the
/// discovery index breaks that tie.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ItemKey {
    /// Monotonically increasing discovery index assigned by the walker
    pub index: u64,
    /// The row's track title at discovery time
    pub title: String,
}

/// One discovered row of the remote list UI.
///
/// The `editions` mapping is read once at discovery time and never
/// refreshed. All element handles here belong to the render `epoch` the row
/// was discovered in; after the walker advances past that epoch they must be
/// treated as invalid.
#[derive(Debug, Clone)]
pub struct TrackRow {
    /// Handle of the underlying row element
    pub row: ElementHandle,
    /// Render epoch the handles were read in
    pub epoch: u64,
    /// Discovery index, monotonically increasing across the whole walk
    pub index: u64,
    /// Track title
    pub title: String,
    /// Credited artists, in display order
    pub artists: Vec<String>,
    /// Available editions with their download controls, in document order
    pub editions: Vec<(Edition, ElementHandle)>,
    /// Single unnamed download control, present on history-style rows
    pub primary: Option<ElementHandle>,
}

impl TrackRow {
    /// Identity used by the orchestrator's `processed` set.
    pub fn key(&self) -> ItemKey {
        ItemKey {
            index: self.index,
            title: self.title.clone(),
        }
    }

    /// Artists joined for display, `"Unknown"` when none were detected.
    pub fn artist_line(&self) -> String {
        if self.artists.is_empty() {
            "Unknown".to_string()
        } else {
            self.artists.join(", ")
        }
    }
}

/// Two rows are the same item only if they are the same rendered element.
/// Identical titles from different rows stay distinct.
impl PartialEq for TrackRow {
    fn eq(&self, other: &Self) -> bool {
        self.epoch == other.epoch && self.row == other.row
    }
}

impl Eq for TrackRow {}

impl Hash for TrackRow {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.epoch.hash(state);
        self.row.hash(state);
    }
}

/// What happened to one attempted edition download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DownloadOutcome {
    Downloaded,
    SkippedDuplicate,
    Failed,
}

/// Per-edition outcome, kept for end-of-run reporting only.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadRecord {
    pub key: ItemKey,
    /// Edition-qualified title, e.g. `"Song Title (Intro Dirty)"`
    pub display_title: String,
    pub artists: String,
    pub outcome: DownloadOutcome,
    /// Failure detail, when there is one
    pub note: Option<String>,
}

/// Summary of one crawl run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub records: Vec<DownloadRecord>,
    pub downloaded: usize,
    pub skipped_duplicates: usize,
    pub failed: usize,
    /// Items that offered no edition from the known vocabulary
    pub without_editions: usize,
    /// Discover/advance iterations the walk performed
    pub pages_walked: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn new(
        records: Vec<DownloadRecord>,
        without_editions: usize,
        pages_walked: u32,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        let count = |outcome: DownloadOutcome| {
            records
                .iter()
                .filter(|record| record.outcome == outcome)
                .count()
        };
        Self {
            downloaded: count(DownloadOutcome::Downloaded),
            skipped_duplicates: count(DownloadOutcome::SkippedDuplicate),
            failed: count(DownloadOutcome::Failed),
            records,
            without_editions,
            pages_walked,
            started_at,
            finished_at,
        }
    }

    /// One-line human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "{} downloaded, {} skipped as duplicates, {} failed ({} items without a known edition)",
            self.downloaded, self.skipped_duplicates, self.failed, self.without_editions
        )
    }

    /// Records that ended in failure.
    pub fn failures(&self) -> impl Iterator<Item = &DownloadRecord> {
        self.records
            .iter()
            .filter(|record| record.outcome == DownloadOutcome::Failed)
    }
}
