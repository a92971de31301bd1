//! Variant selection: given the editions a row offers, decide which to
//! download and under what display title.

use crate::inventory::Inventory;
use crate::surface::ElementHandle;
use crate::types::{Edition, TrackRow};

/// A set of editions considered equally preferred and downloadable together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tier(pub Vec<Edition>);

impl Tier {
    pub fn contains(&self, edition: Edition) -> bool {
        self.0.contains(&edition)
    }
}

/// Ordered priority tiers. The selector walks tiers in order and stops at
/// the first one that yields a download; lower tiers are never consulted
/// after that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityTable {
    tiers: Vec<Tier>,
}

impl PriorityTable {
    pub fn new(tiers: Vec<Tier>) -> Self {
        Self { tiers }
    }

    /// Preference order for new-release and genre grids.
    ///
    /// Radio-style clean cuts are only worth fetching when no dirty, intro
    /// or quick-hit edition exists, since those are considered definitive.
    pub fn standard() -> Self {
        Self::new(vec![
            Tier(vec![Edition::IntroDirty, Edition::QuickHitDirty]),
            Tier(vec![Edition::IntroClean, Edition::QuickHitClean]),
            Tier(vec![Edition::Dirty, Edition::Clean]),
            Tier(vec![Edition::CleanShortEdit]),
        ])
    }

    /// Preference order for the exclusives grid, which favors the short and
    /// extended dirty cuts it is the only source of.
    pub fn exclusives() -> Self {
        Self::new(vec![
            Tier(vec![Edition::DirtyShortEdit, Edition::DirtyExtended]),
            Tier(vec![Edition::Dirty]),
            Tier(vec![Edition::Clean]),
            Tier(vec![Edition::CleanExtended, Edition::CleanShortEdit]),
        ])
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }
}

/// One edition chosen for download.
#[derive(Debug, Clone)]
pub struct Pick {
    /// `None` for the unnamed primary control on history rows
    pub edition: Option<Edition>,
    pub action: ElementHandle,
    /// Edition-qualified title used for duplicate matching and reporting
    pub display_title: String,
}

/// Outcome of selecting against one row. `picks` and `duplicates` both
/// empty means the row offered no edition from the known vocabulary.
#[derive(Debug, Clone, Default)]
pub struct SelectionResult {
    pub picks: Vec<Pick>,
    /// Display titles that were offered but already present locally
    pub duplicates: Vec<String>,
}

/// Select editions for `row` according to `table`.
///
/// Tiers are evaluated in order. Within a tier every offered edition is
/// considered: duplicates are recorded and skipped without abandoning the
/// rest of the tier. The first tier that produces at least one
/// non-duplicate pick wins and lower tiers are not evaluated; a tier whose
/// offerings are all duplicates yields nothing and the scan moves on.
pub fn select(row: &TrackRow, table: &PriorityTable, inventory: &Inventory) -> SelectionResult {
    let mut duplicates = Vec::new();
    for tier in table.tiers() {
        let mut picks = Vec::new();
        for (edition, action) in &row.editions {
            if !tier.contains(*edition) {
                continue;
            }
            let display_title = format!("{} ({})", row.title, edition.label());
            if inventory.contains(&display_title) {
                duplicates.push(display_title);
                continue;
            }
            picks.push(Pick {
                edition: Some(*edition),
                action: action.clone(),
                display_title,
            });
        }
        if !picks.is_empty() {
            return SelectionResult { picks, duplicates };
        }
    }
    SelectionResult {
        picks: Vec::new(),
        duplicates,
    }
}

/// Select the row's single unnamed download control, as used on the
/// download-history page. The bare title is the display title.
pub fn select_primary(row: &TrackRow, inventory: &Inventory) -> SelectionResult {
    let Some(action) = &row.primary else {
        return SelectionResult::default();
    };
    if inventory.contains(&row.title) {
        return SelectionResult {
            picks: Vec::new(),
            duplicates: vec![row.title.clone()],
        };
    }
    SelectionResult {
        picks: vec![Pick {
            edition: None,
            action: action.clone(),
            display_title: row.title.clone(),
        }],
        duplicates: Vec::new(),
    }
}
