#![allow(dead_code)]

//! A scripted in-memory [`BrowserSurface`] for exercising the crawl stack
//! without a browser.

use async_trait::async_trait;
use bpm_fetch::selectors;
use bpm_fetch::{
    BpmError, BrowserSurface, ElementHandle, FetchConfig, OverlayInfo, Result, WaitCondition,
};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

/// What a minted handle points at, for click assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Row { page: usize, index: usize },
    /// Text-only elements: titles, artist links, pagination glyphs
    Static,
    Edition { title: String, label: String },
    Primary { title: String },
    PaginationNext,
    OverlayClose,
}

#[derive(Debug, Clone)]
pub struct FakeRow {
    pub title: String,
    pub artists: Vec<String>,
    pub editions: Vec<String>,
    pub has_primary: bool,
}

pub fn row(title: &str, artists: &[&str], editions: &[&str]) -> FakeRow {
    FakeRow {
        title: title.to_string(),
        artists: artists.iter().map(|a| a.to_string()).collect(),
        editions: editions.iter().map(|e| e.to_string()).collect(),
        has_primary: true,
    }
}

struct Minted {
    target: Target,
    text: String,
}

struct State {
    pages: Vec<Vec<FakeRow>>,
    page: usize,
    visible: usize,
    reveal_step: usize,
    infinite: bool,
    extent: i64,
    url: String,
    login_succeeds: bool,
    minted: HashMap<u64, Minted>,
    next_id: u64,
    clicks: Vec<Target>,
    typed: Vec<String>,
    overlay_script: VecDeque<Option<String>>,
    row_scans: u32,
}

pub struct FakeBrowser {
    state: RefCell<State>,
}

impl FakeBrowser {
    /// One infinite-scroll page; `visible` rows render initially and each
    /// scroll reveals `reveal_step` more.
    pub fn infinite(rows: Vec<FakeRow>, visible: usize, reveal_step: usize) -> Self {
        let visible = visible.min(rows.len());
        Self {
            state: RefCell::new(State {
                pages: vec![rows],
                page: 0,
                visible,
                reveal_step,
                infinite: true,
                extent: 600,
                url: String::new(),
                login_succeeds: true,
                minted: HashMap::new(),
                next_id: 1,
                clicks: Vec::new(),
                typed: Vec::new(),
                overlay_script: VecDeque::new(),
                row_scans: 0,
            }),
        }
    }

    /// A paginated grid; every page renders fully.
    pub fn paginated(pages: Vec<Vec<FakeRow>>) -> Self {
        let visible = pages.first().map_or(0, Vec::len);
        Self {
            state: RefCell::new(State {
                pages,
                page: 0,
                visible,
                reveal_step: 0,
                infinite: false,
                extent: 600,
                url: String::new(),
                login_succeeds: true,
                minted: HashMap::new(),
                next_id: 1,
                clicks: Vec::new(),
                typed: Vec::new(),
                overlay_script: VecDeque::new(),
                row_scans: 0,
            }),
        }
    }

    /// Script the next `detect_overlay` responses; once the queue drains the
    /// overlay reads as absent.
    pub fn script_overlays(&self, overlays: &[Option<&str>]) {
        let mut state = self.state.borrow_mut();
        state
            .overlay_script
            .extend(overlays.iter().map(|o| o.map(str::to_string)));
    }

    pub fn set_login_succeeds(&self, ok: bool) {
        self.state.borrow_mut().login_succeeds = ok;
    }

    pub fn clicks(&self) -> Vec<Target> {
        self.state.borrow().clicks.clone()
    }

    pub fn clicked_edition_labels(&self) -> Vec<String> {
        self.state
            .borrow()
            .clicks
            .iter()
            .filter_map(|t| match t {
                Target::Edition { label, .. } => Some(label.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn overlay_close_clicks(&self) -> usize {
        self.state
            .borrow()
            .clicks
            .iter()
            .filter(|t| **t == Target::OverlayClose)
            .count()
    }

    /// How many times the row list was queried.
    pub fn row_scans(&self) -> u32 {
        self.state.borrow().row_scans
    }

    pub fn typed(&self) -> Vec<String> {
        self.state.borrow().typed.clone()
    }

    pub fn url(&self) -> String {
        self.state.borrow().url.clone()
    }

    fn mint(state: &mut State, target: Target, text: &str) -> ElementHandle {
        let id = state.next_id;
        state.next_id += 1;
        state.minted.insert(
            id,
            Minted {
                target,
                text: text.to_string(),
            },
        );
        ElementHandle(id)
    }

    fn target_of(&self, handle: &ElementHandle) -> Result<Target> {
        self.state
            .borrow()
            .minted
            .get(&handle.0)
            .map(|m| m.target.clone())
            .ok_or_else(|| BpmError::ElementNotFound(format!("unknown handle {}", handle.0)))
    }
}

/// Fast timeouts so tests never sit in real waits.
pub fn test_config() -> FetchConfig {
    FetchConfig {
        page_load_timeout: Duration::from_millis(50),
        scroll_settle_timeout: Duration::from_millis(20),
        poll_interval: Duration::from_millis(2),
        popup_poll_timeout: Duration::from_millis(5),
        popup_retry_pause: Duration::from_millis(1),
        download_pacing: Duration::from_millis(1),
        ..FetchConfig::default()
    }
}

#[async_trait(?Send)]
impl BrowserSurface for FakeBrowser {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.state.borrow_mut().url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.state.borrow().url.clone())
    }

    async fn find_elements(&self, selector: &str) -> Result<Vec<ElementHandle>> {
        let mut state = self.state.borrow_mut();
        match selector {
            selectors::ROW_ITEM => {
                state.row_scans += 1;
                let page = state.page;
                let count = if state.infinite {
                    state.visible
                } else {
                    state.pages[page].len()
                };
                Ok((0..count)
                    .map(|index| Self::mint(&mut state, Target::Row { page, index }, ""))
                    .collect())
            }
            selectors::PAGINATION_ITEM => {
                if state.infinite {
                    return Ok(Vec::new());
                }
                let mut items =
                    vec![Self::mint(&mut state, Target::Static, "\u{2039}")];
                if state.page + 1 < state.pages.len() {
                    items.push(Self::mint(&mut state, Target::PaginationNext, "\u{203a}"));
                }
                Ok(items)
            }
            _ => Ok(Vec::new()),
        }
    }

    async fn find_element(&self, selector: &str) -> Result<ElementHandle> {
        let mut state = self.state.borrow_mut();
        match selector {
            selectors::LOGIN_EMAIL | selectors::LOGIN_PASSWORD => {
                Ok(Self::mint(&mut state, Target::Static, ""))
            }
            _ => Err(BpmError::ElementNotFound(selector.to_string())),
        }
    }

    async fn find_child(&self, parent: &ElementHandle, selector: &str) -> Result<ElementHandle> {
        let target = self.target_of(parent)?;
        let Target::Row { page, index } = target else {
            return Err(BpmError::ElementNotFound(selector.to_string()));
        };
        let mut state = self.state.borrow_mut();
        let row = state.pages[page][index].clone();
        match selector {
            selectors::ROW_TITLE => Ok(Self::mint(&mut state, Target::Static, &row.title)),
            selectors::ROW_DOWNLOAD if row.has_primary => Ok(Self::mint(
                &mut state,
                Target::Primary {
                    title: row.title.clone(),
                },
                "",
            )),
            _ => Err(BpmError::ElementNotFound(selector.to_string())),
        }
    }

    async fn find_children(
        &self,
        parent: &ElementHandle,
        selector: &str,
    ) -> Result<Vec<ElementHandle>> {
        let target = self.target_of(parent)?;
        let Target::Row { page, index } = target else {
            return Ok(Vec::new());
        };
        let mut state = self.state.borrow_mut();
        let row = state.pages[page][index].clone();
        match selector {
            selectors::ROW_ARTIST_LINK => Ok(row
                .artists
                .iter()
                .map(|artist| Self::mint(&mut state, Target::Static, artist))
                .collect()),
            selectors::EDITION_TAG => Ok(row
                .editions
                .iter()
                .map(|label| {
                    Self::mint(
                        &mut state,
                        Target::Edition {
                            title: row.title.clone(),
                            label: label.clone(),
                        },
                        label,
                    )
                })
                .collect()),
            _ => Ok(Vec::new()),
        }
    }

    async fn element_text(&self, handle: &ElementHandle) -> Result<String> {
        self.state
            .borrow()
            .minted
            .get(&handle.0)
            .map(|m| m.text.clone())
            .ok_or_else(|| BpmError::ElementNotFound(format!("unknown handle {}", handle.0)))
    }

    async fn click(&self, handle: &ElementHandle) -> Result<()> {
        let target = self.target_of(handle)?;
        let mut state = self.state.borrow_mut();
        if target == Target::PaginationNext && state.page + 1 < state.pages.len() {
            state.page += 1;
            state.visible = state.pages[state.page].len();
        }
        state.clicks.push(target);
        Ok(())
    }

    async fn send_text(&self, handle: &ElementHandle, text: &str) -> Result<()> {
        self.target_of(handle)?;
        let mut state = self.state.borrow_mut();
        state.typed.push(text.to_string());
        if text.contains(selectors::KEY_ENTER) && state.login_succeeds {
            state.url = "https://app.bpmsupreme.com/".to_string();
        }
        Ok(())
    }

    async fn run_script(
        &self,
        code: &str,
        _args: &[serde_json::Value],
    ) -> Result<serde_json::Value> {
        let mut state = self.state.borrow_mut();
        if code == selectors::SCROLL_TO_BOTTOM && state.infinite {
            let total = state.pages[state.page].len();
            if state.visible < total {
                state.visible = (state.visible + state.reveal_step).min(total);
                state.extent += 600;
            }
        }
        Ok(serde_json::Value::Null)
    }

    async fn wait_until(&self, condition: WaitCondition, _timeout: Duration) -> Result<bool> {
        let state = self.state.borrow();
        Ok(match condition {
            WaitCondition::ElementPresent(selector) => match selector.as_str() {
                selectors::TABLE_MEDIA => !state.pages.is_empty(),
                selectors::ROW_ITEM => !state.pages[state.page].is_empty(),
                selectors::ACCOUNT_MENU => state.login_succeeds,
                _ => true,
            },
            WaitCondition::ElementAbsent(_) => true,
            WaitCondition::UrlChangedFrom(url) => state.url != url,
        })
    }

    async fn scroll_extent(&self) -> Result<i64> {
        Ok(self.state.borrow().extent)
    }

    async fn detect_overlay(&self) -> Result<Option<OverlayInfo>> {
        let mut state = self.state.borrow_mut();
        match state.overlay_script.pop_front() {
            Some(Some(title)) => {
                let close = Self::mint(&mut state, Target::OverlayClose, "");
                Ok(Some(OverlayInfo { title, close }))
            }
            Some(None) | None => Ok(None),
        }
    }
}
