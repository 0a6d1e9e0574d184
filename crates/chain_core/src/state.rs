use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::Duration;

use chain_logging::chain_warn;

use crate::types::{OptionRow, OptionType, PosId, TabId};
use crate::view_model::{ProgressView, RequestRowView};

/// Coordinator tunables. `navigation_timeout` is not consumed by the state
/// machine itself; the host reads it when arming `Effect::ArmTimeout`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorSettings {
    pub navigation_timeout: Duration,
    /// Cap on how many expirations a single run visits; `None` is unbounded.
    pub max_expirations: Option<usize>,
    /// Exchange prefix used when building the chain-page URL.
    pub exchange: String,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_secs(15),
            max_expirations: Some(20),
            exchange: "CME_MINI".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    AwaitingNavigation,
    AwaitingScrape,
    Complete,
    Failed,
}

impl RequestStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestStatus::AwaitingNavigation => write!(f, "awaiting-navigation"),
            RequestStatus::AwaitingScrape => write!(f, "awaiting-scrape"),
            RequestStatus::Complete => write!(f, "complete"),
            RequestStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Per-tab record of one collection run in flight. Created on an accepted
/// start request, mutated only through `update`, removed on completion or
/// failure once the outcome has been delivered.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    pub source_tab: TabId,
    pub pos_id: PosId,
    pub ticker: String,
    pub strike: f64,
    pub option_type: OptionType,
    /// Expiration the coordinator most recently commanded the tab to load.
    pub target_expiration: Option<String>,
    /// Page-declared ordering, set once from the first discovery report.
    pub expirations: Option<Vec<String>>,
    /// Expirations already scraped; membership blocks duplicate reports.
    pub collected: BTreeSet<String>,
    /// Row records accumulated across expirations; append-only.
    pub rows: Vec<OptionRow>,
    pub status: RequestStatus,
    /// Navigation-step counter; an armed watchdog carries the step it was
    /// armed at so stale timers are discarded.
    pub step: u32,
}

impl PendingRequest {
    pub fn new(
        source_tab: TabId,
        pos_id: PosId,
        ticker: String,
        strike: f64,
        option_type: OptionType,
    ) -> Self {
        Self {
            source_tab,
            pos_id,
            ticker,
            strike,
            option_type,
            target_expiration: None,
            expirations: None,
            collected: BTreeSet::new(),
            rows: Vec::new(),
            status: RequestStatus::AwaitingNavigation,
            step: 0,
        }
    }

    /// First expiration in page order that has not been collected yet.
    pub fn next_expiration(&self) -> Option<&str> {
        self.expirations
            .as_deref()?
            .iter()
            .find(|exp| !self.collected.contains(*exp))
            .map(String::as_str)
    }

    /// Forward-only status change; a terminal status never changes again.
    pub(crate) fn advance(&mut self, next: RequestStatus) {
        if self.status.is_terminal() {
            chain_warn!("ignoring status change {} -> {next} (terminal)", self.status);
            return;
        }
        self.status = next;
    }
}

/// Single-writer table of pending requests, keyed by scraping tab.
/// Collectors never touch this directly; they only exchange messages.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CoordinatorState {
    settings: CoordinatorSettings,
    requests: BTreeMap<TabId, PendingRequest>,
    dirty: bool,
}

impl CoordinatorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: CoordinatorSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &CoordinatorSettings {
        &self.settings
    }

    pub fn request(&self, tab: TabId) -> Option<&PendingRequest> {
        self.requests.get(&tab)
    }

    pub fn active_count(&self) -> usize {
        self.requests.len()
    }

    pub fn view(&self) -> ProgressView {
        let requests = self
            .requests
            .iter()
            .map(|(tab, request)| {
                let known = request.expirations.as_ref().map(Vec::len);
                let collected = request.collected.len();
                RequestRowView {
                    tab: *tab,
                    ticker: request.ticker.clone(),
                    status: request.status,
                    collected,
                    known,
                    rows: request.rows.len(),
                    percent: known
                        .filter(|total| *total > 0)
                        .map(|total| (collected * 100 / total).min(100) as u8),
                }
            })
            .collect();
        ProgressView { requests }
    }

    /// Returns whether anything changed since the last call, and resets.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn request_mut(&mut self, tab: TabId) -> Option<&mut PendingRequest> {
        self.requests.get_mut(&tab)
    }

    pub(crate) fn insert_request(&mut self, tab: TabId, request: PendingRequest) {
        self.requests.insert(tab, request);
        self.dirty = true;
    }

    pub(crate) fn remove_request(&mut self, tab: TabId) -> Option<PendingRequest> {
        let removed = self.requests.remove(&tab);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }
}
