use crate::types::{OptionRow, OptionType, PosId, TabId};

/// Inbound events the coordinator reacts to. One message is processed at a
/// time; all pending-request mutation happens inside `update`.
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Caller asks for a full-chain collection run on `scrape_tab`.
    StartCollection {
        source_tab: TabId,
        scrape_tab: TabId,
        pos_id: PosId,
        ticker: String,
        strike: f64,
        /// `None` when the caller supplied an unrecognized option type.
        option_type: Option<OptionType>,
    },
    /// The scraping tab finished loading a page.
    PageLoaded { tab: TabId },
    /// Collector enumerated the page's expiration selector, in page order.
    /// Sent once per run, on the first load.
    ExpirationsDiscovered {
        tab: TabId,
        expirations: Vec<String>,
    },
    /// Collector scraped one expiration's table.
    ExpirationData {
        tab: TabId,
        expiration: String,
        rows: Vec<OptionRow>,
    },
    /// Collector gave up after bounded retries.
    ScrapeFailed { tab: TabId, reason: String },
    /// The scraping tab was closed; this is the cancellation signal.
    TabClosed { tab: TabId },
    /// Watchdog fired for the navigation step it was armed at.
    NavigationTimeout { tab: TabId, step: u32 },
}
