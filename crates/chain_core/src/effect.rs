use crate::types::{CollectionFailure, CollectionResult, PosId, RejectReason, TabId};

/// Commands the host executes on behalf of the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Point the scraping tab at the ticker's option-chain page.
    OpenChainPage { tab: TabId, url: String },
    /// Tell the collector in `tab` to move to another expiration.
    NavigateTo { tab: TabId, expiration: String },
    /// Start a watchdog timer for the given navigation step.
    ArmTimeout { tab: TabId, step: u32 },
    /// Deliver the aggregated dataset to the originating tab.
    DeliverResult { tab: TabId, result: CollectionResult },
    /// Deliver a terminal failure notice to the originating tab.
    DeliverFailure {
        tab: TabId,
        failure: CollectionFailure,
    },
    /// Tell the caller its start request was not accepted.
    RejectStart {
        tab: TabId,
        pos_id: PosId,
        reason: RejectReason,
    },
    /// The scraping tab is no longer needed.
    CloseTab { tab: TabId },
}
