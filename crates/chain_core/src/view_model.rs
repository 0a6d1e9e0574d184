use crate::state::RequestStatus;
use crate::types::TabId;

/// Pull-based progress snapshot over all in-flight collection runs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressView {
    pub requests: Vec<RequestRowView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRowView {
    pub tab: TabId,
    pub ticker: String,
    pub status: RequestStatus,
    /// Expirations scraped so far.
    pub collected: usize,
    /// Total expirations the page declared, once discovered.
    pub known: Option<usize>,
    /// Row records accumulated so far.
    pub rows: usize,
    pub percent: Option<u8>,
}
