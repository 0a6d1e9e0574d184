use std::fmt;

use serde::{Deserialize, Serialize};

pub type TabId = u64;

/// Caller-side correlation id; opaque to the coordinator.
pub type PosId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Lenient parse for caller-supplied type strings.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "call" | "c" => Some(Self::Call),
            "put" | "p" => Some(Self::Put),
            _ => None,
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "call"),
            OptionType::Put => write!(f, "put"),
        }
    }
}

/// One option contract's market data for one expiration, as scraped.
/// Absent cells stay `None`; the scrape never invents numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionRow {
    pub option_type: OptionType,
    pub strike: f64,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub last: Option<f64>,
    pub volume: Option<u64>,
    pub open_interest: Option<u64>,
    pub implied_volatility: Option<f64>,
}

/// Aggregated dataset delivered to the originating tab on success.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionResult {
    pub pos_id: PosId,
    pub ticker: String,
    pub strike: f64,
    pub option_type: OptionType,
    pub rows: Vec<OptionRow>,
}

/// Terminal failure notice. Partial rows are attached so the caller can
/// decide whether an incomplete dataset is still useful.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionFailure {
    pub pos_id: PosId,
    pub reason: FailureReason,
    pub detail: Option<String>,
    pub partial: Vec<OptionRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureReason {
    TabClosed,
    Timeout,
    ScrapeError,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::TabClosed => write!(f, "tabClosed"),
            FailureReason::Timeout => write!(f, "timeout"),
            FailureReason::ScrapeError => write!(f, "scrapeError"),
        }
    }
}

/// Why a start request was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RejectReason {
    TabBusy,
    EmptyTicker,
    InvalidOptionType,
    InvalidStrike,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::TabBusy => write!(f, "tabBusy"),
            RejectReason::EmptyTicker => write!(f, "emptyTicker"),
            RejectReason::InvalidOptionType => write!(f, "invalidOptionType"),
            RejectReason::InvalidStrike => write!(f, "invalidStrike"),
        }
    }
}
