//! Message contract as it crosses the process boundary: camelCase JSON
//! envelopes tagged by `action`, framed with a 4-byte little-endian length
//! prefix (native-messaging framing).

use std::io::{self, Read, Write};

use chain_core::{
    CollectionFailure, CollectionResult, Effect, FailureReason, Msg, OptionRow, OptionType,
    RejectReason, TabId,
};
use serde::{Deserialize, Serialize};

/// Upper bound on a single inbound frame. A sanity bound against corrupted
/// length prefixes, not a protocol limit.
const MAX_FRAME_BYTES: usize = 32 * 1024 * 1024;

/// Inbound messages, tagged the way the page side tags them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum WireRequest {
    #[serde(rename_all = "camelCase")]
    StartCollection {
        source_tab_id: TabId,
        scrape_tab_id: TabId,
        pos_id: String,
        ticker: String,
        strike: f64,
        /// Raw type string; validated by the state machine.
        #[serde(rename = "type")]
        option_type: String,
    },
    #[serde(rename_all = "camelCase")]
    PageLoaded { tab_id: TabId },
    #[serde(rename_all = "camelCase")]
    ExpirationsDiscovered {
        tab_id: TabId,
        expirations: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    ExpirationData {
        tab_id: TabId,
        expiration: String,
        rows: Vec<OptionRow>,
    },
    #[serde(rename_all = "camelCase")]
    ScrapeFailed { tab_id: TabId, reason: String },
    #[serde(rename_all = "camelCase")]
    TabClosed { tab_id: TabId },
}

/// Outbound commands and deliveries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum WireCommand {
    #[serde(rename_all = "camelCase")]
    OpenChainPage { tab_id: TabId, url: String },
    #[serde(rename_all = "camelCase")]
    NavigateTo { tab_id: TabId, expiration: String },
    #[serde(rename_all = "camelCase")]
    CollectionResult {
        tab_id: TabId,
        pos_id: String,
        ticker: String,
        strike: f64,
        #[serde(rename = "type")]
        option_type: OptionType,
        collected_at: String,
        results: Vec<OptionRow>,
    },
    #[serde(rename_all = "camelCase")]
    CollectionFailed {
        tab_id: TabId,
        pos_id: String,
        reason: FailureReason,
        detail: Option<String>,
        partial_results: Vec<OptionRow>,
    },
    #[serde(rename_all = "camelCase")]
    StartRejected {
        tab_id: TabId,
        pos_id: String,
        reason: RejectReason,
    },
    #[serde(rename_all = "camelCase")]
    CloseTab { tab_id: TabId },
}

pub fn msg_from_request(request: WireRequest) -> Msg {
    match request {
        WireRequest::StartCollection {
            source_tab_id,
            scrape_tab_id,
            pos_id,
            ticker,
            strike,
            option_type,
        } => Msg::StartCollection {
            source_tab: source_tab_id,
            scrape_tab: scrape_tab_id,
            pos_id,
            ticker,
            strike,
            option_type: OptionType::parse(&option_type),
        },
        WireRequest::PageLoaded { tab_id } => Msg::PageLoaded { tab: tab_id },
        WireRequest::ExpirationsDiscovered {
            tab_id,
            expirations,
        } => Msg::ExpirationsDiscovered {
            tab: tab_id,
            expirations,
        },
        WireRequest::ExpirationData {
            tab_id,
            expiration,
            rows,
        } => Msg::ExpirationData {
            tab: tab_id,
            expiration,
            rows,
        },
        WireRequest::ScrapeFailed { tab_id, reason } => Msg::ScrapeFailed {
            tab: tab_id,
            reason,
        },
        WireRequest::TabClosed { tab_id } => Msg::TabClosed { tab: tab_id },
    }
}

/// Maps an effect to its outbound frame. `ArmTimeout` is host-internal and
/// maps to nothing.
pub fn command_from_effect(effect: Effect, collected_at: &str) -> Option<WireCommand> {
    match effect {
        Effect::OpenChainPage { tab, url } => Some(WireCommand::OpenChainPage { tab_id: tab, url }),
        Effect::NavigateTo { tab, expiration } => Some(WireCommand::NavigateTo {
            tab_id: tab,
            expiration,
        }),
        Effect::ArmTimeout { .. } => None,
        Effect::DeliverResult { tab, result } => {
            let CollectionResult {
                pos_id,
                ticker,
                strike,
                option_type,
                rows,
            } = result;
            Some(WireCommand::CollectionResult {
                tab_id: tab,
                pos_id,
                ticker,
                strike,
                option_type,
                collected_at: collected_at.to_string(),
                results: rows,
            })
        }
        Effect::DeliverFailure { tab, failure } => {
            let CollectionFailure {
                pos_id,
                reason,
                detail,
                partial,
            } = failure;
            Some(WireCommand::CollectionFailed {
                tab_id: tab,
                pos_id,
                reason,
                detail,
                partial_results: partial,
            })
        }
        Effect::RejectStart {
            tab,
            pos_id,
            reason,
        } => Some(WireCommand::StartRejected {
            tab_id: tab,
            pos_id,
            reason,
        }),
        Effect::CloseTab { tab } => Some(WireCommand::CloseTab { tab_id: tab }),
    }
}

/// Reads one length-prefixed frame; `None` on a clean end of stream.
pub fn read_frame(reader: &mut impl Read) -> io::Result<Option<Vec<u8>>> {
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(err) => return Err(err),
    }
    let len = u32::from_le_bytes(len_buf) as usize;
    if len > MAX_FRAME_BYTES {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame of {len} bytes exceeds the {MAX_FRAME_BYTES} byte bound"),
        ));
    }
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload)?;
    Ok(Some(payload))
}

pub fn write_frame(writer: &mut impl Write, payload: &[u8]) -> io::Result<()> {
    let len = u32::try_from(payload.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "frame too large"))?;
    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(payload)?;
    writer.flush()
}
