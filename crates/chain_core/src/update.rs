use chain_logging::{chain_debug, chain_info, chain_warn};

use crate::state::{CoordinatorState, PendingRequest, RequestStatus};
use crate::types::{
    CollectionFailure, CollectionResult, FailureReason, OptionRow, OptionType, PosId, RejectReason,
    TabId,
};
use crate::{nav, Effect, Msg};

/// Pure update function: applies a message to the coordinator state and
/// returns the effects to execute. Messages for tabs with no pending request
/// are logged and dropped; they carry nothing actionable.
pub fn update(mut state: CoordinatorState, msg: Msg) -> (CoordinatorState, Vec<Effect>) {
    let effects = match msg {
        Msg::StartCollection {
            source_tab,
            scrape_tab,
            pos_id,
            ticker,
            strike,
            option_type,
        } => start_collection(
            &mut state,
            source_tab,
            scrape_tab,
            pos_id,
            ticker,
            strike,
            option_type,
        ),
        Msg::PageLoaded { tab } => page_loaded(&mut state, tab),
        Msg::ExpirationsDiscovered { tab, expirations } => {
            expirations_discovered(&mut state, tab, expirations)
        }
        Msg::ExpirationData {
            tab,
            expiration,
            rows,
        } => expiration_data(&mut state, tab, expiration, rows),
        Msg::ScrapeFailed { tab, reason } => {
            fail_request(&mut state, tab, FailureReason::ScrapeError, Some(reason))
        }
        Msg::TabClosed { tab } => fail_request(&mut state, tab, FailureReason::TabClosed, None),
        Msg::NavigationTimeout { tab, step } => navigation_timeout(&mut state, tab, step),
    };
    (state, effects)
}

fn start_collection(
    state: &mut CoordinatorState,
    source_tab: TabId,
    scrape_tab: TabId,
    pos_id: PosId,
    ticker: String,
    strike: f64,
    option_type: Option<OptionType>,
) -> Vec<Effect> {
    let ticker = ticker.trim().to_string();

    if state.request(scrape_tab).is_some() {
        return reject_start(source_tab, pos_id, scrape_tab, RejectReason::TabBusy);
    }
    if ticker.is_empty() {
        return reject_start(source_tab, pos_id, scrape_tab, RejectReason::EmptyTicker);
    }
    let Some(option_type) = option_type else {
        return reject_start(source_tab, pos_id, scrape_tab, RejectReason::InvalidOptionType);
    };
    if !strike.is_finite() || strike <= 0.0 {
        return reject_start(source_tab, pos_id, scrape_tab, RejectReason::InvalidStrike);
    }

    let url = nav::chain_page_url(&state.settings().exchange, &ticker).to_string();
    chain_info!("collection accepted for tab {scrape_tab}: {ticker} {strike} {option_type}");
    state.insert_request(
        scrape_tab,
        PendingRequest::new(source_tab, pos_id, ticker, strike, option_type),
    );
    vec![
        Effect::OpenChainPage {
            tab: scrape_tab,
            url,
        },
        Effect::ArmTimeout {
            tab: scrape_tab,
            step: 0,
        },
    ]
}

fn reject_start(
    source_tab: TabId,
    pos_id: PosId,
    scrape_tab: TabId,
    reason: RejectReason,
) -> Vec<Effect> {
    chain_warn!("start for tab {scrape_tab} rejected: {reason}");
    vec![Effect::RejectStart {
        tab: source_tab,
        pos_id,
        reason,
    }]
}

fn page_loaded(state: &mut CoordinatorState, tab: TabId) -> Vec<Effect> {
    let Some(request) = state.request_mut(tab) else {
        chain_debug!("load event for tab {tab} with no pending request");
        return Vec::new();
    };
    if request.status == RequestStatus::AwaitingNavigation {
        request.advance(RequestStatus::AwaitingScrape);
        state.mark_dirty();
    }
    Vec::new()
}

fn expirations_discovered(
    state: &mut CoordinatorState,
    tab: TabId,
    expirations: Vec<String>,
) -> Vec<Effect> {
    let cap = state.settings().max_expirations;
    let Some(request) = state.request_mut(tab) else {
        chain_warn!("expiration list from tab {tab} with no pending request");
        return Vec::new();
    };
    if request.expirations.is_some() {
        chain_debug!("expiration list for tab {tab} already known");
        return Vec::new();
    }

    let mut ordered: Vec<String> = Vec::new();
    for expiration in expirations {
        if !ordered.contains(&expiration) {
            ordered.push(expiration);
        }
    }
    if let Some(cap) = cap {
        if ordered.len() > cap {
            chain_info!(
                "tab {tab}: capping run at {cap} expirations (page offers {})",
                ordered.len()
            );
            ordered.truncate(cap);
        }
    }
    chain_info!("tab {tab}: page declares {} expirations", ordered.len());
    request.expirations = Some(ordered);
    // Discovery implies the page is up, even if the load event went missing.
    if request.status == RequestStatus::AwaitingNavigation {
        request.advance(RequestStatus::AwaitingScrape);
    }
    state.mark_dirty();
    Vec::new()
}

fn expiration_data(
    state: &mut CoordinatorState,
    tab: TabId,
    expiration: String,
    rows: Vec<OptionRow>,
) -> Vec<Effect> {
    let Some(request) = state.request_mut(tab) else {
        chain_warn!("scrape report from tab {tab} with no pending request");
        return Vec::new();
    };
    if request.collected.contains(&expiration) {
        // Retry of an already-collected expiration; re-acknowledge without
        // touching the results.
        chain_debug!("duplicate report for tab {tab} expiration {expiration}");
        return Vec::new();
    }

    chain_info!("tab {tab}: {} rows for expiration {expiration}", rows.len());
    request.rows.extend(rows);
    request.collected.insert(expiration);
    request.step += 1;

    if let Some(next) = request.next_expiration().map(ToOwned::to_owned) {
        request.target_expiration = Some(next.clone());
        request.advance(RequestStatus::AwaitingNavigation);
        let step = request.step;
        state.mark_dirty();
        return vec![
            Effect::NavigateTo {
                tab,
                expiration: next,
            },
            Effect::ArmTimeout { tab, step },
        ];
    }

    if request.expirations.is_none() {
        chain_warn!("tab {tab} reported data before an expiration list; finishing with one");
    }
    request.advance(RequestStatus::Complete);
    let Some(request) = state.remove_request(tab) else {
        return Vec::new();
    };
    chain_info!(
        "collection complete for tab {tab}: {} rows across {} expirations",
        request.rows.len(),
        request.collected.len()
    );
    vec![
        Effect::DeliverResult {
            tab: request.source_tab,
            result: CollectionResult {
                pos_id: request.pos_id,
                ticker: request.ticker,
                strike: request.strike,
                option_type: request.option_type,
                rows: request.rows,
            },
        },
        Effect::CloseTab { tab },
    ]
}

fn navigation_timeout(state: &mut CoordinatorState, tab: TabId, step: u32) -> Vec<Effect> {
    match state.request(tab) {
        None => {
            chain_debug!("timeout for tab {tab} with no pending request");
            return Vec::new();
        }
        Some(request) if request.step != step => {
            chain_debug!(
                "stale timeout for tab {tab} (armed at step {step}, now {})",
                request.step
            );
            return Vec::new();
        }
        Some(_) => {}
    }
    fail_request(state, tab, FailureReason::Timeout, None)
}

fn fail_request(
    state: &mut CoordinatorState,
    tab: TabId,
    reason: FailureReason,
    detail: Option<String>,
) -> Vec<Effect> {
    let Some(mut request) = state.remove_request(tab) else {
        chain_debug!("{reason} for tab {tab} with no pending request");
        return Vec::new();
    };
    request.advance(RequestStatus::Failed);
    chain_warn!(
        "collection failed for tab {tab}: {reason} ({} partial rows)",
        request.rows.len()
    );
    vec![Effect::DeliverFailure {
        tab: request.source_tab,
        failure: CollectionFailure {
            pos_id: request.pos_id,
            reason,
            detail,
            partial: request.rows,
        },
    }]
}
