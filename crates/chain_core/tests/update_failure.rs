use std::sync::Once;

use chain_core::{
    update, CoordinatorState, Effect, FailureReason, Msg, OptionRow, OptionType,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(chain_logging::initialize_for_tests);
}

fn row(strike: f64) -> OptionRow {
    OptionRow {
        option_type: OptionType::Call,
        strike,
        bid: Some(1.25),
        ask: Some(1.40),
        last: None,
        volume: Some(12),
        open_interest: Some(340),
        implied_volatility: None,
    }
}

fn mid_run_state() -> CoordinatorState {
    let (state, _) = update(
        CoordinatorState::new(),
        Msg::StartCollection {
            source_tab: 1,
            scrape_tab: 7,
            pos_id: "p1".to_string(),
            ticker: "AAPL".to_string(),
            strike: 150.0,
            option_type: Some(OptionType::Call),
        },
    );
    let (state, _) = update(
        state,
        Msg::ExpirationsDiscovered {
            tab: 7,
            expirations: vec!["2024-01".to_string(), "2024-02".to_string()],
        },
    );
    let (state, _) = update(
        state,
        Msg::ExpirationData {
            tab: 7,
            expiration: "2024-01".to_string(),
            rows: vec![row(150.0)],
        },
    );
    state
}

#[test]
fn tab_closure_fails_run_with_partial_results() {
    init_logging();
    let state = mid_run_state();

    let (state, effects) = update(state, Msg::TabClosed { tab: 7 });

    assert_eq!(effects.len(), 1);
    match &effects[0] {
        Effect::DeliverFailure { tab, failure } => {
            assert_eq!(*tab, 1);
            assert_eq!(failure.pos_id, "p1");
            assert_eq!(failure.reason, FailureReason::TabClosed);
            // Exactly the one collected expiration's rows are attached.
            assert_eq!(failure.partial.len(), 1);
            assert_eq!(failure.partial[0].strike, 150.0);
        }
        other => panic!("expected DeliverFailure, got {other:?}"),
    }
    assert_eq!(state.active_count(), 0);

    // Closing the same (now removed) tab again is a no-op.
    let (state, effects) = update(state, Msg::TabClosed { tab: 7 });
    assert!(effects.is_empty());
    assert_eq!(state.active_count(), 0);
}

#[test]
fn timeout_fails_run_when_step_is_current() {
    init_logging();
    let (state, _) = update(
        CoordinatorState::new(),
        Msg::StartCollection {
            source_tab: 1,
            scrape_tab: 7,
            pos_id: "p1".to_string(),
            ticker: "AAPL".to_string(),
            strike: 150.0,
            option_type: Some(OptionType::Call),
        },
    );

    let (state, effects) = update(state, Msg::NavigationTimeout { tab: 7, step: 0 });

    match &effects[0] {
        Effect::DeliverFailure { tab, failure } => {
            assert_eq!(*tab, 1);
            assert_eq!(failure.reason, FailureReason::Timeout);
            assert!(failure.partial.is_empty());
        }
        other => panic!("expected DeliverFailure, got {other:?}"),
    }
    assert_eq!(state.active_count(), 0);
}

#[test]
fn stale_timeout_is_discarded() {
    init_logging();
    // One expiration collected, so the request sits at step 1; a watchdog
    // armed at step 0 must not kill it.
    let state = mid_run_state();

    let (state, effects) = update(state, Msg::NavigationTimeout { tab: 7, step: 0 });

    assert!(effects.is_empty());
    assert_eq!(state.active_count(), 1);
}

#[test]
fn timeout_for_unknown_tab_is_ignored() {
    init_logging();
    let (state, effects) = update(
        CoordinatorState::new(),
        Msg::NavigationTimeout { tab: 42, step: 0 },
    );

    assert!(effects.is_empty());
    assert_eq!(state.active_count(), 0);
}

#[test]
fn exhausted_collector_retries_fail_the_run() {
    init_logging();
    let state = mid_run_state();

    let (state, effects) = update(
        state,
        Msg::ScrapeFailed {
            tab: 7,
            reason: "expiration selector unreadable after 3 attempts".to_string(),
        },
    );

    match &effects[0] {
        Effect::DeliverFailure { failure, .. } => {
            assert_eq!(failure.reason, FailureReason::ScrapeError);
            assert_eq!(
                failure.detail.as_deref(),
                Some("expiration selector unreadable after 3 attempts")
            );
            assert_eq!(failure.partial.len(), 1);
        }
        other => panic!("expected DeliverFailure, got {other:?}"),
    }
    assert_eq!(state.active_count(), 0);
}
