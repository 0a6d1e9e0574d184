use std::io::Cursor;

use chain_app::platform::wire::{
    command_from_effect, msg_from_request, read_frame, write_frame, WireCommand, WireRequest,
};
use chain_core::{
    CollectionFailure, CollectionResult, Effect, FailureReason, Msg, OptionType,
};

#[test]
fn frames_round_trip() {
    let mut buffer = Vec::new();
    write_frame(&mut buffer, b"{\"action\":\"pageLoaded\",\"tabId\":7}").expect("write");
    write_frame(&mut buffer, b"second").expect("write");

    let mut cursor = Cursor::new(buffer);
    assert_eq!(
        read_frame(&mut cursor).expect("read").as_deref(),
        Some(&b"{\"action\":\"pageLoaded\",\"tabId\":7}"[..])
    );
    assert_eq!(
        read_frame(&mut cursor).expect("read").as_deref(),
        Some(&b"second"[..])
    );
    assert_eq!(read_frame(&mut cursor).expect("read"), None);
}

#[test]
fn corrupted_length_prefix_is_an_error() {
    let mut cursor = Cursor::new(u32::MAX.to_le_bytes().to_vec());
    assert!(read_frame(&mut cursor).is_err());
}

#[test]
fn start_request_decodes_and_maps_to_contract_message() {
    let json = r#"{
        "action": "startCollection",
        "sourceTabId": 1,
        "scrapeTabId": 7,
        "posId": "p1",
        "ticker": "ESH2026",
        "strike": 6950.0,
        "type": "CALL"
    }"#;
    let request: WireRequest = serde_json::from_str(json).expect("decode");

    let msg = msg_from_request(request);
    assert_eq!(
        msg,
        Msg::StartCollection {
            source_tab: 1,
            scrape_tab: 7,
            pos_id: "p1".to_string(),
            ticker: "ESH2026".to_string(),
            strike: 6950.0,
            option_type: Some(OptionType::Call),
        }
    );
}

#[test]
fn unrecognized_type_string_survives_decoding_for_rejection() {
    let json = r#"{
        "action": "startCollection",
        "sourceTabId": 1,
        "scrapeTabId": 7,
        "posId": "p1",
        "ticker": "ESH2026",
        "strike": 6950.0,
        "type": "butterfly"
    }"#;
    let request: WireRequest = serde_json::from_str(json).expect("decode");

    match msg_from_request(request) {
        Msg::StartCollection { option_type, .. } => assert_eq!(option_type, None),
        other => panic!("expected StartCollection, got {other:?}"),
    }
}

#[test]
fn navigation_command_carries_the_action_tag() {
    let command = command_from_effect(
        Effect::NavigateTo {
            tab: 7,
            expiration: "20260619".to_string(),
        },
        "",
    )
    .expect("command");

    let value = serde_json::to_value(&command).expect("serialize");
    assert_eq!(value["action"], "navigateTo");
    assert_eq!(value["tabId"], 7);
    assert_eq!(value["expiration"], "20260619");
}

#[test]
fn watchdog_arming_never_reaches_the_wire() {
    assert_eq!(command_from_effect(Effect::ArmTimeout { tab: 7, step: 2 }, ""), None);
}

#[test]
fn result_delivery_is_stamped_and_tagged() {
    let effect = Effect::DeliverResult {
        tab: 1,
        result: CollectionResult {
            pos_id: "p1".to_string(),
            ticker: "ESH2026".to_string(),
            strike: 6950.0,
            option_type: OptionType::Call,
            rows: Vec::new(),
        },
    };

    let command = command_from_effect(effect, "2026-01-15T10:00:00+00:00").expect("command");
    let value = serde_json::to_value(&command).expect("serialize");
    assert_eq!(value["action"], "collectionResult");
    assert_eq!(value["posId"], "p1");
    assert_eq!(value["type"], "call");
    assert_eq!(value["collectedAt"], "2026-01-15T10:00:00+00:00");

    let back: WireCommand = serde_json::from_value(value).expect("round trip");
    assert_eq!(back, command);
}

#[test]
fn failure_delivery_uses_contract_reason_names() {
    let effect = Effect::DeliverFailure {
        tab: 1,
        failure: CollectionFailure {
            pos_id: "p1".to_string(),
            reason: FailureReason::TabClosed,
            detail: None,
            partial: Vec::new(),
        },
    };

    let command = command_from_effect(effect, "").expect("command");
    let value = serde_json::to_value(&command).expect("serialize");
    assert_eq!(value["action"], "collectionFailed");
    assert_eq!(value["reason"], "tabClosed");
}
