use std::io::{self, Read, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use chain_core::{update, CoordinatorSettings, CoordinatorState, Effect, Msg, TabId};
use chain_logging::{chain_error, chain_info, chain_warn};
use chrono::Utc;

use super::wire::{self, WireRequest};

/// Events multiplexed into the host loop.
enum HostEvent {
    Inbound(Msg),
    Shutdown,
}

/// Long-lived coordinator host. Decodes inbound frames, processes one message
/// at a time through the pure update function, and executes the resulting
/// effects: watchdog arming stays in-process, everything else becomes an
/// outbound frame. Returns when the input stream ends.
pub fn run_host<R, W>(
    input: R,
    output: &mut W,
    settings: CoordinatorSettings,
) -> io::Result<()>
where
    R: Read + Send + 'static,
    W: Write,
{
    let (tx, rx) = mpsc::channel::<HostEvent>();
    spawn_frame_reader(input, tx.clone());

    let mut state = CoordinatorState::with_settings(settings);
    let navigation_timeout = state.settings().navigation_timeout;
    let mut seq: u64 = 0;

    while let Ok(HostEvent::Inbound(msg)) = rx.recv() {
        seq += 1;
        chain_logging::set_msg_seq(seq);

        let (next, effects) = update(state, msg);
        state = next;

        execute_effects(effects, output, &tx, navigation_timeout)?;
        if state.consume_dirty() {
            log_progress(&state);
        }
    }
    Ok(())
}

fn execute_effects<W: Write>(
    effects: Vec<Effect>,
    output: &mut W,
    tx: &mpsc::Sender<HostEvent>,
    navigation_timeout: Duration,
) -> io::Result<()> {
    for effect in effects {
        if let Effect::ArmTimeout { tab, step } = effect {
            arm_timeout(tx, tab, step, navigation_timeout);
            continue;
        }
        let collected_at = Utc::now().to_rfc3339();
        if let Some(command) = wire::command_from_effect(effect, &collected_at) {
            let payload = serde_json::to_vec(&command)
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
            wire::write_frame(output, &payload)?;
        }
    }
    Ok(())
}

fn arm_timeout(tx: &mpsc::Sender<HostEvent>, tab: TabId, step: u32, timeout: Duration) {
    let tx = tx.clone();
    thread::spawn(move || {
        thread::sleep(timeout);
        // Stale steps are discarded by the state machine.
        let _ = tx.send(HostEvent::Inbound(Msg::NavigationTimeout { tab, step }));
    });
}

fn spawn_frame_reader<R>(input: R, tx: mpsc::Sender<HostEvent>)
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut input = input;
        loop {
            match wire::read_frame(&mut input) {
                Ok(Some(payload)) => match serde_json::from_slice::<WireRequest>(&payload) {
                    Ok(request) => {
                        if tx
                            .send(HostEvent::Inbound(wire::msg_from_request(request)))
                            .is_err()
                        {
                            return;
                        }
                    }
                    Err(err) => chain_warn!("undecodable frame dropped: {err}"),
                },
                Ok(None) => break,
                Err(err) => {
                    chain_error!("input stream failed: {err}");
                    break;
                }
            }
        }
        let _ = tx.send(HostEvent::Shutdown);
    });
}

fn log_progress(state: &CoordinatorState) {
    for row in state.view().requests {
        let known = row
            .known
            .map(|total| total.to_string())
            .unwrap_or_else(|| "?".to_string());
        chain_info!(
            "tab {}: {} {}: {}/{} expirations, {} rows",
            row.tab,
            row.ticker,
            row.status,
            row.collected,
            known,
            row.rows
        );
    }
}
