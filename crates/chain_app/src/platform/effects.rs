use std::time::Duration;

use chain_core::{Effect, Msg};
use chain_engine::{CollectorHandle, CollectorReport, CollectorTask};

/// In-process page side of the message contract: turns the coordinator's
/// navigation effects into collector activations and maps collector reports
/// back into coordinator messages. Used where the collector runs embedded
/// (a locally driven page) instead of behind the browser transport.
pub struct CollectorRunner {
    handle: CollectorHandle,
}

impl CollectorRunner {
    pub fn new(handle: CollectorHandle) -> Self {
        Self { handle }
    }

    /// Honors the effects an embedded collector can execute; other effects
    /// are left for the caller. Returns how many were consumed.
    pub fn apply(&self, effects: &[Effect]) -> usize {
        let mut consumed = 0;
        for effect in effects {
            match effect {
                Effect::OpenChainPage { tab, .. } => {
                    // First load: the coordinator does not know the
                    // expiration set yet.
                    self.handle.activate(CollectorTask {
                        tab: *tab,
                        discover: true,
                        filter: None,
                    });
                    consumed += 1;
                }
                Effect::NavigateTo { tab, .. } => {
                    self.handle.activate(CollectorTask {
                        tab: *tab,
                        discover: false,
                        filter: None,
                    });
                    consumed += 1;
                }
                _ => {}
            }
        }
        consumed
    }

    /// Blocks briefly for the next collector report, mapped into the contract.
    pub fn next_msg(&self, timeout: Duration) -> Option<Msg> {
        self.handle.recv_timeout(timeout).map(msg_from_report)
    }
}

pub fn msg_from_report(report: CollectorReport) -> Msg {
    match report {
        CollectorReport::ExpirationsDiscovered { tab, expirations } => {
            Msg::ExpirationsDiscovered { tab, expirations }
        }
        CollectorReport::ExpirationData {
            tab,
            expiration,
            rows,
        } => Msg::ExpirationData {
            tab,
            expiration,
            rows,
        },
        CollectorReport::ScrapeFailed { tab, reason } => Msg::ScrapeFailed { tab, reason },
    }
}
