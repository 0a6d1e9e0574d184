use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chain_app::platform::effects::CollectorRunner;
use chain_core::{update, CoordinatorState, Effect, Msg, OptionType};
use chain_engine::{
    ChainPage, CollectorHandle, CollectorSettings, DomTableParser, LogOverlay, PageError,
};

const MARCH_TABLE: &str = r#"
    <table>
      <tr><th>Strike</th><th>Type</th><th>Bid</th><th>Ask</th></tr>
      <tr><td>6,950</td><td>Call</td><td>12.25</td><td>12.75</td></tr>
      <tr><td>6,975</td><td>Call</td><td>10.50</td><td>11.00</td></tr>
    </table>"#;

const JUNE_TABLE: &str = r#"
    <table>
      <tr><th>Strike</th><th>Type</th><th>Bid</th><th>Ask</th></tr>
      <tr><td>7,000</td><td>Call</td><td>21.00</td><td>21.75</td></tr>
      <tr><td>7,050</td><td>Put</td><td>18.25</td><td>19.00</td></tr>
    </table>"#;

struct PageState {
    expiration: String,
    html: String,
}

/// A chain page whose visible expiration switches when it is navigated, the
/// way the real page does between loads.
struct SwitchingPage {
    state: Mutex<PageState>,
}

impl SwitchingPage {
    fn new() -> Self {
        Self {
            state: Mutex::new(PageState {
                expiration: "20260320".to_string(),
                html: MARCH_TABLE.to_string(),
            }),
        }
    }

    fn navigate(&self, expiration: &str) {
        let mut state = self.state.lock().unwrap();
        state.expiration = expiration.to_string();
        state.html = match expiration {
            "20260320" => MARCH_TABLE.to_string(),
            _ => JUNE_TABLE.to_string(),
        };
    }
}

#[async_trait]
impl ChainPage for SwitchingPage {
    async fn is_ready(&self) -> bool {
        true
    }

    async fn current_expiration(&self) -> Result<String, PageError> {
        Ok(self.state.lock().unwrap().expiration.clone())
    }

    async fn expiration_titles(&self) -> Result<Vec<String>, PageError> {
        Ok(vec![
            "Mar 20, 2026 (4) ESH26".to_string(),
            "Jun 19, 2026 ESM26".to_string(),
        ])
    }

    async fn content(&self) -> Result<String, PageError> {
        Ok(self.state.lock().unwrap().html.clone())
    }
}

#[test]
fn embedded_collector_drives_a_run_to_completion() {
    let page = Arc::new(SwitchingPage::new());
    let handle = CollectorHandle::new(
        page.clone(),
        Arc::new(DomTableParser),
        Arc::new(LogOverlay),
        CollectorSettings {
            max_attempts: 3,
            retry_backoff: Duration::from_millis(5),
            pause_after_load: Duration::from_millis(1),
        },
    );
    let runner = CollectorRunner::new(handle);

    let mut state = CoordinatorState::new();
    let (next, effects) = update(
        state,
        Msg::StartCollection {
            source_tab: 1,
            scrape_tab: 7,
            pos_id: "p1".to_string(),
            ticker: "ESH2026".to_string(),
            strike: 6950.0,
            option_type: Some(OptionType::Call),
        },
    );
    state = next;
    assert_eq!(runner.apply(&effects), 1);

    let mut result = None;
    // Bounded message pump; a healthy run needs far fewer rounds.
    for _ in 0..10 {
        let Some(msg) = runner.next_msg(Duration::from_secs(5)) else {
            break;
        };
        let (next, effects) = update(state, msg);
        state = next;

        for effect in &effects {
            match effect {
                Effect::NavigateTo { expiration, .. } => page.navigate(expiration),
                Effect::DeliverResult { result: delivered, .. } => {
                    result = Some(delivered.clone());
                }
                _ => {}
            }
        }
        runner.apply(&effects);
        if result.is_some() {
            break;
        }
    }

    let result = result.expect("collection result delivered");
    assert_eq!(result.pos_id, "p1");
    assert_eq!(result.ticker, "ESH2026");
    let strikes: Vec<f64> = result.rows.iter().map(|row| row.strike).collect();
    assert_eq!(strikes, vec![6950.0, 6975.0, 7000.0, 7050.0]);
    assert_eq!(state.active_count(), 0);
}
