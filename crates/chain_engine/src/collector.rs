use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use chain_core::{OptionRow, OptionType, TabId};
use chain_logging::{chain_debug, chain_info, chain_warn};
use thiserror::Error;

use crate::expirations::parse_expiration_titles;
use crate::overlay::Overlay;
use crate::page::{ChainPage, PageError};
use crate::parser::TableParser;

/// Collector pacing and retry bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorSettings {
    /// Bounded retries for page readiness and selector reads.
    pub max_attempts: u32,
    pub retry_backoff: Duration,
    /// Settle pause between readiness and the actual scrape.
    pub pause_after_load: Duration,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_backoff: Duration::from_millis(500),
            pause_after_load: Duration::from_millis(500),
        }
    }
}

/// One activation's instructions, derived from the coordinator's navigation
/// command. The collector keeps no state across activations; all continuity
/// lives in the coordinator's pending request.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectorTask {
    pub tab: TabId,
    /// Enumerate the expiration selector before scraping. Requested on the
    /// first load only; afterwards the coordinator already knows the set.
    pub discover: bool,
    pub filter: Option<RowFilter>,
}

/// Instrument selector; rows not matching are dropped before reporting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowFilter {
    pub strike: f64,
    pub option_type: OptionType,
}

impl RowFilter {
    pub fn matches(&self, row: &OptionRow) -> bool {
        row.option_type == self.option_type && (row.strike - self.strike).abs() < 1e-9
    }
}

/// What a collector activation sends back to the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectorReport {
    ExpirationsDiscovered {
        tab: TabId,
        expirations: Vec<String>,
    },
    ExpirationData {
        tab: TabId,
        expiration: String,
        rows: Vec<OptionRow>,
    },
    ScrapeFailed {
        tab: TabId,
        reason: String,
    },
}

pub trait ReportSink: Send + Sync {
    fn send(&self, report: CollectorReport);
}

pub struct ChannelReportSink {
    tx: mpsc::Sender<CollectorReport>,
}

impl ChannelReportSink {
    pub fn new(tx: mpsc::Sender<CollectorReport>) -> Self {
        Self { tx }
    }
}

impl ReportSink for ChannelReportSink {
    fn send(&self, report: CollectorReport) {
        let _ = self.tx.send(report);
    }
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("page not ready after {attempts} attempts")]
    PageNotReady { attempts: u32 },
    #[error("expiration selector unreadable after {attempts} attempts: {source}")]
    ExpirationsUnreadable { attempts: u32, source: PageError },
    #[error(transparent)]
    Page(#[from] PageError),
}

/// Drives one page activation: overlay up, enumerate expirations when asked,
/// parse the visible table, report, overlay down. Transient page errors are
/// retried here; only exhausted retries reach the coordinator.
pub struct Collector {
    page: Arc<dyn ChainPage>,
    parser: Arc<dyn TableParser>,
    overlay: Arc<dyn Overlay>,
    settings: CollectorSettings,
}

impl Collector {
    pub fn new(
        page: Arc<dyn ChainPage>,
        parser: Arc<dyn TableParser>,
        overlay: Arc<dyn Overlay>,
        settings: CollectorSettings,
    ) -> Self {
        Self {
            page,
            parser,
            overlay,
            settings,
        }
    }

    pub async fn run(&self, task: &CollectorTask, sink: &dyn ReportSink) -> Result<(), ScrapeError> {
        self.overlay.show("Collecting option chain data…", None);
        match self.scrape(task, sink).await {
            Ok(()) => {
                self.overlay.hide();
                Ok(())
            }
            Err(err) => {
                chain_warn!("tab {}: scrape failed: {err}", task.tab);
                sink.send(CollectorReport::ScrapeFailed {
                    tab: task.tab,
                    reason: err.to_string(),
                });
                self.overlay.show_result(false, &err.to_string());
                Err(err)
            }
        }
    }

    async fn scrape(&self, task: &CollectorTask, sink: &dyn ReportSink) -> Result<(), ScrapeError> {
        self.wait_until_ready().await?;

        if task.discover {
            let titles = self.expiration_titles_with_retry().await?;
            let expirations: Vec<String> = parse_expiration_titles(&titles)
                .into_iter()
                .map(|expiration| expiration.date_code)
                .collect();
            chain_info!("tab {}: {} expirations on page", task.tab, expirations.len());
            sink.send(CollectorReport::ExpirationsDiscovered {
                tab: task.tab,
                expirations,
            });
        }

        tokio::time::sleep(self.settings.pause_after_load).await;
        let expiration = self.page.current_expiration().await?;
        let content = self.page.content().await?;
        let mut rows = self.parser.parse_visible_table(&content);
        if let Some(filter) = &task.filter {
            let before = rows.len();
            rows.retain(|row| filter.matches(row));
            chain_debug!("tab {}: filter kept {} of {before} rows", task.tab, rows.len());
        }

        self.overlay
            .show(&format!("{} rows for {expiration}", rows.len()), None);
        sink.send(CollectorReport::ExpirationData {
            tab: task.tab,
            expiration,
            rows,
        });
        Ok(())
    }

    async fn wait_until_ready(&self) -> Result<(), ScrapeError> {
        for attempt in 1..=self.settings.max_attempts {
            if self.page.is_ready().await {
                return Ok(());
            }
            chain_debug!("page not ready (attempt {attempt})");
            if attempt < self.settings.max_attempts {
                tokio::time::sleep(self.settings.retry_backoff).await;
            }
        }
        Err(ScrapeError::PageNotReady {
            attempts: self.settings.max_attempts,
        })
    }

    async fn expiration_titles_with_retry(&self) -> Result<Vec<String>, ScrapeError> {
        let mut last = PageError::NotReady;
        for attempt in 1..=self.settings.max_attempts {
            match self.page.expiration_titles().await {
                Ok(titles) => return Ok(titles),
                Err(err) => {
                    chain_debug!("expiration selector unreadable (attempt {attempt}): {err}");
                    last = err;
                }
            }
            if attempt < self.settings.max_attempts {
                tokio::time::sleep(self.settings.retry_backoff).await;
            }
        }
        Err(ScrapeError::ExpirationsUnreadable {
            attempts: self.settings.max_attempts,
            source: last,
        })
    }
}
