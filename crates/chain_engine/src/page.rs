use async_trait::async_trait;
use thiserror::Error;

/// Page surface the collector scrapes through. Implementations wrap whatever
/// renders the chain table: a content-script bridge, a headless browser, a
/// fixture in tests.
#[async_trait]
pub trait ChainPage: Send + Sync {
    /// True once the option table is rendered and stable.
    async fn is_ready(&self) -> bool;

    /// Identifier of the expiration the page currently shows.
    async fn current_expiration(&self) -> Result<String, PageError>;

    /// Raw titles from the expiration selector, in page order.
    async fn expiration_titles(&self) -> Result<Vec<String>, PageError>;

    /// Rendered content containing the visible option table.
    async fn content(&self) -> Result<String, PageError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("page not loaded yet")]
    NotReady,
    #[error("selector not found: {0}")]
    SelectorMissing(String),
    #[error("page gone: {0}")]
    Gone(String),
}
