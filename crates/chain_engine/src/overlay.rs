use chain_logging::chain_info;

/// Blocking-overlay primitive the collector toggles while it owns the page.
/// Implementations only change visibility; no logic lives behind this trait.
pub trait Overlay: Send + Sync {
    fn show(&self, message: &str, progress: Option<u8>);
    fn show_result(&self, success: bool, message: &str);
    fn hide(&self);
}

/// Logs overlay transitions instead of painting them; stands in wherever no
/// page surface is attached.
#[derive(Debug, Default)]
pub struct LogOverlay;

impl Overlay for LogOverlay {
    fn show(&self, message: &str, progress: Option<u8>) {
        match progress {
            Some(pct) => chain_info!("overlay: {message} ({pct}%)"),
            None => chain_info!("overlay: {message}"),
        }
    }

    fn show_result(&self, success: bool, message: &str) {
        let outcome = if success { "done" } else { "aborted" };
        chain_info!("overlay result ({outcome}): {message}");
    }

    fn hide(&self) {
        chain_info!("overlay hidden");
    }
}
