use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use crate::collector::{
    ChannelReportSink, Collector, CollectorReport, CollectorSettings, CollectorTask,
};
use crate::overlay::Overlay;
use crate::page::ChainPage;
use crate::parser::TableParser;

enum CollectorCommand {
    Activate { task: CollectorTask },
}

/// Channel-fronted collector host: activation commands in, reports out.
/// Runs the async collector on a dedicated thread with its own runtime.
pub struct CollectorHandle {
    cmd_tx: mpsc::Sender<CollectorCommand>,
    report_rx: mpsc::Receiver<CollectorReport>,
}

impl CollectorHandle {
    pub fn new(
        page: Arc<dyn ChainPage>,
        parser: Arc<dyn TableParser>,
        overlay: Arc<dyn Overlay>,
        settings: CollectorSettings,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (report_tx, report_rx) = mpsc::channel();
        let collector = Arc::new(Collector::new(page, parser, overlay, settings));

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            while let Ok(command) = cmd_rx.recv() {
                let collector = collector.clone();
                let report_tx = report_tx.clone();
                runtime.spawn(async move {
                    handle_command(collector.as_ref(), command, report_tx).await;
                });
            }
        });

        Self { cmd_tx, report_rx }
    }

    pub fn activate(&self, task: CollectorTask) {
        let _ = self.cmd_tx.send(CollectorCommand::Activate { task });
    }

    pub fn try_recv(&self) -> Option<CollectorReport> {
        self.report_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<CollectorReport> {
        self.report_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    collector: &Collector,
    command: CollectorCommand,
    report_tx: mpsc::Sender<CollectorReport>,
) {
    match command {
        CollectorCommand::Activate { task } => {
            let sink = ChannelReportSink::new(report_tx);
            // Failures already reach the coordinator through the sink.
            let _ = collector.run(&task, &sink).await;
        }
    }
}
