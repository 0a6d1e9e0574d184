use anyhow::Context;
use chain_app::platform::{app, logging};
use chain_core::CoordinatorSettings;
use chain_logging::chain_info;

fn main() -> anyhow::Result<()> {
    // stdout carries the message frames, so the log goes to a file.
    logging::initialize(logging::LogDestination::File);
    chain_info!("coordinator host starting");

    app::run_host(
        std::io::stdin(),
        &mut std::io::stdout(),
        CoordinatorSettings::default(),
    )
    .context("coordinator host terminated abnormally")?;

    chain_info!("coordinator host stopped");
    Ok(())
}
