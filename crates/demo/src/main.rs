use anyhow::Result;
use tracing::info;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let report = moveable_demo::start()?;
    info!(invocations = report.invocations, "Demo completed");

    Ok(())
}
