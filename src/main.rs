use anyhow::{Context, Result};
use crossnca::logger::setup_log;
use crossnca::report;
use crossnca::settings::read_settings;

const DEFAULT_SETTINGS: &str = "crossnca.toml";

fn main() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SETTINGS.to_string());

    let settings =
        read_settings(&path).with_context(|| format!("Failed to read settings from {}", path))?;
    setup_log(&settings)?;

    tracing::info!("Starting crossover NCA report with settings from {}", path);
    let report = report::run(&settings)?;

    println!("{}", report.table.render_text());
    tracing::info!(
        "Report written to {} ({} subjects)",
        settings.paths.output,
        report.paired.len()
    );
    Ok(())
}
