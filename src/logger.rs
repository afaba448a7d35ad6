use std::sync::Mutex;
use std::time::Instant;

use crate::output::OutputFile;
use crate::settings::Settings;
use anyhow::Result;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::EnvFilter;

/// Setup logging for the report
///
/// Events are filtered by `log.level` from the settings (an `EnvFilter`
/// directive, `info` by default) and written to stdout. When `log.file` is set
/// they are also written, without colors, to that file in the output folder.
///
/// Fails if a global subscriber is already installed.
pub fn setup_log(settings: &Settings) -> Result<()> {
    let env_filter = EnvFilter::try_new(&settings.log.level)?;

    let timestamper = CompactTimestamp {
        start: Instant::now(),
    };

    let subscriber = Registry::default().with(env_filter);

    // Optional layer for the log file
    let file_layer = match &settings.log.file {
        Some(name) => {
            let outputfile = OutputFile::new(settings.output_dir(), name)?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(outputfile.file))
                    .with_ansi(false)
                    .with_timer(timestamper.clone()),
            )
        }
        None => None,
    };

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_target(false)
        .with_timer(timestamper.clone());

    subscriber.with(file_layer).with(stdout_layer).try_init()?;

    Ok(())
}

/// Elapsed time since setup as `00h 00m 00s`
#[derive(Clone)]
struct CompactTimestamp {
    start: Instant,
}

impl FormatTime for CompactTimestamp {
    fn format_time(
        &self,
        w: &mut tracing_subscriber::fmt::format::Writer<'_>,
    ) -> Result<(), std::fmt::Error> {
        let elapsed = self.start.elapsed();
        let hours = elapsed.as_secs() / 3600;
        let minutes = (elapsed.as_secs() % 3600) / 60;
        let seconds = elapsed.as_secs() % 60;

        write!(w, "{:02}h {:02}m {:02}s", hours, minutes, seconds)
    }
}
