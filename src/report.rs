//! The crossover report, end to end
//!
//! Each stage takes the previous stage's output as an explicit argument and
//! returns its own output. [analyze] runs the computations on loaded
//! observations, [run] adds loading and writing of every output file.

use crate::aggregate::{aggregate, TimePointSummary};
use crate::data::{read_observations, ObservationTable};
use crate::error::CrossNcaError;
use crate::nca::{NCATable, NCA};
use crate::output::OutputFile;
use crate::paired::{Parameter, PairedTable};
use crate::plot::{self, PlotError};
use crate::settings::Settings;
use crate::stats::{
    paired_t_test, sample_size_paired, wilcoxon_signed_rank, PairedTTest, SampleSize, StatsError,
    WilcoxonTest,
};
use crate::table::Table2;
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A statistic that may be undefined for the data at hand
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum Outcome<T> {
    Computed(T),
    /// E.g. all differences equal, so there is no variance to test against
    Undefined { reason: String },
}

impl<T> Outcome<T> {
    pub fn computed(&self) -> Option<&T> {
        match self {
            Outcome::Computed(value) => Some(value),
            Outcome::Undefined { .. } => None,
        }
    }
}

/// Paired tests of one parameter, no-inducer values against inducer values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterTests {
    pub parameter: Parameter,
    /// Subjects with a value in both groups
    pub n_pairs: usize,
    pub t_test: Outcome<PairedTTest>,
    pub wilcoxon: Outcome<WilcoxonTest>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct TestsFile<'a> {
    tests: &'a [ParameterTests],
    sample_size: &'a SampleSize,
}

/// Every intermediate table of the report
#[derive(Debug, Clone)]
pub struct Report {
    pub observations: ObservationTable,
    pub aggregated: Vec<TimePointSummary>,
    pub nca: NCATable,
    pub paired: PairedTable,
    pub table: Table2,
    pub tests: Vec<ParameterTests>,
    pub sample_size: SampleSize,
}

/// Run every computation on loaded observations
pub fn analyze(observations: ObservationTable, settings: &Settings) -> Result<Report, CrossNcaError> {
    tracing::info!("Aggregating {} observations", observations.len());
    let aggregated = aggregate(&observations);

    tracing::info!("Running NCA");
    let mut nca = observations.nca(&settings.nca)?;
    if settings.analysis.clearance_in_l_per_h {
        nca.rescale_clearance()?;
    }

    let paired = PairedTable::from_nca(&nca)?;
    tracing::info!(
        "Paired {} subjects, {} with both conditions",
        paired.len(),
        paired.complete_count()
    );

    let table = Table2::build(&paired, settings.analysis.confidence_level)?;

    let tests = settings
        .analysis
        .test_parameters
        .iter()
        .map(|p| run_tests(&paired, *p, settings.analysis.confidence_level))
        .collect::<Result<Vec<_>, _>>()?;

    let power = &settings.power;
    let sample_size = sample_size_paired(power.effect_size, power.alpha, power.power)?;
    tracing::info!(
        "Sample size for d = {}, alpha = {}, power = {}: {} pairs",
        power.effect_size,
        power.alpha,
        power.power,
        sample_size.n
    );

    Ok(Report {
        observations,
        aggregated,
        nca,
        paired,
        table,
        tests,
        sample_size,
    })
}

fn run_tests(
    paired: &PairedTable,
    parameter: Parameter,
    level: f64,
) -> Result<ParameterTests, StatsError> {
    let (no_inducer, inducer) = paired.complete_pairs(parameter);

    let t_test = undefined_if_degenerate(parameter, paired_t_test(&no_inducer, &inducer, level))?;
    let wilcoxon = undefined_if_degenerate(parameter, wilcoxon_signed_rank(&no_inducer, &inducer))?;

    if let Outcome::Computed(t) = &t_test {
        tracing::info!(
            "{}: paired t = {:.3}, p = {:.4}",
            parameter,
            t.statistic,
            t.p_value
        );
    }
    if let Outcome::Computed(w) = &wilcoxon {
        tracing::info!("{}: Wilcoxon V = {}, p = {:.4}", parameter, w.statistic, w.p_value);
    }

    Ok(ParameterTests {
        parameter,
        n_pairs: no_inducer.len(),
        t_test,
        wilcoxon,
    })
}

/// Degenerate samples make a test undefined, anything else is an error
fn undefined_if_degenerate<T>(
    parameter: Parameter,
    result: Result<T, StatsError>,
) -> Result<Outcome<T>, StatsError> {
    match result {
        Ok(value) => Ok(Outcome::Computed(value)),
        Err(
            e @ (StatsError::Empty
            | StatsError::ConstantData
            | StatsError::InsufficientData { .. }),
        ) => {
            tracing::warn!("{}: test undefined: {}", parameter, e);
            Ok(Outcome::Undefined {
                reason: e.to_string(),
            })
        }
        Err(e) => Err(e),
    }
}

impl Report {
    /// Write every table, the test results and (optionally) the plots
    ///
    /// Returns the paths of the files written.
    pub fn write(&self, dir: &Path, plots: bool) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();

        let out = OutputFile::new(dir, "aggregated.csv")?;
        let mut wtr = csv::Writer::from_writer(&out.file);
        for row in &self.aggregated {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        written.push(out.relative_path);

        let out = OutputFile::new(dir, "nca.csv")?;
        self.nca
            .write_csv(&out.file)
            .with_context(|| format!("Failed to write {:?}", out.relative_path))?;
        written.push(out.relative_path);

        let out = OutputFile::new(dir, "paired.csv")?;
        self.paired
            .write_csv(&out.file)
            .with_context(|| format!("Failed to write {:?}", out.relative_path))?;
        written.push(out.relative_path);

        let mut out = OutputFile::new(dir, "table2.txt")?;
        out.file.write_all(self.table.render_text().as_bytes())?;
        written.push(out.relative_path);

        let out = OutputFile::new(dir, "table2.csv")?;
        self.table
            .write_csv(&out.file)
            .with_context(|| format!("Failed to write {:?}", out.relative_path))?;
        written.push(out.relative_path);

        let out = OutputFile::new(dir, "tests.json")?;
        serde_json::to_writer_pretty(
            &out.file,
            &TestsFile {
                tests: &self.tests,
                sample_size: &self.sample_size,
            },
        )?;
        written.push(out.relative_path);

        if plots {
            written.extend(self.write_plots(dir)?);
        }

        tracing::info!("Wrote {} files to {}", written.len(), dir.display());
        Ok(written)
    }

    fn write_plots(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();

        let path = dir.join("concentration_time.svg");
        if keep_or_skip(plot::concentration_time(&self.aggregated, &path))? {
            written.push(path);
        }

        for test in &self.tests {
            let path = dir.join(format!("paired_{}.svg", test.parameter.key()));
            if keep_or_skip(plot::paired_parameter(&self.paired, test.parameter, &path))? {
                written.push(path);
            }
        }

        let path = dir.join("subject_profiles.svg");
        if keep_or_skip(plot::subject_profiles(&self.observations, &path))? {
            written.push(path);
        }

        Ok(written)
    }
}

/// `Ok(false)` for a plot without data, which is skipped with a warning
fn keep_or_skip(result: Result<(), PlotError>) -> Result<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(e @ PlotError::NoData { .. }) => {
            tracing::warn!("{}, skipped", e);
            Ok(false)
        }
        Err(e) => Err(CrossNcaError::from(e)).context("plotting"),
    }
}

/// Load the data named in the settings, run the analysis and write all outputs
pub fn run(settings: &Settings) -> Result<Report> {
    settings.validate().context("settings")?;

    let data = &settings.paths.data;
    tracing::info!("Reading {}", data);
    let observations = read_observations(data)
        .map_err(CrossNcaError::from)
        .with_context(|| format!("loading {}", data))?;

    let report =
        analyze(observations, settings).with_context(|| format!("analysis of {}", data))?;

    let dir = settings.output_dir();
    report.write(&dir, settings.output.plots)?;
    if settings.output.write_settings {
        settings
            .write()
            .with_context(|| format!("Failed to write settings to {}", dir.display()))?;
    }

    Ok(report)
}
