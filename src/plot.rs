//! SVG figures of the report
//!
//! - [concentration_time]: mean ± SD concentration over time, one line per group
//! - [paired_parameter]: one segment per subject joining its two NCA values
//! - [subject_profiles]: one panel per subject with the curves of both groups
//!
//! Drawing uses the `plotters` SVG backend, so no system fonts are needed.

use crate::aggregate::TimePointSummary;
use crate::data::{Group, ObservationTable};
use crate::paired::{Parameter, PairedTable};
use plotters::prelude::*;
use std::fmt::Display;
use std::path::Path;
use thiserror::Error;

const FONT: &str = "sans-serif";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlotError {
    #[error("Failed to draw {file}: {message}")]
    Drawing { file: String, message: String },

    #[error("Nothing to plot in {file}")]
    NoData { file: String },
}

impl PlotError {
    fn drawing(path: &Path, e: impl Display) -> Self {
        PlotError::Drawing {
            file: path.display().to_string(),
            message: e.to_string(),
        }
    }

    fn no_data(path: &Path) -> Self {
        PlotError::NoData {
            file: path.display().to_string(),
        }
    }
}

fn group_color(group: Group) -> RGBColor {
    match group {
        Group::NoInducer => BLUE,
        Group::Inducer => RED,
    }
}

/// Axis range padded by 5% at both ends, never empty
fn padded(min: f64, max: f64) -> std::ops::Range<f64> {
    let span = if max > min { max - min } else { 1.0 };
    (min - 0.05 * span)..(max + 0.05 * span)
}

/// Upper concentration limit with headroom, never zero
fn upper(max: f64) -> f64 {
    if max > 0.0 && max.is_finite() {
        max * 1.1
    } else {
        1.0
    }
}

/// Mean concentration-time curves with ±SD error bars
///
/// Points without a defined mean are skipped, points with an undefined SD are
/// drawn without a bar.
pub fn concentration_time(summaries: &[TimePointSummary], path: &Path) -> Result<(), PlotError> {
    let err = |e| PlotError::drawing(path, e);

    let points: Vec<&TimePointSummary> = summaries.iter().filter(|s| s.mean.is_finite()).collect();
    if points.is_empty() {
        return Err(PlotError::no_data(path));
    }

    let t_min = points.iter().map(|s| s.time).fold(f64::INFINITY, f64::min);
    let t_max = points.iter().map(|s| s.time).fold(f64::NEG_INFINITY, f64::max);
    let c_max = points
        .iter()
        .map(|s| if s.sd.is_finite() { s.mean + s.sd } else { s.mean })
        .fold(0.0, f64::max);

    let root = SVGBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Mean concentration-time profile", (FONT, 22))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(65)
        .build_cartesian_2d(padded(t_min, t_max), 0.0..upper(c_max))
        .map_err(err)?;

    chart
        .configure_mesh()
        .x_desc("Time after dose (h)")
        .y_desc("Concentration (ng/mL)")
        .draw()
        .map_err(err)?;

    for group in Group::ALL {
        let color = group_color(group);
        let series: Vec<&TimePointSummary> =
            points.iter().copied().filter(|s| s.group == group).collect();
        if series.is_empty() {
            continue;
        }

        chart
            .draw_series(LineSeries::new(series.iter().map(|s| (s.time, s.mean)), &color))
            .map_err(err)?
            .label(group.label())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));

        chart
            .draw_series(
                series
                    .iter()
                    .map(|s| Circle::new((s.time, s.mean), 3, color.filled())),
            )
            .map_err(err)?;

        chart
            .draw_series(series.iter().filter(|s| s.sd.is_finite()).map(|s| {
                ErrorBar::new_vertical(
                    s.time,
                    (s.mean - s.sd).max(0.0),
                    s.mean,
                    s.mean + s.sd,
                    color.filled(),
                    6,
                )
            }))
            .map_err(err)?;
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(err)?;

    root.present().map_err(err)?;
    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

/// Paired plot of one parameter: a segment per subject from its no-inducer
/// value to its inducer value
pub fn paired_parameter(
    paired: &PairedTable,
    parameter: Parameter,
    path: &Path,
) -> Result<(), PlotError> {
    let err = |e| PlotError::drawing(path, e);

    let (x, y) = paired.complete_pairs(parameter);
    if x.is_empty() {
        return Err(PlotError::no_data(path));
    }
    let v_max = x.iter().chain(&y).copied().fold(0.0, f64::max);

    let root = SVGBackend::new(path, (500, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("{} by condition", parameter.label()), (FONT, 22))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(65)
        .build_cartesian_2d(-0.5..1.5, 0.0..upper(v_max))
        .map_err(err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(5)
        .x_label_formatter(&|v: &f64| {
            if v.abs() < 1e-9 {
                Group::NoInducer.label().to_string()
            } else if (v - 1.0).abs() < 1e-9 {
                Group::Inducer.label().to_string()
            } else {
                String::new()
            }
        })
        .y_desc(format!("{} ({})", parameter.label(), paired.unit(parameter)))
        .draw()
        .map_err(err)?;

    for (a, b) in x.iter().zip(&y) {
        chart
            .draw_series(LineSeries::new([(0.0, *a), (1.0, *b)], &BLACK.mix(0.6)))
            .map_err(err)?;
    }
    for group in Group::ALL {
        let (pos, values) = match group {
            Group::NoInducer => (0.0, &x),
            Group::Inducer => (1.0, &y),
        };
        let color = group_color(group);
        chart
            .draw_series(values.iter().map(|v| Circle::new((pos, *v), 4, color.filled())))
            .map_err(err)?;
    }

    root.present().map_err(err)?;
    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

/// Individual concentration-time curves, one panel per subject
pub fn subject_profiles(observations: &ObservationTable, path: &Path) -> Result<(), PlotError> {
    let err = |e| PlotError::drawing(path, e);

    let subjects = observations.subjects();
    if subjects.is_empty() {
        return Err(PlotError::no_data(path));
    }

    let cols = (subjects.len() as f64).sqrt().ceil() as usize;
    let rows = subjects.len().div_ceil(cols);

    let measured = observations
        .iter()
        .filter_map(|o| o.concentration.map(|c| (o.time, c)));
    let (mut t_min, mut t_max, mut c_max) = (f64::INFINITY, f64::NEG_INFINITY, 0.0_f64);
    for (t, c) in measured {
        t_min = t_min.min(t);
        t_max = t_max.max(t);
        c_max = c_max.max(c);
    }
    if !t_min.is_finite() {
        return Err(PlotError::no_data(path));
    }

    let root = SVGBackend::new(path, (300 * cols as u32, 240 * rows as u32)).into_drawing_area();
    root.fill(&WHITE).map_err(err)?;
    let panels = root.split_evenly((rows, cols));

    for (subject, panel) in subjects.iter().zip(panels.iter()) {
        let mut chart = ChartBuilder::on(panel)
            .caption(format!("Subject {}", subject), (FONT, 14))
            .margin(8)
            .x_label_area_size(25)
            .y_label_area_size(40)
            .build_cartesian_2d(padded(t_min, t_max), 0.0..upper(c_max))
            .map_err(err)?;

        chart
            .configure_mesh()
            .x_labels(5)
            .y_labels(4)
            .draw()
            .map_err(err)?;

        for group in Group::ALL {
            let Some(profile) = observations.profile(subject, group) else {
                continue;
            };
            let mut points: Vec<(f64, f64)> = profile
                .times
                .iter()
                .copied()
                .zip(profile.concentrations.iter().copied())
                .collect();
            points.sort_by(|a, b| a.0.total_cmp(&b.0));

            let color = group_color(group);
            chart
                .draw_series(LineSeries::new(points.iter().copied(), &color))
                .map_err(err)?;
            chart
                .draw_series(points.iter().map(|p| Circle::new(*p, 2, color.filled())))
                .map_err(err)?;
        }
    }

    root.present().map_err(err)?;
    tracing::debug!("Wrote {}", path.display());
    Ok(())
}
