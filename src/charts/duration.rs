use std::path::Path;

use plotters::prelude::*;
use tracing::info;

use crate::error::{AppError, AppResult, ChartError};
use crate::stress::RunResult;

use super::RunPlotter;

/// Line chart of the average response time against the number of
/// responses in each batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct DurationPlotter;

impl RunPlotter for DurationPlotter {
    fn render(&self, result: &RunResult, path: &Path) -> AppResult<()> {
        plot_duration_by_batch(result, path)
    }
}

/// Writes the chart for `result` as a PNG to `path`, creating missing parent
/// directories.
///
/// # Errors
///
/// Returns `ChartError` when the directory cannot be created or drawing fails.
pub fn plot_duration_by_batch(result: &RunResult, path: &Path) -> AppResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|source| {
            AppError::chart(ChartError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })
        })?;
    }

    let data = points(result);
    draw(&data, path).map_err(|err| {
        AppError::chart(ChartError::Render {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    })?;
    info!("Chart written to {}", path.display());
    Ok(())
}

#[expect(
    clippy::float_arithmetic,
    reason = "Plotted latencies are fractional milliseconds"
)]
fn points(result: &RunResult) -> Vec<(u64, f64)> {
    result
        .batches()
        .iter()
        .map(|batch| {
            let responses = u64::try_from(batch.response_count).unwrap_or(u64::MAX);
            let avg_ms = batch.average_latency.as_nanos() as f64 / 1_000_000.0;
            (responses, avg_ms)
        })
        .collect()
}

#[expect(
    clippy::float_arithmetic,
    reason = "Headroom above the slowest batch"
)]
fn draw(
    data: &[(u64, f64)],
    path: &Path,
) -> Result<(), DrawingAreaErrorKind<<BitMapBackend<'static> as DrawingBackend>::ErrorType>> {
    let root = BitMapBackend::new(path, (1600, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let x_max = data
        .iter()
        .map(|(x, _)| *x)
        .max()
        .unwrap_or(1)
        .saturating_add(1);
    let y_max = data.iter().map(|(_, y)| *y).fold(1.0_f64, f64::max) * 1.1;

    let mut chart = ChartBuilder::on(&root)
        .caption("Response Time by Batch Size", ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0u64..x_max, 0f64..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Responses per Batch")
        .y_desc("Avg Response Time (ms)")
        .x_labels(20)
        .y_labels(10)
        .y_label_formatter(&|v| format!("{:.1}", v))
        .draw()?;

    chart.draw_series(LineSeries::new(data.iter().copied(), &BLUE))?;
    chart.draw_series(
        data.iter()
            .map(|(x, y)| Circle::new((*x, *y), 3, BLUE.filled())),
    )?;

    root.present()?;
    Ok(())
}
