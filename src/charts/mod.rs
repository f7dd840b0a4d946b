mod duration;


use std::path::Path;

use crate::error::AppResult;
use crate::stress::RunResult;

pub use duration::{DurationPlotter, plot_duration_by_batch};

/// Renders a finished run to an image file.
pub trait RunPlotter: Send + Sync {
    /// # Errors
    ///
    /// Returns an error when the chart cannot be written to `path`.
    fn render(&self, result: &RunResult, path: &Path) -> AppResult<()>;
}
