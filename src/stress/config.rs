use std::path::PathBuf;
use std::time::Duration;

use super::transport::{ClientPolicy, RequestSpec};

/// Default cap on units per batch; exponential specs reach it quickly.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 10_000;

/// Everything one stress run needs, independent of how it was configured.
#[derive(Debug, Clone)]
pub struct StressConfig {
    pub request: RequestSpec,
    pub policy: ClientPolicy,
    /// Growth spec string, e.g. `lin[2,1]`; parsed when the engine is built.
    pub strategy: String,
    /// Stop after the first batch.
    pub dry_run: bool,
    /// Absolute run length, measured from engine start.
    pub run_duration: Duration,
    pub max_batch_size: usize,
    pub plot_path: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}
