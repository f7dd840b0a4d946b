//! Batch-growth stress engine.
//!
//! A run sends successive batches of concurrent requests to one endpoint. The
//! size of each batch follows a growth function; every completed batch is
//! folded into a summary until the deadline passes or shutdown is requested.
mod config;
mod dispatch;
mod engine;
mod growth;
mod probe;
mod summary;
mod tester;
mod transport;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{DEFAULT_MAX_BATCH_SIZE, StressConfig};
pub use dispatch::BatchDispatcher;
pub use engine::{RunReport, StopReason, StressEngine};
pub use growth::{Growth, GrowthSpec};
pub use probe::{LatencyProbe, RequestTrace};
pub use summary::{BatchSummary, RequestOutcome, RunResult, summarize};
pub use tester::StressTester;
pub use transport::{ClientPolicy, RedirectPolicy, RequestSpec, Transport, TransportClient};
