use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Serialize, Serializer};

/// A request that produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOutcome {
    pub status_code: u16,
    pub latency: Duration,
}

impl RequestOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status_code >= 200 && self.status_code <= 299
    }
}

/// Statistics for one completed batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BatchSummary {
    /// Units launched for the batch.
    pub batch_size: usize,
    pub response_count: usize,
    pub error_count: usize,
    /// Most frequent status code, lowest code on ties, 0 without responses.
    pub mode_status_code: u16,
    #[serde(rename = "average_latency_ms", serialize_with = "serialize_millis")]
    pub average_latency: Duration,
    /// Share of responses outside 2xx; 0.0 without responses.
    pub error_ratio: f64,
}

/// Folds one batch into a summary. `errors` are the transport failures of the
/// same batch; `batch_size` starts as the number of units that reported back.
#[must_use]
pub fn summarize<E>(outcomes: &[RequestOutcome], errors: &[E]) -> BatchSummary {
    BatchSummary {
        batch_size: outcomes.len().saturating_add(errors.len()),
        response_count: outcomes.len(),
        error_count: errors.len(),
        mode_status_code: mode_status_code(outcomes),
        average_latency: average_latency(outcomes),
        error_ratio: error_ratio(outcomes),
    }
}

fn mode_status_code(outcomes: &[RequestOutcome]) -> u16 {
    let mut occurrences: BTreeMap<u16, usize> = BTreeMap::new();
    for outcome in outcomes {
        let count = occurrences.entry(outcome.status_code).or_insert(0);
        *count = count.saturating_add(1);
    }

    let mut mode = 0u16;
    let mut mode_count = 0usize;
    for (status, count) in occurrences {
        if count > mode_count {
            mode = status;
            mode_count = count;
        }
    }
    mode
}

fn average_latency(outcomes: &[RequestOutcome]) -> Duration {
    if outcomes.is_empty() {
        return Duration::ZERO;
    }
    let total_nanos: u128 = outcomes
        .iter()
        .map(|outcome| outcome.latency.as_nanos())
        .sum();
    let count = u128::try_from(outcomes.len()).unwrap_or(u128::MAX);
    let average = total_nanos.checked_div(count).unwrap_or(0);
    Duration::from_nanos(u64::try_from(average).unwrap_or(u64::MAX))
}

#[expect(
    clippy::float_arithmetic,
    reason = "The ratio is reported as a float"
)]
fn error_ratio(outcomes: &[RequestOutcome]) -> f64 {
    if outcomes.is_empty() {
        return 0.0;
    }
    let failed = outcomes
        .iter()
        .filter(|outcome| !outcome.is_success())
        .count();
    failed as f64 / outcomes.len() as f64
}

#[expect(
    clippy::float_arithmetic,
    reason = "Exported latencies are fractional milliseconds"
)]
fn serialize_millis<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(value.as_nanos() as f64 / 1_000_000.0)
}

/// Batch summaries in completion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunResult {
    batches: Vec<BatchSummary>,
}

impl RunResult {
    pub fn push(&mut self, summary: BatchSummary) {
        self.batches.push(summary);
    }

    #[must_use]
    pub fn batches(&self) -> &[BatchSummary] {
        &self.batches
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.batches.is_empty() {
            return writeln!(f, "No batches completed.");
        }
        for (index, batch) in self.batches.iter().enumerate() {
            writeln!(
                f,
                "Summary for batch {} ({} requests):",
                index.saturating_add(1),
                batch.response_count
            )?;
            writeln!(f, "\tMode status code: {}", batch.mode_status_code)?;
            writeln!(f, "\tAverage response time: {:?}", batch.average_latency)?;
            writeln!(f, "\tError ratio: {:.6}", batch.error_ratio)?;
            writeln!(f, "\tTransport errors: {}", batch.error_count)?;
        }
        Ok(())
    }
}
