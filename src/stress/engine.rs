use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::{Instant, sleep_until};
use tracing::{debug, info};

use crate::error::{AppResult, TransportError};
use crate::shutdown::{ShutdownReceiver, wait_for_shutdown};

use super::config::StressConfig;
use super::dispatch::BatchDispatcher;
use super::growth::Growth;
use super::probe::LatencyProbe;
use super::summary::{RequestOutcome, RunResult, summarize};
use super::transport::{ClientPolicy, RequestSpec, Transport};

const FAR_FUTURE: Duration = Duration::from_secs(31_536_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Deadline,
    Cancelled,
    SingleBatchDone,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StopReason::Deadline => "deadline reached",
            StopReason::Cancelled => "cancelled",
            StopReason::SingleBatchDone => "dry run finished",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub result: RunResult,
    pub stop: StopReason,
}

/// Drives batches of requests until the deadline, a shutdown or the end of a
/// dry run.
pub struct StressEngine<T: Transport> {
    transport: Arc<T>,
    dispatcher: BatchDispatcher,
    request: Arc<RequestSpec>,
    policy: Arc<ClientPolicy>,
    dry_run: bool,
    run_duration: Duration,
}

impl<T: Transport> StressEngine<T> {
    /// # Errors
    ///
    /// Returns an error when the growth strategy does not parse.
    pub fn new(config: &StressConfig, transport: T) -> AppResult<Self> {
        let growth: Growth = config.strategy.parse()?;
        let dispatcher = BatchDispatcher::new(growth).with_max_batch_size(config.max_batch_size);
        Ok(Self {
            transport: Arc::new(transport),
            dispatcher,
            request: Arc::new(config.request.clone()),
            policy: Arc::new(config.policy.clone()),
            dry_run: config.dry_run,
            run_duration: config.run_duration,
        })
    }

    /// Runs batches until a stop condition. Batches cut short by the deadline
    /// or a shutdown are discarded, and batches that launch no request are
    /// not summarized.
    pub async fn run(&mut self, mut shutdown_rx: ShutdownReceiver) -> RunReport {
        let started = Instant::now();
        let deadline = started
            .checked_add(self.run_duration)
            .or_else(|| started.checked_add(FAR_FUTURE))
            .unwrap_or(started);
        let dry_run = self.dry_run;
        let mut result = RunResult::default();
        self.dispatcher.reset();

        info!(
            "Stressing {} {} with {} for {:?}{}",
            self.request.method,
            self.request.url,
            self.dispatcher.growth().spec(),
            self.run_duration,
            if dry_run { " (dry run)" } else { "" }
        );

        let stop = loop {
            let outcomes: Arc<Mutex<Vec<RequestOutcome>>> = Arc::new(Mutex::new(Vec::new()));
            let unit = {
                let transport = Arc::clone(&self.transport);
                let policy = Arc::clone(&self.policy);
                let request = Arc::clone(&self.request);
                let outcomes = Arc::clone(&outcomes);
                let shutdown_rx = shutdown_rx.clone();
                move || {
                    run_unit(
                        Arc::clone(&transport),
                        Arc::clone(&policy),
                        Arc::clone(&request),
                        Arc::clone(&outcomes),
                        shutdown_rx.clone(),
                    )
                }
            };

            let dispatcher = &mut self.dispatcher;
            let errors = tokio::select! {
                biased;
                () = wait_for_shutdown(&mut shutdown_rx) => break StopReason::Cancelled,
                () = sleep_until(deadline) => break StopReason::Deadline,
                errors = dispatcher.execute_batch(unit) => errors,
            };

            if dispatcher.last_batch_size() == 0 {
                // Nothing was sent; keep the report free of empty batches.
                if dry_run {
                    break StopReason::SingleBatchDone;
                }
                continue;
            }

            let outcomes =
                std::mem::take(&mut *outcomes.lock().unwrap_or_else(PoisonError::into_inner));
            let mut summary = summarize(&outcomes, &errors);
            summary.batch_size = dispatcher.last_batch_size();
            debug!(
                "Batch {} done: {} launched, {} responses, {} transport errors, mode {}, avg {:?}",
                result.len().saturating_add(1),
                summary.batch_size,
                summary.response_count,
                summary.error_count,
                summary.mode_status_code,
                summary.average_latency
            );
            result.push(summary);

            if dry_run {
                break StopReason::SingleBatchDone;
            }
        };

        info!("Run stopped ({}) after {} batches", stop, result.len());
        RunReport { result, stop }
    }
}

async fn run_unit<T: Transport>(
    transport: Arc<T>,
    policy: Arc<ClientPolicy>,
    request: Arc<RequestSpec>,
    outcomes: Arc<Mutex<Vec<RequestOutcome>>>,
    shutdown_rx: ShutdownReceiver,
) -> Result<(), TransportError> {
    let client = transport.prepare(&policy).inspect_err(|err| {
        debug!("Client setup failed: {}", err);
    })?;
    let probe = Arc::new(LatencyProbe::new());
    match probe.execute(&client, &request, shutdown_rx).await {
        Ok(outcome) => {
            outcomes
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(outcome);
            Ok(())
        }
        Err(err) => {
            debug!("Request failed: {}", err);
            Err(err)
        }
    }
}
