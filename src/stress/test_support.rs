use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;

use crate::error::{AppError, AppResult, TransportError};
use crate::shutdown::{ShutdownReceiver, wait_for_shutdown};

use super::config::{DEFAULT_MAX_BATCH_SIZE, StressConfig};
use super::probe::RequestTrace;
use super::transport::{ClientPolicy, RequestSpec, Transport, TransportClient};

pub(crate) fn run_async_test<F>(future: F) -> AppResult<()>
where
    F: Future<Output = AppResult<()>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::validation(format!("Failed to build runtime: {}", err)))?;
    runtime.block_on(future)
}

pub(crate) fn stress_config(strategy: &str, dry_run: bool, run_duration: Duration) -> StressConfig {
    StressConfig {
        request: RequestSpec {
            method: Method::GET,
            url: "http://localhost/health".to_owned(),
            headers: Vec::new(),
            body: String::new(),
        },
        policy: ClientPolicy::default(),
        strategy: strategy.to_owned(),
        dry_run,
        run_duration,
        max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        plot_path: None,
        export_json: None,
    }
}

/// In-memory transport: answers every request with a fixed status after an
/// optional delay, or fails with `Cancelled` when no status is set.
#[derive(Clone)]
pub(crate) struct FakeTransport {
    pub(crate) status: Option<u16>,
    pub(crate) delay: Duration,
    pub(crate) sent: Arc<AtomicUsize>,
    /// Requests currently inside `send`; an aborted request leaves it too.
    pub(crate) in_flight: Arc<AtomicUsize>,
    pub(crate) policies: Arc<Mutex<Vec<ClientPolicy>>>,
}

impl FakeTransport {
    pub(crate) fn responding(status: u16) -> Self {
        Self {
            status: Some(status),
            delay: Duration::ZERO,
            sent: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            policies: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            status: None,
            ..Self::responding(0)
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

struct InFlight<'counter>(&'counter AtomicUsize);

impl<'counter> InFlight<'counter> {
    fn enter(counter: &'counter AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub(crate) struct FakeClient {
    transport: FakeTransport,
}

impl Transport for FakeTransport {
    type Client = FakeClient;

    fn prepare(&self, policy: &ClientPolicy) -> Result<FakeClient, TransportError> {
        self.policies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(policy.clone());
        Ok(FakeClient {
            transport: self.clone(),
        })
    }
}

#[async_trait]
impl TransportClient for FakeClient {
    async fn send(
        &self,
        _request: &RequestSpec,
        trace: Arc<dyn RequestTrace>,
        mut shutdown_rx: ShutdownReceiver,
    ) -> Result<u16, TransportError> {
        let _in_flight = InFlight::enter(&self.transport.in_flight);
        trace.connection_acquired();
        trace.dns_started();
        trace.dns_finished();
        tokio::select! {
            () = wait_for_shutdown(&mut shutdown_rx) => return Err(TransportError::Cancelled),
            () = tokio::time::sleep(self.transport.delay) => {}
        }
        trace.first_byte();
        self.transport.sent.fetch_add(1, Ordering::SeqCst);
        self.transport.status.ok_or(TransportError::Cancelled)
    }
}
