//! Time-to-first-byte measurement for a single request.
//!
//! Latency is measured from connection acquisition to the first response
//! byte, minus the time spent resolving the host name. Resolver caches make
//! the DNS phase vary wildly between requests, so it is left out.
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::error::TransportError;
use crate::shutdown::ShutdownReceiver;

use super::summary::RequestOutcome;
use super::transport::{RequestSpec, TransportClient};

/// Timing hooks a transport fires while it executes one request.
pub trait RequestTrace: Send + Sync {
    /// A connection is about to be acquired; clears earlier timestamps.
    fn connection_acquired(&self);
    fn dns_started(&self);
    fn dns_finished(&self);
    fn first_byte(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProbePhase {
    ConnectionAcquired,
    DnsStart,
    DnsDone,
    FirstByte,
}

#[derive(Debug, Default, Clone, Copy)]
struct Timeline {
    start: Option<Instant>,
    dns_start: Option<Instant>,
    dns_end: Option<Instant>,
    first_byte: Option<Instant>,
}

/// Decorates one request with latency measurement. Use one probe per request.
#[derive(Debug, Default)]
pub struct LatencyProbe {
    timeline: Mutex<Timeline>,
}

impl LatencyProbe {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Effective latency: `(first_byte - start) - (dns_end - dns_start)`.
    ///
    /// Zero when the transport never reported a start or a first byte.
    #[must_use]
    pub fn effective_latency(&self) -> Duration {
        let timeline = *self.timeline();
        let (Some(start), Some(first_byte)) = (timeline.start, timeline.first_byte) else {
            return Duration::ZERO;
        };
        let dns = match (timeline.dns_start, timeline.dns_end) {
            (Some(dns_start), Some(dns_end)) => dns_end.saturating_duration_since(dns_start),
            _ => Duration::ZERO,
        };
        first_byte.saturating_duration_since(start).saturating_sub(dns)
    }

    /// Sends `request` through `client` and pairs the status with the
    /// measured latency.
    ///
    /// # Errors
    ///
    /// Returns the transport error when the request did not produce a status.
    pub async fn execute<C>(
        self: &Arc<Self>,
        client: &C,
        request: &RequestSpec,
        shutdown_rx: ShutdownReceiver,
    ) -> Result<RequestOutcome, TransportError>
    where
        C: TransportClient + ?Sized,
    {
        let trace: Arc<dyn RequestTrace> = Arc::clone(self) as Arc<dyn RequestTrace>;
        let status_code = client.send(request, trace, shutdown_rx).await?;
        Ok(RequestOutcome {
            status_code,
            latency: self.effective_latency(),
        })
    }

    pub(crate) fn mark(&self, phase: ProbePhase, at: Instant) {
        let mut timeline = self.timeline();
        match phase {
            ProbePhase::ConnectionAcquired => {
                *timeline = Timeline {
                    start: Some(at),
                    ..Timeline::default()
                };
            }
            ProbePhase::DnsStart => timeline.dns_start = Some(at),
            ProbePhase::DnsDone => timeline.dns_end = Some(at),
            ProbePhase::FirstByte => timeline.first_byte = Some(at),
        }
    }

    fn timeline(&self) -> MutexGuard<'_, Timeline> {
        self.timeline.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RequestTrace for LatencyProbe {
    fn connection_acquired(&self) {
        self.mark(ProbePhase::ConnectionAcquired, Instant::now());
    }

    fn dns_started(&self) {
        self.mark(ProbePhase::DnsStart, Instant::now());
    }

    fn dns_finished(&self) {
        self.mark(ProbePhase::DnsDone, Instant::now());
    }

    fn first_byte(&self) {
        self.mark(ProbePhase::FirstByte, Instant::now());
    }
}
