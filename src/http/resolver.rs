use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

use reqwest::dns::{Addrs, Name, Resolve, Resolving};

use crate::stress::RequestTrace;

tokio::task_local! {
    /// Trace of the request currently executing on this task.
    pub(super) static ACTIVE_TRACE: Arc<dyn RequestTrace>;
}

/// System resolver that reports lookups to the active request trace.
#[derive(Debug, Clone, Copy, Default)]
pub(super) struct TimedResolver;

impl Resolve for TimedResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let trace = ACTIVE_TRACE.try_with(Arc::clone).ok();
        Box::pin(async move {
            if let Some(trace) = trace.as_ref() {
                trace.dns_started();
            }
            let resolved = tokio::net::lookup_host((name.as_str(), 0)).await;
            if let Some(trace) = trace.as_ref() {
                trace.dns_finished();
            }
            let addrs: Vec<SocketAddr> = resolved?.collect();
            Ok::<Addrs, Box<dyn Error + Send + Sync>>(Box::new(addrs.into_iter()))
        })
    }
}
