//! Seams between the stress engine and the HTTP stack.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;

use crate::error::TransportError;
use crate::shutdown::ShutdownReceiver;

use super::probe::RequestTrace;

/// The request every unit of work sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectPolicy {
    /// Return the 3xx response as-is.
    Never,
    /// Follow at most this many hops, then return the last response.
    Limited(usize),
    /// Transport default.
    Default,
}

impl RedirectPolicy {
    #[must_use]
    pub const fn from_flags(follow: bool, max_hops: usize) -> Self {
        match (follow, max_hops) {
            (false, _) => RedirectPolicy::Never,
            (true, 0) => RedirectPolicy::Default,
            (true, hops) => RedirectPolicy::Limited(hops),
        }
    }
}

/// Run-level client settings applied to every prepared client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientPolicy {
    pub insecure: bool,
    /// PEM encoded root certificate(s) to trust in addition to the system roots.
    pub trust_root: Option<Arc<[u8]>>,
    pub redirect: RedirectPolicy,
    pub request_timeout: Option<Duration>,
}

impl Default for ClientPolicy {
    fn default() -> Self {
        Self {
            insecure: false,
            trust_root: None,
            redirect: RedirectPolicy::Never,
            request_timeout: None,
        }
    }
}

/// Builds clients for units of work.
pub trait Transport: Send + Sync + 'static {
    type Client: TransportClient;

    /// Prepares a client configured by `policy`.
    ///
    /// # Errors
    ///
    /// Returns an error when the client cannot be built from the policy.
    fn prepare(&self, policy: &ClientPolicy) -> Result<Self::Client, TransportError>;
}

#[async_trait]
pub trait TransportClient: Send + Sync {
    /// Sends one request and returns its status code.
    ///
    /// Implementations report timing events to `trace` and give up with
    /// `TransportError::Cancelled` once `shutdown_rx` signals.
    async fn send(
        &self,
        request: &RequestSpec,
        trace: Arc<dyn RequestTrace>,
        shutdown_rx: ShutdownReceiver,
    ) -> Result<u16, TransportError>;
}
