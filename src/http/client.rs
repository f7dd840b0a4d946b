use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Certificate, Client, Request, Response, redirect};

use crate::error::{HttpError, TransportError};
use crate::shutdown::{ShutdownReceiver, wait_for_shutdown};
use crate::stress::{
    ClientPolicy, RedirectPolicy, RequestSpec, RequestTrace, Transport, TransportClient,
};

use super::resolver::{ACTIVE_TRACE, TimedResolver};

/// Transport backed by `reqwest`. Every prepared client has its own
/// connection pool, so each request opens a fresh connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReqwestTransport;

pub struct ReqwestClient {
    client: Client,
}

impl Transport for ReqwestTransport {
    type Client = ReqwestClient;

    fn prepare(&self, policy: &ClientPolicy) -> Result<ReqwestClient, TransportError> {
        let mut builder = Client::builder()
            .dns_resolver(Arc::new(TimedResolver))
            .redirect(redirect_policy(policy.redirect));

        if let Some(timeout) = policy.request_timeout {
            builder = builder.timeout(timeout);
        }

        if policy.insecure {
            builder = builder
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true);
        }

        if let Some(pem) = policy.trust_root.as_deref() {
            let cert = Certificate::from_pem(pem)
                .map_err(|source| TransportError::TrustRoot { source })?;
            builder = builder.add_root_certificate(cert);
        }

        let client = builder
            .build()
            .map_err(|source| TransportError::BuildClient { source })?;
        Ok(ReqwestClient { client })
    }
}

impl ReqwestClient {
    fn build_request(&self, spec: &RequestSpec) -> Result<Request, TransportError> {
        let mut builder = self.client.request(spec.method.clone(), spec.url.as_str());
        for (name, value) in &spec.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !spec.body.is_empty() {
            builder = builder.body(spec.body.clone());
        }
        Ok(builder.build()?)
    }
}

#[async_trait]
impl TransportClient for ReqwestClient {
    async fn send(
        &self,
        request: &RequestSpec,
        trace: Arc<dyn RequestTrace>,
        mut shutdown_rx: ShutdownReceiver,
    ) -> Result<u16, TransportError> {
        let prepared = self.build_request(request)?;
        let exchange = ACTIVE_TRACE.scope(Arc::clone(&trace), async {
            trace.connection_acquired();
            let response = self.client.execute(prepared).await?;
            trace.first_byte();
            let status = response.status().as_u16();
            drain(response).await?;
            Ok::<u16, TransportError>(status)
        });

        tokio::select! {
            () = wait_for_shutdown(&mut shutdown_rx) => Err(TransportError::Cancelled),
            result = exchange => result,
        }
    }
}

async fn drain(response: Response) -> Result<(), TransportError> {
    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        chunk?;
    }
    Ok(())
}

/// reqwest's own default hop limit.
const DEFAULT_MAX_HOPS: usize = 10;

fn redirect_policy(policy: RedirectPolicy) -> redirect::Policy {
    match policy {
        RedirectPolicy::Never => redirect::Policy::none(),
        RedirectPolicy::Limited(max_hops) => redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() > max_hops {
                attempt.stop()
            } else {
                follow_hop(attempt)
            }
        }),
        RedirectPolicy::Default => redirect::Policy::custom(|attempt| {
            if attempt.previous().len() > DEFAULT_MAX_HOPS {
                attempt.error("too many redirects")
            } else {
                follow_hop(attempt)
            }
        }),
    }
}

/// Every followed hop opens a new connection, so the trace restarts there.
fn follow_hop(attempt: redirect::Attempt<'_>) -> redirect::Action {
    if let Ok(trace) = ACTIVE_TRACE.try_with(Arc::clone) {
        trace.connection_acquired();
    }
    attempt.follow()
}

/// Checks that `pem` holds a certificate the TLS backend accepts.
///
/// # Errors
///
/// Returns `HttpError::InvalidCacert` when the bytes do not parse.
pub fn validate_trust_root(pem: &[u8]) -> Result<(), HttpError> {
    Certificate::from_pem(pem)
        .map(|_| ())
        .map_err(|source| HttpError::InvalidCacert { source })
}
