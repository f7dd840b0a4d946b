use tokio::sync::watch;

pub type ShutdownSender = watch::Sender<bool>;
pub type ShutdownReceiver = watch::Receiver<bool>;

#[must_use]
pub fn shutdown_channel() -> (ShutdownSender, ShutdownReceiver) {
    watch::channel(false)
}

/// Resolves once shutdown has been requested, including requests made before
/// the call. Never resolves if every sender is dropped without signalling.
pub async fn wait_for_shutdown(shutdown_rx: &mut ShutdownReceiver) {
    if shutdown_rx.wait_for(|requested| *requested).await.is_err() {
        std::future::pending::<()>().await;
    }
}
