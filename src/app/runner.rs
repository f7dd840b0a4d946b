use tracing::info;

use crate::charts::{DurationPlotter, RunPlotter};
use crate::error::AppResult;
use crate::http::ReqwestTransport;
use crate::shutdown::{ShutdownReceiver, shutdown_channel};
use crate::shutdown_handlers::setup_signal_shutdown_handler;
use crate::stress::{RunReport, StressConfig, StressTester, Transport};

use super::export;

/// Runs a stress test against the real network, then prints the report.
///
/// Ctrl+C or SIGTERM stop the run early; the batches completed so far are
/// still reported.
pub(crate) async fn run_local(config: StressConfig) -> AppResult<RunReport> {
    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);

    let outcome = run_stress(&config, ReqwestTransport, DurationPlotter, shutdown_rx).await;
    signal_handle.abort();
    let report = outcome?;

    print!("{}", report.result);
    Ok(report)
}

/// Runs the tester, then renders and exports its result. Nothing is printed.
pub(crate) async fn run_stress<T, P>(
    config: &StressConfig,
    transport: T,
    plotter: P,
    shutdown_rx: ShutdownReceiver,
) -> AppResult<RunReport>
where
    T: Transport,
    P: RunPlotter,
{
    let mut tester = StressTester::new(config, transport, plotter)?;
    let report = tester.test(shutdown_rx).await?;

    if let Some(path) = config.export_json.as_ref() {
        export::export_json(path, &report.result).await?;
        info!("Exported {} batches to {}", report.result.len(), path.display());
    }

    Ok(report)
}
