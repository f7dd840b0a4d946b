use std::path::PathBuf;

use tracing::info;

use crate::charts::RunPlotter;
use crate::error::AppResult;
use crate::shutdown::ShutdownReceiver;

use super::config::StressConfig;
use super::engine::{RunReport, StressEngine};
use super::transport::Transport;

/// Runs the engine and renders the result once the run has stopped.
pub struct StressTester<T: Transport, P: RunPlotter> {
    engine: StressEngine<T>,
    plotter: P,
    plot_path: Option<PathBuf>,
}

impl<T: Transport, P: RunPlotter> StressTester<T, P> {
    /// # Errors
    ///
    /// Returns an error when the engine cannot be set up from `config`.
    pub fn new(config: &StressConfig, transport: T, plotter: P) -> AppResult<Self> {
        Ok(Self {
            engine: StressEngine::new(config, transport)?,
            plotter,
            plot_path: config.plot_path.clone(),
        })
    }

    /// # Errors
    ///
    /// Returns an error when the plot cannot be rendered. The run itself never
    /// fails: request errors are part of the report.
    pub async fn test(&mut self, shutdown_rx: ShutdownReceiver) -> AppResult<RunReport> {
        let report = self.engine.run(shutdown_rx).await;
        if let Some(path) = &self.plot_path {
            info!("Plotting {} batches to {}", report.result.len(), path.display());
            self.plotter.render(&report.result, path)?;
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::{Arc, Mutex, PoisonError};
    use std::time::Duration;

    use super::*;
    use crate::error::{AppError, ChartError};
    use crate::shutdown::shutdown_channel;
    use crate::stress::RunResult;
    use crate::stress::engine::StopReason;
    use crate::stress::test_support::{FakeTransport, run_async_test, stress_config};

    #[derive(Default)]
    struct RecordingPlotter {
        rendered: Arc<Mutex<Vec<(PathBuf, usize)>>>,
        fail: bool,
    }

    impl RunPlotter for RecordingPlotter {
        fn render(&self, result: &RunResult, path: &Path) -> AppResult<()> {
            if self.fail {
                return Err(AppError::chart(ChartError::Render {
                    path: path.to_path_buf(),
                    message: "backend unavailable".to_owned(),
                }));
            }
            self.rendered
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((path.to_path_buf(), result.len()));
            Ok(())
        }
    }

    #[test]
    fn plot_rendered_after_run() -> AppResult<()> {
        run_async_test(async {
            let mut config = stress_config("lin[1,1]", true, Duration::from_secs(60));
            config.plot_path = Some(PathBuf::from("out/run.png"));
            let plotter = RecordingPlotter::default();
            let rendered = Arc::clone(&plotter.rendered);
            let mut tester = StressTester::new(&config, FakeTransport::responding(200), plotter)?;
            let (_shutdown_tx, shutdown_rx) = shutdown_channel();

            let report = tester.test(shutdown_rx).await?;

            if report.stop != StopReason::SingleBatchDone {
                return Err(AppError::validation("Expected a dry run"));
            }
            let rendered = rendered.lock().unwrap_or_else(PoisonError::into_inner);
            if rendered.as_slice() != [(PathBuf::from("out/run.png"), 1)] {
                return Err(AppError::validation(format!("Unexpected renders {:?}", rendered)));
            }
            Ok(())
        })
    }

    #[test]
    fn no_plot_without_path() -> AppResult<()> {
        run_async_test(async {
            let config = stress_config("lin[1,1]", true, Duration::from_secs(60));
            let plotter = RecordingPlotter::default();
            let rendered = Arc::clone(&plotter.rendered);
            let mut tester = StressTester::new(&config, FakeTransport::responding(200), plotter)?;
            let (_shutdown_tx, shutdown_rx) = shutdown_channel();

            tester.test(shutdown_rx).await?;

            if !rendered.lock().unwrap_or_else(PoisonError::into_inner).is_empty() {
                return Err(AppError::validation("Expected no render"));
            }
            Ok(())
        })
    }

    #[test]
    fn render_failure_fails_run() -> AppResult<()> {
        run_async_test(async {
            let mut config = stress_config("lin[1,1]", true, Duration::from_secs(60));
            config.plot_path = Some(PathBuf::from("run.png"));
            let plotter = RecordingPlotter {
                fail: true,
                ..RecordingPlotter::default()
            };
            let mut tester = StressTester::new(&config, FakeTransport::responding(200), plotter)?;
            let (_shutdown_tx, shutdown_rx) = shutdown_channel();

            match tester.test(shutdown_rx).await {
                Err(AppError::Chart(ChartError::Render { .. })) => Ok(()),
                Err(err) => Err(AppError::validation(format!("Unexpected error: {}", err))),
                Ok(_) => Err(AppError::validation("Expected render failure")),
            }
        })
    }
}
