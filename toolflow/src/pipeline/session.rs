//! Single-flight background execution.
//!
//! A [`PipelineSession`] runs at most one pipeline at a time on a background
//! task. The finished [`PipelineRun`] travels back over a oneshot channel
//! together with the in-flight guard, so the session only becomes idle once
//! the foreground has the result in hand.

use super::run::PipelineRun;
use super::runner::PipelineRunner;
use crate::errors::PipelineError;
use crate::tools::MissingTool;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Clears the in-flight flag when dropped.
#[derive(Debug)]
struct FlightGuard {
    flag: Arc<AtomicBool>,
}

impl FlightGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag: flag.clone() })
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// A finished run on its way to the foreground.
#[derive(Debug)]
struct Delivery {
    run: PipelineRun,
    guard: FlightGuard,
}

impl Delivery {
    fn into_run(self) -> PipelineRun {
        let Self { run, guard } = self;
        drop(guard);
        run
    }
}

/// Owns a runner and enforces at most one run in flight.
#[derive(Debug, Clone)]
pub struct PipelineSession {
    runner: Arc<PipelineRunner>,
    in_flight: Arc<AtomicBool>,
}

impl PipelineSession {
    /// Wraps `runner` and logs the result of a startup tool check.
    #[must_use]
    pub fn new(runner: PipelineRunner) -> Self {
        let session = Self {
            runner: Arc::new(runner),
            in_flight: Arc::new(AtomicBool::new(false)),
        };
        let missing = session.preflight();
        if missing.is_empty() {
            info!("All pipeline executables found");
        } else {
            warn!(missing = missing.len(), "Pipeline executables missing; runs will not start");
        }
        session
    }

    /// Returns the runner.
    #[must_use]
    pub fn runner(&self) -> &PipelineRunner {
        &self.runner
    }

    /// Checks every tool executable without starting a run.
    #[must_use]
    pub fn preflight(&self) -> Vec<MissingTool> {
        self.runner.registry().verify_all()
    }

    /// Returns true while a run is executing or awaiting delivery.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Starts a run on `input` in the background.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::RunInProgress`] if a run is already in flight.
    pub fn start(&self, input: impl Into<PathBuf>) -> Result<RunHandle, PipelineError> {
        let guard = FlightGuard::acquire(&self.in_flight).ok_or(PipelineError::RunInProgress)?;
        let input = input.into();
        let runner = Arc::clone(&self.runner);
        let (tx, rx) = oneshot::channel();

        debug!(input = %input.display(), "Starting background run");
        let task = tokio::spawn(async move {
            let run = runner.run(&input).await;
            if tx.send(Delivery { run, guard }).is_err() {
                debug!("Run handle dropped before delivery");
            }
        });

        Ok(RunHandle { rx, task })
    }
}

/// The foreground's claim on a background run.
///
/// Dropping the handle abandons the result; the session becomes idle once
/// the background task finishes.
#[derive(Debug)]
pub struct RunHandle {
    rx: oneshot::Receiver<Delivery>,
    task: JoinHandle<()>,
}

impl RunHandle {
    /// Waits for the run and takes ownership of its record.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::TaskFailed`] if the background task ended
    /// without delivering a result.
    pub async fn wait(self) -> Result<PipelineRun, PipelineError> {
        let Self { rx, task } = self;
        match rx.await {
            Ok(delivery) => Ok(delivery.into_run()),
            Err(_) => Err(task_failure(task.await.err())),
        }
    }

    /// Takes the run if it has already been delivered, without waiting.
    ///
    /// Returns `None` while the run is still executing.
    pub fn try_take(&mut self) -> Option<Result<PipelineRun, PipelineError>> {
        match self.rx.try_recv() {
            Ok(delivery) => Some(Ok(delivery.into_run())),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(PipelineError::TaskFailed(
                "background task ended without a result".to_string(),
            ))),
        }
    }
}

fn task_failure(join_error: Option<tokio::task::JoinError>) -> PipelineError {
    let reason = match join_error {
        Some(err) if err.is_panic() => "background task panicked".to_string(),
        Some(err) => err.to_string(),
        None => "background task ended without a result".to_string(),
    };
    warn!(%reason, "Background run lost");
    PipelineError::TaskFailed(reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_is_exclusive() {
        let flag = Arc::new(AtomicBool::new(false));
        let guard = FlightGuard::acquire(&flag).unwrap();
        assert!(flag.load(Ordering::Acquire));
        assert!(FlightGuard::acquire(&flag).is_none());

        drop(guard);
        assert!(!flag.load(Ordering::Acquire));
        assert!(FlightGuard::acquire(&flag).is_some());
    }

    #[test]
    fn test_task_failure_reason() {
        let err = task_failure(None);
        assert!(matches!(err, PipelineError::TaskFailed(ref r) if r.contains("without a result")));
    }
}
