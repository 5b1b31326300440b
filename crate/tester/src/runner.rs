use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use jacarta_interfaces::Pkcs11Api;
use jacarta_logger::{debug, info};
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use zeroize::Zeroizing;

use crate::{DetachSignal, EventSink, Reporter, SessionController, TestOutcome, TesterConfig};

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("a test run is already in progress")]
    Busy,

    #[error("the test run worker failed: {0}")]
    Worker(#[from] JoinError),
}

/// Clears the busy flag when the run is over, even if the worker panicked
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// A run executing on the blocking thread pool
#[derive(Debug)]
pub struct RunHandle(JoinHandle<TestOutcome>);

impl RunHandle {
    /// Wait for the run to complete
    pub async fn outcome(self) -> Result<TestOutcome, RunnerError> {
        Ok(self.0.await?)
    }
}

/// Runs the token test sequence when the device becomes available.
///
/// There is a single worker slot: a run requested while another is in flight is
/// rejected with [`RunnerError::Busy`]. The methods returning a [`RunHandle`] must be
/// called from within a Tokio runtime.
pub struct TokenTester {
    api: Arc<dyn Pkcs11Api>,
    config: Arc<TesterConfig>,
    sink: Arc<dyn EventSink>,
    busy: Arc<AtomicBool>,
    detach: DetachSignal,
}

impl TokenTester {
    #[must_use]
    pub fn new(api: Arc<dyn Pkcs11Api>, config: TesterConfig, sink: Arc<dyn EventSink>) -> Self {
        Self {
            api,
            config: Arc::new(config),
            sink,
            busy: Arc::new(AtomicBool::new(false)),
            detach: DetachSignal::default(),
        }
    }

    /// The device is attached and access was granted: start a test run
    pub fn on_device_ready(&self) -> Result<RunHandle, RunnerError> {
        let config = self.config.clone();
        self.spawn("test", move |controller, reporter| {
            controller.run_test_sequence(&config, reporter)
        })
    }

    /// The device went away: the run in flight, if any, fails at its current phase
    pub fn on_device_gone(&self) {
        if self.is_busy() {
            info!("device detached during a run");
            self.detach.raise();
        } else {
            debug!("device detached, no run in progress");
        }
    }

    /// Initialize the token with the security officer PIN, through the same single
    /// worker slot as the test runs
    pub fn init_token(&self, so_pin: Zeroizing<String>) -> Result<RunHandle, RunnerError> {
        let config = self.config.clone();
        self.spawn("token initialization", move |controller, reporter| {
            controller.run_init_token(&config, &so_pin, reporter)
        })
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    fn spawn<F>(&self, name: &'static str, run: F) -> Result<RunHandle, RunnerError>
    where
        F: FnOnce(&SessionController, &Reporter) -> TestOutcome + Send + 'static,
    {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(RunnerError::Busy);
        }
        let guard = BusyGuard(self.busy.clone());
        self.detach.reset();

        let controller = SessionController::new(self.api.clone(), self.detach.clone());
        let reporter = Reporter::new(self.sink.clone());
        info!("starting {name} run");
        let handle = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            let outcome = run(&controller, &reporter);
            reporter.finish(outcome)
        });
        Ok(RunHandle(handle))
    }
}
