//! Packager readiness state machine
//!
//! [`PackagerWatcher`] only *observes* the packager endpoint. Launching the
//! process is someone else's job (see [`crate::process`]), which lets a run
//! with `--no-packager` reuse an externally started packager without any
//! special casing in the platform runners.
//!
//! State moves Down → Starting → {Up | Failed} and is published through a
//! `tokio::sync::watch` channel so any number of consumers can await it.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};

use devrun_core::prelude::*;
use devrun_core::{PackagerEndpoint, PackagerState};

use crate::probe::{EndpointProbe, TcpProbe};

/// Default time to wait for the packager to accept connections
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(120);

/// Default delay between probes
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Deadline used when `ready_timeout` does not fit in an `Instant`
const FAR_FUTURE: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 30);

/// Timing for [`PackagerWatcher::start_watching_until_up`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchConfig {
    pub ready_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            ready_timeout: DEFAULT_READY_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Watches the packager endpoint and exposes readiness to consumers.
pub struct PackagerWatcher<P = TcpProbe> {
    endpoint: PackagerEndpoint,
    probe: Arc<P>,
    config: WatchConfig,
    state_tx: Arc<watch::Sender<PackagerState>>,
    poll_task: Mutex<Option<JoinHandle<()>>>,
}

impl PackagerWatcher<TcpProbe> {
    /// Watcher using a real TCP probe
    pub fn tcp(endpoint: PackagerEndpoint, config: WatchConfig) -> Self {
        Self::new(endpoint, TcpProbe::default(), config)
    }
}

impl<P> PackagerWatcher<P>
where
    P: EndpointProbe + Sync + 'static,
{
    pub fn new(endpoint: PackagerEndpoint, probe: P, config: WatchConfig) -> Self {
        let (state_tx, _) = watch::channel(PackagerState::Down);
        Self {
            endpoint,
            probe: Arc::new(probe),
            config,
            state_tx: Arc::new(state_tx),
            poll_task: Mutex::new(None),
        }
    }

    pub fn endpoint(&self) -> &PackagerEndpoint {
        &self.endpoint
    }

    pub fn config(&self) -> WatchConfig {
        self.config
    }

    /// Current state (non-blocking)
    pub fn state(&self) -> PackagerState {
        *self.state_tx.borrow()
    }

    /// Check that nothing is listening on the endpoint yet.
    ///
    /// Returns `true` without probing when the caller opted out of running a
    /// packager. A `false` result is a usage error and must not be retried.
    pub async fn validate_down(&self, skip_packager: bool) -> bool {
        if skip_packager {
            debug!("Packager skipped, not probing {}", self.endpoint);
            return true;
        }

        if self.probe.is_listening(&self.endpoint).await {
            warn!("Something is already listening on {}", self.endpoint);
            false
        } else {
            debug!("Endpoint {} is free", self.endpoint);
            true
        }
    }

    /// Move to Starting and poll in the background until Up or Failed.
    ///
    /// Returns immediately. Calling it more than once has no effect.
    pub fn start_watching_until_up(&self) {
        if !transition(&self.state_tx, PackagerState::Starting) {
            warn!(
                "Packager watcher already started (state: {}), ignoring",
                self.state()
            );
            return;
        }

        info!("Waiting for packager on {}", self.endpoint);

        let handle = tokio::spawn(poll_until_up(
            Arc::clone(&self.probe),
            self.endpoint.clone(),
            self.config,
            Arc::clone(&self.state_tx),
        ));

        if let Ok(mut slot) = self.poll_task.lock() {
            *slot = Some(handle);
        }
    }

    /// Suspend until the watcher reaches Up or Failed
    pub async fn await_ready(&self) -> PackagerState {
        self.readiness().await_ready().await
    }

    /// Cloneable readiness handle for consumers
    pub fn readiness(&self) -> PackagerReadiness {
        PackagerReadiness {
            rx: self.state_tx.subscribe(),
            endpoint: self.endpoint.clone(),
            waited: self.config.ready_timeout,
        }
    }
}

impl<P> Drop for PackagerWatcher<P> {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.poll_task.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
    }
}

/// Apply a state change if the state machine allows it
fn transition(state_tx: &watch::Sender<PackagerState>, next: PackagerState) -> bool {
    state_tx.send_if_modified(|state| {
        if state.can_transition_to(next) {
            debug!("Packager state: {} -> {}", state, next);
            *state = next;
            true
        } else {
            false
        }
    })
}

/// Background poll loop: Starting → Up on first successful probe, Failed at the deadline
async fn poll_until_up<P: EndpointProbe>(
    probe: Arc<P>,
    endpoint: PackagerEndpoint,
    config: WatchConfig,
    state_tx: Arc<watch::Sender<PackagerState>>,
) {
    let started = Instant::now();
    let deadline = started
        .checked_add(config.ready_timeout)
        .unwrap_or_else(|| started + FAR_FUTURE);
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        if probe.is_listening(&endpoint).await {
            info!(
                "Packager is up on {} ({:?}, {} probes)",
                endpoint,
                started.elapsed(),
                attempts
            );
            transition(&state_tx, PackagerState::Up);
            return;
        }

        let now = Instant::now();
        if now >= deadline {
            // Nobody waits on readiness when the run skips the packager
            if state_tx.receiver_count() > 0 {
                error!(
                    "Packager did not come up on {} within {:?}",
                    endpoint, config.ready_timeout
                );
            } else {
                debug!(
                    "No packager on {} after {:?} (no consumers)",
                    endpoint, config.ready_timeout
                );
            }
            transition(&state_tx, PackagerState::Failed);
            return;
        }

        sleep(config.poll_interval.min(deadline - now)).await;
    }
}

/// Consumer side of the watcher
#[derive(Debug, Clone)]
pub struct PackagerReadiness {
    rx: watch::Receiver<PackagerState>,
    endpoint: PackagerEndpoint,
    waited: Duration,
}

impl PackagerReadiness {
    pub fn state(&self) -> PackagerState {
        *self.rx.borrow()
    }

    pub fn endpoint(&self) -> &PackagerEndpoint {
        &self.endpoint
    }

    /// Suspend until Up or Failed. A dropped watcher counts as Failed.
    pub async fn await_ready(&self) -> PackagerState {
        let mut rx = self.rx.clone();
        let result = rx.wait_for(|state| state.is_terminal()).await.map(|s| *s);
        match result {
            Ok(state) => state,
            Err(_) => {
                warn!("Packager watcher went away before reaching a final state");
                PackagerState::Failed
            }
        }
    }

    /// Like [`Self::await_ready`] but turns Failed into [`Error::PackagerUnreachable`]
    pub async fn require_up(&self) -> Result<()> {
        match self.await_ready().await {
            PackagerState::Up => Ok(()),
            _ => Err(Error::packager_unreachable(&self.endpoint, self.waited)),
        }
    }
}
