use std::sync::{Arc, Mutex, Weak};

use chrono::Utc;
use tokio::runtime::Handle;
use tokio::sync::{watch, Notify};
use tokio::time::Instant;

use common::types::{Sample3D, SensorType};
use publisher::{Listener, Subscription};

use crate::config::SessionConfig;
use crate::errors::SamplerError;
use crate::helpers::lock;
use crate::models::{SessionSnapshot, SessionStatus, UploadPayload};
use crate::ports::SensorSource;

/// Timed accelerometer and gyroscope sampling buffer.
///
/// `start()` clears both buffers, subscribes to both sources and arms a deadline. Samples are
/// appended in arrival order while the session is collecting. When the deadline elapses, or on
/// [`SamplingSession::teardown`], both subscriptions are released and the session is stopped.
/// The collected samples remain readable (and uploadable) until the next `start()`.
///
/// Dropping the session tears it down.
pub struct SamplingSession {
    config: SessionConfig,
    accelerometer: Arc<dyn SensorSource>,
    gyroscope: Arc<dyn SensorSource>,
    shared: Arc<Shared>,
}

// Lock order: `run` before `state`.
struct Shared {
    state: Mutex<SessionState>,
    run: Mutex<Option<ActiveRun>>,
    status_tx: watch::Sender<SessionStatus>,
}

#[derive(Default)]
struct SessionState {
    status: SessionStatus,
    generation: u64,
    started_at: Option<chrono::DateTime<Utc>>,
    accelerometer: Vec<Sample3D>,
    gyroscope: Vec<Sample3D>,
}

/// Resources held while a run is collecting
struct ActiveRun {
    generation: u64,
    subscriptions: Vec<Subscription>,
    abort_signal: Arc<Notify>,
}

impl Drop for ActiveRun {
    fn drop(&mut self) {
        for subscription in &self.subscriptions {
            subscription.remove();
        }
        // Stores a permit if the deadline task has not been polled yet.
        self.abort_signal.notify_one();
    }
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Accelerometer,
    Gyroscope,
}

impl SamplingSession {
    /// Creates an idle session.
    /// # Errors
    /// - InvalidConfig if the update interval or the collection duration is zero
    /// - SensorMismatch if `accelerometer` or `gyroscope` is a source of another kind
    pub fn new(
        config: SessionConfig,
        accelerometer: Arc<dyn SensorSource>,
        gyroscope: Arc<dyn SensorSource>,
    ) -> Result<Self, SamplerError> {
        config.validate()?;
        check_source(accelerometer.as_ref(), "accelerometer", |s| {
            s.is_accelerometer()
        })?;
        check_source(gyroscope.as_ref(), "gyroscope", |s| s.is_gyroscope())?;

        let (status_tx, _) = watch::channel(SessionStatus::Idle);

        Ok(Self {
            config,
            accelerometer,
            gyroscope,
            shared: Arc::new(Shared {
                state: Mutex::new(SessionState::default()),
                run: Mutex::new(None),
                status_tx,
            }),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Starts a new collection run, discarding the samples of any previous run.
    ///
    /// Must be called from within a tokio runtime. If a source refuses the subscription, the
    /// session moves to `Failed` and the error is returned.
    pub fn start(&self) -> Result<(), SamplerError> {
        let runtime = Handle::try_current().map_err(|e| SamplerError::Runtime(e.to_string()))?;
        let duration = self.config.collection_duration();
        let deadline_at = Instant::now() + duration;

        let mut run_slot = lock(&self.shared.run);
        let previous = run_slot.take();

        let generation = {
            let mut state = lock(&self.shared.state);
            state.generation += 1;
            state.accelerometer.clear();
            state.gyroscope.clear();
            state.started_at = Some(Utc::now());
            self.shared.set_status(&mut state, SessionStatus::Collecting);
            state.generation
        };
        drop(previous);

        let interval = self.config.update_interval();
        self.accelerometer.set_update_interval(interval);
        self.gyroscope.set_update_interval(interval);

        let mut subscriptions = Vec::with_capacity(2);
        for (stream, source) in [
            (Stream::Accelerometer, &self.accelerometer),
            (Stream::Gyroscope, &self.gyroscope),
        ] {
            let mut listener = self.sample_listener(stream, generation);
            match source.add_listener(&mut listener) {
                Ok(subscription) => subscriptions.push(subscription),
                Err(e) => {
                    drop(subscriptions);
                    log::error!("Could not subscribe to {}: {}", source.get_sensor_type(), e);
                    let mut state = lock(&self.shared.state);
                    self.shared
                        .set_status(&mut state, SessionStatus::Failed(e.to_string()));
                    return Err(e);
                }
            }
        }

        let abort_signal = Arc::new(Notify::new());
        runtime.spawn(deadline(
            Arc::downgrade(&self.shared),
            generation,
            deadline_at,
            Arc::clone(&abort_signal),
        ));

        *run_slot = Some(ActiveRun {
            generation,
            subscriptions,
            abort_signal,
        });

        log::info!(
            "Collecting samples every {:?} for {:?}",
            interval,
            duration
        );
        Ok(())
    }

    /// Releases both subscriptions and cancels the deadline before returning.
    ///
    /// A collecting session becomes `Stopped` and keeps its samples. Calling it again, or on a
    /// session that is not collecting, has no effect.
    pub fn teardown(&self) {
        self.shared.stop_run(None, "teardown");
    }

    pub fn status(&self) -> SessionStatus {
        lock(&self.shared.state).status.clone()
    }

    /// Receiver notified on every status transition
    pub fn subscribe_status(&self) -> watch::Receiver<SessionStatus> {
        self.shared.status_tx.subscribe()
    }

    /// Resolves with the current status as soon as the session is not collecting.
    pub async fn wait_until_stopped(&self) -> SessionStatus {
        let mut status_rx = self.subscribe_status();
        loop {
            let status = status_rx.borrow_and_update().clone();
            if !status.is_collecting() {
                return status;
            }
            if status_rx.changed().await.is_err() {
                return self.status();
            }
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = lock(&self.shared.state);
        SessionSnapshot {
            status: state.status.clone(),
            started_at: state.started_at,
            accelerometer: state.accelerometer.clone(),
            gyroscope: state.gyroscope.clone(),
        }
    }

    /// Copies the buffered samples into an upload batch stamped with the current time.
    /// The buffers are left untouched.
    pub fn build_upload_payload(&self) -> Result<UploadPayload, SamplerError> {
        let state = lock(&self.shared.state);
        if state.status.is_collecting() {
            return Err(SamplerError::StillCollecting);
        }
        Ok(UploadPayload::new(
            Utc::now(),
            state.accelerometer.clone(),
            state.gyroscope.clone(),
        ))
    }

    fn sample_listener(&self, stream: Stream, generation: u64) -> Listener<Sample3D> {
        let shared = Arc::downgrade(&self.shared);
        Listener::new(move |_id, sample: Arc<Sample3D>| {
            if let Some(shared) = shared.upgrade() {
                shared.append(stream, generation, &sample);
            }
        })
    }
}

impl Drop for SamplingSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl Shared {
    fn set_status(&self, state: &mut SessionState, status: SessionStatus) {
        log::info!("Session status: {}", status);
        state.status = status.clone();
        self.status_tx.send_replace(status);
    }

    fn append(&self, stream: Stream, generation: u64, sample: &Sample3D) {
        let mut state = lock(&self.state);
        if state.generation != generation || !state.status.is_collecting() {
            log::debug!("Dropping late {:?} sample", stream);
            return;
        }
        log::debug!("{:?}: {}", stream, sample);
        match stream {
            Stream::Accelerometer => state.accelerometer.push(sample.clone()),
            Stream::Gyroscope => state.gyroscope.push(sample.clone()),
        }
    }

    /// Ends the active run. With `Some(generation)`, only if that run is still the active one.
    fn stop_run(&self, generation: Option<u64>, reason: &str) -> bool {
        let mut run_slot = lock(&self.run);
        if let Some(expected) = generation {
            if run_slot.as_ref().map(|run| run.generation) != Some(expected) {
                return false;
            }
        }
        let Some(run) = run_slot.take() else {
            return false;
        };

        {
            let mut state = lock(&self.state);
            if state.generation == run.generation && state.status.is_collecting() {
                self.set_status(&mut state, SessionStatus::Stopped);
                log::info!(
                    "Collection ended on {}: {} accelerometer and {} gyroscope samples",
                    reason,
                    state.accelerometer.len(),
                    state.gyroscope.len()
                );
            }
        }
        drop(run);
        true
    }
}

async fn deadline(
    shared: Weak<Shared>,
    generation: u64,
    deadline_at: Instant,
    abort_signal: Arc<Notify>,
) {
    tokio::select! {
        _ = abort_signal.notified() => {}
        _ = tokio::time::sleep_until(deadline_at) => {
            if let Some(shared) = shared.upgrade() {
                shared.stop_run(Some(generation), "deadline");
            }
        }
    }
}

fn check_source(
    source: &dyn SensorSource,
    expected: &str,
    is_expected: impl Fn(&SensorType) -> bool,
) -> Result<(), SamplerError> {
    let sensor_type = source.get_sensor_type();
    if is_expected(sensor_type) {
        return Ok(());
    }
    Err(SamplerError::SensorMismatch {
        expected: expected.to_string(),
        found: sensor_type.kind().to_string(),
    })
}

impl std::fmt::Debug for SamplingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SamplingSession")
            .field("config", &self.config)
            .field("status", &self.status())
            .finish()
    }
}
