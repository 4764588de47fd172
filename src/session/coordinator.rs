use super::snapshot::{SessionPhase, StateSnapshot, StreamQuality, PAIRING_CODE_PLACEHOLDER};
use crate::store::{keys, SharedStateStore, StateValue};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rand::Rng;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Coordinates a broadcast session with the external recorder process
///
/// The recorder is launched and torn down by the OS outside this
/// process; the only thing the host ever sees is the recorder's writes
/// to shared state. The coordinator polls that state on a fixed
/// interval and infers the session lifecycle from it: the start-time
/// key appearing means a session began, the key disappearing means it
/// ended.
pub struct SessionCoordinator {
    store: Arc<dyn SharedStateStore>,
    poll_interval: Duration,

    /// Start-time value this coordinator last observed, used to detect
    /// a session appearing or restarting between polls
    observed_start: Arc<Mutex<Option<DateTime<Utc>>>>,

    /// Elapsed time of the current session in milliseconds
    elapsed_ms: Arc<AtomicU64>,

    /// Whether the poll loop is running
    polling: Arc<AtomicBool>,

    /// Handle for the poll loop task
    poll_task: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl SessionCoordinator {
    pub fn new(store: Arc<dyn SharedStateStore>, poll_interval: Duration) -> Self {
        Self {
            store,
            poll_interval,
            observed_start: Arc::new(Mutex::new(None)),
            elapsed_ms: Arc::new(AtomicU64::new(0)),
            polling: Arc::new(AtomicBool::new(false)),
            poll_task: tokio::sync::Mutex::new(None),
        }
    }

    /// Generate a fresh 4-digit pairing code and publish it
    ///
    /// Sampled uniformly from 0000-9999 and written to shared state
    /// last-writer-wins. Call this only while idle, when preparing to
    /// start a new session; no uniqueness check against prior codes is
    /// made.
    pub fn issue_pairing_code(&self) -> Result<String> {
        let code = format!("{:04}", rand::thread_rng().gen_range(0..10_000));

        self.store
            .set(keys::PAIRING_CODE, StateValue::Text(code.clone()))
            .context("Failed to publish pairing code")?;

        info!("Issued pairing code: {}", code);
        Ok(code)
    }

    /// Request a capture quality from the recorder (fire-and-forget)
    pub fn set_stream_quality(&self, quality: StreamQuality) -> Result<()> {
        self.store
            .set(
                keys::STREAM_QUALITY,
                StateValue::Text(quality.as_str().to_string()),
            )
            .context("Failed to publish stream quality")?;

        debug!("Requested stream quality: {}", quality.as_str());
        Ok(())
    }

    /// Read-only snapshot of the current session for display
    ///
    /// Never blocks and never fails: an unreachable store degrades to
    /// an idle snapshot with the placeholder pairing code.
    pub fn observe_state(&self) -> StateSnapshot {
        let start = match self.store.get(keys::SESSION_START_TIME) {
            Ok(value) => value.and_then(|v| v.as_timestamp()),
            Err(e) => {
                warn!("Shared state unavailable, reporting idle: {}", e);
                return StateSnapshot::idle();
            }
        };

        let pairing_code = self
            .store
            .get(keys::PAIRING_CODE)
            .ok()
            .flatten()
            .and_then(|v| v.as_text().map(str::to_string))
            .unwrap_or_else(|| PAIRING_CODE_PLACEHOLDER.to_string());

        let active = SessionPhase::from_start_time(start) == SessionPhase::Active;
        let elapsed = if active {
            Duration::from_millis(self.elapsed_ms.load(Ordering::SeqCst))
        } else {
            Duration::ZERO
        };

        StateSnapshot {
            active,
            elapsed,
            pairing_code,
        }
    }

    /// Current phase as derived on the last poll
    pub fn phase(&self) -> SessionPhase {
        let observed = self.observed_start.lock().unwrap_or_else(|e| e.into_inner());
        SessionPhase::from_start_time(*observed)
    }

    /// Run one poll cycle against shared state
    ///
    /// Re-derives the phase and recomputes elapsed time. A session
    /// appearing (or restarting with a different start time) between
    /// polls resets the locally tracked elapsed before recomputing.
    pub fn poll_tick(&self) {
        Self::tick(&self.store, &self.observed_start, &self.elapsed_ms);
    }

    fn tick(
        store: &Arc<dyn SharedStateStore>,
        observed_start: &Mutex<Option<DateTime<Utc>>>,
        elapsed_ms: &AtomicU64,
    ) {
        let start = match store.get(keys::SESSION_START_TIME) {
            Ok(value) => value.and_then(|v| v.as_timestamp()),
            Err(e) => {
                // Store unavailable: degrade to idle, never fatal
                warn!("Shared state unavailable during poll: {}", e);
                None
            }
        };

        let mut observed = observed_start.lock().unwrap_or_else(|e| e.into_inner());

        match start {
            None => {
                if observed.is_some() {
                    info!("Session ended (start-time key removed)");
                }
                *observed = None;
                elapsed_ms.store(0, Ordering::SeqCst);
            }
            Some(start) => {
                if *observed != Some(start) {
                    // The recorder wrote the marker between polls
                    info!("Session started at {}", start);
                    *observed = Some(start);
                    elapsed_ms.store(0, Ordering::SeqCst);
                }

                let wall_ms = Utc::now()
                    .signed_duration_since(start)
                    .num_milliseconds()
                    .max(0) as u64;

                // Elapsed never runs backwards within one session, even
                // if the wall clock is adjusted underneath us
                let prev = elapsed_ms.load(Ordering::SeqCst);
                elapsed_ms.store(wall_ms.max(prev), Ordering::SeqCst);
            }
        }
    }

    /// Start the fixed-interval poll loop
    pub async fn run(&self) {
        if self.polling.swap(true, Ordering::SeqCst) {
            warn!("Poll loop already running");
            return;
        }

        info!(
            "Starting session poll loop ({}ms interval)",
            self.poll_interval.as_millis()
        );

        let store = Arc::clone(&self.store);
        let observed_start = Arc::clone(&self.observed_start);
        let elapsed_ms = Arc::clone(&self.elapsed_ms);
        let polling = Arc::clone(&self.polling);
        let interval = self.poll_interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                if !polling.load(Ordering::SeqCst) {
                    break;
                }
                Self::tick(&store, &observed_start, &elapsed_ms);
            }

            info!("Session poll loop stopped");
        });

        {
            let mut handle = self.poll_task.lock().await;
            *handle = Some(task);
        }
    }

    /// Stop the poll loop and wait for it to wind down
    pub async fn stop(&self) {
        if !self.polling.swap(false, Ordering::SeqCst) {
            return;
        }

        let mut handle = self.poll_task.lock().await;
        if let Some(task) = handle.take() {
            task.abort();
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    error!("Poll task panicked: {}", e);
                }
            }
        }
    }
}
