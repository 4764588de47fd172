// Integration tests for the session coordinator
//
// The coordinator has no direct start/stop callback from the recorder;
// everything is inferred from the shared start-time key. These tests
// play the recorder's role by writing that key directly.

use anyhow::{bail, Result};
use castlink::store::{keys, MemoryStore, SharedStateStore, StateValue};
use castlink::{SessionCoordinator, SessionPhase, StreamQuality, PAIRING_CODE_PLACEHOLDER};
use chrono::{Duration as ChronoDuration, Utc};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

fn coordinator_over(store: Arc<dyn SharedStateStore>) -> SessionCoordinator {
    SessionCoordinator::new(store, Duration::from_millis(10))
}

#[test]
fn test_pairing_code_is_four_zero_padded_digits() -> Result<()> {
    let store: Arc<dyn SharedStateStore> = Arc::new(MemoryStore::new());
    let coordinator = coordinator_over(Arc::clone(&store));

    for _ in 0..100 {
        let code = coordinator.issue_pairing_code()?;

        assert_eq!(code.len(), 4, "Code should always be 4 characters");
        assert!(
            code.chars().all(|c| c.is_ascii_digit()),
            "Code should be numeric, got {}",
            code
        );
        let numeric: u32 = code.parse()?;
        assert!(numeric <= 9999);
    }

    Ok(())
}

#[test]
fn test_issuing_codes_overwrites_only_last_persists() -> Result<()> {
    let store: Arc<dyn SharedStateStore> = Arc::new(MemoryStore::new());
    let coordinator = coordinator_over(Arc::clone(&store));

    let mut last = String::new();
    for _ in 0..5 {
        last = coordinator.issue_pairing_code()?;
    }

    let stored = store.get(keys::PAIRING_CODE)?;
    assert_eq!(stored, Some(StateValue::Text(last)));

    Ok(())
}

#[test]
fn test_observe_state_idle_without_start_time() -> Result<()> {
    let store: Arc<dyn SharedStateStore> = Arc::new(MemoryStore::new());
    let coordinator = coordinator_over(Arc::clone(&store));

    coordinator.poll_tick();
    let snapshot = coordinator.observe_state();

    assert!(!snapshot.active);
    assert_eq!(snapshot.elapsed, Duration::ZERO);
    assert_eq!(snapshot.pairing_code, PAIRING_CODE_PLACEHOLDER);

    Ok(())
}

#[test]
fn test_active_follows_start_time_presence() -> Result<()> {
    let store: Arc<dyn SharedStateStore> = Arc::new(MemoryStore::new());
    let coordinator = coordinator_over(Arc::clone(&store));

    // Recorder writes the marker between polls
    store.set(keys::SESSION_START_TIME, StateValue::Timestamp(Utc::now()))?;
    coordinator.poll_tick();

    assert!(coordinator.observe_state().active);
    assert_eq!(coordinator.phase(), SessionPhase::Active);

    // Recorder tears the session down
    store.remove(keys::SESSION_START_TIME)?;
    coordinator.poll_tick();

    let snapshot = coordinator.observe_state();
    assert!(!snapshot.active);
    assert_eq!(snapshot.elapsed, Duration::ZERO, "Elapsed resets to zero");
    assert_eq!(coordinator.phase(), SessionPhase::Idle);

    Ok(())
}

#[test]
fn test_elapsed_tracks_start_time_and_never_decreases() -> Result<()> {
    let store: Arc<dyn SharedStateStore> = Arc::new(MemoryStore::new());
    let coordinator = coordinator_over(Arc::clone(&store));

    // Session that started 30 seconds ago
    let started = Utc::now() - ChronoDuration::seconds(30);
    store.set(keys::SESSION_START_TIME, StateValue::Timestamp(started))?;

    coordinator.poll_tick();
    let first = coordinator.observe_state().elapsed;
    assert!(
        first >= Duration::from_secs(29),
        "Elapsed should reflect the recorded start time, got {:?}",
        first
    );

    coordinator.poll_tick();
    let second = coordinator.observe_state().elapsed;
    assert!(second >= first, "Elapsed must be monotonically non-decreasing");

    Ok(())
}

#[test]
fn test_new_start_time_resets_elapsed_tracking() -> Result<()> {
    let store: Arc<dyn SharedStateStore> = Arc::new(MemoryStore::new());
    let coordinator = coordinator_over(Arc::clone(&store));

    let old = Utc::now() - ChronoDuration::seconds(600);
    store.set(keys::SESSION_START_TIME, StateValue::Timestamp(old))?;
    coordinator.poll_tick();
    assert!(coordinator.observe_state().elapsed >= Duration::from_secs(599));

    // A different start time means a different session, even though the
    // key never went absent between polls
    store.set(keys::SESSION_START_TIME, StateValue::Timestamp(Utc::now()))?;
    coordinator.poll_tick();

    let elapsed = coordinator.observe_state().elapsed;
    assert!(
        elapsed < Duration::from_secs(5),
        "Elapsed should restart for the new session, got {:?}",
        elapsed
    );

    Ok(())
}

#[test]
fn test_stream_quality_round_trip() -> Result<()> {
    let store: Arc<dyn SharedStateStore> = Arc::new(MemoryStore::new());
    let coordinator = coordinator_over(Arc::clone(&store));

    coordinator.set_stream_quality(StreamQuality::High)?;

    let stored = store
        .get(keys::STREAM_QUALITY)?
        .and_then(|v| v.as_text().map(str::to_string));
    assert_eq!(stored.as_deref(), Some("high"));

    let parsed = StreamQuality::from_str("high")?;
    assert_eq!(parsed, StreamQuality::High);
    assert!(StreamQuality::from_str("ultra").is_err());

    Ok(())
}

/// Store that fails every call, standing in for a missing shared
/// storage handle
struct UnavailableStore;

impl SharedStateStore for UnavailableStore {
    fn get(&self, _key: &str) -> Result<Option<StateValue>> {
        bail!("shared storage is gone")
    }

    fn set(&self, _key: &str, _value: StateValue) -> Result<()> {
        bail!("shared storage is gone")
    }

    fn remove(&self, _key: &str) -> Result<()> {
        bail!("shared storage is gone")
    }
}

#[test]
fn test_unavailable_store_degrades_to_idle() {
    let store: Arc<dyn SharedStateStore> = Arc::new(UnavailableStore);
    let coordinator = coordinator_over(store);

    // Neither polling nor observing may panic or error
    coordinator.poll_tick();
    let snapshot = coordinator.observe_state();

    assert!(!snapshot.active);
    assert_eq!(snapshot.elapsed, Duration::ZERO);
    assert_eq!(snapshot.pairing_code, PAIRING_CODE_PLACEHOLDER);

    // Writes do surface the failure to the caller
    assert!(coordinator.issue_pairing_code().is_err());
}

#[tokio::test]
async fn test_poll_loop_observes_session_lifecycle() -> Result<()> {
    let store: Arc<dyn SharedStateStore> = Arc::new(MemoryStore::new());
    let coordinator = coordinator_over(Arc::clone(&store));

    coordinator.run().await;

    // Recorder starts a session; the loop should notice within a few
    // intervals
    store.set(keys::SESSION_START_TIME, StateValue::Timestamp(Utc::now()))?;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(coordinator.observe_state().active);

    // Recorder stops; the loop should settle back to idle
    store.remove(keys::SESSION_START_TIME)?;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!coordinator.observe_state().active);

    coordinator.stop().await;

    Ok(())
}

#[tokio::test]
async fn test_stop_cancels_poll_loop() -> Result<()> {
    let store: Arc<dyn SharedStateStore> = Arc::new(MemoryStore::new());
    let coordinator = coordinator_over(Arc::clone(&store));

    coordinator.run().await;
    coordinator.stop().await;

    // After stop, the loop no longer reacts to recorder writes
    store.set(keys::SESSION_START_TIME, StateValue::Timestamp(Utc::now()))?;
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(coordinator.phase(), SessionPhase::Idle);

    Ok(())
}
