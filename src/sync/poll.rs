use super::*;
use crate::api::Api;
use crate::notify::Notifier;
use crate::notify::Severity;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Polling cadence: fast while an autoplay loop is running, idle
/// otherwise.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    pub idle: Duration,
    pub fast: Duration,
}

impl PollConfig {
    /// Solo play: steady 1s refresh.
    pub fn solo() -> Self {
        Self {
            idle: Duration::from_millis(1000),
            fast: Duration::from_millis(1000),
        }
    }
    /// Bot-vs-bot: 500ms while stepping, 2s while paused.
    pub fn battle() -> Self {
        Self {
            idle: Duration::from_millis(2000),
            fast: Duration::from_millis(500),
        }
    }
}

/// Interval-driven session refresh.
///
/// Fetches while mounted, fully replaces the slot on every success,
/// and stops permanently once the outcome is set. Transport failures
/// are retried on the normal interval; the connectivity notice fires
/// on the transition into failure, not on every miss.
pub struct PollDriver {
    handle: Option<JoinHandle<()>>,
}

impl PollDriver {
    /// Starts polling. The `fast` flag is shared with whoever drives
    /// the pace (the autoplay loop hands over its running flag).
    pub fn spawn(
        api: Arc<dyn Api>,
        slot: Arc<SessionSlot>,
        notifier: Arc<dyn Notifier>,
        id: String,
        config: PollConfig,
        fast: Arc<AtomicBool>,
    ) -> Self {
        let pace = fast;
        let handle = tokio::spawn(async move {
            let mut failing = false;
            loop {
                match api.fetch_session(&id).await {
                    Ok(session) => {
                        failing = false;
                        let session = slot.replace(session, Provenance::Poll);
                        if session.finished() {
                            log::info!("[poll] outcome set, polling stops");
                            break;
                        }
                    }
                    Err(e) => {
                        log::warn!("[poll] fetch failed: {}", e);
                        if e.is_transport() && !failing {
                            notifier.notify("Connection interrupted", Severity::Error);
                        }
                        failing = e.is_transport();
                    }
                }
                let delay = match pace.load(Ordering::Relaxed) {
                    true => config.fast,
                    false => config.idle,
                };
                tokio::time::sleep(delay).await;
            }
        });
        Self {
            handle: Some(handle),
        }
    }
    pub fn stopped(&self) -> bool {
        self.handle.as_ref().map(|h| h.is_finished()).unwrap_or(true)
    }
    /// Unconditional teardown.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for PollDriver {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::super::support::ScriptedApi;
    use super::*;
    use crate::game::tests::fixture;
    use crate::notify::tests::Recorder;
    use std::sync::atomic::Ordering;

    fn quick() -> PollConfig {
        PollConfig {
            idle: Duration::from_millis(10),
            fast: Duration::from_millis(10),
        }
    }

    #[tokio::test]
    async fn replaces_slot_and_stops_on_outcome() {
        let api = Arc::new(ScriptedApi::default());
        api.push_fetch(Ok(fixture(0, None)));
        api.push_fetch(Ok(fixture(0, Some(1))));
        let slot = Arc::new(SessionSlot::default());
        let driver = PollDriver::spawn(
            Arc::clone(&api) as Arc<dyn Api>,
            Arc::clone(&slot),
            Arc::new(Recorder::default()),
            "g-1".into(),
            quick(),
            Arc::new(AtomicBool::new(false)),
        );
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(slot.finished());
        assert!(driver.stopped());
        let fetched = api.fetch_calls.load(Ordering::SeqCst);
        // Terminal: no further fetches after the winning snapshot.
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(api.fetch_calls.load(Ordering::SeqCst), fetched);
    }
    #[tokio::test]
    async fn transport_failure_notifies_once_and_retries() {
        let api = Arc::new(ScriptedApi::default());
        api.push_fetch(Err(crate::api::ApiError::Transport("down".into())));
        api.push_fetch(Err(crate::api::ApiError::Transport("down".into())));
        api.push_fetch(Ok(fixture(0, Some(0))));
        let recorder = Arc::new(Recorder::default());
        let slot = Arc::new(SessionSlot::default());
        let _driver = PollDriver::spawn(
            Arc::clone(&api) as Arc<dyn Api>,
            Arc::clone(&slot),
            Arc::clone(&recorder) as Arc<dyn Notifier>,
            "g-1".into(),
            quick(),
            Arc::new(AtomicBool::new(false)),
        );
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(slot.finished());
        assert_eq!(recorder.messages(), vec!["Connection interrupted"]);
    }
    #[tokio::test]
    async fn teardown_leaves_no_fetches_behind() {
        let api = Arc::new(ScriptedApi::default());
        let slot = Arc::new(SessionSlot::default());
        let mut driver = PollDriver::spawn(
            Arc::clone(&api) as Arc<dyn Api>,
            slot,
            Arc::new(Recorder::default()),
            "g-1".into(),
            quick(),
            Arc::new(AtomicBool::new(false)),
        );
        tokio::time::sleep(Duration::from_millis(25)).await;
        driver.stop();
        let fetched = api.fetch_calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(api.fetch_calls.load(Ordering::SeqCst), fetched);
    }
}
