use super::*;
use crate::api::Api;
use crate::notify::Notifier;
use crate::notify::Severity;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU8;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Autoplay speed tiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Speed {
    Slow,
    Normal,
    Fast,
}

impl Speed {
    pub fn delay(self) -> Duration {
        match self {
            Self::Slow => Duration::from_millis(1500),
            Self::Normal => Duration::from_millis(800),
            Self::Fast => Duration::from_millis(200),
        }
    }
    fn encode(self) -> u8 {
        match self {
            Self::Slow => 0,
            Self::Normal => 1,
            Self::Fast => 2,
        }
    }
    fn decode(v: u8) -> Self {
        match v {
            0 => Self::Slow,
            2 => Self::Fast,
            _ => Self::Normal,
        }
    }
}

/// Loop controller state as seen by the owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running(Speed),
}

/// Cancellable periodic driver for unattended bot-vs-bot play.
///
/// Each tick waits out the tier delay and then issues exactly one
/// advance command; the next delay starts only after the previous
/// command resolves, so slow responses throttle the loop instead of
/// queuing a backlog. The loop self-terminates when the outcome is
/// set or an advance fails, and never restarts on its own.
pub struct Autoplay {
    api: Arc<dyn Api>,
    slot: Arc<SessionSlot>,
    notifier: Arc<dyn Notifier>,
    id: String,
    speed: Arc<AtomicU8>,
    running: Arc<AtomicBool>,
    busy: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Autoplay {
    pub fn new(
        api: Arc<dyn Api>,
        slot: Arc<SessionSlot>,
        notifier: Arc<dyn Notifier>,
        id: String,
    ) -> Self {
        Self {
            api,
            slot,
            notifier,
            id,
            speed: Arc::new(AtomicU8::new(Speed::Normal.encode())),
            running: Arc::new(AtomicBool::new(false)),
            busy: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }
    pub fn state(&self) -> LoopState {
        match self.running.load(Ordering::SeqCst) {
            true => LoopState::Running(Speed::decode(self.speed.load(Ordering::SeqCst))),
            false => LoopState::Stopped,
        }
    }
    /// Flag shared with the poll driver so polling speeds up while
    /// the loop runs.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }
    pub fn set_speed(&self, speed: Speed) {
        self.speed.store(speed.encode(), Ordering::SeqCst);
    }

    /// Starts the loop; a no-op while already running or once the
    /// session has an outcome.
    pub fn play(&mut self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        if self.slot.finished() {
            self.running.store(false, Ordering::SeqCst);
            return;
        }
        let api = Arc::clone(&self.api);
        let slot = Arc::clone(&self.slot);
        let notifier = Arc::clone(&self.notifier);
        let id = self.id.clone();
        let speed = Arc::clone(&self.speed);
        let running = Arc::clone(&self.running);
        let busy = Arc::clone(&self.busy);
        log::info!("[autoplay] loop started");
        self.handle = Some(tokio::spawn(async move {
            while running.load(Ordering::SeqCst) {
                tokio::time::sleep(Speed::decode(speed.load(Ordering::SeqCst)).delay()).await;
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                match Self::tick(&api, &slot, &busy, &id).await {
                    Ok(true) => continue,
                    Ok(false) => {
                        log::info!("[autoplay] outcome reached, stopping");
                        break;
                    }
                    Err(e) => {
                        log::warn!("[autoplay] advance failed: {}", e);
                        notifier.notify("Simulation Error", Severity::Error);
                        break;
                    }
                }
            }
            running.store(false, Ordering::SeqCst);
        }));
    }

    /// Stops the loop without waiting for the current tick.
    pub fn pause(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.busy.store(false, Ordering::SeqCst);
        log::info!("[autoplay] loop stopped");
    }

    /// Manual single step, independent of loop state. Refused while a
    /// previous advance command is still outstanding.
    pub async fn step(&self) {
        match Self::tick(&self.api, &self.slot, &self.busy, &self.id).await {
            Ok(_) => (),
            Err(e) => {
                log::warn!("[autoplay] step failed: {}", e);
                self.notifier.notify("Simulation Error", Severity::Error);
            }
        }
    }

    /// One advance command. Returns Ok(false) when the session is (or
    /// just became) terminal, Ok(true) to keep going.
    async fn tick(
        api: &Arc<dyn Api>,
        slot: &Arc<SessionSlot>,
        busy: &Arc<AtomicBool>,
        id: &str,
    ) -> Result<bool, crate::api::ApiError> {
        if slot.finished() {
            return Ok(false);
        }
        if busy.swap(true, Ordering::SeqCst) {
            log::debug!("[autoplay] advance already outstanding, skipping");
            return Ok(true);
        }
        let outcome = api.advance(id, 1).await;
        busy.store(false, Ordering::SeqCst);
        let session = slot.replace(outcome?, Provenance::Autoplay);
        Ok(!session.finished())
    }
}

impl Drop for Autoplay {
    fn drop(&mut self) {
        // Teardown is unconditional: a detached loop must never keep
        // mutating state nobody observes.
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.running.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::super::support::ScriptedApi;
    use super::*;
    use crate::game::tests::fixture;
    use crate::notify::tests::Recorder;

    fn harness(api: Arc<ScriptedApi>, recorder: Arc<Recorder>) -> Autoplay {
        let slot = Arc::new(SessionSlot::default());
        slot.replace(fixture(0, None), Provenance::Poll);
        let mut autoplay = Autoplay::new(
            api as Arc<dyn Api>,
            slot,
            recorder as Arc<dyn Notifier>,
            "g-1".into(),
        );
        autoplay.set_speed(Speed::Fast);
        autoplay
    }

    #[tokio::test]
    async fn stops_within_one_tick_of_outcome() {
        let api = Arc::new(ScriptedApi::default());
        api.push_advance(Ok(fixture(0, None)));
        api.push_advance(Ok(fixture(0, Some(0))));
        let mut autoplay = harness(Arc::clone(&api), Arc::new(Recorder::default()));
        autoplay.play();
        assert_eq!(autoplay.state(), LoopState::Running(Speed::Fast));
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(autoplay.state(), LoopState::Stopped);
        let advanced = api.advance_calls.load(std::sync::atomic::Ordering::SeqCst);
        assert_eq!(advanced, 2);
        // No further ticks after self-termination.
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(api.advance_calls.load(std::sync::atomic::Ordering::SeqCst), advanced);
    }
    #[tokio::test]
    async fn failure_stops_loop_and_notifies() {
        let api = Arc::new(ScriptedApi::default());
        api.push_advance(Err(crate::api::ApiError::Status(500)));
        let recorder = Arc::new(Recorder::default());
        let mut autoplay = harness(Arc::clone(&api), Arc::clone(&recorder));
        autoplay.play();
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(autoplay.state(), LoopState::Stopped);
        assert_eq!(recorder.messages(), vec!["Simulation Error"]);
        assert_eq!(api.advance_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
    #[tokio::test]
    async fn teardown_cancels_pending_timer() {
        let api = Arc::new(ScriptedApi::default());
        let mut autoplay = harness(Arc::clone(&api), Arc::new(Recorder::default()));
        autoplay.play();
        drop(autoplay);
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(api.advance_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }
    #[tokio::test]
    async fn manual_step_ignores_loop_state() {
        let api = Arc::new(ScriptedApi::default());
        api.push_advance(Ok(fixture(1, None)));
        let autoplay = harness(Arc::clone(&api), Arc::new(Recorder::default()));
        assert_eq!(autoplay.state(), LoopState::Stopped);
        autoplay.step().await;
        assert_eq!(api.advance_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
    #[tokio::test]
    async fn play_refused_after_outcome() {
        let api = Arc::new(ScriptedApi::default());
        let mut autoplay = harness(Arc::clone(&api), Arc::new(Recorder::default()));
        autoplay.slot.replace(fixture(0, Some(1)), Provenance::Poll);
        autoplay.play();
        assert_eq!(autoplay.state(), LoopState::Stopped);
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(api.advance_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }
}
