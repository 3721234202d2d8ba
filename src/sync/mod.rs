//! The game-session synchronization core.
//!
//! Keeps the local view of the authoritative remote state current
//! across polling, autoplay, and push delivery, and drives the
//! turn-scoped interaction state machine.
//!
//! ## Components
//!
//! - [`SessionSlot`] — last-write-wins snapshot holder with provenance
//! - [`TurnMachine`] — card selection, legal lookup, move submission
//! - [`SessionClient`] — wires the machine to transport and notices
//! - [`PollDriver`] — interval-driven state refresh
//! - [`Autoplay`] — cancellable bot-vs-bot stepping loop
mod autoplay;
mod client;
mod machine;
mod poll;
mod slot;

pub use autoplay::*;
pub use client::*;
pub use machine::*;
pub use poll::*;
pub use slot::*;

#[cfg(test)]
pub mod support {
    use crate::api::*;
    use crate::game::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    type Script<T> = Mutex<VecDeque<Result<T, ApiError>>>;

    /// Scripted transport for sync-layer tests.
    /// Each operation pops its next scripted response; an empty script
    /// falls back to a fresh two-player fixture.
    #[derive(Default)]
    pub struct ScriptedApi {
        pub fetches: Script<GameSession>,
        pub submits: Script<GameSession>,
        pub exchanges: Script<GameSession>,
        pub advances: Script<GameSession>,
        pub legals: Script<LegalMoves>,
        pub advance_calls: AtomicUsize,
        pub fetch_calls: AtomicUsize,
        pub submit_calls: AtomicUsize,
        pub legal_calls: AtomicUsize,
    }

    impl ScriptedApi {
        pub fn push_fetch(&self, r: Result<GameSession, ApiError>) {
            self.fetches.lock().unwrap().push_back(r);
        }
        pub fn push_submit(&self, r: Result<GameSession, ApiError>) {
            self.submits.lock().unwrap().push_back(r);
        }
        pub fn push_exchange(&self, r: Result<GameSession, ApiError>) {
            self.exchanges.lock().unwrap().push_back(r);
        }
        pub fn push_advance(&self, r: Result<GameSession, ApiError>) {
            self.advances.lock().unwrap().push_back(r);
        }
        pub fn push_legal(&self, r: Result<LegalMoves, ApiError>) {
            self.legals.lock().unwrap().push_back(r);
        }
        fn pop<T>(script: &Script<T>) -> Option<Result<T, ApiError>> {
            script.lock().unwrap().pop_front()
        }
        fn fallback() -> GameSession {
            crate::game::tests::fixture(0, None)
        }
    }

    #[async_trait::async_trait]
    impl Api for ScriptedApi {
        async fn create_session(&self, _: NewSessionRequest) -> Result<GameSession, ApiError> {
            Ok(Self::fallback())
        }
        async fn fetch_session(&self, _: &str) -> Result<GameSession, ApiError> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            Self::pop(&self.fetches).unwrap_or_else(|| Ok(Self::fallback()))
        }
        async fn legal_moves(&self, _: &str, _: usize) -> Result<LegalMoves, ApiError> {
            self.legal_calls.fetch_add(1, Ordering::SeqCst);
            Self::pop(&self.legals).unwrap_or_else(|| Ok(LegalMoves::none()))
        }
        async fn submit_move(
            &self,
            _: &str,
            _: usize,
            _: Coord,
        ) -> Result<GameSession, ApiError> {
            self.submit_calls.fetch_add(1, Ordering::SeqCst);
            Self::pop(&self.submits).unwrap_or_else(|| Ok(Self::fallback()))
        }
        async fn exchange_dead(&self, _: &str, _: usize) -> Result<GameSession, ApiError> {
            Self::pop(&self.exchanges).unwrap_or_else(|| Ok(Self::fallback()))
        }
        async fn advance(&self, _: &str, _: u32) -> Result<GameSession, ApiError> {
            self.advance_calls.fetch_add(1, Ordering::SeqCst);
            Self::pop(&self.advances).unwrap_or_else(|| Ok(Self::fallback()))
        }
        async fn simulate(&self, trials: u32) -> Result<SimulationReport, ApiError> {
            Ok(SimulationReport {
                games: trials,
                win_rates: Default::default(),
                avg_turns: 0.0,
            })
        }
        async fn create_room(&self) -> Result<String, ApiError> {
            Ok("ABCD".to_string())
        }
    }
}
