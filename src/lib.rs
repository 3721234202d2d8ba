//! Client synchronization layer for the Sequence board game.
//!
//! The server owns all rules, AI, and persistence; this crate keeps a
//! local snapshot of the authoritative game state current across three
//! delivery modes (manual polling, autoplay polling, push messaging),
//! drives the turn-scoped interaction state machine, and runs the
//! cancellable bot-vs-bot stepping loop.
//!
//! ## Architecture
//!
//! - [`game`] — wire-shaped data model (session snapshot, legal moves)
//! - [`api`] — request/response transport against the game server
//! - [`sync`] — session slot, turn machine, polling, autoplay
//! - [`realtime`] — push channel for multiplayer rooms
//! - [`notify`] — injected capability for user-visible notices
pub mod api;
pub mod game;
pub mod notify;
pub mod realtime;
pub mod sync;

/// Player index within a session (0 is the local human in solo play).
pub type PlayerId = i32;
/// Team index; team 0 is blue, team 1 is red.
pub type TeamId = i32;
/// Monotonically increasing turn counter.
pub type TurnIndex = u32;
