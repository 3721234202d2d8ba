//! Push channel for multiplayer rooms.
//!
//! State arrives here instead of by polling; updates merge into the
//! same session slot, and the channel never re-derives game legality.
mod channel;
mod message;

pub use channel::*;
pub use message::*;
