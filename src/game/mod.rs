//! Wire-shaped data model for the remote game session.
//!
//! These types mirror the server's JSON exactly; the client never
//! derives game legality from them beyond deciding when to ask for it.
mod board;
mod legal;
mod session;

pub use board::*;
pub use legal::*;
pub use session::*;
