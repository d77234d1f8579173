//! Chat session state machine for Jarvis.
//!
//! `SessionState` holds the message log and flags and implements every
//! transition synchronously. `ChatSession` is the async handle front ends
//! use: it guards the state, calls the response provider, schedules
//! delivery transitions and broadcasts `SessionEvent`s.

pub mod delivery;
pub mod session;
pub mod state;

pub use session::{ChatSession, LoadOlderOutcome, SendOutcome};
pub use state::{SessionSnapshot, SessionState};
