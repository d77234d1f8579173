//! Interactive terminal chat for Jarvis.
//!
//! Plain lines are sent to the active session; slash commands drive the
//! sidebar, preferences and upload staging. Session events are printed as
//! they arrive. Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;
