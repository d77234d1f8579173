//! Session logic for Jarvis.
//!
//! This crate owns the chat session state machine, the response provider
//! port and everything the front end drives around it: preferences, the
//! chat sidebar, upload staging and display formatting. It depends only on
//! `jarvis-types` plus the tokio runtime, never on a terminal or IO crate.

pub mod chat;
pub mod event;
pub mod format;
pub mod history;
pub mod preferences;
pub mod provider;
pub mod search;
pub mod upload;
