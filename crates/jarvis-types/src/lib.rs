//! Shared domain types for Jarvis.
//!
//! This crate contains the types shared by the session core and the
//! terminal front end: messages, quick replies, session events,
//! notifications, preferences, sidebar entries, upload staging, and
//! their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod error;
pub mod event;
pub mod history;
pub mod message;
pub mod model;
pub mod notification;
pub mod theme;
pub mod upload;
