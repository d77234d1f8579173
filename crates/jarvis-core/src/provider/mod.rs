//! Response provider abstraction for Jarvis.
//!
//! Defines the `ResponseProvider` trait (RPITIT) that generates bot replies
//! and older history, the `BoxResponseProvider` dynamic dispatch wrapper,
//! and the local `StubProvider` used when no real backend is wired in.

pub mod box_provider;
pub mod provider;
pub mod stub;
