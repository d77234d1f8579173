//! Chat history sidebar: the set of conversations and which one is active.

pub mod directory;
pub mod title;

pub use directory::ChatDirectory;
pub use title::title_from_message;
