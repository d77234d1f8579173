//! File upload staging.

pub mod stager;

pub use stager::{progress, rejection_notice, UploadStager};
