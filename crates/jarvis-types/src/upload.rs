//! File upload staging types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// A file the user offered for upload, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCandidate {
    pub name: String,
    pub size_bytes: u64,
}

impl FileCandidate {
    pub fn new(name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            size_bytes,
        }
    }
}

/// A validated file waiting to be sent with the next message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedFile {
    pub id: Uuid,
    pub name: String,
    pub size_bytes: u64,
    pub staged_at: DateTime<Utc>,
}

impl StagedFile {
    /// Size in megabytes, for display.
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / BYTES_PER_MB
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_mb() {
        let file = StagedFile {
            id: Uuid::now_v7(),
            name: "notes.txt".to_string(),
            size_bytes: 3 * 1024 * 1024 / 2,
            staged_at: Utc::now(),
        };
        assert!((file.size_mb() - 1.5).abs() < f64::EPSILON);
    }
}
