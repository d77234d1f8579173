//! Validates files offered for upload and holds them until sent.
//!
//! Nothing is transferred anywhere; `progress` only paces a progress
//! indicator for the front end.

use std::time::Duration;

use chrono::Utc;
use futures_util::Stream;
use tracing::{debug, info};
use uuid::Uuid;

use jarvis_types::config::UploadConfig;
use jarvis_types::error::UploadError;
use jarvis_types::notification::Notification;
use jarvis_types::upload::{FileCandidate, StagedFile};

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Staged files for the next message.
#[derive(Debug, Clone)]
pub struct UploadStager {
    config: UploadConfig,
    staged: Vec<StagedFile>,
}

impl UploadStager {
    pub fn new(config: UploadConfig) -> Self {
        Self {
            config,
            staged: Vec::new(),
        }
    }

    /// Check a candidate against the size limit and accepted types.
    pub fn validate(&self, candidate: &FileCandidate) -> Result<(), UploadError> {
        if candidate.size_bytes > self.config.max_size_mb.saturating_mul(BYTES_PER_MB) {
            return Err(UploadError::TooLarge {
                name: candidate.name.clone(),
                limit_mb: self.config.max_size_mb,
            });
        }
        if !self.is_accepted(&candidate.name) {
            return Err(UploadError::UnsupportedType {
                name: candidate.name.clone(),
                accepted: self.config.accept.join(", "),
            });
        }
        Ok(())
    }

    /// Validate and stage a file.
    pub fn stage(&mut self, candidate: FileCandidate) -> Result<StagedFile, UploadError> {
        if let Err(e) = self.validate(&candidate) {
            debug!(name = %candidate.name, error = %e, "file rejected");
            return Err(e);
        }
        let file = StagedFile {
            id: Uuid::now_v7(),
            name: candidate.name,
            size_bytes: candidate.size_bytes,
            staged_at: Utc::now(),
        };
        info!(name = %file.name, size_bytes = file.size_bytes, "file staged");
        self.staged.push(file.clone());
        Ok(file)
    }

    pub fn files(&self) -> &[StagedFile] {
        &self.staged
    }

    pub fn remove(&mut self, id: Uuid) -> Result<StagedFile, UploadError> {
        let index = self
            .staged
            .iter()
            .position(|f| f.id == id)
            .ok_or(UploadError::NotFound)?;
        Ok(self.staged.remove(index))
    }

    /// Drop every staged file, returning how many there were.
    pub fn clear(&mut self) -> usize {
        let count = self.staged.len();
        self.staged.clear();
        count
    }

    /// Progress ticks for a staged upload, paced by config.
    pub fn progress(&self) -> impl Stream<Item = u8> + Send + 'static {
        progress(
            self.config.progress_step,
            Duration::from_millis(self.config.progress_tick_ms),
        )
    }

    fn is_accepted(&self, name: &str) -> bool {
        if self.config.accept.is_empty() {
            return true;
        }
        let name = name.to_lowercase();
        self.config.accept.iter().any(|ext| {
            let ext = ext.trim().to_lowercase();
            let ext = ext.strip_prefix('.').unwrap_or(&ext);
            name.rsplit_once('.').is_some_and(|(stem, actual)| !stem.is_empty() && actual == ext)
        })
    }
}

/// Percentages in `step` increments, one every `tick`, ending at 100.
pub fn progress(step: u8, tick: Duration) -> impl Stream<Item = u8> + Send + 'static {
    let step = step.clamp(1, 100);
    async_stream::stream! {
        let mut percent: u8 = 0;
        while percent < 100 {
            tokio::time::sleep(tick).await;
            percent = percent.saturating_add(step).min(100);
            yield percent;
        }
    }
}

/// The toast shown when a file is refused.
pub fn rejection_notice(err: &UploadError) -> Notification {
    match err {
        UploadError::TooLarge { .. } => Notification::error("File too large", err.to_string()),
        UploadError::UnsupportedType { .. } => {
            Notification::error("Unsupported file type", err.to_string())
        }
        UploadError::NotFound => Notification::error("File not found", err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    fn stager() -> UploadStager {
        UploadStager::new(UploadConfig::default())
    }

    #[test]
    fn test_stage_accepted_file() {
        let mut s = stager();
        let file = s.stage(FileCandidate::new("report.PDF", 2048)).unwrap();
        assert_eq!(file.name, "report.PDF");
        assert_eq!(s.files().len(), 1);
    }

    #[test]
    fn test_too_large_rejected_with_notice() {
        let mut s = stager();
        let err = s
            .stage(FileCandidate::new("big.pdf", 11 * BYTES_PER_MB))
            .unwrap_err();
        let note = rejection_notice(&err);
        assert_eq!(note.title, "File too large");
        assert_eq!(note.description, "big.pdf exceeds the 10MB limit");
        assert!(note.is_error());
        assert!(s.files().is_empty());
    }

    #[test]
    fn test_exact_limit_accepted() {
        let s = stager();
        assert!(s.validate(&FileCandidate::new("a.txt", 10 * BYTES_PER_MB)).is_ok());
    }

    #[test]
    fn test_unsupported_type() {
        let s = stager();
        for name in ["image.png", "README", ".pdf", "archive.pdf.zip"] {
            assert!(matches!(
                s.validate(&FileCandidate::new(name, 10)),
                Err(UploadError::UnsupportedType { .. })
            ));
        }
        assert!(s.validate(&FileCandidate::new("notes.Docx", 10)).is_ok());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut s = stager();
        let a = s.stage(FileCandidate::new("a.txt", 1)).unwrap();
        s.stage(FileCandidate::new("b.txt", 1)).unwrap();

        assert_eq!(s.remove(a.id).unwrap().name, "a.txt");
        assert_eq!(s.remove(a.id).unwrap_err(), UploadError::NotFound);
        assert_eq!(s.clear(), 1);
        assert!(s.files().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_ticks_to_100() {
        let ticks: Vec<u8> = stager().progress().collect().await;
        assert_eq!(ticks, vec![10, 20, 30, 40, 50, 60, 70, 80, 90, 100]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_uneven_step_ends_at_100() {
        let start = tokio::time::Instant::now();
        let ticks: Vec<u8> = progress(30, Duration::from_millis(100)).collect().await;
        assert_eq!(ticks, vec![30, 60, 90, 100]);
        assert!(start.elapsed() >= Duration::from_millis(400));
    }
}
