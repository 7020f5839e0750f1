//! Raw protocol output files
//!
//! Every query and transfer invocation can leave its full tool output on disk
//! as `{tool}_{label}_{YYYYmmdd_HHMMSS}.log`. These files are a debugging aid:
//! failing to write one is logged and never affects the run.

use crate::core::audit::sanitize::sanitize_text;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Timestamp format used in raw log file names
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Writes raw tool output into a directory
#[derive(Debug, Clone)]
pub struct RawLogWriter {
    dir: PathBuf,
}

impl RawLogWriter {
    /// Create a writer for `dir`
    ///
    /// The directory is created on the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path for one invocation
    pub fn file_path(&self, tool: &str, label: &str, started_at: DateTime<Utc>) -> PathBuf {
        let name = format!(
            "{}_{}_{}.log",
            file_safe(tool),
            file_safe(label),
            started_at.format(FILE_TIMESTAMP_FORMAT)
        );
        self.dir.join(name)
    }

    /// Write `text` with control characters stripped
    ///
    /// Returns the written path, or `None` if the write failed.
    pub async fn write(
        &self,
        tool: &str,
        label: &str,
        started_at: DateTime<Utc>,
        text: &str,
    ) -> Option<PathBuf> {
        let path = self.file_path(tool, label, started_at);

        if let Err(e) = tokio::fs::create_dir_all(&self.dir).await {
            tracing::warn!(
                dir = %self.dir.display(),
                error = %e,
                "Failed to create raw log directory"
            );
            return None;
        }

        match tokio::fs::write(&path, sanitize_text(text)).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Raw tool output written");
                Some(path)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to write raw tool output");
                None
            }
        }
    }
}

fn file_safe(component: &str) -> String {
    component
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn started_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 1, 4, 7, 30, 5).unwrap()
    }

    #[test]
    fn test_file_path() {
        let writer = RawLogWriter::new("/var/log/nmdose");
        let path = writer.file_path("movescu", "1.2.840.1", started_at());
        assert_eq!(
            path,
            PathBuf::from("/var/log/nmdose/movescu_1.2.840.1_20220104_073005.log")
        );
    }

    #[test]
    fn test_file_path_replaces_separators() {
        let writer = RawLogWriter::new("raw");
        let path = writer.file_path("findscu", "PT/CT", started_at());
        assert_eq!(path, PathBuf::from("raw/findscu_PT_CT_20220104_073005.log"));
    }

    #[tokio::test]
    async fn test_write_strips_control_characters() {
        let dir = tempdir().unwrap();
        let writer = RawLogWriter::new(dir.path().join("raw"));

        let path = writer
            .write("findscu", "PT", started_at(), "I: Find Response: 1\0\n")
            .await
            .unwrap();

        let contents = std::fs::read_to_string(path).unwrap();
        assert_eq!(contents, "I: Find Response: 1\n");
    }

    #[tokio::test]
    async fn test_write_failure_is_not_an_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file").unwrap();

        let writer = RawLogWriter::new(&blocker);
        assert!(writer.write("findscu", "PT", started_at(), "x").await.is_none());
    }
}
