//! Atomic JSON file writer with automatic cleanup on failure.
//!
//! Writes to a temporary file in the same directory as the destination,
//! then atomically replaces the destination on `finish()`. If dropped
//! before finishing, the temporary file is automatically cleaned up.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::AppError;

/// An atomic JSON writer.
///
/// The document is serialized into a temporary file next to `final_path`
/// and only moved into place by `finish()`.
pub struct AtomicJsonWriter {
    writer: BufWriter<NamedTempFile>,
    final_path: PathBuf,
}

impl AtomicJsonWriter {
    /// Creates a writer targeting `final_path`.
    ///
    /// The temporary file is created in the same directory as `final_path`
    /// so the final rename stays on one filesystem.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Output` if the parent directory cannot be
    /// determined or the temporary file cannot be created.
    pub fn new(final_path: impl AsRef<Path>) -> Result<Self, AppError> {
        let final_path = final_path.as_ref().to_path_buf();

        let parent_dir = match final_path.parent() {
            Some(dir) if dir.as_os_str().is_empty() => Path::new("."),
            Some(dir) => dir,
            None => {
                return Err(AppError::Output(format!(
                    "Cannot determine parent directory for: {}",
                    final_path.display()
                )))
            }
        };

        let temp_file = NamedTempFile::new_in(parent_dir)
            .map_err(|e| AppError::Output(format!("Failed to create temporary file: {}", e)))?;

        Ok(Self {
            writer: BufWriter::new(temp_file),
            final_path,
        })
    }

    /// Serializes `value` as pretty-printed JSON (two-space indent).
    pub fn write<T>(&mut self, value: &T) -> Result<(), AppError>
    where
        T: Serialize + ?Sized,
    {
        serde_json::to_writer_pretty(&mut self.writer, value)
            .map_err(|e| AppError::Output(format!("Failed to serialize JSON: {}", e)))
    }

    /// Flushes all buffers and atomically persists the file to the final path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Output` if flushing or persisting fails. On error,
    /// the temporary file is cleaned up automatically.
    pub fn finish(mut self) -> Result<PathBuf, AppError> {
        self.writer
            .write_all(b"\n")
            .map_err(|e| AppError::Output(format!("Failed to write: {}", e)))?;

        let named_temp = self
            .writer
            .into_inner()
            .map_err(|e| AppError::Output(format!("Failed to flush buffer: {}", e.error())))?;

        named_temp.persist(&self.final_path).map_err(|e| {
            AppError::Output(format!(
                "Failed to persist file to {}: {}",
                self.final_path.display(),
                e.error
            ))
        })?;

        Ok(self.final_path)
    }
}

/// Writes `value` to `path` as pretty JSON, atomically.
pub fn write_json<T>(path: impl AsRef<Path>, value: &T) -> Result<PathBuf, AppError>
where
    T: Serialize + ?Sized,
{
    let mut writer = AtomicJsonWriter::new(path)?;
    writer.write(value)?;
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_successful_write() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let final_path = temp_dir.path().join("members.json");

        let result_path =
            write_json(&final_path, &vec!["alice", "bob"]).expect("Failed to write");

        assert_eq!(result_path, final_path);
        let content = fs::read_to_string(&final_path).expect("Failed to read file");
        assert_eq!(content, "[\n  \"alice\",\n  \"bob\"\n]\n");
    }

    #[test]
    fn test_drop_cleanup() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let final_path = temp_dir.path().join("payments.json");

        {
            let mut writer = AtomicJsonWriter::new(&final_path).expect("Failed to create writer");
            writer.write(&json!({ "rows": [1, 2, 3] })).expect("Failed to write");
            // Dropped without finish()
        }

        let entries_after: Vec<_> = fs::read_dir(temp_dir.path())
            .expect("Failed to read dir")
            .collect();
        assert!(
            entries_after.is_empty(),
            "Directory should be empty after drop (temp file cleaned up)"
        );
        assert!(!final_path.exists());
    }

    #[test]
    fn test_overwrite_behavior() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let final_path = temp_dir.path().join("husd_stats.json");

        fs::write(&final_path, "OLD_CONTENT").expect("Failed to write dummy file");

        write_json(&final_path, &json!({ "supply": "10.00 HUSD" })).expect("Failed to write");

        let content = fs::read_to_string(&final_path).expect("Failed to read file");
        assert!(!content.contains("OLD_CONTENT"));
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["supply"], "10.00 HUSD");
    }

    #[test]
    fn test_missing_directory_fails() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let final_path = temp_dir.path().join("absent").join("out.json");

        let result = write_json(&final_path, &json!([]));

        assert!(matches!(result, Err(AppError::Output(_))));
    }

    #[test]
    fn test_invalid_parent_directory() {
        #[cfg(unix)]
        {
            let result = AtomicJsonWriter::new("/");
            assert!(result.is_err(), "Should fail for path with no parent");
        }
    }
}
