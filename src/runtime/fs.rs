//! File system reads for command inputs.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn read_to_string_impl(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{RealRuntime, Runtime};
    use tempfile::tempdir;

    #[test]
    fn test_real_runtime_read_to_string() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("body.html");
        std::fs::write(&file_path, "<h1>Hello</h1>\n").unwrap();

        let content = runtime.read_to_string(&file_path).unwrap();
        assert_eq!(content, "<h1>Hello</h1>\n");
    }

    #[test]
    fn test_real_runtime_read_missing_file() {
        let runtime = RealRuntime;
        let path = std::path::Path::new("/nonexistent/path/file.txt");

        let err = runtime.read_to_string(path).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/path/file.txt"));
    }
}
