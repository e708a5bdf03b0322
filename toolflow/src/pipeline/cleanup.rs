//! Pre-run removal of stale pipeline files.

use crate::config::ArtifactPaths;
use crate::core::Diagnostic;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, warn};

/// What the cleanup step did.
#[derive(Debug, Default)]
pub struct CleanupReport {
    /// Files that existed and were removed.
    pub removed: Vec<PathBuf>,
    /// Files that could not be removed.
    pub failures: Vec<(PathBuf, std::io::Error)>,
}

impl CleanupReport {
    /// Returns true if every stale file is gone.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// One [`Diagnostic`] per removal failure.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.failures
            .iter()
            .map(|(path, err)| Diagnostic::cleanup_failed(path, err))
            .collect()
    }
}

/// Deletes every file a previous run may have produced.
///
/// Reference files are never touched. An absent file is not a failure, and a
/// failed removal does not stop the run.
pub async fn remove_pipeline_outputs(paths: &ArtifactPaths) -> CleanupReport {
    let mut report = CleanupReport::default();

    for path in paths.pipeline_outputs() {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                debug!(path = %path.display(), "Removed stale pipeline file");
                report.removed.push(path.to_path_buf());
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Could not remove stale pipeline file");
                report.failures.push((path.to_path_buf(), err));
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::core::DiagnosticKind;

    #[tokio::test]
    async fn test_removes_outputs_and_keeps_references() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PipelineConfig::new(dir.path()).artifact_paths();
        for path in paths.pipeline_outputs().iter().chain(paths.references().iter()) {
            std::fs::write(path, "stale").unwrap();
        }

        let report = remove_pipeline_outputs(&paths).await;

        assert!(report.is_clean());
        assert_eq!(report.removed.len(), 5);
        for path in paths.pipeline_outputs() {
            assert!(!path.exists(), "{} should be gone", path.display());
        }
        for path in paths.references() {
            assert!(path.exists(), "{} should be kept", path.display());
        }
    }

    #[tokio::test]
    async fn test_absent_files_are_fine() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PipelineConfig::new(dir.path()).artifact_paths();

        let report = remove_pipeline_outputs(&paths).await;

        assert!(report.is_clean());
        assert!(report.removed.is_empty());
        assert!(report.diagnostics().is_empty());
    }

    #[tokio::test]
    async fn test_unremovable_entry_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PipelineConfig::new(dir.path()).artifact_paths();
        // A non-empty directory where a file is expected cannot be removed with remove_file.
        std::fs::create_dir(&paths.ast_output).unwrap();
        std::fs::write(paths.ast_output.join("keep"), "x").unwrap();
        std::fs::write(&paths.lexer_output, "stale").unwrap();

        let report = remove_pipeline_outputs(&paths).await;

        assert!(!report.is_clean());
        assert_eq!(report.removed, vec![paths.lexer_output.clone()]);
        let diagnostics = report.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::CleanupFailed);
        assert_eq!(diagnostics[0].paths, vec![paths.ast_output.clone()]);
    }
}
