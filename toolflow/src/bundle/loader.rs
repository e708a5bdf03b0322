//! Reading result files into slot content.

use crate::errors::SlotReadError;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Reads `path` as strict UTF-8 text.
///
/// Every failure is returned as a typed [`SlotReadError`]; the caller decides
/// which bundle the result lands in and what diagnostic to record.
pub async fn load_slot(path: &Path) -> Result<String, SlotReadError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            SlotReadError::Missing {
                path: path.to_path_buf(),
            }
        } else {
            SlotReadError::Unreadable {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let text = String::from_utf8(bytes).map_err(|_| SlotReadError::InvalidUtf8 {
        path: path.to_path_buf(),
    })?;
    debug!(path = %path.display(), bytes = text.len(), "Loaded result file");
    Ok(text)
}
