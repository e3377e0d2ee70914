//! Failure screenshot artifacts
//!
//! Best-effort persistence: callers log an `Artifact` error and keep the
//! failure that triggered the capture.

use std::path::{Path, PathBuf};

use chrono::Local;
use playwright::api::Page;

use crate::error::HarnessError;

/// Write a screenshot named after the failing scenario context into `dir`,
/// creating the directory on demand. Returns the file path on success.
pub async fn capture_screenshot(
    page: &Page,
    dir: &Path,
    context: &str,
) -> Result<PathBuf, HarnessError> {
    std::fs::create_dir_all(dir).map_err(|e| {
        HarnessError::Artifact(format!("could not create {}: {}", dir.display(), e))
    })?;

    let file = dir.join(artifact_file_name(context));

    page.screenshot_builder()
        .path(file.clone())
        .screenshot()
        .await
        .map_err(|e| {
            HarnessError::Artifact(format!("could not save screenshot {}: {}", file.display(), e))
        })?;

    Ok(file)
}

fn artifact_file_name(context: &str) -> String {
    format!("{}_{}.png", context, Local::now().format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_carry_context_and_timestamp() {
        let name = artifact_file_name("footer-policy-links");
        assert!(name.starts_with("footer-policy-links_"));
        assert!(name.ends_with(".png"));
        // context + '_' + yyyyMMdd_HHmmss + ".png"
        assert_eq!(name.len(), "footer-policy-links_".len() + 15 + 4);
    }
}
