use crate::domain::recommendation::AnalysisResult;
use anyhow::Context;
use std::path::Path;

pub const DEFAULT_OUTPUT_PATH: &str = "analysis_results.json";

/// Writes the run's results as a pretty-printed JSON array, replacing any existing file.
pub fn write_results(path: &Path, results: &[AnalysisResult]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory {}", parent.display()))?;
    }

    let body = serde_json::to_vec_pretty(results).context("failed to serialize results")?;

    // Sibling temp file, then rename over the target.
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, body).with_context(|| format!("failed to write {}", tmp.display()))?;
    if let Err(err) = std::fs::rename(&tmp, path) {
        if let Err(cleanup) = std::fs::remove_file(&tmp) {
            tracing::warn!(path = %tmp.display(), error = %cleanup, "failed to remove temp file");
        }
        return Err(err)
            .with_context(|| format!("failed to move results into {}", path.display()));
    }

    tracing::info!(path = %path.display(), count = results.len(), "results written");
    Ok(())
}
