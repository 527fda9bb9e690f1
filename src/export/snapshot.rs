use std::path::Path;

use super::ExportRecord;

/// Write the export records as a pretty-printed JSON array.
///
/// Source URLs are never serialized; the file is an audit trail of what was
/// named and which size was chosen.
pub async fn write_snapshot(path: &Path, records: &[ExportRecord]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_vec_pretty(records)?;
    tokio::fs::write(path, json).await?;
    tracing::debug!(records = records.len(), "Snapshot written to {}", path.display());
    Ok(())
}
