//! Model artifact directory listing for rollback reference.

use std::path::Path;

use fastbreak_core::types::{ArtifactFile, ArtifactSnapshot};

/// Keep only the most recently modified files; the directory can accumulate
/// checkpoints.
const MAX_ARTIFACTS: usize = 10;

/// Capture a read-only listing of the current model artifacts.
///
/// A missing or unreadable directory yields `available: false` rather than
/// an error: the snapshot is reference material, and its absence must not
/// block job creation. Individual unreadable entries are skipped.
pub fn capture_snapshot(model_dir: &Path) -> ArtifactSnapshot {
    let entries = match std::fs::read_dir(model_dir) {
        Ok(entries) => entries,
        Err(_) => return ArtifactSnapshot::default(),
    };

    let mut files: Vec<ArtifactFile> = entries
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let metadata = entry.metadata().ok()?;
            if !metadata.is_file() {
                return None;
            }
            let modified_at = metadata
                .modified()
                .ok()?
                .duration_since(std::time::UNIX_EPOCH)
                .ok()?
                .as_secs() as i64;
            Some(ArtifactFile {
                name: entry.file_name().to_string_lossy().into_owned(),
                size_bytes: metadata.len(),
                modified_at,
            })
        })
        .collect();

    files.sort_by(|a, b| b.modified_at.cmp(&a.modified_at).then(a.name.cmp(&b.name)));
    files.truncate(MAX_ARTIFACTS);

    ArtifactSnapshot {
        available: true,
        files,
    }
}
