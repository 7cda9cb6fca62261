//! JSON snapshot persistence.
//!
//! Writes always use the versioned document. Reads accept versioned and
//! legacy documents and return `None` instead of an error: no history is the
//! normal cold-start condition, and a corrupt old file must not fail a run.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use benchkit_core::error::{BenchError, Result};
use benchkit_core::Snapshot;

pub fn write(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let json = snapshot.to_json_pretty()?;
    fs::write(path, json).map_err(|e| BenchError::io(path, e))?;
    tracing::debug!(path = %path.display(), metrics = snapshot.metrics.len(), "snapshot written");
    Ok(())
}

pub fn read(path: &Path) -> Option<Snapshot> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no snapshot at path");
            return None;
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "snapshot unreadable");
            return None;
        }
    };
    if raw.trim().is_empty() {
        tracing::warn!(path = %path.display(), "snapshot file is empty");
        return None;
    }
    match Snapshot::from_json_str(&raw) {
        Ok(s) => Some(s),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "snapshot malformed");
            None
        }
    }
}

/// Most recently modified `*.json` file in `dir` other than `exclude`.
pub fn latest_json_in(dir: &Path, exclude: &Path) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;
    entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json") && p != exclude)
        .filter_map(|p| {
            let modified = fs::metadata(&p).and_then(|m| m.modified()).ok()?;
            Some((modified, p))
        })
        // ties (coarse mtime granularity) fall back to the larger file name
        .max_by(|(ma, pa), (mb, pb)| ma.cmp(mb).then_with(|| pa.cmp(pb)))
        .map(|(_, p)| p)
}

/// The previous snapshot next to `current`, if one can be read.
pub fn find_previous(dir: &Path, current: &Path) -> Option<Snapshot> {
    let path = latest_json_in(dir, current)?;
    tracing::debug!(previous = %path.display(), "comparing against previous snapshot");
    read(&path)
}
