//! File-system helpers: existence and size checks, directory scans, staleness.

use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use hd_core::{Error, Result};
use walkdir::WalkDir;

/// Largest file that may be attached to a submission, in MB.
pub const MAX_FILE_SIZE_MB: f64 = 100.0;

/// Fail with a resource error unless `path` exists.
pub fn check_file_existence(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(Error::resource(format!("Cannot find file: {}", path.display())));
    }
    Ok(())
}

/// Fail with a resource error if `path` is larger than `upper_limit_mb`.
pub fn check_file_size(path: &Path, upper_limit_mb: f64) -> Result<()> {
    let size_mb = 1e-6 * std::fs::metadata(path)?.len() as f64;
    if size_mb > upper_limit_mb {
        return Err(Error::resource(format!(
            "File too big: {} is {size_mb:.1} MB, limit is {upper_limit_mb} MB",
            path.display()
        )));
    }
    Ok(())
}

/// Every file below `dir` whose extension is `extension`, in sorted path order.
pub fn find_all_matching(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::resource(format!("cannot scan {}: {e}", dir.display())))?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|e| e.to_str()) == Some(extension)
        {
            found.push(entry.into_path());
        }
    }
    Ok(found)
}

/// True if `file` is missing or was last changed before `reference`.
///
/// A file's last change is the newer of its modification and status-change
/// times where the platform records both. The reference itself must exist.
pub fn file_is_outdated(file: &Path, reference: &Path) -> Result<bool> {
    let reference_meta = std::fs::metadata(reference)
        .map_err(|_| Error::resource(format!("reference file does not exist: {}", reference.display())))?;
    let reference_time = last_changed(&reference_meta)?;
    match std::fs::metadata(file) {
        Ok(meta) => Ok(last_changed(&meta)? < reference_time),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(true),
        Err(e) => Err(e.into()),
    }
}

#[cfg(unix)]
fn last_changed(meta: &Metadata) -> Result<SystemTime> {
    use std::os::unix::fs::MetadataExt;
    use std::time::{Duration, UNIX_EPOCH};

    let modified = meta.modified()?;
    // Status changes before the epoch cannot be represented; fall back to mtime.
    let changed = u64::try_from(meta.ctime())
        .ok()
        .zip(u32::try_from(meta.ctime_nsec()).ok())
        .map(|(secs, nanos)| UNIX_EPOCH + Duration::new(secs, nanos));
    Ok(changed.map_or(modified, |changed| changed.max(modified)))
}

#[cfg(not(unix))]
fn last_changed(meta: &Metadata) -> Result<SystemTime> {
    Ok(meta.modified()?)
}

/// Final path component as a string.
pub(crate) fn basename(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| Error::validation(format!("path has no file name: {}", path.display())))
}
