//! Gzip-compressed tar archives of submission files.
//!
//! Entries are stored flat, under their basename only.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use hd_core::{Error, Result};

use crate::files::{basename, find_all_matching};

/// Files of `outdir` that belong in the archive: every `*.yaml` and `*.png`
/// below it, then the basenames of `copied` as found in `outdir`.
pub fn collect_files(outdir: &Path, copied: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = find_all_matching(outdir, "yaml")?;
    files.extend(find_all_matching(outdir, "png")?);
    for file in copied {
        files.push(outdir.join(basename(file)?));
    }
    Ok(files)
}

/// Write `files` into a gzip tar at `archive`. Returns the entry names.
///
/// A file whose basename is already in the archive is skipped.
pub fn write_archive(archive: &Path, files: &[PathBuf]) -> Result<Vec<String>> {
    if let Some(parent) = archive.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let encoder = GzEncoder::new(File::create(archive)?, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    let mut names = Vec::new();
    let mut seen = BTreeSet::new();
    for file in files {
        let name = basename(file)?;
        if !seen.insert(name.clone()) {
            tracing::debug!("skipping duplicate archive entry {}", file.display());
            continue;
        }
        builder.append_path_with_name(file, &name)?;
        names.push(name);
    }
    builder.into_inner()?.finish()?;
    tracing::info!("wrote {} file(s) to {}", names.len(), archive.display());
    Ok(names)
}

/// Every regular file of the archive at `archive`, by entry name.
pub fn read_archive(archive: &Path) -> Result<BTreeMap<String, Vec<u8>>> {
    let file = File::open(archive)
        .map_err(|e| Error::resource(format!("cannot open archive {}: {e}", archive.display())))?;
    let mut tar = tar::Archive::new(GzDecoder::new(file));

    let mut contents = BTreeMap::new();
    for entry in tar.entries()? {
        let mut entry = entry?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let name = entry.path()?.to_string_lossy().into_owned();
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes)?;
        contents.insert(name, bytes);
    }
    Ok(contents)
}
