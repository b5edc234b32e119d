//! Output options for [`Submission::create_files`](crate::Submission::create_files).
//!
//! Options can be built in code or read from YAML:
//!
//! ```yaml
//! validate: true
//! remove_old: false
//! archive_path: submission.tar.gz
//! images:
//!   enabled: true
//!   density: 300
//!   thumbnail_size: 240x179
//! ```

use std::path::{Path, PathBuf};

use hd_core::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// How `create_files` writes, bundles and checks a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WriteOptions {
    /// Run the validator on the finished archive.
    pub validate: bool,
    /// Delete the output directory before writing.
    pub remove_old: bool,
    /// Where the gzip tar archive is written.
    pub archive_path: PathBuf,
    pub images: ImageOptions,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            validate: true,
            remove_old: false,
            archive_path: PathBuf::from("submission.tar.gz"),
            images: ImageOptions::default(),
        }
    }
}

/// Image conversion settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageOptions {
    /// Convert table images to PNG and thumbnails.
    pub enabled: bool,
    /// Rasterisation density in DPI.
    pub density: u32,
    /// Thumbnail geometry, `WIDTHxHEIGHT`.
    pub thumbnail_size: String,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self { enabled: true, density: 300, thumbnail_size: "240x179".into() }
    }
}

impl WriteOptions {
    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn remove_old(mut self, remove_old: bool) -> Self {
        self.remove_old = remove_old;
        self
    }

    pub fn archive_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.archive_path = path.into();
        self
    }

    pub fn images(mut self, enabled: bool) -> Self {
        self.images.enabled = enabled;
        self
    }

    /// Check value ranges.
    pub fn check(&self) -> Result<()> {
        if self.archive_path.as_os_str().is_empty() {
            return Err(Error::validation("archive_path must not be empty"));
        }
        if self.images.density == 0 {
            return Err(Error::validation("image density must be positive"));
        }
        let geometry = Regex::new(r"^\d+x\d+$").map_err(|e| Error::validation(e.to_string()))?;
        if !geometry.is_match(&self.images.thumbnail_size) {
            return Err(Error::validation(format!(
                "thumbnail_size must look like 240x179, got '{}'",
                self.images.thumbnail_size
            )));
        }
        Ok(())
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let options: Self = serde_yaml_ng::from_str(text)?;
        options.check()?;
        Ok(options)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!("loading write options: {}", path.display());
        Self::from_yaml_str(&std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = WriteOptions::default();
        assert!(options.validate && !options.remove_old && options.images.enabled);
        assert_eq!(options.archive_path, PathBuf::from("submission.tar.gz"));
        assert_eq!(options.images.thumbnail_size, "240x179");
        options.check().unwrap();
    }

    #[test]
    fn partial_yaml() {
        let options = WriteOptions::from_yaml_str("remove_old: true\nimages:\n  density: 150\n").unwrap();
        assert!(options.remove_old && options.validate);
        assert_eq!(options.images.density, 150);
        assert_eq!(options.images.thumbnail_size, "240x179");
    }

    #[test]
    fn rejects_bad_yaml() {
        assert!(matches!(WriteOptions::from_yaml_str("validat: false\n"), Err(Error::Yaml(_))));
        assert!(matches!(
            WriteOptions::from_yaml_str("images:\n  thumbnail_size: big\n"),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            WriteOptions::from_yaml_str("images:\n  density: 0\n"),
            Err(Error::Validation(_))
        ));
    }
}
