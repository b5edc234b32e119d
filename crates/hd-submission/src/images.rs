//! Image conversion for table figures.
//!
//! Figures (usually PDF) are rasterised to PNG and shrunk to a thumbnail by an
//! external program. [`ImageMagick`] calls `convert`; tests plug in their own
//! [`ImageConverter`].

use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use hd_core::{Error, Result};

use crate::config::ImageOptions;

/// Shell status for "command not found".
const EXIT_COMMAND_NOT_FOUND: i32 = 127;

/// Result of one conversion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// The target file was written.
    Converted,
    /// The converter is not installed; nothing was written.
    ToolMissing,
}

/// Turns figures into PNG images and thumbnails.
pub trait ImageConverter {
    /// Rasterise `source` into the PNG `target`.
    fn convert_image(&self, source: &Path, target: &Path) -> Result<ConversionOutcome>;

    /// Write a thumbnail of the PNG `source` to `target`.
    fn create_thumbnail(&self, source: &Path, target: &Path) -> Result<ConversionOutcome>;
}

/// ImageMagick's `convert`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageMagick {
    program: String,
    density: u32,
    thumbnail_size: String,
}

impl Default for ImageMagick {
    fn default() -> Self {
        Self::from_options(&ImageOptions::default())
    }
}

impl ImageMagick {
    pub fn from_options(options: &ImageOptions) -> Self {
        Self {
            program: "convert".into(),
            density: options.density,
            thumbnail_size: options.thumbnail_size.clone(),
        }
    }

    /// Use another executable, e.g. `magick` or an absolute path.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn run(&self, args: Vec<OsString>) -> Result<ConversionOutcome> {
        let command = format!(
            "{} {}",
            self.program,
            args.iter().map(|a| a.to_string_lossy()).collect::<Vec<_>>().join(" ")
        );
        tracing::debug!(command = %command, "running image converter");

        match Command::new(&self.program).args(&args).output() {
            Ok(output) if output.status.success() => Ok(ConversionOutcome::Converted),
            Ok(output) if output.status.code() == Some(EXIT_COMMAND_NOT_FOUND) => {
                tracing::warn!(command = %command, "image converter not found, skipping conversion");
                Ok(ConversionOutcome::ToolMissing)
            }
            Ok(output) => Err(Error::ExternalTool {
                command,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    program = %self.program,
                    "ImageMagick does not seem to be installed, skipping image conversion"
                );
                Ok(ConversionOutcome::ToolMissing)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl ImageConverter for ImageMagick {
    fn convert_image(&self, source: &Path, target: &Path) -> Result<ConversionOutcome> {
        let mut args: Vec<OsString> = ["-flatten", "-density"].map(OsString::from).into();
        args.push(self.density.to_string().into());
        args.extend(["-fuzz", "1%", "-trim", "+repage"].map(OsString::from));
        args.push(source.into());
        args.push(target.into());
        self.run(args)
    }

    fn create_thumbnail(&self, source: &Path, target: &Path) -> Result<ConversionOutcome> {
        let args = vec![
            OsString::from("-thumbnail"),
            OsString::from(&self.thumbnail_size),
            source.into(),
            target.into(),
        ];
        self.run(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let converter = ImageMagick::default().with_program("hd-no-such-converter-binary");
        let outcome = converter
            .convert_image(&dir.path().join("a.pdf"), &dir.path().join("a.png"))
            .unwrap();
        assert_eq!(outcome, ConversionOutcome::ToolMissing);
        assert!(!dir.path().join("a.png").exists());
    }

    #[cfg(unix)]
    #[test]
    fn failing_program_reports_stderr() {
        let converter = ImageMagick::default().with_program("false");
        let dir = tempfile::tempdir().unwrap();
        match converter.create_thumbnail(&dir.path().join("a.png"), &dir.path().join("t.png")) {
            Err(Error::ExternalTool { command, .. }) => {
                assert!(command.starts_with("false -thumbnail 240x179"), "{command}")
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
