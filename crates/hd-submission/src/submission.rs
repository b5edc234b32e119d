//! A full HEPData submission: tables, record links and the output pipeline.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use hd_core::{Error, Result};
use serde::Serialize;

use crate::archive::{collect_files, write_archive};
use crate::config::WriteOptions;
use crate::images::{ImageConverter, ImageMagick};
use crate::resources::{License, Resource, ResourceBag};
use crate::table::{SUBMISSION_FILE, Table};
use crate::validate::{ArchiveValidator, SubmissionValidator};

/// Values accepted as record identifiers: integers and decimal strings.
pub trait IntoRecordId {
    fn into_record_id(self) -> Result<i64>;
}

macro_rules! record_id_from_int {
    ($($t:ty),*) => {$(
        impl IntoRecordId for $t {
            fn into_record_id(self) -> Result<i64> {
                Ok(i64::from(self))
            }
        }
    )*};
}

record_id_from_int!(i64, i32, i16, u32, u16);

impl IntoRecordId for u64 {
    fn into_record_id(self) -> Result<i64> {
        i64::try_from(self).map_err(|_| Error::type_error(format!("record id {self} is out of range")))
    }
}

impl IntoRecordId for usize {
    fn into_record_id(self) -> Result<i64> {
        i64::try_from(self).map_err(|_| Error::type_error(format!("record id {self} is out of range")))
    }
}

impl IntoRecordId for &str {
    fn into_record_id(self) -> Result<i64> {
        self.trim()
            .parse()
            .map_err(|_| Error::type_error(format!("cannot interpret '{self}' as a record id")))
    }
}

impl IntoRecordId for String {
    fn into_record_id(self) -> Result<i64> {
        self.as_str().into_record_id()
    }
}

/// DOI of the tool release recorded as provenance on every submission.
pub const PROVENANCE_URL: &str = "https://doi.org/10.5281/zenodo.1217998";

/// Link to a record in another database (arXiv, INSPIRE, CDS, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordId {
    pub id: i64,
    #[serde(rename = "type")]
    pub record_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    tables: Vec<Table>,
    comment: String,
    data_license: License,
    record_ids: Vec<RecordId>,
    related_records: Vec<i64>,
    resources: ResourceBag,
}

/// First document of `submission.yaml`.
#[derive(Serialize)]
struct SubmissionDocument<'a> {
    #[serde(skip_serializing_if = "<[Resource]>::is_empty")]
    additional_resources: &'a [Resource],
    comment: &'a str,
    data_license: &'a License,
    #[serde(skip_serializing_if = "<[RecordId]>::is_empty")]
    record_ids: &'a [RecordId],
    #[serde(skip_serializing_if = "<[i64]>::is_empty")]
    related_to_hepdata_records: &'a [i64],
}

impl Default for Submission {
    /// An empty submission under CC0 whose resources start with a provenance link.
    fn default() -> Self {
        let mut resources = ResourceBag::new();
        resources.push_link(
            format!("Created with hepdata_lib {}", env!("CARGO_PKG_VERSION")),
            PROVENANCE_URL,
        );
        Self {
            tables: Vec::new(),
            comment: String::new(),
            data_license: License::cc0(),
            record_ids: Vec::new(),
            related_records: Vec::new(),
            resources,
        }
    }
}

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn add_table(&mut self, table: Table) {
        self.tables.push(table);
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = comment.into();
    }

    /// Use the text of `path` as the comment, with line breaks removed.
    pub fn read_abstract(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let text = std::fs::read_to_string(path.as_ref())?;
        self.comment = text.replace("\r\n", "").replace('\n', "");
        Ok(())
    }

    /// License of the submission as a whole. Defaults to CC0.
    pub fn data_license(&self) -> &License {
        &self.data_license
    }

    pub fn set_data_license(&mut self, license: License) {
        self.data_license = license;
    }

    pub fn record_ids(&self) -> &[RecordId] {
        &self.record_ids
    }

    pub fn add_record_id(&mut self, id: impl IntoRecordId, record_type: impl Into<String>) -> Result<()> {
        self.record_ids.push(RecordId { id: id.into_record_id()?, record_type: record_type.into() });
        Ok(())
    }

    pub fn related_records(&self) -> &[i64] {
        &self.related_records
    }

    /// Link to another HEPData record. The id must be a positive integer.
    pub fn add_related_recid(&mut self, id: impl IntoRecordId) -> Result<()> {
        let id = id.into_record_id()?;
        if id <= 0 {
            return Err(Error::validation(format!("HEPData record ids are positive, got {id}")));
        }
        self.related_records.push(id);
        Ok(())
    }

    pub fn resources(&self) -> &ResourceBag {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut ResourceBag {
        &mut self.resources
    }

    /// Local files queued by the submission and by every table.
    pub fn files_to_copy_nested(&self) -> Vec<PathBuf> {
        let mut files = self.resources.files_to_copy().to_vec();
        for table in &self.tables {
            files.extend_from_slice(table.resources().files_to_copy());
        }
        files
    }

    /// Write every file into `outdir`, bundle the archive and validate it.
    ///
    /// Images are converted with ImageMagick. Returns the archive path.
    pub fn create_files(&self, outdir: impl AsRef<Path>, options: &WriteOptions) -> Result<PathBuf> {
        options.check()?;
        let converter = ImageMagick::from_options(&options.images);
        self.create_files_with_validator(outdir, options, &converter, &mut ArchiveValidator::new())
    }

    /// [`create_files`](Self::create_files) with a custom converter and validator.
    pub fn create_files_with_validator(
        &self,
        outdir: impl AsRef<Path>,
        options: &WriteOptions,
        converter: &dyn ImageConverter,
        validator: &mut dyn SubmissionValidator,
    ) -> Result<PathBuf> {
        let outdir = outdir.as_ref();
        if options.remove_old && outdir.exists() {
            tracing::info!("removing old output directory {}", outdir.display());
            std::fs::remove_dir_all(outdir)?;
        }
        std::fs::create_dir_all(outdir)?;
        tracing::info!("writing submission with {} table(s) to {}", self.tables.len(), outdir.display());

        let document = SubmissionDocument {
            additional_resources: self.resources.resources(),
            comment: &self.comment,
            data_license: &self.data_license,
            record_ids: &self.record_ids,
            related_to_hepdata_records: &self.related_records,
        };
        let mut submission = File::create(outdir.join(SUBMISSION_FILE))?;
        write!(submission, "---\n{}", serde_yaml_ng::to_string(&document)?)?;
        drop(submission);

        let converter = options.images.enabled.then_some(converter);
        for table in &self.tables {
            table.write_output(outdir, converter)?;
            table.resources().copy_files(outdir)?;
        }
        self.resources.copy_files(outdir)?;

        let files = collect_files(outdir, &self.files_to_copy_nested())?;
        let archive = options.archive_path.clone();
        write_archive(&archive, &files)?;

        if options.validate {
            if !validator.validate(&archive)? {
                for message in validator.messages() {
                    tracing::error!("{message}");
                }
                return Err(Error::InvalidSubmission { messages: validator.messages().to_vec() });
            }
            tracing::info!("submission archive {} is valid", archive.display());
        }
        Ok(archive)
    }
}
