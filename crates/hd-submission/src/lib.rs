//! # hd-submission
//!
//! Tables and submissions for HEPData: YAML output, resource files, figure
//! conversion, the upload archive and its validation.
//!
//! ## Example
//!
//! ```no_run
//! use hd_core::Variable;
//! use hd_submission::{Submission, Table, WriteOptions};
//!
//! let mut table = Table::new("Table 1")?;
//! table.set_description("Measured cross section.");
//! table.add_keyword("cmenergies", [13000]);
//! table.add_variable(Variable::new("SQRT(S)").binned(false).with_values([13000])?);
//! table.add_variable(Variable::new("SIG").independent(false).binned(false).with_values([1.25])?);
//!
//! let mut submission = Submission::new();
//! submission.add_table(table);
//! let archive = submission.create_files("output", &WriteOptions::default())?;
//! println!("wrote {}", archive.display());
//! # Ok::<(), hd_core::Error>(())
//! ```

#![warn(clippy::all)]

pub mod archive;
pub mod config;
pub mod files;
pub mod hist;
pub mod images;
pub mod resources;
pub mod submission;
pub mod table;
pub mod validate;

pub use config::{ImageOptions, WriteOptions};
pub use files::{check_file_existence, check_file_size, file_is_outdated, find_all_matching};
pub use hist::hist_base_table;
pub use images::{ConversionOutcome, ImageConverter, ImageMagick};
pub use resources::{License, Resource, ResourceBag};
pub use submission::{IntoRecordId, PROVENANCE_URL, RecordId, Submission};
pub use table::{Keyword, MAX_TABLE_NAME_LEN, SUBMISSION_FILE, Table};
pub use validate::{ArchiveValidator, SubmissionValidator};
