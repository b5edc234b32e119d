//! One HEPData table: variables plus the metadata of its submission document.

use std::collections::BTreeSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use hd_core::{Error, Result, Scalar, TableRecord, Variable};
use regex::Regex;
use serde::Serialize;

use crate::files::{basename, file_is_outdated};
use crate::images::{ConversionOutcome, ImageConverter};
use crate::resources::{License, Resource, ResourceBag};

/// Longest accepted table name, in characters.
pub const MAX_TABLE_NAME_LEN: usize = 64;

/// Name of the submission file tables append their documents to.
pub const SUBMISSION_FILE: &str = "submission.yaml";

pub(crate) const TABLE_DOI_PATTERN: &str = r"^10\.17182/hepdata\.\d+\.v\d+/t\d+$";

/// A keyword and its values, e.g. `cmenergies: [13000]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Keyword {
    pub name: String,
    pub values: Vec<Scalar>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    description: String,
    location: String,
    variables: Vec<Variable>,
    related_tables: Vec<String>,
    keywords: Vec<Keyword>,
    image_files: BTreeSet<PathBuf>,
    data_license: Option<License>,
    resources: ResourceBag,
}

/// Entry of a table in `submission.yaml`.
#[derive(Serialize)]
struct TableDocument<'a> {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    additional_resources: Vec<Resource>,
    data_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data_license: Option<&'a License>,
    description: &'a str,
    keywords: &'a [Keyword],
    location: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    related_to_table_dois: Vec<&'a str>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let mut table = Self {
            name: String::new(),
            description: "Example description".into(),
            location: "Example location".into(),
            variables: Vec::new(),
            related_tables: Vec::new(),
            keywords: Vec::new(),
            image_files: BTreeSet::new(),
            data_license: None,
            resources: ResourceBag::new(),
        };
        table.set_name(name)?;
        Ok(table)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the table. Names longer than 64 characters are rejected.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        let len = name.chars().count();
        if len > MAX_TABLE_NAME_LEN {
            return Err(Error::validation(format!(
                "table name must not be longer than {MAX_TABLE_NAME_LEN} characters, got {len}: '{name}'"
            )));
        }
        self.name = name;
        Ok(())
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = location.into();
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn add_variable(&mut self, variable: Variable) {
        self.variables.push(variable);
    }

    pub fn related_tables(&self) -> &[String] {
        &self.related_tables
    }

    /// Link to another table by its DOI, e.g. `10.17182/hepdata.1.v1/t1`.
    pub fn add_related_doi(&mut self, doi: impl Into<String>) -> Result<()> {
        let doi = doi.into();
        let pattern = Regex::new(TABLE_DOI_PATTERN).map_err(|e| Error::validation(e.to_string()))?;
        if !pattern.is_match(&doi) {
            return Err(Error::validation(format!(
                "DOI does not match the table DOI format 10.17182/hepdata.<record>.v<version>/t<table>: '{doi}'"
            )));
        }
        self.related_tables.push(doi);
        Ok(())
    }

    pub fn data_license(&self) -> Option<&License> {
        self.data_license.as_ref()
    }

    pub fn add_data_license(&mut self, name: &str, url: &str, description: Option<&str>) -> Result<()> {
        let license = License::new(name, url)?;
        self.data_license = Some(match description {
            Some(description) => license.with_description(description),
            None => license,
        });
        Ok(())
    }

    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    /// Set the values of keyword `name`, replacing earlier values of the same keyword.
    pub fn add_keyword<I, V>(&mut self, name: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<Scalar>,
    {
        let name = name.into();
        let values: Vec<Scalar> = values.into_iter().map(Into::into).collect();
        match self.keywords.iter_mut().find(|k| k.name == name) {
            Some(keyword) => keyword.values = values,
            None => self.keywords.push(Keyword { name, values }),
        }
    }

    pub fn image_files(&self) -> &BTreeSet<PathBuf> {
        &self.image_files
    }

    /// Attach a figure. The file must exist; it is converted by [`write_images`](Self::write_images).
    pub fn add_image(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::resource(format!("image file does not exist: {}", path.display())));
        }
        self.image_files.insert(path.to_path_buf());
        Ok(())
    }

    pub fn resources(&self) -> &ResourceBag {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut ResourceBag {
        &mut self.resources
    }

    /// File the table data is written to: lowercase name, spaces as underscores.
    pub fn data_file_name(&self) -> String {
        format!("{}.yaml", self.name.to_lowercase().replace(' ', "_"))
    }

    /// Data file content.
    pub fn make_record(&self) -> TableRecord {
        let mut record = TableRecord::default();
        for variable in &self.variables {
            if variable.is_independent() {
                record.independent_variables.push(variable.make_record());
            } else {
                record.dependent_variables.push(variable.make_record());
            }
        }
        record
    }

    /// Convert every image to a PNG and a thumbnail in `outdir`.
    ///
    /// Outputs newer than their source are kept. Returns the "Image file" and
    /// "Thumbnail image file" resources for the images that are available.
    pub fn write_images(&self, outdir: &Path, converter: &dyn ImageConverter) -> Result<Vec<Resource>> {
        let mut resources = Vec::new();
        for image in &self.image_files {
            if !image.is_file() {
                return Err(Error::resource(format!("image file does not exist: {}", image.display())));
            }
            std::fs::create_dir_all(outdir)?;

            let stem = image
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| Error::validation(format!("bad image file name: {}", image.display())))?;
            let png_name = format!("{stem}.png");
            let thumb_name = format!("thumb_{png_name}");
            let png = outdir.join(&png_name);
            let thumb = outdir.join(&thumb_name);

            if file_is_outdated(&png, image)? {
                tracing::info!("converting {} to {}", image.display(), png.display());
                converter.convert_image(image, &png)?;
            } else {
                tracing::info!("{} is up to date, skipping conversion", png.display());
            }
            if !png.exists() {
                continue;
            }
            resources.push(image_resource("Image file", png_name));

            if file_is_outdated(&thumb, &png)? {
                tracing::info!("creating thumbnail {}", thumb.display());
                if converter.create_thumbnail(&png, &thumb)? == ConversionOutcome::ToolMissing {
                    continue;
                }
            } else {
                tracing::info!("{} is up to date, skipping thumbnail", thumb.display());
            }
            if thumb.exists() {
                resources.push(image_resource("Thumbnail image file", thumb_name));
            }
        }
        Ok(resources)
    }

    /// Write the data file and append the table document to `submission.yaml`.
    pub fn write_yaml(&self, outdir: &Path) -> Result<PathBuf> {
        self.write_yaml_with(outdir, Vec::new())
    }

    /// [`write_images`](Self::write_images) when a converter is given, then [`write_yaml`](Self::write_yaml).
    pub fn write_output(&self, outdir: &Path, converter: Option<&dyn ImageConverter>) -> Result<PathBuf> {
        let image_resources = match converter {
            Some(converter) => self.write_images(outdir, converter)?,
            None => Vec::new(),
        };
        self.write_yaml_with(outdir, image_resources)
    }

    fn write_yaml_with(&self, outdir: &Path, image_resources: Vec<Resource>) -> Result<PathBuf> {
        std::fs::create_dir_all(outdir)?;
        let data_file = outdir.join(self.data_file_name());
        std::fs::write(&data_file, serde_yaml_ng::to_string(&self.make_record())?)?;
        tracing::info!("wrote table '{}' to {}", self.name, data_file.display());

        let mut additional_resources = self.resources.resources().to_vec();
        additional_resources.extend(image_resources);
        let document = TableDocument {
            additional_resources,
            data_file: basename(&data_file)?,
            data_license: self.data_license.as_ref(),
            description: &self.description,
            keywords: &self.keywords,
            location: &self.location,
            name: &self.name,
            related_to_table_dois: self.related_tables.iter().map(String::as_str).collect(),
        };
        let mut submission =
            OpenOptions::new().create(true).append(true).open(outdir.join(SUBMISSION_FILE))?;
        write!(submission, "---\n{}", serde_yaml_ng::to_string(&document)?)?;
        Ok(data_file)
    }
}

fn image_resource(description: &str, location: String) -> Resource {
    Resource { description: description.into(), license: None, location, file_type: None }
}
