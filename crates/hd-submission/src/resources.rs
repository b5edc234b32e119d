//! Additional resources attached to tables and submissions.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use hd_core::{Error, Result};
use serde::Serialize;

use crate::files::{MAX_FILE_SIZE_MB, basename, check_file_existence, check_file_size};

/// License of a data table or of an additional resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct License {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub name: String,
    pub url: String,
}

impl License {
    /// License with a name and a URL, both non-empty.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Result<Self> {
        let (name, url) = (name.into(), url.into());
        if name.is_empty() || url.is_empty() {
            return Err(Error::validation("a license needs a non-empty name and url"));
        }
        Ok(Self { description: None, name, url })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Build from a plain key/value map.
    ///
    /// The keys must be exactly `{name, url}` or `{name, url, description}`.
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self> {
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        if keys != ["name", "url"] && keys != ["description", "name", "url"] {
            return Err(Error::validation(format!(
                "Incorrect license format: expected keys {{name, url}} or {{name, url, description}}, got {{{}}}",
                keys.join(", ")
            )));
        }
        let license = Self::new(&map["name"], &map["url"])?;
        Ok(match map.get("description") {
            Some(description) => license.with_description(description),
            None => license,
        })
    }

    /// CC0 public-domain dedication, the default data license.
    pub fn cc0() -> Self {
        Self {
            description: Some(
                "CC0 enables reusers to distribute, remix, adapt, and build upon the material \
                 in any medium or format, with no conditions."
                    .into(),
            ),
            name: "CC0".into(),
            url: "https://creativecommons.org/publicdomain/zero/1.0/".into(),
        }
    }
}

/// One entry of `additional_resources`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
    pub location: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
}

/// Resources of a table or submission, plus the local files they refer to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceBag {
    resources: Vec<Resource>,
    files_to_copy: Vec<PathBuf>,
}

impl ResourceBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a resource.
    ///
    /// With `copy_file`, `location` is a local file: it must exist and be at most
    /// 100 MB, it is recorded under its basename and copied on [`copy_files`](Self::copy_files).
    pub fn add_resource(
        &mut self,
        description: impl Into<String>,
        location: &str,
        copy_file: bool,
        file_type: Option<&str>,
        license: Option<License>,
    ) -> Result<()> {
        let location = if copy_file {
            let path = Path::new(location);
            check_file_existence(path)?;
            check_file_size(path, MAX_FILE_SIZE_MB)?;
            self.files_to_copy.push(path.to_path_buf());
            basename(path)?
        } else {
            location.to_string()
        };
        self.resources.push(Resource {
            description: description.into(),
            license,
            location,
            file_type: file_type.map(str::to_string),
        });
        Ok(())
    }

    /// Attach an external link.
    pub fn add_link(&mut self, description: impl Into<String>, location: &str) -> Result<()> {
        self.add_resource(description, location, false, None, None)
    }

    /// Record a link that needs no checks.
    pub(crate) fn push_link(&mut self, description: impl Into<String>, location: impl Into<String>) {
        self.resources.push(Resource {
            description: description.into(),
            license: None,
            location: location.into(),
            file_type: None,
        });
    }

    /// Copy every queued file into `outdir`.
    pub fn copy_files(&self, outdir: &Path) -> Result<()> {
        if self.files_to_copy.is_empty() {
            return Ok(());
        }
        std::fs::create_dir_all(outdir)?;
        for file in &self.files_to_copy {
            check_file_existence(file)?;
            let target = outdir.join(basename(file)?);
            tracing::debug!("copying {} to {}", file.display(), target.display());
            std::fs::copy(file, target)?;
        }
        Ok(())
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn files_to_copy(&self) -> &[PathBuf] {
        &self.files_to_copy
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn license_key_sets() {
        let plain = License::from_map(&map(&[("name", "GPL"), ("url", "https://gnu.org")])).unwrap();
        assert_eq!(plain.description, None);

        let full = License::from_map(&map(&[
            ("name", "GPL"),
            ("url", "https://gnu.org"),
            ("description", "copyleft"),
        ]))
        .unwrap();
        assert_eq!(full.description.as_deref(), Some("copyleft"));

        for bad in [
            map(&[("name", "GPL")]),
            map(&[("name", "GPL"), ("url", "u"), ("version", "3")]),
            map(&[("name", ""), ("url", "u")]),
        ] {
            assert!(matches!(License::from_map(&bad), Err(Error::Validation(_))), "{bad:?}");
        }
    }

    #[test]
    fn copied_file_uses_basename() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let file = src.path().join("notes.txt");
        std::fs::write(&file, "hello").unwrap();

        let mut bag = ResourceBag::new();
        bag.add_resource("Notes", file.to_str().unwrap(), true, Some("text"), None).unwrap();
        bag.add_link("Paper", "https://arxiv.org/abs/0000.00000").unwrap();
        assert_eq!(bag.resources()[0].location, "notes.txt");
        assert_eq!(bag.resources()[1].location, "https://arxiv.org/abs/0000.00000");
        assert_eq!(bag.files_to_copy().len(), 1);

        bag.copy_files(out.path()).unwrap();
        assert_eq!(std::fs::read_to_string(out.path().join("notes.txt")).unwrap(), "hello");

        assert!(matches!(
            bag.add_resource("Gone", "/nonexistent/file.txt", true, None, None),
            Err(Error::Resource(_))
        ));
    }

    #[test]
    fn resource_yaml() {
        let resource = Resource {
            description: "Code".into(),
            license: Some(License::new("MIT", "https://opensource.org/license/mit").unwrap()),
            location: "code.tar.gz".into(),
            file_type: Some("code".into()),
        };
        assert_eq!(
            serde_yaml_ng::to_string(&resource).unwrap(),
            "description: Code\nlicense:\n  name: MIT\n  url: https://opensource.org/license/mit\nlocation: code.tar.gz\ntype: code\n"
        );
    }
}
