//! Checks on a finished submission archive.

use std::collections::BTreeMap;
use std::path::Path;

use hd_core::{Error, Result};
use regex::Regex;
use serde::Deserialize;
use serde_yaml_ng::Value;

use crate::archive::read_archive;
use crate::table::{MAX_TABLE_NAME_LEN, SUBMISSION_FILE, TABLE_DOI_PATTERN};

/// Something that can accept or reject a submission archive.
pub trait SubmissionValidator {
    /// Check the archive at `archive`. `Ok(false)` means problems were found;
    /// they are available from [`messages`](Self::messages).
    fn validate(&mut self, archive: &Path) -> Result<bool>;

    /// Problems found by the last [`validate`](Self::validate) call, as `file: message`.
    fn messages(&self) -> &[String];
}

/// Structural validator that reads the archive back.
///
/// Checks that `submission.yaml` is present and parses, that every table document
/// has its required keys and a well-formed data file in the archive, that
/// dependent variables have as many values as the independent ones, and that
/// local resources were bundled.
#[derive(Debug, Default)]
pub struct ArchiveValidator {
    messages: Vec<String>,
}

impl ArchiveValidator {
    pub fn new() -> Self {
        Self::default()
    }

    fn report(&mut self, file: &str, message: impl AsRef<str>) {
        self.messages.push(format!("{file}: {}", message.as_ref()));
    }

    fn check_root(&mut self, doc: &Value, contents: &BTreeMap<String, Vec<u8>>) {
        if !doc.is_mapping() {
            self.report(SUBMISSION_FILE, "submission document is not a mapping");
            return;
        }
        if doc.get("comment").is_some_and(|c| !c.is_string()) {
            self.report(SUBMISSION_FILE, "comment must be a string");
        }
        if let Some(license) = doc.get("data_license") {
            self.check_license(SUBMISSION_FILE, license);
        }
        if let Some(resources) = doc.get("additional_resources") {
            self.check_resources(SUBMISSION_FILE, resources, contents);
        }
        if let Some(ids) = doc.get("record_ids") {
            let valid = ids.as_sequence().is_some_and(|ids| {
                ids.iter().all(|r| {
                    r.get("id").is_some_and(Value::is_i64) && r.get("type").is_some_and(Value::is_string)
                })
            });
            if !valid {
                self.report(SUBMISSION_FILE, "record_ids must be a list of {id, type}");
            }
        }
        if let Some(records) = doc.get("related_to_hepdata_records") {
            let valid = records
                .as_sequence()
                .is_some_and(|r| r.iter().all(|id| id.as_i64().is_some_and(|id| id > 0)));
            if !valid {
                self.report(SUBMISSION_FILE, "related_to_hepdata_records must be positive integers");
            }
        }
    }

    fn check_table(&mut self, doc: &Value, contents: &BTreeMap<String, Vec<u8>>, doi: &Regex) {
        let name = doc.get("name").and_then(Value::as_str).unwrap_or("<unnamed table>").to_string();
        let context = format!("{SUBMISSION_FILE} (table '{name}')");

        match doc.get("name").and_then(Value::as_str) {
            Some(n) if n.chars().count() > MAX_TABLE_NAME_LEN => {
                self.report(&context, format!("name is longer than {MAX_TABLE_NAME_LEN} characters"))
            }
            Some(_) => {}
            None => self.report(&context, "missing string key 'name'"),
        }
        if doc.get("description").and_then(Value::as_str).is_none() {
            self.report(&context, "missing string key 'description'");
        }
        match doc.get("keywords").and_then(Value::as_sequence) {
            Some(keywords) => {
                for keyword in keywords {
                    if keyword.get("name").and_then(Value::as_str).is_none()
                        || keyword.get("values").and_then(Value::as_sequence).is_none()
                    {
                        self.report(&context, "keywords must be a list of {name, values}");
                    }
                }
            }
            None => self.report(&context, "missing list key 'keywords'"),
        }
        if let Some(license) = doc.get("data_license") {
            self.check_license(&context, license);
        }
        if let Some(resources) = doc.get("additional_resources") {
            self.check_resources(&context, resources, contents);
        }
        if let Some(dois) = doc.get("related_to_table_dois") {
            let valid = dois
                .as_sequence()
                .is_some_and(|d| d.iter().all(|v| v.as_str().is_some_and(|s| doi.is_match(s))));
            if !valid {
                self.report(&context, "related_to_table_dois must be table DOIs");
            }
        }

        let Some(data_file) = doc.get("data_file").and_then(Value::as_str) else {
            self.report(&context, "missing string key 'data_file'");
            return;
        };
        match contents.get(data_file) {
            Some(bytes) => self.check_data_file(data_file, bytes),
            None => self.report(&context, format!("data file '{data_file}' is not in the archive")),
        }
    }

    fn check_data_file(&mut self, file: &str, bytes: &[u8]) {
        let data: Value = match serde_yaml_ng::from_slice(bytes) {
            Ok(data) => data,
            Err(e) => {
                self.report(file, format!("cannot parse: {e}"));
                return;
            }
        };

        let mut lengths = BTreeMap::new();
        for key in ["independent_variables", "dependent_variables"] {
            let Some(variables) = data.get(key).and_then(Value::as_sequence) else {
                self.report(file, format!("missing list key '{key}'"));
                return;
            };
            let mut variable_lengths = Vec::with_capacity(variables.len());
            for variable in variables {
                let name = variable
                    .get("header")
                    .and_then(|h| h.get("name"))
                    .and_then(Value::as_str)
                    .unwrap_or("");
                if name.is_empty() {
                    self.report(file, format!("{key}: variable without header name"));
                }
                let Some(values) = variable.get("values").and_then(Value::as_sequence) else {
                    self.report(file, format!("{key}: variable '{name}' has no values list"));
                    continue;
                };
                for (i, value) in values.iter().enumerate() {
                    if let Err(message) = check_value(value) {
                        self.report(file, format!("{key}: variable '{name}', value {i}: {message}"));
                    }
                }
                variable_lengths.push((name.to_string(), values.len()));
            }
            lengths.insert(key, variable_lengths);
        }

        let independent = &lengths["independent_variables"];
        let Some((first_name, expected)) = independent.first() else {
            return;
        };
        for (name, len) in independent.iter().chain(&lengths["dependent_variables"]) {
            if len != expected {
                self.report(
                    file,
                    format!("variable '{name}' has {len} value(s), '{first_name}' has {expected}"),
                );
            }
        }
    }

    fn check_license(&mut self, context: &str, license: &Value) {
        let valid = license.get("name").and_then(Value::as_str).is_some_and(|s| !s.is_empty())
            && license.get("url").and_then(Value::as_str).is_some_and(|s| !s.is_empty());
        if !valid {
            self.report(context, "license needs a non-empty name and url");
        }
    }

    fn check_resources(&mut self, context: &str, resources: &Value, contents: &BTreeMap<String, Vec<u8>>) {
        let Some(resources) = resources.as_sequence() else {
            self.report(context, "additional_resources must be a list");
            return;
        };
        for resource in resources {
            if resource.get("description").and_then(Value::as_str).is_none() {
                self.report(context, "resource without description");
            }
            match resource.get("location").and_then(Value::as_str) {
                Some(location) if !location.contains("://") && !contents.contains_key(location) => {
                    self.report(context, format!("resource '{location}' is not in the archive"))
                }
                Some(_) => {}
                None => self.report(context, "resource without location"),
            }
            if let Some(license) = resource.get("license") {
                self.check_license(context, license);
            }
        }
    }
}

impl SubmissionValidator for ArchiveValidator {
    fn validate(&mut self, archive: &Path) -> Result<bool> {
        self.messages.clear();
        let contents = read_archive(archive)?;

        let Some(bytes) = contents.get(SUBMISSION_FILE) else {
            self.report(SUBMISSION_FILE, "not found in archive");
            return Ok(false);
        };
        let text = String::from_utf8_lossy(bytes);
        let mut documents = Vec::new();
        for document in serde_yaml_ng::Deserializer::from_str(&text) {
            match Value::deserialize(document) {
                Ok(Value::Null) => {}
                Ok(value) => documents.push(value),
                Err(e) => {
                    self.report(SUBMISSION_FILE, format!("cannot parse: {e}"));
                    return Ok(false);
                }
            }
        }
        if documents.is_empty() {
            self.report(SUBMISSION_FILE, "no documents");
        }

        let doi = Regex::new(TABLE_DOI_PATTERN).map_err(|e| Error::validation(e.to_string()))?;
        let mut tables = 0;
        for (i, doc) in documents.iter().enumerate() {
            let is_table = doc.get("data_file").is_some() || doc.get("name").is_some();
            if is_table {
                tables += 1;
                self.check_table(doc, &contents, &doi);
            } else if i == 0 {
                self.check_root(doc, &contents);
            } else {
                self.report(SUBMISSION_FILE, format!("document {} is neither a table nor the first document", i + 1));
            }
        }
        tracing::debug!("validated {} with {tables} table(s)", archive.display());
        Ok(self.messages.is_empty())
    }

    fn messages(&self) -> &[String] {
        &self.messages
    }
}

fn check_value(value: &Value) -> std::result::Result<(), String> {
    if !value.is_mapping() {
        return Err("not a mapping".into());
    }
    let has_value = value.get("value").is_some();
    let has_bin = value.get("low").is_some() && value.get("high").is_some();
    if !has_value && !has_bin {
        return Err("needs 'value' or both 'low' and 'high'".into());
    }
    let Some(errors) = value.get("errors") else {
        return Ok(());
    };
    let errors = errors.as_sequence().ok_or("errors must be a list")?;
    for error in errors {
        let symmetric = error.get("symerror").is_some();
        let asymmetric = error
            .get("asymerror")
            .is_some_and(|a| a.get("minus").is_some() && a.get("plus").is_some());
        if !symmetric && !asymmetric {
            return Err("error needs 'symerror' or 'asymerror' with 'minus' and 'plus'".into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::write_archive;

    fn archive_of(files: &[(&str, &str)]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<_> = files
            .iter()
            .map(|(name, text)| {
                let path = dir.path().join(name);
                std::fs::write(&path, text).unwrap();
                path
            })
            .collect();
        let archive = dir.path().join("out.tar.gz");
        write_archive(&archive, &paths).unwrap();
        (dir, archive)
    }

    const ROOT: &str = "---\ncomment: ''\ndata_license:\n  name: CC0\n  url: https://creativecommons.org/publicdomain/zero/1.0/\n";
    const TABLE: &str = "---\ndata_file: t.yaml\ndescription: d\nkeywords: []\nlocation: l\nname: T\n";

    #[test]
    fn accepts_consistent_archive() {
        let data = "dependent_variables:\n- header:\n    name: y\n  values:\n  - value: 1\n    errors:\n    - symerror: 0.1\n  - value: 2\nindependent_variables:\n- header:\n    name: x\n  values:\n  - low: 0\n    high: 1\n  - low: 1\n    high: 2\n";
        let (_dir, archive) = archive_of(&[
            ("submission.yaml", format!("{ROOT}{TABLE}").as_str()),
            ("t.yaml", data),
        ]);
        let mut validator = ArchiveValidator::new();
        assert!(validator.validate(&archive).unwrap(), "{:?}", validator.messages());
    }

    #[test]
    fn reports_length_mismatch_and_missing_files() {
        let data = "dependent_variables:\n- header:\n    name: y\n  values:\n  - value: 1\nindependent_variables:\n- header:\n    name: x\n  values:\n  - value: 1\n  - value: 2\n";
        let extra = "---\nadditional_resources:\n- description: code\n  location: code.py\ndata_file: missing.yaml\ndescription: d\nkeywords: []\nname: U\n";
        let (_dir, archive) = archive_of(&[
            ("submission.yaml", format!("{ROOT}{TABLE}{extra}").as_str()),
            ("t.yaml", data),
        ]);
        let mut validator = ArchiveValidator::new();
        assert!(!validator.validate(&archive).unwrap());
        let messages = validator.messages().join("\n");
        assert!(messages.contains("t.yaml: variable 'y' has 1 value(s), 'x' has 2"), "{messages}");
        assert!(messages.contains("resource 'code.py' is not in the archive"), "{messages}");
        assert!(messages.contains("data file 'missing.yaml' is not in the archive"), "{messages}");
    }

    #[test]
    fn missing_submission_file() {
        let (_dir, archive) = archive_of(&[("t.yaml", "a: 1\n")]);
        let mut validator = ArchiveValidator::new();
        assert!(!validator.validate(&archive).unwrap());
        assert_eq!(validator.messages(), &["submission.yaml: not found in archive"]);
    }
}
