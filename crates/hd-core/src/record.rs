//! Serialisable output records.
//!
//! Fields are declared in alphabetical order: the repository tooling emits mapping
//! keys sorted, and the YAML written here must match it byte for byte.

use serde::Serialize;

use crate::value::Scalar;

/// Variable name and optional units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Header {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
}

/// Measurement condition attached to a dependent variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Qualifier {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    pub value: Scalar,
}

/// `{minus, plus}` half of an asymmetric error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AsymError {
    pub minus: Scalar,
    pub plus: Scalar,
}

/// One error entry of a value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asymerror: Option<AsymError>,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symerror: Option<Scalar>,
}

impl ErrorRecord {
    /// Symmetric error entry.
    pub fn symmetric(label: &str, value: Scalar) -> Self {
        Self { asymerror: None, label: label.to_string(), symerror: Some(value) }
    }

    /// Asymmetric error entry.
    pub fn asymmetric(label: &str, minus: Scalar, plus: Scalar) -> Self {
        Self { asymerror: Some(AsymError { minus, plus }), label: label.to_string(), symerror: None }
    }
}

/// One element of a variable: `{value}` or `{low, high}`, plus errors.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ValueRecord {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Scalar>,
}

/// Exported form of a [`Variable`](crate::Variable).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableRecord {
    pub header: Header,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub qualifiers: Vec<Qualifier>,
    pub values: Vec<ValueRecord>,
}

/// Content of one table data file.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TableRecord {
    pub dependent_variables: Vec<VariableRecord>,
    pub independent_variables: Vec<VariableRecord>,
}
