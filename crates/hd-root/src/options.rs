//! Readout options for histograms.
//!
//! Options are plain structs with builder helpers and can be loaded from YAML:
//!
//! ```yaml
//! xlim: [0.0, 200.0]
//! force_symmetric_errors: true
//! ```

use std::path::Path;

use hd_core::{Error, Result};
use serde::Deserialize;

/// Optional `(low, high)` range on one axis. Either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Limits(pub Option<f64>, pub Option<f64>);

impl Limits {
    /// Closed range.
    pub fn new(low: f64, high: f64) -> Self {
        Self(Some(low), Some(high))
    }

    /// No restriction.
    pub fn unbounded() -> Self {
        Self(None, None)
    }

    pub fn low(&self) -> Option<f64> {
        self.0
    }

    pub fn high(&self) -> Option<f64> {
        self.1
    }

    /// When both bounds are given they must be finite and ordered.
    pub fn validate(&self, axis: &str) -> Result<()> {
        if let (Some(low), Some(high)) = (self.0, self.1) {
            if !(low.is_finite() && high.is_finite()) {
                return Err(Error::validation(format!(
                    "{axis}lim bounds must be finite numbers, got ({low}, {high})"
                )));
            }
            if low >= high {
                return Err(Error::validation(format!(
                    "{axis}lim lower bound must be below upper bound, got ({low}, {high})"
                )));
            }
        }
        Ok(())
    }
}

/// Options of [`SourceReader::read_hist_1d`](crate::SourceReader::read_hist_1d).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Hist1DOptions {
    /// Range on the x axis.
    pub xlim: Limits,
    /// Read symmetric errors whatever the histogram error mode.
    pub force_symmetric_errors: bool,
    /// Also read the underflow and overflow bins.
    pub include_flow: bool,
}

impl Hist1DOptions {
    const KEYS: &'static [&'static str] = &["xlim", "force_symmetric_errors", "include_flow"];

    pub fn xlim(mut self, low: f64, high: f64) -> Self {
        self.xlim = Limits::new(low, high);
        self
    }

    pub fn force_symmetric_errors(mut self, force: bool) -> Self {
        self.force_symmetric_errors = force;
        self
    }

    pub fn include_flow(mut self, include: bool) -> Self {
        self.include_flow = include;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.xlim.validate("x")
    }

    /// Parse from YAML. Unknown keys are a type error.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let options: Self = parse_options(text, Self::KEYS)?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_yaml_str(&std::fs::read_to_string(path)?)
    }
}

/// Options of [`SourceReader::read_hist_2d`](crate::SourceReader::read_hist_2d).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Hist2DOptions {
    /// Range on the x axis.
    pub xlim: Limits,
    /// Range on the y axis.
    pub ylim: Limits,
    /// Read symmetric errors whatever the histogram error mode.
    pub force_symmetric_errors: bool,
    /// Also read the underflow and overflow bins on both axes.
    pub include_flow: bool,
}

impl Hist2DOptions {
    const KEYS: &'static [&'static str] = &["xlim", "ylim", "force_symmetric_errors", "include_flow"];

    pub fn xlim(mut self, low: f64, high: f64) -> Self {
        self.xlim = Limits::new(low, high);
        self
    }

    pub fn ylim(mut self, low: f64, high: f64) -> Self {
        self.ylim = Limits::new(low, high);
        self
    }

    pub fn force_symmetric_errors(mut self, force: bool) -> Self {
        self.force_symmetric_errors = force;
        self
    }

    pub fn include_flow(mut self, include: bool) -> Self {
        self.include_flow = include;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.xlim.validate("x")?;
        self.ylim.validate("y")
    }

    /// Parse from YAML. Unknown keys are a type error.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let options: Self = parse_options(text, Self::KEYS)?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_yaml_str(&std::fs::read_to_string(path)?)
    }
}

fn parse_options<T: serde::de::DeserializeOwned + Default>(text: &str, known: &[&str]) -> Result<T> {
    let value: serde_yaml_ng::Value = serde_yaml_ng::from_str(text)?;
    match &value {
        serde_yaml_ng::Value::Null => return Ok(T::default()),
        serde_yaml_ng::Value::Mapping(map) => {
            for key in map.keys() {
                let name = key.as_str().unwrap_or_default();
                if !known.contains(&name) {
                    return Err(Error::type_error(format!(
                        "unexpected option {key:?}; known options: {}",
                        known.join(", ")
                    )));
                }
            }
        }
        other => {
            return Err(Error::type_error(format!("options must be a mapping, got {other:?}")));
        }
    }
    serde_yaml_ng::from_value(value).map_err(|e| Error::validation(format!("invalid options: {e}")))
}
