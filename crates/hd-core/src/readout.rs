//! Readout records: named numeric series produced by the source adapters.
//!
//! A readout maps semantic names (`x`, `x_edges`, `y`, `dy`, `z`, ...) to series.
//! Symmetric errors are stored as [`Series::Values`], asymmetric ones as
//! [`Series::Pairs`] of `(down, up)` with the down component already negated.

use std::collections::BTreeMap;

use crate::{Error, Result};

/// One named column of a readout.
#[derive(Debug, Clone, PartialEq)]
pub enum Series {
    /// Plain numbers (bin centres, contents, symmetric errors).
    Values(Vec<f64>),
    /// Pairs (bin edges, asymmetric errors).
    Pairs(Vec<(f64, f64)>),
    /// Bin labels.
    Labels(Vec<String>),
}

impl Series {
    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Series::Values(v) => v.len(),
            Series::Pairs(v) => v.len(),
            Series::Labels(v) => v.len(),
        }
    }

    /// True if the series has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn kind(&self) -> &'static str {
        match self {
            Series::Values(_) => "values",
            Series::Pairs(_) => "pairs",
            Series::Labels(_) => "labels",
        }
    }
}

/// Mapping from series name to series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Readout {
    series: BTreeMap<String, Series>,
}

impl Readout {
    /// Empty readout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a series.
    pub fn insert(&mut self, key: impl Into<String>, series: Series) {
        self.series.insert(key.into(), series);
    }

    /// Raw lookup.
    pub fn get(&self, key: &str) -> Option<&Series> {
        self.series.get(key)
    }

    /// Mutable raw lookup.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Series> {
        self.series.get_mut(key)
    }

    /// True if a series with this name exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.series.contains_key(key)
    }

    /// Series names in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// Number of series.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// True if the readout has no series.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    fn require(&self, key: &str) -> Result<&Series> {
        self.series.get(key).ok_or_else(|| {
            let known: Vec<&str> = self.keys().collect();
            Error::validation(format!("readout has no series '{key}' (known: {known:?})"))
        })
    }

    /// Numeric series `key`.
    pub fn values(&self, key: &str) -> Result<&[f64]> {
        match self.require(key)? {
            Series::Values(v) => Ok(v),
            other => Err(Error::type_error(format!(
                "series '{key}' holds {}, expected values",
                other.kind()
            ))),
        }
    }

    /// Pair series `key`.
    pub fn pairs(&self, key: &str) -> Result<&[(f64, f64)]> {
        match self.require(key)? {
            Series::Pairs(v) => Ok(v),
            other => Err(Error::type_error(format!(
                "series '{key}' holds {}, expected pairs",
                other.kind()
            ))),
        }
    }

    /// Label series `key`.
    pub fn labels(&self, key: &str) -> Result<&[String]> {
        match self.require(key)? {
            Series::Labels(v) => Ok(v),
            other => Err(Error::type_error(format!(
                "series '{key}' holds {}, expected labels",
                other.kind()
            ))),
        }
    }

    /// Numeric series `key`, created empty on first use.
    ///
    /// An existing series of another kind is a type error.
    pub fn entry_values(&mut self, key: &str) -> Result<&mut Vec<f64>> {
        match self.series.entry(key.to_string()).or_insert_with(|| Series::Values(Vec::new())) {
            Series::Values(v) => Ok(v),
            other => Err(Error::type_error(format!(
                "series '{key}' holds {}, expected values",
                other.kind()
            ))),
        }
    }

    /// Pair series `key`, created empty on first use.
    pub fn entry_pairs(&mut self, key: &str) -> Result<&mut Vec<(f64, f64)>> {
        match self.series.entry(key.to_string()).or_insert_with(|| Series::Pairs(Vec::new())) {
            Series::Pairs(v) => Ok(v),
            other => Err(Error::type_error(format!(
                "series '{key}' holds {}, expected pairs",
                other.kind()
            ))),
        }
    }

    /// Label series `key`, created empty on first use.
    pub fn entry_labels(&mut self, key: &str) -> Result<&mut Vec<String>> {
        match self.series.entry(key.to_string()).or_insert_with(|| Series::Labels(Vec::new())) {
            Series::Labels(v) => Ok(v),
            other => Err(Error::type_error(format!(
                "series '{key}' holds {}, expected labels",
                other.kind()
            ))),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Series)> for Readout {
    fn from_iter<I: IntoIterator<Item = (K, Series)>>(iter: I) -> Self {
        Self { series: iter.into_iter().map(|(k, s)| (k.into(), s)).collect() }
    }
}
