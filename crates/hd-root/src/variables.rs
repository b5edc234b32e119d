//! Building variables and uncertainties from readouts and whole histograms.

use hd_core::{Error, Readout, Result, Series, Uncertainty, Variable};

use crate::objects::{Hist1D, Hist2D};
use crate::options::{Hist1DOptions, Hist2DOptions};
use crate::points::{hist_1d_points, hist_2d_points};

/// Binned independent variable from the `(low, high)` series `edges_key`.
pub fn axis_variable(readout: &Readout, edges_key: &str, name: &str) -> Result<Variable> {
    Variable::new(name).with_values(readout.pairs(edges_key)?.iter().copied())
}

/// Unbinned variable from the numeric series `key`.
pub fn point_variable(readout: &Readout, key: &str, name: &str, independent: bool) -> Result<Variable> {
    Variable::new(name)
        .independent(independent)
        .binned(false)
        .with_values(readout.values(key)?.iter().copied())
}

/// Unbinned independent variable from the label series `key`.
pub fn label_variable(readout: &Readout, key: &str, name: &str) -> Result<Variable> {
    Variable::new(name).binned(false).with_values(readout.labels(key)?.iter().cloned())
}

/// Uncertainty from the error series `key`: symmetric for values, asymmetric for pairs.
pub fn uncertainty_from_readout(readout: &Readout, key: &str, label: &str) -> Result<Uncertainty> {
    match readout.get(key) {
        Some(Series::Values(v)) => Uncertainty::new(label).with_values(v.iter().copied()),
        Some(Series::Pairs(v)) => Uncertainty::asymmetric(label).with_values(v.iter().copied()),
        Some(Series::Labels(_)) => {
            Err(Error::type_error(format!("series '{key}' holds labels, not errors")))
        }
        None => Err(Error::validation(format!("readout has no series '{key}'"))),
    }
}

/// A histogram of either dimension, read over its full range.
#[derive(Debug, Clone, Copy)]
pub enum HistRef<'a> {
    OneD(&'a dyn Hist1D),
    TwoD(&'a dyn Hist2D),
}

impl<'a> HistRef<'a> {
    pub fn name(self) -> &'a str {
        match self {
            HistRef::OneD(h) => h.name(),
            HistRef::TwoD(h) => h.name(),
        }
    }

    /// Axis ids in bin order: `x`, then `y` for two dimensions.
    pub fn axis_ids(self) -> &'static [&'static str] {
        match self {
            HistRef::OneD(_) => &["x"],
            HistRef::TwoD(_) => &["x", "y"],
        }
    }

    /// Every bin, x-major for two dimensions, optionally with the flow bins.
    pub fn readout(self, include_flow: bool) -> Result<Readout> {
        match self {
            HistRef::OneD(h) => hist_1d_points(h, &Hist1DOptions::default().include_flow(include_flow)),
            HistRef::TwoD(h) => hist_2d_points(h, &Hist2DOptions::default().include_flow(include_flow)),
        }
    }

    fn contents_key(self) -> &'static str {
        match self {
            HistRef::OneD(_) => "y",
            HistRef::TwoD(_) => "z",
        }
    }

    /// Bin contents in readout order.
    pub fn contents(self, include_flow: bool) -> Result<Vec<f64>> {
        Ok(self.readout(include_flow)?.values(self.contents_key())?.to_vec())
    }
}

/// Per-bin numbers for a histogram uncertainty.
#[derive(Debug, Clone)]
pub enum BinValues<'a> {
    /// The same value in every bin.
    Flat(f64),
    /// One value per bin, in readout order.
    PerBin(Vec<f64>),
    /// Contents of a histogram with the same binning.
    Hist(HistRef<'a>),
}

impl BinValues<'_> {
    fn resolve(&self, label: &str, n_bins: usize, include_flow: bool) -> Result<Vec<f64>> {
        let values = match self {
            BinValues::Flat(v) => vec![*v; n_bins],
            BinValues::PerBin(v) => v.clone(),
            BinValues::Hist(h) => h.contents(include_flow)?,
        };
        if values.len() != n_bins {
            return Err(Error::validation(format!(
                "uncertainty '{label}' has {} value(s), the histogram has {n_bins} bin(s)",
                values.len()
            )));
        }
        Ok(values)
    }
}

/// How to build one uncertainty of [`hist_as_variable`].
#[derive(Debug, Clone)]
pub enum HistUncertainty<'a> {
    Symmetric(BinValues<'a>),
    /// Signed `(down, up)` parts, taken as given.
    Asymmetric(BinValues<'a>, BinValues<'a>),
}

/// Independent variables for the axes of `hist`.
///
/// Each axis is named by its id (`x`, `y`) unless `renames` maps the id to a
/// new name, and takes its units from `units`. Labelled axes become unbinned
/// label variables, all others binned variables of edge pairs. Two-dimensional
/// histograms repeat the axis values so that every bin has a row.
pub fn hist_axis_variables(
    hist: HistRef<'_>,
    include_flow: bool,
    renames: &[(&str, &str)],
    units: &[(&str, &str)],
) -> Result<Vec<Variable>> {
    let readout = hist.readout(include_flow)?;
    let mut variables = Vec::new();
    for &id in hist.axis_ids() {
        let name = lookup(renames, id).unwrap_or(id);
        let labels_key = format!("{id}_labels");
        let mut variable = if readout.contains_key(&labels_key) {
            label_variable(&readout, &labels_key, name)?
        } else {
            axis_variable(&readout, &format!("{id}_edges"), name)?
        };
        if let Some(units) = lookup(units, id) {
            variable.set_units(units);
        }
        variables.push(variable);
    }
    Ok(variables)
}

fn lookup<'a>(pairs: &[(&str, &'a str)], id: &str) -> Option<&'a str> {
    pairs.iter().find(|(key, _)| *key == id).map(|(_, value)| *value)
}

/// Dependent variable holding the bin contents of `hist`, with uncertainties.
///
/// Uncertainty values must line up with the bins read; a length mismatch is a
/// validation error.
pub fn hist_as_variable(
    hist: HistRef<'_>,
    name: &str,
    include_flow: bool,
    uncertainties: &[(&str, HistUncertainty<'_>)],
) -> Result<Variable> {
    let contents = hist.contents(include_flow)?;
    let n_bins = contents.len();
    let mut variable = Variable::new(name).independent(false).binned(false).with_values(contents)?;

    for (label, spec) in uncertainties {
        let uncertainty = match spec {
            HistUncertainty::Symmetric(values) => {
                Uncertainty::new(*label).with_values(values.resolve(label, n_bins, include_flow)?)?
            }
            HistUncertainty::Asymmetric(down, up) => {
                let down = down.resolve(label, n_bins, include_flow)?;
                let up = up.resolve(label, n_bins, include_flow)?;
                Uncertainty::asymmetric(*label).with_values(down.into_iter().zip(up))?
            }
        };
        variable.add_uncertainty(uncertainty)?;
    }
    tracing::debug!(
        "histogram '{}' as variable '{name}' with {} uncertainty(ies)",
        hist.name(),
        uncertainties.len()
    );
    Ok(variable)
}
