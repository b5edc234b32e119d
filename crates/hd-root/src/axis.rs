//! Histogram axis with ROOT bin numbering.
//!
//! Bins are 1-based: bin 0 is the underflow, bin `n + 1` the overflow.

use hd_core::{Error, Result};

/// Bin edges plus optional alphanumeric bin labels.
#[derive(Debug, Clone, PartialEq)]
pub struct BinAxis {
    edges: Vec<f64>,
    labels: Option<Vec<String>>,
}

impl BinAxis {
    /// `n_bins` equal-width bins on `[low, high)`.
    pub fn uniform(n_bins: usize, low: f64, high: f64) -> Result<Self> {
        if n_bins == 0 {
            return Err(Error::validation("axis needs at least one bin"));
        }
        if !(low.is_finite() && high.is_finite() && low < high) {
            return Err(Error::validation(format!("invalid axis range [{low}, {high})")));
        }
        let width = (high - low) / n_bins as f64;
        let mut edges: Vec<f64> = (0..n_bins).map(|i| low + i as f64 * width).collect();
        edges.push(high);
        Ok(Self { edges, labels: None })
    }

    /// Variable-width bins from strictly increasing edges.
    pub fn variable(edges: Vec<f64>) -> Result<Self> {
        if edges.len() < 2 {
            return Err(Error::validation("axis needs at least two edges"));
        }
        if edges.iter().any(|e| !e.is_finite()) || edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::validation(format!(
                "axis edges must be finite and strictly increasing: {edges:?}"
            )));
        }
        Ok(Self { edges, labels: None })
    }

    /// Attach one label per bin.
    pub fn with_labels<S: Into<String>>(mut self, labels: impl IntoIterator<Item = S>) -> Result<Self> {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.len() != self.n_bins() {
            return Err(Error::validation(format!(
                "{} label(s) for an axis with {} bin(s)",
                labels.len(),
                self.n_bins()
            )));
        }
        self.labels = Some(labels);
        Ok(self)
    }

    /// Number of in-range bins.
    pub fn n_bins(&self) -> usize {
        self.edges.len() - 1
    }

    /// All edges, `n_bins + 1` of them.
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Lower edge of in-range bin `bin`.
    pub fn low_edge(&self, bin: usize) -> f64 {
        self.edges[bin - 1]
    }

    /// Upper edge of in-range bin `bin`.
    pub fn up_edge(&self, bin: usize) -> f64 {
        self.edges[bin]
    }

    pub fn bin_center(&self, bin: usize) -> f64 {
        0.5 * (self.low_edge(bin) + self.up_edge(bin))
    }

    pub fn bin_width(&self, bin: usize) -> f64 {
        self.up_edge(bin) - self.low_edge(bin)
    }

    /// Bin containing `x`: 0 below the axis, `n + 1` at or above the upper edge (and for NaN).
    pub fn find_bin(&self, x: f64) -> usize {
        let n = self.n_bins();
        if x < self.edges[0] {
            0
        } else if x.is_nan() || x >= self.edges[n] {
            n + 1
        } else {
            self.edges.partition_point(|&e| e <= x)
        }
    }

    pub fn labels(&self) -> Option<&[String]> {
        self.labels.as_deref()
    }

    /// Label of bin `bin`, empty for flow bins.
    pub fn label(&self, bin: usize) -> Option<&str> {
        let labels = self.labels.as_ref()?;
        Some(match bin {
            0 => "",
            b if b > labels.len() => "",
            b => labels[b - 1].as_str(),
        })
    }
}
