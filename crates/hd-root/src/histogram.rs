//! In-memory histograms implementing [`Hist1D`] and [`Hist2D`].
//!
//! Storage follows ROOT: one slot per bin including under- and overflow, an
//! optional sum of squared weights, and optional explicit low/up errors for
//! histograms in [`ErrorMode::Poisson`].

use hd_core::{Error, Result};

use crate::axis::BinAxis;
use crate::objects::{ErrorMode, Hist1D, Hist2D};

/// Explicit asymmetric errors, one slot per bin including flow bins.
#[derive(Debug, Clone, PartialEq)]
struct AsymmetricErrors {
    low: Vec<f64>,
    up: Vec<f64>,
}

impl AsymmetricErrors {
    fn zeros(n: usize) -> Self {
        Self { low: vec![0.0; n], up: vec![0.0; n] }
    }
}

/// A 1D histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram1D {
    /// Histogram name.
    pub name: String,
    axis: BinAxis,
    /// Bin contents (length = n_bins + 2, including under/overflow).
    contents: Vec<f64>,
    /// Sum of weights squared per bin, if errors were stored.
    sumw2: Option<Vec<f64>>,
    asymmetric: Option<AsymmetricErrors>,
    error_mode: ErrorMode,
}

impl Histogram1D {
    /// Empty histogram on `axis`.
    pub fn new(name: impl Into<String>, axis: BinAxis) -> Self {
        let n = axis.n_bins() + 2;
        Self {
            name: name.into(),
            axis,
            contents: vec![0.0; n],
            sumw2: None,
            asymmetric: None,
            error_mode: ErrorMode::Normal,
        }
    }

    /// Set the in-range contents (`n_bins` values).
    pub fn with_contents(mut self, contents: &[f64]) -> Result<Self> {
        check_len("contents", contents.len(), self.axis.n_bins())?;
        self.contents[1..=contents.len()].copy_from_slice(contents);
        Ok(self)
    }

    /// Set the in-range symmetric errors (`n_bins` values).
    pub fn with_errors(mut self, errors: &[f64]) -> Result<Self> {
        check_len("errors", errors.len(), self.axis.n_bins())?;
        for (i, e) in errors.iter().enumerate() {
            self.set_bin_error(i + 1, *e)?;
        }
        Ok(self)
    }

    /// Set in-range low/up errors and switch to [`ErrorMode::Poisson`].
    pub fn with_asymmetric_errors(mut self, low: &[f64], up: &[f64]) -> Result<Self> {
        check_len("low errors", low.len(), self.axis.n_bins())?;
        check_len("up errors", up.len(), self.axis.n_bins())?;
        let mut errors = AsymmetricErrors::zeros(self.contents.len());
        errors.low[1..=low.len()].copy_from_slice(low);
        errors.up[1..=up.len()].copy_from_slice(up);
        self.asymmetric = Some(errors);
        self.error_mode = ErrorMode::Poisson;
        Ok(self)
    }

    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Add `weight` to the bin containing `x`.
    pub fn fill(&mut self, x: f64, weight: f64) {
        let bin = self.axis.find_bin(x);
        self.contents[bin] += weight;
        let n = self.contents.len();
        let sumw2 = self.sumw2.get_or_insert_with(|| vec![0.0; n]);
        sumw2[bin] += weight * weight;
    }

    /// Set the content of `bin` (0 underflow, `n + 1` overflow).
    pub fn set_bin_content(&mut self, bin: usize, value: f64) -> Result<()> {
        check_bin("bin", bin, self.axis.n_bins())?;
        self.contents[bin] = value;
        Ok(())
    }

    pub fn set_bin_error(&mut self, bin: usize, error: f64) -> Result<()> {
        check_bin("bin", bin, self.axis.n_bins())?;
        let n = self.contents.len();
        self.sumw2.get_or_insert_with(|| vec![0.0; n])[bin] = error * error;
        Ok(())
    }

    /// Sum of in-range contents.
    pub fn integral(&self) -> f64 {
        self.contents[1..=self.axis.n_bins()].iter().sum()
    }
}

impl Hist1D for Histogram1D {
    fn name(&self) -> &str {
        &self.name
    }

    fn x_axis(&self) -> &BinAxis {
        &self.axis
    }

    fn bin_content(&self, bin: usize) -> f64 {
        self.contents.get(bin).copied().unwrap_or(0.0)
    }

    fn bin_error(&self, bin: usize) -> f64 {
        match &self.sumw2 {
            Some(sumw2) => sumw2.get(bin).copied().unwrap_or(0.0).sqrt(),
            None => self.bin_content(bin).abs().sqrt(),
        }
    }

    fn bin_error_low(&self, bin: usize) -> f64 {
        match &self.asymmetric {
            Some(e) => e.low.get(bin).copied().unwrap_or(0.0),
            None => self.bin_error(bin),
        }
    }

    fn bin_error_up(&self, bin: usize) -> f64 {
        match &self.asymmetric {
            Some(e) => e.up.get(bin).copied().unwrap_or(0.0),
            None => self.bin_error(bin),
        }
    }

    fn error_mode(&self) -> ErrorMode {
        self.error_mode
    }
}

/// A 2D histogram. Bin `(x, y)` is stored at `x + (nx + 2) * y`.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram2D {
    /// Histogram name.
    pub name: String,
    x_axis: BinAxis,
    y_axis: BinAxis,
    contents: Vec<f64>,
    sumw2: Option<Vec<f64>>,
    asymmetric: Option<AsymmetricErrors>,
    error_mode: ErrorMode,
}

impl Histogram2D {
    pub fn new(name: impl Into<String>, x_axis: BinAxis, y_axis: BinAxis) -> Self {
        let n = (x_axis.n_bins() + 2) * (y_axis.n_bins() + 2);
        Self {
            name: name.into(),
            x_axis,
            y_axis,
            contents: vec![0.0; n],
            sumw2: None,
            asymmetric: None,
            error_mode: ErrorMode::Normal,
        }
    }

    /// Global bin index.
    pub fn bin(&self, x_bin: usize, y_bin: usize) -> usize {
        x_bin + (self.x_axis.n_bins() + 2) * y_bin
    }

    pub fn fill(&mut self, x: f64, y: f64, weight: f64) {
        let bin = self.bin(self.x_axis.find_bin(x), self.y_axis.find_bin(y));
        self.contents[bin] += weight;
        let n = self.contents.len();
        self.sumw2.get_or_insert_with(|| vec![0.0; n])[bin] += weight * weight;
    }

    /// Global bin index, checked against both axes including flow bins.
    fn checked_bin(&self, x_bin: usize, y_bin: usize) -> Result<usize> {
        check_bin("x bin", x_bin, self.x_axis.n_bins())?;
        check_bin("y bin", y_bin, self.y_axis.n_bins())?;
        Ok(self.bin(x_bin, y_bin))
    }

    pub fn set_bin_content(&mut self, x_bin: usize, y_bin: usize, value: f64) -> Result<()> {
        let bin = self.checked_bin(x_bin, y_bin)?;
        self.contents[bin] = value;
        Ok(())
    }

    pub fn set_bin_error(&mut self, x_bin: usize, y_bin: usize, error: f64) -> Result<()> {
        let bin = self.checked_bin(x_bin, y_bin)?;
        let n = self.contents.len();
        self.sumw2.get_or_insert_with(|| vec![0.0; n])[bin] = error * error;
        Ok(())
    }

    /// Explicit low/up errors of one bin; switches to [`ErrorMode::Poisson`].
    pub fn set_bin_errors_asymmetric(
        &mut self,
        x_bin: usize,
        y_bin: usize,
        low: f64,
        up: f64,
    ) -> Result<()> {
        let bin = self.checked_bin(x_bin, y_bin)?;
        let n = self.contents.len();
        let errors = self.asymmetric.get_or_insert_with(|| AsymmetricErrors::zeros(n));
        errors.low[bin] = low;
        errors.up[bin] = up;
        self.error_mode = ErrorMode::Poisson;
        Ok(())
    }

    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }
}

impl Hist2D for Histogram2D {
    fn name(&self) -> &str {
        &self.name
    }

    fn x_axis(&self) -> &BinAxis {
        &self.x_axis
    }

    fn y_axis(&self) -> &BinAxis {
        &self.y_axis
    }

    fn bin_content(&self, x_bin: usize, y_bin: usize) -> f64 {
        self.contents.get(self.bin(x_bin, y_bin)).copied().unwrap_or(0.0)
    }

    fn bin_error(&self, x_bin: usize, y_bin: usize) -> f64 {
        match &self.sumw2 {
            Some(sumw2) => sumw2.get(self.bin(x_bin, y_bin)).copied().unwrap_or(0.0).sqrt(),
            None => self.bin_content(x_bin, y_bin).abs().sqrt(),
        }
    }

    fn bin_error_low(&self, x_bin: usize, y_bin: usize) -> f64 {
        match &self.asymmetric {
            Some(e) => e.low.get(self.bin(x_bin, y_bin)).copied().unwrap_or(0.0),
            None => self.bin_error(x_bin, y_bin),
        }
    }

    fn bin_error_up(&self, x_bin: usize, y_bin: usize) -> f64 {
        match &self.asymmetric {
            Some(e) => e.up.get(self.bin(x_bin, y_bin)).copied().unwrap_or(0.0),
            None => self.bin_error(x_bin, y_bin),
        }
    }

    fn error_mode(&self) -> ErrorMode {
        self.error_mode
    }
}

fn check_bin(what: &str, bin: usize, n_bins: usize) -> Result<()> {
    if bin > n_bins + 1 {
        return Err(Error::validation(format!(
            "{what} {bin} is out of range for an axis with {n_bins} bin(s) (0 to {} with flow bins)",
            n_bins + 1
        )));
    }
    Ok(())
}

fn check_len(what: &str, got: usize, n_bins: usize) -> Result<()> {
    if got != n_bins {
        return Err(Error::validation(format!("{got} {what} for a histogram with {n_bins} bin(s)")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_tracks_sumw2() {
        let mut h = Histogram1D::new("h", BinAxis::uniform(2, 0.0, 2.0).unwrap());
        h.fill(0.5, 2.0);
        h.fill(0.5, 1.0);
        h.fill(5.0, 1.0);
        assert_eq!(h.bin_content(1), 3.0);
        assert_eq!(h.bin_content(3), 1.0);
        assert!((h.bin_error(1) - 5f64.sqrt()).abs() < 1e-12);
        assert_eq!(h.integral(), 3.0);
    }

    #[test]
    fn errors_default_to_sqrt_content() {
        let h = Histogram1D::new("h", BinAxis::uniform(2, 0.0, 2.0).unwrap())
            .with_contents(&[4.0, 9.0])
            .unwrap();
        assert_eq!(h.bin_error(2), 3.0);
        assert_eq!(h.bin_error_low(2), 3.0);
        assert!(h.clone().with_contents(&[1.0]).is_err());
    }

    #[test]
    fn global_bin_2d() {
        let mut h = Histogram2D::new(
            "h2",
            BinAxis::uniform(3, 0.0, 3.0).unwrap(),
            BinAxis::uniform(2, 0.0, 2.0).unwrap(),
        );
        assert_eq!(h.bin(1, 1), 6);
        h.fill(2.5, 0.5, 1.0);
        assert_eq!(h.bin_content(3, 1), 1.0);
        h.set_bin_errors_asymmetric(3, 1, 0.4, 0.7).unwrap();
        assert_eq!(h.error_mode(), ErrorMode::Poisson);
        assert_eq!(h.bin_error_up(3, 1), 0.7);
    }

    #[test]
    fn out_of_range_bins_are_rejected() {
        let mut h = Histogram1D::new("h", BinAxis::uniform(2, 0.0, 2.0).unwrap());
        h.set_bin_content(3, 1.0).unwrap();
        assert!(matches!(h.set_bin_content(4, 1.0), Err(Error::Validation(_))));
        assert!(matches!(h.set_bin_error(10, 1.0), Err(Error::Validation(_))));
        assert_eq!(h.bin_content(3), 1.0);

        let mut h2 = Histogram2D::new(
            "h2",
            BinAxis::uniform(3, 0.0, 3.0).unwrap(),
            BinAxis::uniform(2, 0.0, 2.0).unwrap(),
        );
        h2.set_bin_content(4, 3, 1.0).unwrap();
        // (5, 0) would alias bin (0, 1) in the flat storage.
        assert!(matches!(h2.set_bin_content(5, 0, 1.0), Err(Error::Validation(_))));
        assert!(matches!(h2.set_bin_error(1, 4, 1.0), Err(Error::Validation(_))));
        assert!(matches!(
            h2.set_bin_errors_asymmetric(9, 9, 0.1, 0.2),
            Err(Error::Validation(_))
        ));
        assert_eq!(h2.error_mode(), ErrorMode::Normal);
        assert_eq!(h2.bin_content(0, 1), 0.0);
    }
}
