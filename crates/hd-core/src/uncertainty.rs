//! Per-element uncertainty series.

use crate::value::{Entry, Scalar};
use crate::{Error, Result};

/// A labelled uncertainty series bound to one [`Variable`](crate::Variable).
///
/// Symmetric uncertainties hold one scalar per element, asymmetric ones a
/// `(down, up)` pair per element, or a whole-entry null for elements without
/// an error. Signs are not checked: `(down, up)` is conventionally `down <= 0 <= up`
/// but one-sided and inverted errors are stored as given.
#[derive(Debug, Clone, PartialEq)]
pub struct Uncertainty {
    label: String,
    is_symmetric: bool,
    values: Vec<Entry>,
}

impl Uncertainty {
    /// Symmetric uncertainty without values.
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_symmetry(label, true)
    }

    /// Asymmetric uncertainty without values.
    pub fn asymmetric(label: impl Into<String>) -> Self {
        Self::with_symmetry(label, false)
    }

    pub fn with_symmetry(label: impl Into<String>, is_symmetric: bool) -> Self {
        Self { label: label.into(), is_symmetric, values: Vec::new() }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_symmetric(&self) -> bool {
        self.is_symmetric
    }

    pub fn values(&self) -> &[Entry] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Replace the values. Every entry must match the symmetry of the uncertainty.
    pub fn set_values<I, E>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = E>,
        E: Into<Entry>,
    {
        let values: Vec<Entry> = values.into_iter().map(Into::into).collect();
        for (i, entry) in values.iter().enumerate() {
            self.check_shape(i, entry)?;
        }
        self.values = values;
        Ok(())
    }

    /// Builder form of [`set_values`](Self::set_values).
    pub fn with_values<I, E>(mut self, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = E>,
        E: Into<Entry>,
    {
        self.set_values(values)?;
        Ok(self)
    }

    /// Set `(low - nominal, high - nominal)` for each interval.
    pub fn set_values_from_intervals(
        &mut self,
        intervals: &[(f64, f64)],
        nominal: &[f64],
    ) -> Result<()> {
        if intervals.len() != nominal.len() {
            return Err(Error::validation(format!(
                "uncertainty '{}': {} interval(s) for {} nominal value(s)",
                self.label,
                intervals.len(),
                nominal.len()
            )));
        }
        let pairs = intervals.iter().zip(nominal).map(|(&(lo, hi), &n)| (lo - n, hi - n));
        self.set_values(pairs)
    }

    /// Multiply every number by `factor`. Strings cannot be scaled.
    pub fn scale_values(&mut self, factor: f64) -> Result<()> {
        self.values = self.scaled_values(factor)?;
        Ok(())
    }

    pub(crate) fn scaled_values(&self, factor: f64) -> Result<Vec<Entry>> {
        self.values.iter().map(|e| e.scaled(factor)).collect()
    }

    pub(crate) fn replace_values_unchecked(&mut self, values: Vec<Entry>) {
        self.values = values;
    }

    /// True if element `i` carries a nonzero error. Nulls and empty strings count as zero.
    pub fn is_nonzero_at(&self, i: usize) -> bool {
        match self.values.get(i) {
            Some(Entry::Scalar(s)) => !s.is_zero_like(),
            Some(Entry::Pair(down, up)) => !down.is_zero_like() || !up.is_zero_like(),
            None => false,
        }
    }

    fn check_shape(&self, i: usize, entry: &Entry) -> Result<()> {
        match (self.is_symmetric, entry) {
            (true, Entry::Scalar(_)) | (false, Entry::Pair(..)) => Ok(()),
            (false, Entry::Scalar(Scalar::Null)) => Ok(()),
            (true, Entry::Pair(..)) => Err(Error::validation(format!(
                "symmetric uncertainty '{}' expects single values, element {i} is a pair",
                self.label
            ))),
            (false, Entry::Scalar(s)) => Err(Error::validation(format!(
                "asymmetric uncertainty '{}' expects (down, up) pairs, element {i} is '{s}'",
                self.label
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetric_values_are_sanitised() {
        let mut unc = Uncertainty::new("stat");
        unc.set_values([Entry::from(1), Entry::from(0.5_f32), Entry::from("n/a")]).unwrap();
        assert_eq!(
            unc.values(),
            &[
                Entry::Scalar(Scalar::Int(1)),
                Entry::Scalar(Scalar::Float(0.5)),
                Entry::Scalar(Scalar::Str("n/a".into())),
            ]
        );
        assert!(matches!(unc.set_values([(0.1, 0.2)]), Err(Error::Validation(_))));
    }

    #[test]
    fn asymmetric_accepts_any_signs() {
        let mut unc = Uncertainty::asymmetric("syst");
        unc.set_values([(-0.1, 0.2), (0.3, 0.1), (-0.2, -0.1)]).unwrap();
        assert_eq!(unc.len(), 3);
        unc.set_values([Entry::from(None::<f64>), Entry::from((-0.1, 0.1))]).unwrap();
        assert!(matches!(unc.set_values([0.1]), Err(Error::Validation(_))));
    }

    #[test]
    fn values_from_intervals() {
        let mut unc = Uncertainty::asymmetric("band");
        unc.set_values_from_intervals(&[(0.5, 2.0), (1.0, 4.0)], &[1.0, 3.0]).unwrap();
        assert_eq!(unc.values(), &[Entry::from((-0.5, 1.0)), Entry::from((-2.0, 1.0))]);

        let err = unc.set_values_from_intervals(&[(0.5, 2.0)], &[1.0, 3.0]);
        assert!(matches!(err, Err(Error::Validation(_))));
    }

    #[test]
    fn scaling() {
        let mut unc = Uncertainty::new("stat").with_values([1.0, 2.0]).unwrap();
        unc.scale_values(-2.0).unwrap();
        assert_eq!(unc.values(), &[Entry::from(-2.0), Entry::from(-4.0)]);

        let mut asym = Uncertainty::asymmetric("syst").with_values([(-1.0, 2.0)]).unwrap();
        asym.scale_values(0.5).unwrap();
        assert_eq!(asym.values(), &[Entry::from((-0.5, 1.0))]);

        let mut text = Uncertainty::new("t").with_values(["x"]).unwrap();
        assert!(matches!(text.scale_values(2.0), Err(Error::Type(_))));
    }

    #[test]
    fn nonzero_mask() {
        let unc = Uncertainty::asymmetric("a")
            .with_values([
                Entry::from((0.0, 0.0)),
                Entry::from(None::<f64>),
                Entry::from((0.0, 0.1)),
                Entry::from(("", "")),
            ])
            .unwrap();
        assert!(!unc.is_nonzero_at(0));
        assert!(!unc.is_nonzero_at(1));
        assert!(unc.is_nonzero_at(2));
        assert!(!unc.is_nonzero_at(3));
        assert!(!unc.is_nonzero_at(7));
    }
}
