//! Variables: ordered value lists with attached uncertainties.

use crate::record::{ErrorRecord, Header, Qualifier, ValueRecord, VariableRecord};
use crate::rounding::RelativeRound;
use crate::uncertainty::Uncertainty;
use crate::value::{Entry, Scalar, entries_from_json};
use crate::{Error, Result};

/// Default number of significant digits written for values and errors.
pub const DEFAULT_DIGITS: i32 = 5;

/// A named sequence of point values or `(low, high)` bins.
///
/// ```
/// use hd_core::{Uncertainty, Variable};
///
/// let mut y = Variable::new("Y").independent(false).binned(false).with_values([1.0, 2.0])?;
/// y.add_uncertainty(Uncertainty::new("stat").with_values([0.1, 0.2])?)?;
/// assert_eq!(y.make_record().values.len(), 2);
/// # Ok::<(), hd_core::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    name: String,
    is_independent: bool,
    is_binned: bool,
    units: Option<String>,
    values: Vec<Entry>,
    qualifiers: Vec<Qualifier>,
    uncertainties: Vec<Uncertainty>,
    digits: i32,
    zero_uncertainties_warning: bool,
}

impl Variable {
    /// Independent, binned variable without units or values.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_independent: true,
            is_binned: true,
            units: None,
            values: Vec::new(),
            qualifiers: Vec::new(),
            uncertainties: Vec::new(),
            digits: DEFAULT_DIGITS,
            zero_uncertainties_warning: true,
        }
    }

    pub fn independent(mut self, is_independent: bool) -> Self {
        self.is_independent = is_independent;
        self
    }

    /// Binned variables hold `(low, high)` pairs. Set before assigning values.
    pub fn binned(mut self, is_binned: bool) -> Self {
        self.is_binned = is_binned;
        self
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.set_units(units);
        self
    }

    /// Significant digits used by [`make_record`](Self::make_record).
    pub fn with_digits(mut self, digits: i32) -> Self {
        self.digits = digits;
        self
    }

    /// Log a warning for elements whose uncertainties are all zero (on by default).
    pub fn zero_uncertainties_warning(mut self, enabled: bool) -> Self {
        self.zero_uncertainties_warning = enabled;
        self
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

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_independent(&self) -> bool {
        self.is_independent
    }

    pub fn is_binned(&self) -> bool {
        self.is_binned
    }

    pub fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }

    /// Empty units are the same as none.
    pub fn set_units(&mut self, units: impl Into<String>) {
        let units = units.into();
        self.units = if units.is_empty() { None } else { Some(units) };
    }

    pub fn digits(&self) -> i32 {
        self.digits
    }

    pub fn set_digits(&mut self, digits: i32) {
        self.digits = digits;
    }

    pub fn values(&self) -> &[Entry] {
        &self.values
    }

    pub fn qualifiers(&self) -> &[Qualifier] {
        &self.qualifiers
    }

    pub fn uncertainties(&self) -> &[Uncertainty] {
        &self.uncertainties
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Replace the values.
    ///
    /// Binned variables need `(low, high)` pairs, unbinned ones single values.
    pub fn set_values<I, E>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = E>,
        E: Into<Entry>,
    {
        let values: Vec<Entry> = values.into_iter().map(Into::into).collect();
        if let Some(i) = values.iter().position(|e| e.is_pair() != self.is_binned) {
            let msg = if self.is_binned {
                format!(
                    "variable '{}': binned values must be (low, high) pairs, element {i} is not",
                    self.name
                )
            } else {
                format!(
                    "variable '{}': unbinned values must be single values, element {i} is a pair",
                    self.name
                )
            };
            return Err(Error::Validation(msg));
        }
        self.values = values;
        Ok(())
    }

    /// Set values from a JSON list, e.g. `[[0, 1], [1, 2]]` or `[1.5, "x", null]`.
    pub fn set_values_json(&mut self, values: &serde_json::Value) -> Result<()> {
        let entries = entries_from_json(values).map_err(|e| {
            Error::validation(format!("malformed values for variable '{}': {e}", self.name))
        })?;
        self.set_values(entries)
    }

    /// Multiply every value and every attached uncertainty by `factor`.
    ///
    /// Nothing changes if any element cannot be scaled.
    pub fn scale_values(&mut self, factor: f64) -> Result<()> {
        let values: Vec<Entry> =
            self.values.iter().map(|e| e.scaled(factor)).collect::<Result<_>>()?;
        let uncertainties: Vec<Vec<Entry>> =
            self.uncertainties.iter().map(|u| u.scaled_values(factor)).collect::<Result<_>>()?;

        self.values = values;
        for (unc, scaled) in self.uncertainties.iter_mut().zip(uncertainties) {
            unc.replace_values_unchecked(scaled);
        }
        Ok(())
    }

    /// Attach a measurement condition. Only dependent variables have qualifiers.
    pub fn add_qualifier(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Scalar>,
        units: Option<&str>,
    ) -> Result<()> {
        if self.is_independent {
            return Err(Error::State(format!(
                "qualifiers are not allowed for independent variables ('{}')",
                self.name
            )));
        }
        self.qualifiers.push(Qualifier {
            name: name.into(),
            units: units.filter(|u| !u.is_empty()).map(str::to_string),
            value: value.into(),
        });
        Ok(())
    }

    /// Attach an uncertainty. Its length must match once the variable has values.
    pub fn add_uncertainty(&mut self, uncertainty: Uncertainty) -> Result<()> {
        if !self.values.is_empty() && self.values.len() != uncertainty.len() {
            return Err(Error::validation(format!(
                "length of uncertainty '{}' ({}) differs from length of variable '{}' ({})",
                uncertainty.label(),
                uncertainty.len(),
                self.name,
                self.values.len()
            )));
        }
        self.uncertainties.push(uncertainty);
        Ok(())
    }

    fn any_uncertainty_nonzero(&self, i: usize) -> bool {
        self.uncertainties.iter().any(|u| u.is_nonzero_at(i))
    }

    fn error_record(&self, unc: &Uncertainty, entry: &Entry) -> Option<ErrorRecord> {
        let digits = self.digits;
        match entry {
            Entry::Scalar(Scalar::Null) => None,
            Entry::Scalar(s) => Some(ErrorRecord::symmetric(unc.label(), s.relative_round(digits))),
            Entry::Pair(down, up) => {
                let as_number = |s: &Scalar| match s {
                    Scalar::Null => Some(0.0),
                    other => other.as_f64(),
                };
                let collapses = matches!(
                    (as_number(down), as_number(up)),
                    (Some(d), Some(u)) if d + u == 0.0
                );
                if collapses {
                    Some(ErrorRecord::symmetric(unc.label(), up.relative_round(digits)))
                } else {
                    Some(ErrorRecord::asymmetric(
                        unc.label(),
                        down.relative_round(digits),
                        up.relative_round(digits),
                    ))
                }
            }
        }
    }

    /// Exportable form of this variable.
    ///
    /// Values and errors are rounded to `digits` significant figures. Elements whose
    /// uncertainties are all zero get no `errors` entry; symmetric-looking asymmetric
    /// errors (`down + up == 0`) are written as `symerror`.
    pub fn make_record(&self) -> VariableRecord {
        let digits = self.digits;
        let mut values = Vec::with_capacity(self.values.len());

        for (i, entry) in self.values.iter().enumerate() {
            let mut record = match entry {
                Entry::Pair(low, high) => ValueRecord {
                    low: Some(low.relative_round(digits)),
                    high: Some(high.relative_round(digits)),
                    ..Default::default()
                },
                Entry::Scalar(v) => {
                    ValueRecord { value: Some(v.relative_round(digits)), ..Default::default() }
                }
            };

            if self.any_uncertainty_nonzero(i) {
                record.errors = self
                    .uncertainties
                    .iter()
                    .filter_map(|unc| unc.values().get(i).and_then(|e| self.error_record(unc, e)))
                    .collect();
            } else if !self.uncertainties.is_empty() && self.zero_uncertainties_warning {
                tracing::warn!(
                    "omitting 'errors' since all uncertainties are zero for bin {} of variable '{}'; \
                     bins with zero content should preferably be omitted from the table",
                    i + 1,
                    self.name
                );
            }
            values.push(record);
        }

        VariableRecord {
            header: Header { name: self.name.clone(), units: self.units.clone() },
            qualifiers: self.qualifiers.clone(),
            values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn floats(entries: &[Entry]) -> Vec<f64> {
        entries
            .iter()
            .flat_map(|e| match e {
                Entry::Scalar(s) => vec![s.as_f64().unwrap()],
                Entry::Pair(a, b) => vec![a.as_f64().unwrap(), b.as_f64().unwrap()],
            })
            .collect()
    }

    #[test]
    fn shape_follows_binning() {
        let mut binned = Variable::new("x");
        binned.set_values([(0.0, 1.0), (1.0, 2.0)]).unwrap();
        assert!(matches!(binned.set_values([1.0, 2.0]), Err(Error::Validation(_))));
        assert_eq!(binned.len(), 2, "failed assignment must keep old values");

        let mut unbinned = Variable::new("y").binned(false);
        unbinned.set_values([1.0, 2.0]).unwrap();
        assert!(matches!(unbinned.set_values([(0.0, 1.0)]), Err(Error::Validation(_))));
    }

    #[test]
    fn json_values() {
        let mut v = Variable::new("x");
        v.set_values_json(&json!([[0, 1], [1, 2.5]])).unwrap();
        assert_eq!(v.values()[1], Entry::Pair(Scalar::Int(1), Scalar::Float(2.5)));
        assert!(matches!(v.set_values_json(&json!([[0, 1, 2]])), Err(Error::Validation(_))));
        assert!(matches!(v.set_values_json(&json!([1, 2])), Err(Error::Validation(_))));

        let mut u = Variable::new("y").binned(false);
        u.set_values_json(&json!([1, "two", null])).unwrap();
        assert_eq!(u.values()[2], Entry::Scalar(Scalar::Null));
    }

    #[test]
    fn qualifiers_only_on_dependent() {
        let mut x = Variable::new("x");
        assert!(matches!(x.add_qualifier("SQRT(S)", 13000, Some("GeV")), Err(Error::State(_))));

        let mut y = Variable::new("y").independent(false);
        y.add_qualifier("SQRT(S)", 13000, Some("GeV")).unwrap();
        y.add_qualifier("Reaction", "P P --> X", None).unwrap();
        assert_eq!(y.qualifiers().len(), 2);
        assert_eq!(y.qualifiers()[1].units, None);
    }

    #[test]
    fn uncertainty_length_checked_against_values() {
        let mut v = Variable::new("y").binned(false);
        v.add_uncertainty(Uncertainty::new("early").with_values([0.1; 5]).unwrap()).unwrap();

        v.set_values([1.0, 2.0, 3.0]).unwrap();
        let err = v.add_uncertainty(Uncertainty::new("bad").with_values([0.1, 0.2]).unwrap());
        assert!(matches!(err, Err(Error::Validation(_))));
        v.add_uncertainty(Uncertainty::new("ok").with_values([0.1, 0.2, 0.3]).unwrap()).unwrap();
        assert_eq!(v.uncertainties().len(), 2);
    }

    #[test]
    fn scaling_round_trip() {
        let mut v = Variable::new("x").with_values([(0.5, 1.5), (1.5, 2.25)]).unwrap();
        v.add_uncertainty(Uncertainty::new("sym").with_values([0.1, 0.3]).unwrap()).unwrap();
        v.add_uncertainty(
            Uncertainty::asymmetric("asym").with_values([(-0.1, 0.2), (-0.05, 0.7)]).unwrap(),
        )
        .unwrap();
        let before = v.clone();

        for factor in [3.7, -0.25, 1e-3, 12345.0] {
            v.scale_values(factor).unwrap();
            v.scale_values(1.0 / factor).unwrap();
            for (a, b) in floats(v.values()).iter().zip(floats(before.values())) {
                assert_relative_eq!(*a, b, max_relative = 1e-12);
            }
            for (ua, ub) in v.uncertainties().iter().zip(before.uncertainties()) {
                for (a, b) in floats(ua.values()).iter().zip(floats(ub.values())) {
                    assert_relative_eq!(*a, b, max_relative = 1e-12);
                }
            }
        }
    }

    #[test]
    fn failed_scaling_changes_nothing() {
        let mut v = Variable::new("y").binned(false).with_values([1.0, 2.0]).unwrap();
        v.add_uncertainty(Uncertainty::new("stat").with_values([0.1, 0.2]).unwrap()).unwrap();
        v.add_uncertainty(Uncertainty::new("text").with_values(["a", "b"]).unwrap()).unwrap();
        let before = v.clone();
        assert!(matches!(v.scale_values(2.0), Err(Error::Type(_))));
        assert_eq!(v, before);
    }

    #[test]
    fn record_omits_zero_errors() {
        let mut v = Variable::new("y")
            .binned(false)
            .independent(false)
            .zero_uncertainties_warning(false)
            .with_values([1.0, 2.0, 3.0])
            .unwrap();
        v.add_uncertainty(Uncertainty::new("stat").with_values([0.0, 0.1, 0.0]).unwrap()).unwrap();
        v.add_uncertainty(
            Uncertainty::asymmetric("syst")
                .with_values([Entry::from((0.0, 0.0)), Entry::from((0.0, 0.0)), Entry::from(None::<f64>)])
                .unwrap(),
        )
        .unwrap();

        let record = v.make_record();
        assert!(record.values[0].errors.is_empty());
        assert_eq!(record.values[1].errors.len(), 2);
        assert!(record.values[2].errors.is_empty());
    }

    #[test]
    fn record_error_kinds() {
        let mut v = Variable::new("y").binned(false).with_values([10.0, 20.0]).unwrap();
        v.add_uncertainty(
            Uncertainty::asymmetric("syst").with_values([(-0.5, 0.5), (-0.25, 0.75)]).unwrap(),
        )
        .unwrap();
        v.add_uncertainty(
            Uncertainty::asymmetric("partial")
                .with_values([Entry::from(None::<f64>), Entry::from((-0.1, 0.3))])
                .unwrap(),
        )
        .unwrap();

        let record = v.make_record();
        let first = &record.values[0].errors;
        assert_eq!(first.len(), 1, "null entry is skipped");
        assert_eq!(first[0], ErrorRecord::symmetric("syst", Scalar::Float(0.5)));

        let second = &record.values[1].errors;
        assert_eq!(
            second[0],
            ErrorRecord::asymmetric("syst", Scalar::Float(-0.25), Scalar::Float(0.75))
        );
        assert_eq!(second[1].label, "partial");
    }

    #[test]
    fn record_rounds_to_digits() {
        let v = Variable::new("x").with_digits(3).with_values([(0.123456, 1.98765)]).unwrap();
        let record = v.make_record();
        assert_eq!(record.values[0].low, Some(Scalar::Float(0.123)));
        assert_eq!(record.values[0].high, Some(Scalar::Float(1.99)));
        assert_eq!(record.header.units, None);
    }

    #[test]
    fn record_yaml() {
        let mut v = Variable::new("m")
            .with_units("GeV")
            .binned(false)
            .independent(false)
            .with_values([Scalar::from(1.5), Scalar::from("n/a")])
            .unwrap();
        v.add_qualifier("SQRT(S)", 13, Some("TeV")).unwrap();
        v.add_uncertainty(Uncertainty::new("stat").with_values([0.25, 0.0]).unwrap()).unwrap();
        let yaml = serde_yaml_ng::to_string(&v.zero_uncertainties_warning(false).make_record())
            .unwrap();
        assert_eq!(
            yaml,
            "header:\n  name: m\n  units: GeV\nqualifiers:\n- name: SQRT(S)\n  units: TeV\n  value: 13\n\
             values:\n- errors:\n  - label: stat\n    symerror: 0.25\n  value: 1.5\n- value: n/a\n"
        );
    }
}
