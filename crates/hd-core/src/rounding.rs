//! Significant-digit rounding of values and their uncertainties.
//!
//! Rounding is done on the exact binary value with round-half-to-even, through
//! the correctly rounded decimal formatting of the standard library, so results
//! are reproducible bit for bit. Zero, NaN, infinities and strings are never
//! rounded and come back unchanged.
//!
//! Precision convention: `number_precision(x) == ceil(log10(|x|))` evaluated on the
//! shortest decimal representation of `x`, so exact decimal powers of ten get the
//! precision of their exponent (`10.0 -> 1`, `0.1 -> -1`).

use crate::readout::{Readout, Series};
use crate::value::{Entry, Scalar};
use crate::{Error, Result};

/// Largest number of decimals that can still change an `f64`.
const MAX_DECIMALS: i32 = 343;
/// Rounding to more than this many tens always gives zero.
const MAX_NEGATIVE_DECIMALS: i32 = 308;

/// Decimal exponent of a finite non-zero value and whether its mantissa is exactly 1.
fn decimal_exponent(value: f64) -> (i32, bool) {
    let repr = format!("{:e}", value.abs());
    match repr.split_once('e') {
        Some((mantissa, exp)) => match exp.parse::<i32>() {
            Ok(exp) => (exp, mantissa == "1"),
            Err(_) => (value.abs().log10().floor() as i32, false),
        },
        None => (value.abs().log10().floor() as i32, false),
    }
}

/// `ceil(log10(|value|))`, `None` for zero, NaN and infinities.
pub fn number_precision(value: f64) -> Option<i32> {
    if value == 0.0 || !value.is_finite() {
        return None;
    }
    let (exp, power_of_ten) = decimal_exponent(value);
    Some(if power_of_ten { exp } else { exp + 1 })
}

fn ten_to(m: i32) -> f64 {
    format!("1e{m}").parse().unwrap_or(f64::INFINITY)
}

/// Round to `decimals` places after the decimal point (negative: to tens, hundreds, ...).
///
/// Ties go to the even neighbour of the exact binary value.
pub fn round_to_decimals(value: f64, decimals: i32) -> f64 {
    if value == 0.0 || !value.is_finite() || decimals > MAX_DECIMALS {
        return value;
    }
    if decimals >= 0 {
        return format!("{:.*}", decimals as usize, value).parse().unwrap_or(value);
    }

    let m = -decimals;
    if m > MAX_NEGATIVE_DECIMALS {
        return 0.0_f64.copysign(value);
    }
    let (exp, _) = decimal_exponent(value);
    let significant = exp - m + 1;
    if significant >= 1 {
        format!("{:.*e}", (significant - 1) as usize, value).parse().unwrap_or(value)
    } else if significant == 0 {
        // |value| lies in [10^(m-1), 10^m): the result is either 0 or 10^m.
        let leading: f64 = format!("{:e}", value.abs())
            .split_once('e')
            .and_then(|(mantissa, _)| mantissa.parse().ok())
            .unwrap_or(0.0);
        if leading > 5.0 { ten_to(m).copysign(value) } else { 0.0_f64.copysign(value) }
    } else {
        0.0_f64.copysign(value)
    }
}

/// Round an integer to `decimals` places (only negative values change anything).
fn round_int(value: i64, decimals: i32) -> i64 {
    if decimals >= 0 {
        return value;
    }
    let Some(step) = 10_i64.checked_pow((-decimals) as u32) else {
        return 0;
    };
    let q = value.div_euclid(step);
    let r = value.rem_euclid(step);
    let twice = i128::from(r) * 2;
    let step_wide = i128::from(step);
    let q = if twice > step_wide || (twice == step_wide && q % 2 != 0) { q + 1 } else { q };
    q.saturating_mul(step)
}

/// Round to `digits` significant figures.
pub fn relative_round(value: f64, digits: i32) -> f64 {
    match number_precision(value) {
        Some(precision) => round_to_decimals(value, digits - precision),
        None => value,
    }
}

/// Precision in significant-digit terms.
pub trait NumberPrecision {
    /// `Option<i32>` for single values, a tuple of them for pairs.
    type Output;

    /// See [`number_precision`].
    fn number_precision(&self) -> Self::Output;
}

impl NumberPrecision for f64 {
    type Output = Option<i32>;

    fn number_precision(&self) -> Option<i32> {
        number_precision(*self)
    }
}

impl NumberPrecision for Scalar {
    type Output = Option<i32>;

    fn number_precision(&self) -> Option<i32> {
        self.as_f64().and_then(number_precision)
    }
}

impl<A: NumberPrecision, B: NumberPrecision> NumberPrecision for (A, B) {
    type Output = (A::Output, B::Output);

    fn number_precision(&self) -> Self::Output {
        (self.0.number_precision(), self.1.number_precision())
    }
}

/// Significant-figure rounding that leaves sentinel values alone.
pub trait RelativeRound: Sized {
    /// Round to `digits` significant figures.
    fn relative_round(&self, digits: i32) -> Self;
}

impl RelativeRound for f64 {
    fn relative_round(&self, digits: i32) -> f64 {
        relative_round(*self, digits)
    }
}

impl RelativeRound for Scalar {
    fn relative_round(&self, digits: i32) -> Scalar {
        match self {
            Scalar::Float(v) => Scalar::Float(relative_round(*v, digits)),
            Scalar::Int(v) => match number_precision(*v as f64) {
                Some(precision) => Scalar::Int(round_int(*v, digits - precision)),
                None => Scalar::Int(*v),
            },
            Scalar::Str(_) | Scalar::Null => self.clone(),
        }
    }
}

impl RelativeRound for Entry {
    fn relative_round(&self, digits: i32) -> Entry {
        match self {
            Entry::Scalar(s) => Entry::Scalar(s.relative_round(digits)),
            Entry::Pair(a, b) => Entry::Pair(a.relative_round(digits), b.relative_round(digits)),
        }
    }
}

impl<A: RelativeRound, B: RelativeRound> RelativeRound for (A, B) {
    fn relative_round(&self, digits: i32) -> Self {
        (self.0.relative_round(digits), self.1.relative_round(digits))
    }
}

fn finite_precision(value: f64) -> Result<i32> {
    match number_precision(value) {
        Some(p) => Ok(p),
        None if value == 0.0 => Ok(0),
        None => Err(Error::type_error(format!("cannot take the precision of {value}"))),
    }
}

fn precision_wrt(value: f64, reference: f64) -> Result<i32> {
    Ok(finite_precision(value)? - finite_precision(reference)?)
}

/// Precision of `value` relative to `reference` (usually its uncertainty).
///
/// Zero counts as precision 0. Strings, nulls and non-finite numbers are a type error.
pub fn value_precision_wrt_reference(value: &Scalar, reference: &Scalar) -> Result<i32> {
    let numeric = |s: &Scalar| {
        s.as_f64().ok_or_else(|| {
            Error::type_error(format!("precision comparison needs numbers, got '{s}'"))
        })
    };
    precision_wrt(numeric(value)?, numeric(reference)?)
}

fn check_lengths(val_key: &str, n_val: usize, unc_key: &str, n_unc: usize) -> Result<()> {
    if n_val != n_unc {
        return Err(Error::validation(format!(
            "series '{val_key}' has {n_val} elements but '{unc_key}' has {n_unc}"
        )));
    }
    Ok(())
}

/// Round each uncertainty to `sig_digits_unc` significant figures and each value to
/// the matching precision.
///
/// For asymmetric `(down, up)` errors the larger side is rounded to `sig_digits_unc`
/// figures and sets the precision of the value; the smaller side keeps at least one
/// figure. `26.5345 ± 1.3456` at two digits becomes `26.5 ± 1.3`.
pub fn round_value_and_uncertainty(
    readout: &mut Readout,
    val_key: &str,
    unc_key: &str,
    sig_digits_unc: i32,
) -> Result<()> {
    let values = readout.values(val_key)?.to_vec();
    let uncertainty = readout
        .get(unc_key)
        .ok_or_else(|| Error::validation(format!("readout has no series '{unc_key}'")))?
        .clone();
    check_lengths(val_key, values.len(), unc_key, uncertainty.len())?;

    let mut rounded_values = Vec::with_capacity(values.len());
    let rounded_unc = match uncertainty {
        Series::Values(unc) => {
            let mut out = Vec::with_capacity(unc.len());
            for (&val, &u) in values.iter().zip(&unc) {
                out.push(relative_round(u, sig_digits_unc));
                let sig_val = sig_digits_unc + precision_wrt(val, u)?;
                rounded_values.push(relative_round(val, sig_val));
            }
            Series::Values(out)
        }
        Series::Pairs(unc) => {
            let mut out = Vec::with_capacity(unc.len());
            for (&val, &(down, up)) in values.iter().zip(&unc) {
                let mut sig = [sig_digits_unc, sig_digits_unc];
                let max_abs = if down.abs() < up.abs() {
                    sig[0] = (sig_digits_unc + precision_wrt(down, up)?).max(1);
                    up.abs()
                } else {
                    sig[1] = (sig_digits_unc + precision_wrt(up, down)?).max(1);
                    down.abs()
                };
                out.push((relative_round(down, sig[0]), relative_round(up, sig[1])));
                let sig_val = sig_digits_unc + precision_wrt(val, max_abs)?;
                rounded_values.push(relative_round(val, sig_val));
            }
            Series::Pairs(out)
        }
        Series::Labels(_) => {
            return Err(Error::type_error(format!(
                "series '{unc_key}' holds labels, expected uncertainties"
            )));
        }
    };

    readout.insert(val_key, Series::Values(rounded_values));
    readout.insert(unc_key, rounded_unc);
    Ok(())
}

fn round_series_to_decimals(series: &Series, key: &str, decimals: i32) -> Result<Series> {
    match series {
        Series::Values(v) => {
            Ok(Series::Values(v.iter().map(|&x| round_to_decimals(x, decimals)).collect()))
        }
        Series::Pairs(v) => Ok(Series::Pairs(
            v.iter()
                .map(|&(a, b)| (round_to_decimals(a, decimals), round_to_decimals(b, decimals)))
                .collect(),
        )),
        Series::Labels(_) => {
            Err(Error::type_error(format!("series '{key}' holds labels and cannot be rounded")))
        }
    }
}

/// Round every element of series `key` to a fixed number of decimals.
///
/// Useful for correlation-like values living in `[-1, 1]`.
pub fn round_value_to_decimals(readout: &mut Readout, key: &str, decimals: i32) -> Result<()> {
    let series = readout
        .get(key)
        .ok_or_else(|| Error::validation(format!("readout has no series '{key}'")))?;
    let rounded = round_series_to_decimals(series, key, decimals)?;
    readout.insert(key, rounded);
    Ok(())
}

/// Round values and uncertainties to a fixed number of decimals.
pub fn round_value_and_uncertainty_to_decimals(
    readout: &mut Readout,
    val_key: &str,
    unc_key: &str,
    decimals: i32,
) -> Result<()> {
    let n_val = readout.values(val_key)?.len();
    let uncertainty = readout
        .get(unc_key)
        .ok_or_else(|| Error::validation(format!("readout has no series '{unc_key}'")))?;
    check_lengths(val_key, n_val, unc_key, uncertainty.len())?;
    let rounded_unc = round_series_to_decimals(uncertainty, unc_key, decimals)?;

    round_value_to_decimals(readout, val_key, decimals)?;
    readout.insert(unc_key, rounded_unc);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precision_of_single_values() {
        assert_eq!(number_precision(12.5), Some(2));
        assert_eq!(number_precision(1.25), Some(1));
        assert_eq!(number_precision(0.125), Some(0));
        assert_eq!(number_precision(0.0125), Some(-1));
        assert_eq!(number_precision(-0.0125), Some(-1));
    }

    #[test]
    fn precision_at_powers_of_ten() {
        assert_eq!(number_precision(10.0), Some(1));
        assert_eq!(number_precision(10.001), Some(2));
        assert_eq!(number_precision(9.999), Some(1));
        assert_eq!(number_precision(100.0), Some(2));
        assert_eq!(number_precision(1.0), Some(0));
        assert_eq!(number_precision(0.1), Some(-1));
        assert_eq!(number_precision(0.001), Some(-3));
    }

    #[test]
    fn precision_passthrough() {
        assert_eq!(number_precision(0.0), None);
        assert_eq!(number_precision(f64::NAN), None);
        assert_eq!(number_precision(f64::INFINITY), None);
        assert_eq!(Scalar::from("astring").number_precision(), None);
    }

    #[test]
    fn precision_of_pairs() {
        assert_eq!((12.5, 1.25).number_precision(), (Some(2), Some(1)));
        assert_eq!((0.125, 0.0125).number_precision(), (Some(0), Some(-1)));
    }

    #[test]
    fn relative_round_table() {
        assert_eq!(relative_round(1.23456, 1), 1.0);
        assert_eq!(relative_round(12.3456, 1), 10.0);
        assert_eq!(relative_round(12.3456, 3), 12.3);
        assert_eq!(relative_round(12.3456, 5), 12.346);
    }

    #[test]
    fn relative_round_sentinels() {
        for digits in 0..10 {
            assert_eq!(relative_round(f64::INFINITY, digits), f64::INFINITY);
            assert_eq!(relative_round(0.0, digits), 0.0);
            assert!(relative_round(f64::NAN, digits).is_nan());
            let s = Scalar::from("astring");
            assert_eq!(s.relative_round(digits), s);
        }
    }

    #[test]
    fn ties_round_to_even() {
        assert_eq!(round_to_decimals(0.5, 0), 0.0);
        assert_eq!(round_to_decimals(1.5, 0), 2.0);
        assert_eq!(round_to_decimals(2.5, 0), 2.0);
        assert_eq!(round_to_decimals(0.125, 2), 0.12);
        // 2.675 is stored as 2.67499999...
        assert_eq!(round_to_decimals(2.675, 2), 2.67);
        assert_eq!(round_to_decimals(25.0, -1), 20.0);
        assert_eq!(round_to_decimals(35.0, -1), 40.0);
        assert_eq!(round_to_decimals(5.0, -1), 0.0);
        assert_eq!(round_to_decimals(6.0, -1), 10.0);
        assert_eq!(round_to_decimals(-6.0, -1), -10.0);
        assert_eq!(round_to_decimals(4.0, -2), 0.0);
    }

    #[test]
    fn integers_round_only_to_tens() {
        assert_eq!(Scalar::Int(12345).relative_round(3), Scalar::Int(12300));
        assert_eq!(Scalar::Int(12355).relative_round(3), Scalar::Int(12400));
        assert_eq!(Scalar::Int(12350).relative_round(3), Scalar::Int(12400));
        assert_eq!(Scalar::Int(12250).relative_round(3), Scalar::Int(12200));
        assert_eq!(Scalar::Int(7).relative_round(5), Scalar::Int(7));
        assert_eq!(Scalar::Int(0).relative_round(2), Scalar::Int(0));
    }

    #[test]
    fn rounding_error_is_bounded() {
        let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
        for _ in 0..2000 {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let mantissa = (state >> 11) as f64 / (1u64 << 53) as f64;
            let exponent = ((state >> 3) % 16) as i32 - 8;
            let v = (mantissa - 0.5) * 10f64.powi(exponent);
            if v == 0.0 {
                continue;
            }
            for digits in 1..8 {
                let r = relative_round(v, digits);
                let p = number_precision(v).unwrap();
                let bound = 0.5 * 10f64.powi(p - digits);
                assert!(
                    (r - v).abs() <= bound * (1.0 + 1e-9) + 4.0 * f64::EPSILON * v.abs(),
                    "v={v} digits={digits} r={r} bound={bound}"
                );
                // At most `digits` significant figures survive.
                let sig = format!("{:e}", r.abs());
                let mantissa = sig.split('e').next().unwrap().replace('.', "");
                assert!(r == 0.0 || mantissa.len() as i32 <= digits, "{r} has too many digits");
            }
        }
    }

    #[test]
    fn precision_wrt_reference() {
        let cases = [(12.5, 0.08, 3), (1.25, 102.4, -2), (0.0, 0.002, 2), (10.0, 9.0, 0)];
        for (val, reference, expected) in cases {
            let got =
                value_precision_wrt_reference(&Scalar::from(val), &Scalar::from(reference))
                    .unwrap();
            assert_eq!(got, expected, "{val} wrt {reference}");
        }
        assert_eq!(
            value_precision_wrt_reference(&Scalar::Int(10), &Scalar::Float(9.0)).unwrap(),
            0
        );
        assert!(matches!(
            value_precision_wrt_reference(&Scalar::from(1.23), &Scalar::from("bad")),
            Err(Error::Type(_))
        ));
        assert!(matches!(
            value_precision_wrt_reference(&Scalar::from("bad"), &Scalar::from(1.2)),
            Err(Error::Type(_))
        ));
    }

    #[test]
    fn value_and_symmetric_uncertainty() {
        let mut r: Readout = [
            ("val", Series::Values(vec![1.23456, 1234.56, 0.0012345, 0.123])),
            ("unc", Series::Values(vec![0.00123, 1.23, 0.012, 0.12])),
        ]
        .into_iter()
        .collect();
        round_value_and_uncertainty(&mut r, "val", "unc", 2).unwrap();
        assert_eq!(r.values("val").unwrap(), &[1.2346, 1234.6, 0.001, 0.12]);
        assert_eq!(r.values("unc").unwrap(), &[0.0012, 1.2, 0.012, 0.12]);
    }

    #[test]
    fn value_and_asymmetric_uncertainty() {
        let mut r: Readout = [
            ("val", Series::Values(vec![1.23456, 0.123])),
            ("unc", Series::Pairs(vec![(0.00123, 0.0123), (0.012, 0.12)])),
        ]
        .into_iter()
        .collect();
        round_value_and_uncertainty(&mut r, "val", "unc", 2).unwrap();
        assert_eq!(r.values("val").unwrap(), &[1.235, 0.12]);
        assert_eq!(r.pairs("unc").unwrap(), &[(0.001, 0.012), (0.01, 0.12)]);
    }

    #[test]
    fn measurement_matches_uncertainty_precision() {
        let mut r: Readout =
            [("y", Series::Values(vec![26.5345])), ("dy", Series::Values(vec![1.3456]))]
                .into_iter()
                .collect();
        round_value_and_uncertainty(&mut r, "y", "dy", 2).unwrap();
        assert_eq!(r.values("y").unwrap(), &[26.5]);
        assert_eq!(r.values("dy").unwrap(), &[1.3]);
    }

    #[test]
    fn larger_down_side_drives_precision() {
        let mut r: Readout = [
            ("y", Series::Values(vec![5.4321])),
            ("dy", Series::Pairs(vec![(-0.132, 0.083)])),
        ]
        .into_iter()
        .collect();
        round_value_and_uncertainty(&mut r, "y", "dy", 2).unwrap();
        assert_eq!(r.pairs("dy").unwrap(), &[(-0.13, 0.08)]);
        assert_eq!(r.values("y").unwrap(), &[5.43]);
    }

    #[test]
    fn mismatched_lengths_rejected() {
        let mut r: Readout =
            [("y", Series::Values(vec![1.0, 2.0])), ("dy", Series::Values(vec![0.1]))]
                .into_iter()
                .collect();
        assert!(matches!(
            round_value_and_uncertainty(&mut r, "y", "dy", 2),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn fixed_decimals() {
        let mut r: Readout = [
            ("rho", Series::Values(vec![0.123456, -0.98765])),
            ("drho", Series::Pairs(vec![(-0.01234, 0.05678), (-0.1, 0.2)])),
        ]
        .into_iter()
        .collect();
        round_value_and_uncertainty_to_decimals(&mut r, "rho", "drho", 3).unwrap();
        assert_eq!(r.values("rho").unwrap(), &[0.123, -0.988]);
        assert_eq!(r.pairs("drho").unwrap(), &[(-0.012, 0.057), (-0.1, 0.2)]);

        round_value_to_decimals(&mut r, "rho", 1).unwrap();
        assert_eq!(r.values("rho").unwrap(), &[0.1, -1.0]);
    }
}
