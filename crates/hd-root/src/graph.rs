//! In-memory point graphs implementing [`Graph`].

use hd_core::{Error, Result};

use crate::objects::{Graph, GraphErrorKind};

#[derive(Debug, Clone, PartialEq)]
enum PointErrors {
    None,
    Symmetric { ex: Vec<f64>, ey: Vec<f64> },
    Asymmetric { exl: Vec<f64>, exh: Vec<f64>, eyl: Vec<f64>, eyh: Vec<f64> },
}

/// A graph of `(x, y)` points with optional errors.
#[derive(Debug, Clone, PartialEq)]
pub struct PointGraph {
    /// Graph name.
    pub name: String,
    x: Vec<f64>,
    y: Vec<f64>,
    errors: PointErrors,
}

impl PointGraph {
    /// Plain graph; `x` and `y` must have the same length.
    pub fn new(name: impl Into<String>, x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        let name = name.into();
        same_len(&name, "y", x.len(), y.len())?;
        Ok(Self { name, x, y, errors: PointErrors::None })
    }

    /// Attach symmetric errors.
    pub fn with_errors(mut self, ex: Vec<f64>, ey: Vec<f64>) -> Result<Self> {
        same_len(&self.name, "ex", self.x.len(), ex.len())?;
        same_len(&self.name, "ey", self.x.len(), ey.len())?;
        self.errors = PointErrors::Symmetric { ex, ey };
        Ok(self)
    }

    /// Attach asymmetric errors, all given as positive magnitudes.
    pub fn with_asymmetric_errors(
        mut self,
        exl: Vec<f64>,
        exh: Vec<f64>,
        eyl: Vec<f64>,
        eyh: Vec<f64>,
    ) -> Result<Self> {
        for (what, len) in [("exl", exl.len()), ("exh", exh.len()), ("eyl", eyl.len()), ("eyh", eyh.len())] {
            same_len(&self.name, what, self.x.len(), len)?;
        }
        self.errors = PointErrors::Asymmetric { exl, exh, eyl, eyh };
        Ok(self)
    }
}

fn same_len(name: &str, what: &str, n: usize, got: usize) -> Result<()> {
    if n != got {
        return Err(Error::validation(format!(
            "graph '{name}': {what} has {got} element(s), expected {n}"
        )));
    }
    Ok(())
}

impl Graph for PointGraph {
    fn name(&self) -> &str {
        &self.name
    }

    fn n_points(&self) -> usize {
        self.x.len()
    }

    fn point(&self, i: usize) -> (f64, f64) {
        (self.x[i], self.y[i])
    }

    fn error_kind(&self) -> GraphErrorKind {
        match self.errors {
            PointErrors::None => GraphErrorKind::None,
            PointErrors::Symmetric { .. } => GraphErrorKind::Symmetric,
            PointErrors::Asymmetric { .. } => GraphErrorKind::Asymmetric,
        }
    }

    fn error_x(&self, i: usize) -> f64 {
        match &self.errors {
            PointErrors::None => 0.0,
            PointErrors::Symmetric { ex, .. } => ex[i],
            PointErrors::Asymmetric { exl, exh, .. } => 0.5 * (exl[i] + exh[i]),
        }
    }

    fn error_y(&self, i: usize) -> f64 {
        match &self.errors {
            PointErrors::None => 0.0,
            PointErrors::Symmetric { ey, .. } => ey[i],
            PointErrors::Asymmetric { eyl, eyh, .. } => 0.5 * (eyl[i] + eyh[i]),
        }
    }

    fn error_x_low(&self, i: usize) -> f64 {
        match &self.errors {
            PointErrors::Asymmetric { exl, .. } => exl[i],
            _ => self.error_x(i),
        }
    }

    fn error_x_high(&self, i: usize) -> f64 {
        match &self.errors {
            PointErrors::Asymmetric { exh, .. } => exh[i],
            _ => self.error_x(i),
        }
    }

    fn error_y_low(&self, i: usize) -> f64 {
        match &self.errors {
            PointErrors::Asymmetric { eyl, .. } => eyl[i],
            _ => self.error_y(i),
        }
    }

    fn error_y_high(&self, i: usize) -> f64 {
        match &self.errors {
            PointErrors::Asymmetric { eyh, .. } => eyh[i],
            _ => self.error_y(i),
        }
    }
}
