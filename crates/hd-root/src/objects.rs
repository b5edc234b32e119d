//! Object model of a binary data source.
//!
//! Only the accessors the readout needs are part of the traits, so any ROOT
//! binding (or a plain in-memory fixture) can back a [`SourceReader`](crate::SourceReader).

use std::fmt;

use crate::axis::BinAxis;

/// How a histogram computes its bin errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorMode {
    /// `sqrt(sumw2)`; read out as symmetric errors.
    #[default]
    Normal,
    /// Poisson intervals; read out as asymmetric `(-low, up)` errors.
    Poisson,
}

/// One-dimensional histogram.
pub trait Hist1D: fmt::Debug {
    /// Object name.
    fn name(&self) -> &str;
    /// X axis.
    fn x_axis(&self) -> &BinAxis;
    /// Content of bin `bin` (0 underflow, `n + 1` overflow).
    fn bin_content(&self, bin: usize) -> f64;
    /// Symmetric error of bin `bin`.
    fn bin_error(&self, bin: usize) -> f64;
    /// Lower error of bin `bin`, positive.
    fn bin_error_low(&self, bin: usize) -> f64 {
        self.bin_error(bin)
    }
    /// Upper error of bin `bin`.
    fn bin_error_up(&self, bin: usize) -> f64 {
        self.bin_error(bin)
    }
    /// Error mode.
    fn error_mode(&self) -> ErrorMode {
        ErrorMode::Normal
    }
}

/// Two-dimensional histogram.
pub trait Hist2D: fmt::Debug {
    /// Object name.
    fn name(&self) -> &str;
    /// X axis.
    fn x_axis(&self) -> &BinAxis;
    /// Y axis.
    fn y_axis(&self) -> &BinAxis;
    /// Content of bin `(x_bin, y_bin)`.
    fn bin_content(&self, x_bin: usize, y_bin: usize) -> f64;
    /// Symmetric error of bin `(x_bin, y_bin)`.
    fn bin_error(&self, x_bin: usize, y_bin: usize) -> f64;
    /// Lower error, positive.
    fn bin_error_low(&self, x_bin: usize, y_bin: usize) -> f64 {
        self.bin_error(x_bin, y_bin)
    }
    /// Upper error.
    fn bin_error_up(&self, x_bin: usize, y_bin: usize) -> f64 {
        self.bin_error(x_bin, y_bin)
    }
    /// Error mode.
    fn error_mode(&self) -> ErrorMode {
        ErrorMode::Normal
    }
}

/// Which errors a graph stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphErrorKind {
    /// Plain points (`TGraph`).
    None,
    /// One error per coordinate (`TGraphErrors`).
    Symmetric,
    /// Low and high errors per coordinate (`TGraphAsymmErrors`).
    Asymmetric,
}

/// Point series.
pub trait Graph: fmt::Debug {
    /// Object name.
    fn name(&self) -> &str;
    /// Number of points.
    fn n_points(&self) -> usize;
    /// Coordinates of point `i`.
    fn point(&self, i: usize) -> (f64, f64);
    /// Stored error kind.
    fn error_kind(&self) -> GraphErrorKind;
    /// Symmetric x error of point `i`.
    fn error_x(&self, i: usize) -> f64;
    /// Symmetric y error of point `i`.
    fn error_y(&self, i: usize) -> f64;
    /// Lower x error, positive.
    fn error_x_low(&self, i: usize) -> f64 {
        self.error_x(i)
    }
    /// Upper x error.
    fn error_x_high(&self, i: usize) -> f64 {
        self.error_x(i)
    }
    /// Lower y error, positive.
    fn error_y_low(&self, i: usize) -> f64 {
        self.error_y(i)
    }
    /// Upper y error.
    fn error_y_high(&self, i: usize) -> f64 {
        self.error_y(i)
    }
}

/// Columnar table with numeric branches.
pub trait Tree: fmt::Debug {
    /// Object name.
    fn name(&self) -> &str;
    /// Number of rows.
    fn n_entries(&self) -> usize;
    /// Names of all branches.
    fn branch_names(&self) -> Vec<&str>;
    /// Every value of branch `name`, `None` if there is no such branch.
    fn read_branch(&self, name: &str) -> Option<Vec<f64>>;
}

/// Drawable container (canvas, pad, stack) holding other objects.
pub trait Container: fmt::Debug {
    /// Object name.
    fn name(&self) -> &str;
    /// Contained objects in drawing order.
    fn primitives(&self) -> &[SourceObject];
}

/// Any object a source can hold.
#[derive(Debug)]
pub enum SourceObject {
    /// TH1-like.
    Hist1D(Box<dyn Hist1D>),
    /// TH2-like.
    Hist2D(Box<dyn Hist2D>),
    /// TGraph-like.
    Graph(Box<dyn Graph>),
    /// TTree-like.
    Tree(Box<dyn Tree>),
    /// TCanvas/TPad/THStack-like.
    Container(Box<dyn Container>),
}

impl SourceObject {
    /// Object name.
    pub fn name(&self) -> &str {
        match self {
            SourceObject::Hist1D(h) => h.name(),
            SourceObject::Hist2D(h) => h.name(),
            SourceObject::Graph(g) => g.name(),
            SourceObject::Tree(t) => t.name(),
            SourceObject::Container(c) => c.name(),
        }
    }

    /// Human-readable kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            SourceObject::Hist1D(_) => "1-D histogram",
            SourceObject::Hist2D(_) => "2-D histogram",
            SourceObject::Graph(_) => "graph",
            SourceObject::Tree(_) => "tree",
            SourceObject::Container(_) => "container",
        }
    }
}

/// An open data source (e.g. a ROOT file).
pub trait ObjectSource {
    /// Object stored under exactly `path`.
    fn get(&self, path: &str) -> Option<&SourceObject>;
    /// Paths of all top-level objects.
    fn keys(&self) -> Vec<String>;
    /// Release the underlying handle. Called once.
    fn close(&mut self) {}
}
