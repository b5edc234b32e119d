//! # hd-root
//!
//! Readout of histograms, graphs and trees into the series that HEPData
//! variables and uncertainties are built from.
//!
//! The binary file format is not parsed here: a source is anything implementing
//! [`ObjectSource`], holding objects that implement [`Hist1D`], [`Hist2D`],
//! [`Graph`], [`Tree`] or [`Container`]. In-memory implementations are provided.
//!
//! ## Example
//!
//! ```
//! use hd_root::{BinAxis, Hist1DOptions, Histogram1D, MemorySource, SourceObject, SourceReader};
//!
//! let hist = Histogram1D::new("mjj", BinAxis::uniform(3, 0.0, 3.0)?).with_contents(&[4.0, 9.0, 1.0])?;
//! let reader = SourceReader::new(MemorySource::new().with("mjj", SourceObject::Hist1D(Box::new(hist))));
//!
//! let points = reader.read_hist_1d("mjj", &Hist1DOptions::default().xlim(1.0, 3.0))?;
//! assert_eq!(points.values("y")?, &[9.0, 1.0]);
//! # Ok::<(), hd_core::Error>(())
//! ```

#![warn(clippy::all)]

pub mod axis;
pub mod cfile;
pub mod graph;
pub mod histogram;
pub mod objects;
pub mod options;
pub mod points;
pub mod reader;
pub mod source;
pub mod tree;
pub mod variables;

pub use axis::BinAxis;
pub use cfile::CFileReader;
pub use graph::PointGraph;
pub use histogram::{Histogram1D, Histogram2D};
pub use objects::{
    Container, ErrorMode, Graph, GraphErrorKind, Hist1D, Hist2D, ObjectSource, SourceObject, Tree,
};
pub use options::{Hist1DOptions, Hist2DOptions, Limits};
pub use points::{graph_points, hist_1d_points, hist_2d_points};
pub use reader::{LIMIT_TREE_GROUP, SourceReader};
pub use source::{Canvas, MemorySource};
pub use tree::ColumnTree;
pub use variables::{
    BinValues, HistRef, HistUncertainty, axis_variable, hist_as_variable, hist_axis_variables,
    label_variable, point_variable, uncertainty_from_readout,
};
