//! Conversion of histograms and graphs into readouts.
//!
//! | object    | keys                                                          |
//! |-----------|---------------------------------------------------------------|
//! | 1-D hist  | `x`, `x_edges`, `y`, `dy`, `x_labels`?                        |
//! | 2-D hist  | `x`, `x_edges`, `y`, `y_edges`, `z`, `dz`, `x_labels`?, `y_labels`? |
//! | graph     | `x`, `y`, `dx`?, `dy`?                                        |
//!
//! Symmetric errors are [`Series::Values`], asymmetric ones [`Series::Pairs`] of
//! `(-low, up)` so that `value + down` and `value + up` are the interval bounds.

use std::ops::Range;

use hd_core::{Readout, Result, Series};

use crate::axis::BinAxis;
use crate::objects::{ErrorMode, Graph, GraphErrorKind, Hist1D, Hist2D};
use crate::options::{Hist1DOptions, Hist2DOptions, Limits};

/// Bins read for `limits`: `[FindBin(low), FindBin(high))`, in-range bins by default.
fn bin_range(axis: &BinAxis, limits: &Limits, include_flow: bool) -> Range<usize> {
    let n = axis.n_bins();
    let default_start = if include_flow { 0 } else { 1 };
    let default_end = if include_flow { n + 2 } else { n + 1 };
    let start = limits.low().map_or(default_start, |x| axis.find_bin(x));
    let end = limits.high().map_or(default_end, |x| axis.find_bin(x));
    start..end.max(start)
}

/// Centre and `(center - width/2, center + width/2)` of a bin; flow bins extend to infinity.
fn bin_geometry(axis: &BinAxis, bin: usize) -> (f64, (f64, f64)) {
    let n = axis.n_bins();
    if bin == 0 {
        (f64::NEG_INFINITY, (f64::NEG_INFINITY, axis.low_edge(1)))
    } else if bin > n {
        (f64::INFINITY, (axis.up_edge(n), f64::INFINITY))
    } else {
        let center = axis.bin_center(bin);
        let width = axis.bin_width(bin);
        (center, (center - width / 2.0, center + width / 2.0))
    }
}

/// Readout of a 1-D histogram. Options are validated first.
pub fn hist_1d_points(hist: &dyn Hist1D, options: &Hist1DOptions) -> Result<Readout> {
    options.validate()?;
    let axis = hist.x_axis();
    let symmetric = options.force_symmetric_errors || hist.error_mode() == ErrorMode::Normal;

    let mut readout = Readout::new();
    let mut x = Vec::new();
    let mut x_edges = Vec::new();
    let mut y = Vec::new();
    let mut dy = Vec::new();
    let mut dy_asym = Vec::new();
    let mut labels = axis.labels().map(|_| Vec::new());

    for bin in bin_range(axis, &options.xlim, options.include_flow) {
        let (center, edges) = bin_geometry(axis, bin);
        x.push(center);
        x_edges.push(edges);
        y.push(hist.bin_content(bin));
        if symmetric {
            dy.push(hist.bin_error(bin));
        } else {
            dy_asym.push((-hist.bin_error_low(bin), hist.bin_error_up(bin)));
        }
        if let (Some(labels), Some(label)) = (labels.as_mut(), axis.label(bin)) {
            labels.push(label.to_string());
        }
    }

    tracing::debug!("read {} bin(s) from histogram '{}'", x.len(), hist.name());
    readout.insert("x", Series::Values(x));
    readout.insert("x_edges", Series::Pairs(x_edges));
    readout.insert("y", Series::Values(y));
    readout.insert("dy", if symmetric { Series::Values(dy) } else { Series::Pairs(dy_asym) });
    if let Some(labels) = labels {
        readout.insert("x_labels", Series::Labels(labels));
    }
    Ok(readout)
}

/// Readout of a 2-D histogram, x-major. Options are validated first.
pub fn hist_2d_points(hist: &dyn Hist2D, options: &Hist2DOptions) -> Result<Readout> {
    options.validate()?;
    let (x_axis, y_axis) = (hist.x_axis(), hist.y_axis());
    let symmetric = options.force_symmetric_errors || hist.error_mode() == ErrorMode::Normal;
    let x_bins = bin_range(x_axis, &options.xlim, options.include_flow);
    let y_bins = bin_range(y_axis, &options.ylim, options.include_flow);

    let mut readout = Readout::new();
    for x_bin in x_bins {
        let (x, x_edges) = bin_geometry(x_axis, x_bin);
        for y_bin in y_bins.clone() {
            let (y, y_edges) = bin_geometry(y_axis, y_bin);
            readout.entry_values("x")?.push(x);
            readout.entry_pairs("x_edges")?.push(x_edges);
            readout.entry_values("y")?.push(y);
            readout.entry_pairs("y_edges")?.push(y_edges);
            readout.entry_values("z")?.push(hist.bin_content(x_bin, y_bin));
            if symmetric {
                readout.entry_values("dz")?.push(hist.bin_error(x_bin, y_bin));
            } else {
                let dz = (-hist.bin_error_low(x_bin, y_bin), hist.bin_error_up(x_bin, y_bin));
                readout.entry_pairs("dz")?.push(dz);
            }
            if let Some(label) = x_axis.label(x_bin) {
                readout.entry_labels("x_labels")?.push(label.to_string());
            }
            if let Some(label) = y_axis.label(y_bin) {
                readout.entry_labels("y_labels")?.push(label.to_string());
            }
        }
    }

    // Empty ranges still produce every key.
    for key in ["x", "y", "z"] {
        readout.entry_values(key)?;
    }
    for key in ["x_edges", "y_edges"] {
        readout.entry_pairs(key)?;
    }
    if symmetric {
        readout.entry_values("dz")?;
    } else {
        readout.entry_pairs("dz")?;
    }
    tracing::debug!("read {} bin(s) from histogram '{}'", readout.values("z")?.len(), hist.name());
    Ok(readout)
}

/// Readout of a graph. `dx`/`dy` are present only if the graph stores errors.
pub fn graph_points(graph: &dyn Graph) -> Readout {
    let n = graph.n_points();
    let (x, y): (Vec<f64>, Vec<f64>) = (0..n).map(|i| graph.point(i)).unzip();

    let mut readout = Readout::new();
    readout.insert("x", Series::Values(x));
    readout.insert("y", Series::Values(y));
    match graph.error_kind() {
        GraphErrorKind::None => {}
        GraphErrorKind::Symmetric => {
            readout.insert("dx", Series::Values((0..n).map(|i| graph.error_x(i)).collect()));
            readout.insert("dy", Series::Values((0..n).map(|i| graph.error_y(i)).collect()));
        }
        GraphErrorKind::Asymmetric => {
            readout.insert(
                "dx",
                Series::Pairs((0..n).map(|i| (-graph.error_x_low(i), graph.error_x_high(i))).collect()),
            );
            readout.insert(
                "dy",
                Series::Pairs((0..n).map(|i| (-graph.error_y_low(i), graph.error_y_high(i))).collect()),
            );
        }
    }
    readout
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::PointGraph;
    use crate::histogram::{Histogram1D, Histogram2D};

    fn hist() -> Histogram1D {
        Histogram1D::new("h", BinAxis::uniform(4, 0.0, 4.0).unwrap())
            .with_contents(&[1.0, 4.0, 9.0, 16.0])
            .unwrap()
    }

    #[test]
    fn full_range() {
        let r = hist_1d_points(&hist(), &Hist1DOptions::default()).unwrap();
        assert_eq!(r.values("x").unwrap(), &[0.5, 1.5, 2.5, 3.5]);
        assert_eq!(r.pairs("x_edges").unwrap()[1], (1.0, 2.0));
        assert_eq!(r.values("dy").unwrap(), &[1.0, 2.0, 3.0, 4.0]);
        assert!(!r.contains_key("x_labels"));
    }

    #[test]
    fn range_is_half_open_in_bins() {
        let r = hist_1d_points(&hist(), &Hist1DOptions::default().xlim(1.2, 3.0)).unwrap();
        // FindBin(1.2) = 2, FindBin(3.0) = 4: bins 2 and 3.
        assert_eq!(r.values("y").unwrap(), &[4.0, 9.0]);

        let open = Hist1DOptions { xlim: Limits(Some(2.0), None), ..Default::default() };
        assert_eq!(hist_1d_points(&hist(), &open).unwrap().values("y").unwrap(), &[9.0, 16.0]);
    }

    #[test]
    fn bad_range_reads_nothing() {
        let err = hist_1d_points(&hist(), &Hist1DOptions::default().xlim(3.0, 1.0));
        assert!(matches!(err, Err(hd_core::Error::Validation(_))));
    }

    #[test]
    fn flow_bins() {
        let mut h = hist();
        h.set_bin_content(0, 7.0).unwrap();
        h.set_bin_content(5, 8.0).unwrap();
        let r = hist_1d_points(&h, &Hist1DOptions::default().include_flow(true)).unwrap();
        let y = r.values("y").unwrap();
        assert_eq!(y.len(), 6);
        assert_eq!((y[0], y[5]), (7.0, 8.0));
        let x = r.values("x").unwrap();
        assert!(x[0].is_infinite() && x[0] < 0.0);
        assert_eq!(r.pairs("x_edges").unwrap()[5], (4.0, f64::INFINITY));
    }

    #[test]
    fn asymmetric_errors_unless_forced() {
        let h = hist().with_asymmetric_errors(&[0.5; 4], &[1.5; 4]).unwrap();
        let r = hist_1d_points(&h, &Hist1DOptions::default()).unwrap();
        assert_eq!(r.pairs("dy").unwrap()[0], (-0.5, 1.5));

        let forced = Hist1DOptions::default().force_symmetric_errors(true);
        let r = hist_1d_points(&h, &forced).unwrap();
        assert_eq!(r.values("dy").unwrap()[3], 4.0);
    }

    #[test]
    fn labels_are_read() {
        let axis = BinAxis::uniform(2, 0.0, 2.0).unwrap().with_labels(["ee", "mumu"]).unwrap();
        let h = Histogram1D::new("h", axis);
        let r = hist_1d_points(&h, &Hist1DOptions::default()).unwrap();
        assert_eq!(r.labels("x_labels").unwrap(), &["ee".to_string(), "mumu".to_string()]);
    }

    #[test]
    fn hist_2d_is_x_major() {
        let mut h = Histogram2D::new(
            "h2",
            BinAxis::uniform(2, 0.0, 2.0).unwrap(),
            BinAxis::variable(vec![0.0, 1.0, 3.0]).unwrap(),
        );
        h.set_bin_content(1, 1, 11.0).unwrap();
        h.set_bin_content(1, 2, 12.0).unwrap();
        h.set_bin_content(2, 1, 21.0).unwrap();
        h.set_bin_content(2, 2, 22.0).unwrap();
        let r = hist_2d_points(&h, &Hist2DOptions::default()).unwrap();
        assert_eq!(r.values("z").unwrap(), &[11.0, 12.0, 21.0, 22.0]);
        assert_eq!(r.values("x").unwrap(), &[0.5, 0.5, 1.5, 1.5]);
        assert_eq!(r.values("y").unwrap(), &[0.5, 2.0, 0.5, 2.0]);
        assert_eq!(r.pairs("y_edges").unwrap()[1], (1.0, 3.0));

        let r = hist_2d_points(&h, &Hist2DOptions::default().xlim(1.0, 2.0).ylim(0.0, 1.0))
            .unwrap();
        assert_eq!(r.values("z").unwrap(), &[21.0]);
    }

    #[test]
    fn graph_errors() {
        let plain = PointGraph::new("g", vec![1.0, 2.0], vec![3.0, 4.0]).unwrap();
        let r = graph_points(&plain);
        assert!(!r.contains_key("dx") && !r.contains_key("dy"));

        let sym = plain.clone().with_errors(vec![0.1, 0.1], vec![0.2, 0.3]).unwrap();
        assert_eq!(graph_points(&sym).values("dy").unwrap(), &[0.2, 0.3]);

        let asym = plain
            .with_asymmetric_errors(vec![0.1; 2], vec![0.2; 2], vec![0.3; 2], vec![0.4; 2])
            .unwrap();
        let r = graph_points(&asym);
        assert_eq!(r.pairs("dx").unwrap()[0], (-0.1, 0.2));
        assert_eq!(r.pairs("dy").unwrap()[1], (-0.3, 0.4));
    }
}
