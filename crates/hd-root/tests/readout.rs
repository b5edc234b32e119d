//! Integration tests: read objects through a `SourceReader` and build variables.

use std::cell::Cell;
use std::rc::Rc;

use hd_core::{Error, round_value_and_uncertainty};
use hd_root::{
    BinAxis, Canvas, ColumnTree, Hist1DOptions, Histogram1D, MemorySource, ObjectSource,
    PointGraph, SourceObject, SourceReader, axis_variable, point_variable,
    uncertainty_from_readout,
};

fn limit_tree() -> ColumnTree {
    let mh: Vec<f64> = (0..12).map(|i| if i < 6 { 1000.0 } else { 2000.0 }).collect();
    let limit: Vec<f64> = (0..12).map(|i| i as f64 * 0.1).collect();
    ColumnTree::new("limit")
        .with_branch("mh", mh)
        .unwrap()
        .with_branch("limit", limit)
        .unwrap()
}

fn fixture() -> MemorySource {
    let hist = Histogram1D::new("pt", BinAxis::variable(vec![0.0, 10.0, 20.0, 50.0]).unwrap())
        .with_contents(&[26.5345, 12.0, 3.0])
        .unwrap()
        .with_errors(&[1.3456, 0.75, 0.5])
        .unwrap();
    let graph = PointGraph::new("expected", vec![1.0, 2.0], vec![0.3, 0.2])
        .unwrap()
        .with_asymmetric_errors(vec![0.0; 2], vec![0.0; 2], vec![0.05, 0.04], vec![0.06, 0.05])
        .unwrap();
    MemorySource::new()
        .with("hists/pt", SourceObject::Hist1D(Box::new(hist)))
        .with(
            "c1",
            SourceObject::Container(Box::new(
                Canvas::new("c1").with_primitive(SourceObject::Graph(Box::new(graph))),
            )),
        )
        .with("limit", SourceObject::Tree(Box::new(limit_tree())))
}

#[test]
fn open_checks_path_before_opening() {
    let dir = tempfile::tempdir().unwrap();
    let never = |_: &std::path::Path| -> hd_core::Result<MemorySource> {
        panic!("opener must not be called")
    };

    let txt = dir.path().join("data.txt");
    std::fs::write(&txt, "x").unwrap();
    assert!(matches!(SourceReader::open(&txt, never), Err(Error::State(_))));

    let missing = dir.path().join("missing.root");
    assert!(matches!(SourceReader::open(&missing, never), Err(Error::Resource(_))));

    let present = dir.path().join("data.root");
    std::fs::write(&present, b"root").unwrap();
    let reader = SourceReader::open(&present, |_| Ok(fixture())).unwrap();
    assert!(reader.retrieve_object("hists/pt").is_ok());
}

#[derive(Debug)]
struct TrackedSource {
    inner: MemorySource,
    closed: Rc<Cell<u32>>,
}

impl ObjectSource for TrackedSource {
    fn get(&self, path: &str) -> Option<&SourceObject> {
        self.inner.get(path)
    }

    fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }

    fn close(&mut self) {
        self.closed.set(self.closed.get() + 1);
    }
}

#[test]
fn source_closed_once() {
    let closed = Rc::new(Cell::new(0));
    {
        let _reader =
            SourceReader::new(TrackedSource { inner: fixture(), closed: Rc::clone(&closed) });
    }
    assert_eq!(closed.get(), 1, "dropping the reader closes the source");

    let mut reader =
        SourceReader::new(TrackedSource { inner: fixture(), closed: Rc::clone(&closed) });
    reader.close();
    drop(reader);
    assert_eq!(closed.get(), 2, "explicit close is not repeated on drop");
}

#[test]
fn graph_inside_canvas() {
    let reader = SourceReader::new(fixture());
    let points = reader.read_graph("c1/expected").unwrap();
    assert_eq!(points.pairs("dy").unwrap(), &[(-0.05, 0.06), (-0.04, 0.05)]);
    assert_eq!(points.pairs("dx").unwrap()[0], (-0.0, 0.0));
}

#[test]
fn wrong_object_kind() {
    let reader = SourceReader::new(fixture());
    assert!(matches!(reader.read_graph("hists/pt"), Err(Error::Type(_))));
    assert!(matches!(
        reader.read_hist_1d("c1", &Hist1DOptions::default()),
        Err(Error::Type(_))
    ));
}

#[test]
fn trees() {
    let reader = SourceReader::new(fixture());
    assert_eq!(reader.read_tree("limit", "mh").unwrap().len(), 12);
    assert!(matches!(reader.read_tree("hists/pt", "mh"), Err(Error::Resource(_))));
    assert!(matches!(reader.read_tree("limit", "nope"), Err(Error::Resource(_))));

    let rows = reader.read_limit_tree("limit", "mh", "limit").unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].len(), 7);
    assert_eq!(rows[1][0], 2000.0);
    approx::assert_relative_eq!(rows[1][6], 1.1, epsilon = 1e-12);
}

#[test]
fn histogram_to_rounded_variable() {
    let reader = SourceReader::new(fixture());
    let mut points = reader.read_hist_1d("hists/pt", &Hist1DOptions::default()).unwrap();
    round_value_and_uncertainty(&mut points, "y", "dy", 2).unwrap();
    assert_eq!(points.values("y").unwrap(), &[26.5, 12.0, 3.0]);

    let x = axis_variable(&points, "x_edges", "pT").unwrap();
    let mut y = point_variable(&points, "y", "Events", false).unwrap();
    y.add_uncertainty(uncertainty_from_readout(&points, "dy", "stat").unwrap()).unwrap();

    assert_eq!(x.len(), 3);
    let record = y.make_record();
    assert_eq!(record.values[0].errors.len(), 1);
    let yaml = serde_yaml_ng::to_string(&record).unwrap();
    assert!(yaml.contains("symerror: 1.3"), "{yaml}");
}
