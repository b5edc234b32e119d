//! Reader over one open data source.

use std::path::Path;

use hd_core::{Error, Readout, Result};

use crate::objects::{ObjectSource, SourceObject};
use crate::options::{Hist1DOptions, Hist2DOptions};
use crate::points::{graph_points, hist_1d_points, hist_2d_points};

/// Rows per parameter point in a limit tree (observed, expected and four bands).
pub const LIMIT_TREE_GROUP: usize = 6;

/// Owns one open source and reads objects out of it.
///
/// The source is closed on [`close`](Self::close) or when the reader is dropped.
#[derive(Debug)]
pub struct SourceReader<S: ObjectSource> {
    source: Option<S>,
}

impl<S: ObjectSource> SourceReader<S> {
    /// Wrap an already open source.
    pub fn new(source: S) -> Self {
        Self { source: Some(source) }
    }

    /// Open the file at `path` with `opener`.
    ///
    /// The path must end in `.root` and exist; neither is left to the opener.
    pub fn open<P, F>(path: P, opener: F) -> Result<Self>
    where
        P: AsRef<Path>,
        F: FnOnce(&Path) -> Result<S>,
    {
        let path = path.as_ref();
        if path.extension().and_then(|e| e.to_str()) != Some("root") {
            return Err(Error::State(format!(
                "input file is not a ROOT file (name does not end in .root): {}",
                path.display()
            )));
        }
        if !path.exists() {
            return Err(Error::resource(format!("file not found: {}", path.display())));
        }
        tracing::info!("opening ROOT file: {}", path.display());
        Ok(Self::new(opener(path)?))
    }

    /// The open source.
    pub fn source(&self) -> Result<&S> {
        self.source.as_ref().ok_or_else(|| Error::State("reader is closed".into()))
    }

    /// Close the source. Later reads fail with a state error.
    pub fn close(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.close();
        }
    }

    /// Object at `path`.
    ///
    /// If nothing is stored under `path` itself, `parent/name` is looked up as the
    /// primitive `name` drawn in the container at `parent`, recursively.
    pub fn retrieve_object(&self, path: &str) -> Result<&SourceObject> {
        let source = self.source()?;
        if let Some(object) = lookup(source, path) {
            return Ok(object);
        }

        let available = match path.rsplit_once('/').and_then(|(parent, _)| lookup(source, parent)) {
            Some(SourceObject::Container(container)) => {
                tracing::warn!("available primitives in '{}':", container.name());
                container
                    .primitives()
                    .iter()
                    .map(|p| {
                        tracing::warn!("name: '{}', type: {}", p.name(), p.kind());
                        p.name().to_string()
                    })
                    .collect()
            }
            _ => source.keys(),
        };
        Err(Error::ObjectNotFound { path: path.to_string(), available })
    }

    /// Bin centres, edges, contents and errors of the 1-D histogram at `path`.
    pub fn read_hist_1d(&self, path: &str, options: &Hist1DOptions) -> Result<Readout> {
        options.validate()?;
        match self.retrieve_object(path)? {
            SourceObject::Hist1D(hist) => hist_1d_points(hist.as_ref(), options),
            other => Err(wrong_kind(path, "1-D histogram", other)),
        }
    }

    /// Same for the 2-D histogram at `path`.
    pub fn read_hist_2d(&self, path: &str, options: &Hist2DOptions) -> Result<Readout> {
        options.validate()?;
        match self.retrieve_object(path)? {
            SourceObject::Hist2D(hist) => hist_2d_points(hist.as_ref(), options),
            other => Err(wrong_kind(path, "2-D histogram", other)),
        }
    }

    /// Points (and errors, if stored) of the graph at `path`.
    pub fn read_graph(&self, path: &str) -> Result<Readout> {
        match self.retrieve_object(path)? {
            SourceObject::Graph(graph) => Ok(graph_points(graph.as_ref())),
            other => Err(wrong_kind(path, "graph", other)),
        }
    }

    /// Every value of branch `branch` of the tree at `path`.
    pub fn read_tree(&self, path: &str, branch: &str) -> Result<Vec<f64>> {
        let tree = self.tree(path)?;
        tree.read_branch(branch).ok_or_else(|| {
            Error::resource(format!("the tree '{path}' does not have a branch with name '{branch}'"))
        })
    }

    /// Combine-style limit tree: one `[x, y1, ..., y6]` row per six entries.
    pub fn read_limit_tree(&self, path: &str, branch_x: &str, branch_y: &str) -> Result<Vec<Vec<f64>>> {
        self.read_grouped_rows(path, branch_x, branch_y, LIMIT_TREE_GROUP)
    }

    /// Group every `group_size` rows into `[x, y_1, ..., y_group_size]`.
    ///
    /// `x` is taken from the last row of each group. A trailing incomplete group is dropped.
    pub fn read_grouped_rows(
        &self,
        path: &str,
        branch_x: &str,
        branch_y: &str,
        group_size: usize,
    ) -> Result<Vec<Vec<f64>>> {
        if group_size == 0 {
            return Err(Error::validation("group size must be positive"));
        }
        let x = self.read_tree(path, branch_x)?;
        let y = self.read_tree(path, branch_y)?;
        let rows: Vec<Vec<f64>> = x
            .chunks_exact(group_size)
            .zip(y.chunks_exact(group_size))
            .map(|(xs, ys)| {
                let mut row = Vec::with_capacity(group_size + 1);
                row.push(xs[group_size - 1]);
                row.extend_from_slice(ys);
                row
            })
            .collect();
        if x.len() % group_size != 0 {
            tracing::warn!(
                "tree '{path}' has {} entries, not a multiple of {group_size}; last {} dropped",
                x.len(),
                x.len() % group_size
            );
        }
        Ok(rows)
    }

    fn tree(&self, path: &str) -> Result<&dyn crate::objects::Tree> {
        match lookup(self.source()?, path) {
            Some(SourceObject::Tree(tree)) => Ok(tree.as_ref()),
            _ => Err(Error::resource(format!("No TTree found for path '{path}'"))),
        }
    }
}

impl<S: ObjectSource> Drop for SourceReader<S> {
    fn drop(&mut self) {
        self.close();
    }
}

fn lookup<'a, S: ObjectSource>(source: &'a S, path: &str) -> Option<&'a SourceObject> {
    if let Some(object) = source.get(path) {
        return Some(object);
    }
    let (parent, name) = path.rsplit_once('/')?;
    match lookup(source, parent)? {
        SourceObject::Container(container) => {
            container.primitives().iter().find(|p| p.name() == name)
        }
        _ => None,
    }
}

fn wrong_kind(path: &str, expected: &str, found: &SourceObject) -> Error {
    Error::type_error(format!("expected '{path}' to be a {expected}, found a {}", found.kind()))
}
