//! Graphs from ROOT macros (`.C` files written by `TCanvas::SaveAs`).
//!
//! A saved canvas declares each graph as arrays followed by a constructor and a
//! `SetName` call:
//!
//! ```text
//! Double_t Graph0_fx1[3] = { 1.2, 1.3, 1.4 };
//! Double_t Graph0_fy1[3] = { 0.5, 0.6, 0.7 };
//! TGraph *graph = new TGraph(3,Graph0_fx1,Graph0_fy1);
//! graph->SetName("Graph0");
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use hd_core::{Error, Readout, Result};
use regex::Regex;

use crate::graph::PointGraph;
use crate::points::graph_points;

/// Reads `TGraph`, `TGraphErrors` and `TGraphAsymmErrors` definitions out of macro source.
#[derive(Debug, Clone)]
pub struct CFileReader {
    text: String,
}

impl CFileReader {
    /// Read the macro at `path`, which must end in `.C`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.extension().and_then(|e| e.to_str()) != Some("C") {
            return Err(Error::State(format!(
                "input file is not a .C file (name does not end in .C): {}",
                path.display()
            )));
        }
        if !path.exists() {
            return Err(Error::resource(format!("file not found: {}", path.display())));
        }
        tracing::info!("reading macro: {}", path.display());
        Ok(Self::from_source(std::fs::read_to_string(path)?))
    }

    /// Use macro text directly.
    pub fn from_source(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Every named graph as a readout of `x`, `y` and, for graphs with errors, `dx`, `dy`.
    ///
    /// `TGraphAsymmErrors` errors come back as `(-low, high)` pairs.
    pub fn get_graphs(&self) -> Result<BTreeMap<String, Readout>> {
        let code = strip_comments(&self.text)?;
        let arrays = parse_arrays(&code)?;

        let constructor = Regex::new(r"new\s+(TGraph(?:Errors|AsymmErrors)?)\s*\(([^)]*)\)")
            .map_err(|e| Error::validation(e.to_string()))?;
        let set_name = Regex::new(r#"SetName\s*\(\s*"([^"]*)"\s*\)"#)
            .map_err(|e| Error::validation(e.to_string()))?;

        let matches: Vec<_> = constructor.captures_iter(&code).collect();
        let mut graphs = BTreeMap::new();
        for (i, caps) in matches.iter().enumerate() {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            let next_start = matches
                .get(i + 1)
                .and_then(|c| c.get(0))
                .map_or(code.len(), |m| m.start());
            let name = set_name
                .captures(&code[whole.end..next_start])
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
                .ok_or_else(|| {
                    Error::validation(format!("graph constructor '{}' has no SetName", &caps[0]))
                })?;

            let args: Vec<&str> = caps[2].split(',').map(str::trim).collect();
            let kind = match &caps[1] {
                "TGraphErrors" => GraphKind::Errors,
                "TGraphAsymmErrors" => GraphKind::AsymmErrors,
                _ => GraphKind::Plain,
            };
            let graph = build_graph(&name, &args, kind, &arrays)?;
            tracing::debug!("found graph '{name}' with {} point(s)", args.first().unwrap_or(&"?"));
            graphs.insert(name, graph_points(&graph));
        }
        Ok(graphs)
    }
}

fn strip_comments(text: &str) -> Result<String> {
    let comments = Regex::new(r"(?s)/\*.*?\*/|//[^\n]*").map_err(|e| Error::validation(e.to_string()))?;
    Ok(comments.replace_all(text, "").into_owned())
}

fn parse_arrays(code: &str) -> Result<HashMap<String, Vec<f64>>> {
    let array = Regex::new(
        r"\b(?:Double_t|Float_t|double|float)\s+(\w+)\s*\[\s*\d*\s*\]\s*=\s*\{([^}]*)\}",
    )
    .map_err(|e| Error::validation(e.to_string()))?;

    let mut arrays = HashMap::new();
    for caps in array.captures_iter(code) {
        let values = caps[2]
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<f64>().map_err(|_| {
                    Error::validation(format!("array '{}' has a non-numeric entry '{s}'", &caps[1]))
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        arrays.insert(caps[1].to_string(), values);
    }
    Ok(arrays)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GraphKind {
    Plain,
    Errors,
    AsymmErrors,
}

impl GraphKind {
    /// Constructor arguments: the point count followed by one array per column.
    fn n_args(self) -> usize {
        match self {
            GraphKind::Plain => 3,
            GraphKind::Errors => 5,
            GraphKind::AsymmErrors => 7,
        }
    }
}

fn build_graph(
    name: &str,
    args: &[&str],
    kind: GraphKind,
    arrays: &HashMap<String, Vec<f64>>,
) -> Result<PointGraph> {
    let expected = kind.n_args();
    if args.len() != expected {
        return Err(Error::validation(format!(
            "graph '{name}': expected {expected} constructor arguments, got {}",
            args.len()
        )));
    }
    let n: usize = args[0]
        .parse()
        .map_err(|_| Error::validation(format!("graph '{name}': bad point count '{}'", args[0])))?;
    let column = |arg: &str| -> Result<Vec<f64>> {
        let values = arrays
            .get(arg)
            .ok_or_else(|| Error::validation(format!("graph '{name}': no array named '{arg}'")))?;
        if values.len() < n {
            return Err(Error::validation(format!(
                "graph '{name}': array '{arg}' has {} value(s), expected {n}",
                values.len()
            )));
        }
        Ok(values[..n].to_vec())
    };

    let graph = PointGraph::new(name, column(args[1])?, column(args[2])?)?;
    match kind {
        GraphKind::Plain => Ok(graph),
        GraphKind::Errors => graph.with_errors(column(args[3])?, column(args[4])?),
        GraphKind::AsymmErrors => graph.with_asymmetric_errors(
            column(args[3])?,
            column(args[4])?,
            column(args[5])?,
            column(args[6])?,
        ),
    }
}
