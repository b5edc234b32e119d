//! In-memory column tree implementing [`Tree`].

use hd_core::{Error, Result};

use crate::objects::Tree;

/// A TTree-like table of equally long numeric branches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnTree {
    /// Tree name.
    pub name: String,
    /// Total number of entries.
    pub entries: usize,
    /// Branches in insertion order.
    pub branches: Vec<(String, Vec<f64>)>,
}

impl ColumnTree {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    /// Add a branch. All branches must have the same number of entries.
    pub fn with_branch(mut self, name: impl Into<String>, values: Vec<f64>) -> Result<Self> {
        let name = name.into();
        if self.find_branch(&name).is_some() {
            return Err(Error::validation(format!("tree '{}' already has branch '{name}'", self.name)));
        }
        if !self.branches.is_empty() && values.len() != self.entries {
            return Err(Error::validation(format!(
                "branch '{name}' has {} entries, tree '{}' has {}",
                values.len(),
                self.name,
                self.entries
            )));
        }
        self.entries = values.len();
        self.branches.push((name, values));
        Ok(self)
    }

    /// Find a branch by name.
    pub fn find_branch(&self, name: &str) -> Option<&[f64]> {
        self.branches.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_slice())
    }
}

impl Tree for ColumnTree {
    fn name(&self) -> &str {
        &self.name
    }

    fn n_entries(&self) -> usize {
        self.entries
    }

    fn branch_names(&self) -> Vec<&str> {
        self.branches.iter().map(|(n, _)| n.as_str()).collect()
    }

    fn read_branch(&self, name: &str) -> Option<Vec<f64>> {
        self.find_branch(name).map(<[f64]>::to_vec)
    }
}
