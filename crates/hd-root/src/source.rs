//! In-memory containers and sources.

use std::collections::BTreeMap;

use crate::objects::{Container, ObjectSource, SourceObject};

/// A canvas (or pad, or stack) holding drawn objects.
#[derive(Debug, Default)]
pub struct Canvas {
    /// Canvas name.
    pub name: String,
    primitives: Vec<SourceObject>,
}

impl Canvas {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), primitives: Vec::new() }
    }

    /// Draw `object` on this canvas.
    pub fn with_primitive(mut self, object: SourceObject) -> Self {
        self.primitives.push(object);
        self
    }
}

impl Container for Canvas {
    fn name(&self) -> &str {
        &self.name
    }

    fn primitives(&self) -> &[SourceObject] {
        &self.primitives
    }
}

/// Objects keyed by path, standing in for an open file.
#[derive(Debug, Default)]
pub struct MemorySource {
    objects: BTreeMap<String, SourceObject>,
    closed: bool,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `object` under `path`, replacing any previous one.
    pub fn insert(&mut self, path: impl Into<String>, object: SourceObject) {
        self.objects.insert(path.into(), object);
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, path: impl Into<String>, object: SourceObject) -> Self {
        self.insert(path, object);
        self
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl ObjectSource for MemorySource {
    fn get(&self, path: &str) -> Option<&SourceObject> {
        if self.closed {
            return None;
        }
        self.objects.get(path)
    }

    fn keys(&self) -> Vec<String> {
        self.objects.keys().cloned().collect()
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
