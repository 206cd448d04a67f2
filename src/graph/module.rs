//! Module entities for the chunk graph

use std::path::PathBuf;

use super::{ChunkGraph, ChunkId};

/// Unique identifier for a module
pub type ModuleId = usize;

/// Predicate deciding whether a module may be moved into a given chunk.
///
/// Receives the graph and the candidate target chunk. Modules without a
/// condition are always eligible.
pub type ChunkCondition = fn(&ChunkGraph, ChunkId) -> bool;

/// A unit of source code participating in the chunk graph
#[derive(Debug, Clone, Default)]
pub struct Module {
    /// Source file this module was built from, if any
    pub resource: Option<PathBuf>,

    /// Module size in bytes
    pub size: usize,

    /// Chunks this module is a member of (kept symmetric with
    /// `Chunk::modules` by the graph mutators)
    pub chunks: Vec<ChunkId>,

    /// Optional eligibility predicate for moving this module into a chunk
    pub condition: Option<ChunkCondition>,
}

impl Module {
    /// Create a module with the given size and no resource path
    pub fn new(size: usize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// Create a module backed by a source file
    pub fn with_resource(size: usize, resource: impl Into<PathBuf>) -> Self {
        Self {
            resource: Some(resource.into()),
            size,
            ..Self::default()
        }
    }

    /// Whether this module may be placed into `chunk`
    pub fn accepts_chunk(&self, graph: &ChunkGraph, chunk: ChunkId) -> bool {
        match self.condition {
            Some(condition) => condition(graph, chunk),
            None => true,
        }
    }
}
