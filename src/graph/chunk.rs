//! Chunk, entrypoint, and async block entities

use super::{ChunkId, EntrypointId, ModuleId};

/// Unique identifier for an async code-split block
pub type BlockId = usize;

/// An output grouping of modules in the bundle graph
///
/// Parent/child lists and module membership are kept bidirectionally
/// consistent by the [`ChunkGraph`](super::ChunkGraph) mutators; callers
/// should not edit the adjacency lists by hand.
#[derive(Debug, Clone, Default)]
pub struct Chunk {
    /// Chunk name; unique names are used for lookup, anonymous chunks
    /// are skipped by the name index
    pub name: Option<String>,

    /// Modules contained in this chunk
    pub modules: Vec<ModuleId>,

    /// Chunks that load before this one
    pub parents: Vec<ChunkId>,

    /// Chunks this one is a parent of
    pub children: Vec<ChunkId>,

    /// Entrypoints whose load sequence routes through this chunk
    pub entrypoints: Vec<EntrypointId>,

    /// Async code-split blocks owned by this chunk
    pub blocks: Vec<BlockId>,

    /// Provenance records for diagnostics
    pub origins: Vec<ChunkOrigin>,

    /// Whether this chunk carries the bundler runtime
    pub has_runtime: bool,

    /// Marks chunks created as extra async commons chunks
    pub extra_async: bool,

    /// Why this chunk exists, for diagnostics
    pub reason: Option<String>,
}

impl Chunk {
    /// Create a chunk with an optional name
    pub fn new(name: Option<&str>) -> Self {
        Self {
            name: name.map(str::to_string),
            ..Self::default()
        }
    }

    /// Whether the chunk holds no modules
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Number of modules in this chunk
    pub fn len(&self) -> usize {
        self.modules.len()
    }
}

/// Provenance record attached to a chunk for diagnostics
#[derive(Debug, Clone, Default)]
pub struct ChunkOrigin {
    /// Module that caused the chunk to exist, if known
    pub module: Option<ModuleId>,

    /// Human-readable reasons accumulated during graph surgery
    pub reasons: Vec<String>,
}

/// Named root of a load sequence
///
/// The `chunks` list is the ordered sequence of chunks that must load
/// synchronously to satisfy this entry.
#[derive(Debug, Clone)]
pub struct Entrypoint {
    /// Entry name
    pub name: String,

    /// Ordered chunk load sequence
    pub chunks: Vec<ChunkId>,
}

/// One async/code-split load point
///
/// Owned by the chunk(s) listing it in their `blocks`; originates from a
/// single module. The trigger list names the chunks requested when the
/// block's load point is hit.
#[derive(Debug, Clone)]
pub struct Block {
    /// Module the async boundary originates from
    pub module: ModuleId,

    /// Chunks requested at this load point, in request order
    pub chunks: Vec<ChunkId>,
}
