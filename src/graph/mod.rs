//! Chunk graph model
//!
//! Arena-backed storage for chunks, modules, entrypoints, and async blocks.
//! Relationships are explicit adjacency lists of ids, maintained
//! bidirectionally by the mutators here; entities are never removed from the
//! arenas, so ids stay stable for the lifetime of a compilation.

mod chunk;
mod module;
pub mod stats;

use std::collections::HashMap;

use tracing::debug;

use crate::error::OptimizeError;

pub use chunk::{Block, BlockId, Chunk, ChunkOrigin, Entrypoint};
pub use module::{ChunkCondition, Module, ModuleId};

/// Unique identifier for a chunk
pub type ChunkId = usize;

/// Unique identifier for an entrypoint
pub type EntrypointId = usize;

/// The chunk graph of a single compilation
#[derive(Debug, Default)]
pub struct ChunkGraph {
    chunks: Vec<Chunk>,
    modules: Vec<Module>,
    entrypoints: Vec<Entrypoint>,
    blocks: Vec<Block>,
}

impl ChunkGraph {
    /// Create a new empty chunk graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate and register a new chunk
    pub fn add_chunk(&mut self, name: Option<&str>) -> ChunkId {
        let id = self.chunks.len();
        self.chunks.push(Chunk::new(name));
        debug!("Added chunk {} ({:?})", id, name);
        id
    }

    /// Register a module with the graph
    pub fn add_module(&mut self, module: Module) -> ModuleId {
        let id = self.modules.len();
        self.modules.push(module);
        id
    }

    /// Register a named entrypoint routing through the given chunk sequence
    ///
    /// Each chunk in the sequence gets the entrypoint recorded on it.
    pub fn add_entrypoint(&mut self, name: &str, chunks: &[ChunkId]) -> EntrypointId {
        let id = self.entrypoints.len();
        self.entrypoints.push(Entrypoint {
            name: name.to_string(),
            chunks: chunks.to_vec(),
        });
        for &chunk in chunks {
            let entrypoints = &mut self.chunks[chunk].entrypoints;
            if !entrypoints.contains(&id) {
                entrypoints.push(id);
            }
        }
        id
    }

    /// Register an async block on `owner`, originating from `module` and
    /// triggering the load of `targets`
    pub fn add_block(&mut self, owner: ChunkId, module: ModuleId, targets: &[ChunkId]) -> BlockId {
        let id = self.blocks.len();
        self.blocks.push(Block {
            module,
            chunks: targets.to_vec(),
        });
        self.chunks[owner].blocks.push(id);
        id
    }

    /// Get a chunk by id
    pub fn chunk(&self, id: ChunkId) -> &Chunk {
        &self.chunks[id]
    }

    /// Get a mutable reference to a chunk
    pub fn chunk_mut(&mut self, id: ChunkId) -> &mut Chunk {
        &mut self.chunks[id]
    }

    /// Get a module by id
    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id]
    }

    /// Get a mutable reference to a module
    pub fn module_mut(&mut self, id: ModuleId) -> &mut Module {
        &mut self.modules[id]
    }

    /// Get an entrypoint by id
    pub fn entrypoint(&self, id: EntrypointId) -> &Entrypoint {
        &self.entrypoints[id]
    }

    /// Get a block by id
    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id]
    }

    /// Get a mutable reference to a block
    pub fn block_mut(&mut self, id: BlockId) -> &mut Block {
        &mut self.blocks[id]
    }

    /// All chunk ids currently registered, in creation order
    pub fn chunk_ids(&self) -> impl Iterator<Item = ChunkId> {
        0..self.chunks.len()
    }

    /// All module ids currently registered, in creation order
    pub fn module_ids(&self) -> impl Iterator<Item = ModuleId> {
        0..self.modules.len()
    }

    /// Total number of chunks
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Build a name -> chunk lookup over the given chunks
    ///
    /// Anonymous chunks are omitted; on duplicate names the later chunk wins.
    pub fn name_index(&self, chunks: &[ChunkId]) -> HashMap<String, ChunkId> {
        let mut map = HashMap::new();
        for &chunk in chunks {
            if let Some(name) = &self.chunks[chunk].name {
                map.insert(name.clone(), chunk);
            }
        }
        map
    }

    /// Establish the two-way module/chunk membership link
    ///
    /// Returns true if the link was newly created, false if it already
    /// existed (re-adding is a no-op).
    pub fn connect_chunk_and_module(&mut self, chunk: ChunkId, module: ModuleId) -> bool {
        let chunk_modules = &mut self.chunks[chunk].modules;
        if chunk_modules.contains(&module) {
            return false;
        }
        chunk_modules.push(module);
        let module_chunks = &mut self.modules[module].chunks;
        if !module_chunks.contains(&chunk) {
            module_chunks.push(chunk);
        }
        true
    }

    /// Remove the two-way module/chunk membership link
    ///
    /// Transactional per pair: returns true iff the module was previously
    /// connected to the chunk and both sides were updated.
    pub fn disconnect_chunk_and_module(&mut self, chunk: ChunkId, module: ModuleId) -> bool {
        let module_chunks = &mut self.modules[module].chunks;
        let Some(pos) = module_chunks.iter().position(|&c| c == chunk) else {
            return false;
        };
        module_chunks.remove(pos);
        let chunk_modules = &mut self.chunks[chunk].modules;
        if let Some(pos) = chunk_modules.iter().position(|&m| m == module) {
            chunk_modules.remove(pos);
        }
        true
    }

    /// Record `parent` as a parent of `child` and `child` as a child of
    /// `parent`, keeping both adjacency lists consistent
    pub fn link_parent_child(&mut self, parent: ChunkId, child: ChunkId) {
        let parents = &mut self.chunks[child].parents;
        if !parents.contains(&parent) {
            parents.push(parent);
        }
        let children = &mut self.chunks[parent].children;
        if !children.contains(&child) {
            children.push(child);
        }
    }

    /// Splice `chunk` into an entrypoint's load sequence immediately before
    /// `before`, preserving the relative order of all other chunks
    ///
    /// If `chunk` is already in the sequence it is only moved when it
    /// currently sits after `before`. The entrypoint is registered on the
    /// inserted chunk so the chunk is no longer considered async.
    pub fn insert_chunk_in_entrypoint(
        &mut self,
        entrypoint: EntrypointId,
        chunk: ChunkId,
        before: ChunkId,
    ) {
        let sequence = &mut self.entrypoints[entrypoint].chunks;
        let Some(before_idx) = sequence.iter().position(|&c| c == before) else {
            return;
        };
        match sequence.iter().position(|&c| c == chunk) {
            Some(old_idx) if old_idx > before_idx => {
                sequence.remove(old_idx);
                sequence.insert(before_idx, chunk);
            }
            Some(_) => {}
            None => sequence.insert(before_idx, chunk),
        }

        let entrypoints = &mut self.chunks[chunk].entrypoints;
        if !entrypoints.contains(&entrypoint) {
            entrypoints.push(entrypoint);
        }
    }
}

/// Compilation-scoped host state handed to the optimization phase
///
/// Owns the mutable chunk graph and the error-reporting channel policies
/// append configuration errors to. Built fresh per compilation and discarded
/// afterwards.
#[derive(Debug, Default)]
pub struct Compilation {
    /// The live chunk graph
    pub graph: ChunkGraph,

    /// Errors reported by policies; these do not abort the build
    pub errors: Vec<OptimizeError>,
}

impl Compilation {
    /// Create an empty compilation
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_membership_symmetry() {
        let mut graph = ChunkGraph::new();
        let chunk = graph.add_chunk(Some("main"));
        let module = graph.add_module(Module::new(100));

        assert!(graph.connect_chunk_and_module(chunk, module));
        assert_eq!(graph.chunk(chunk).modules, vec![module]);
        assert_eq!(graph.module(module).chunks, vec![chunk]);

        assert!(graph.disconnect_chunk_and_module(chunk, module));
        assert!(graph.chunk(chunk).modules.is_empty());
        assert!(graph.module(module).chunks.is_empty());
    }

    #[test]
    fn test_connect_is_idempotent() {
        let mut graph = ChunkGraph::new();
        let chunk = graph.add_chunk(None);
        let module = graph.add_module(Module::new(1));

        assert!(graph.connect_chunk_and_module(chunk, module));
        assert!(!graph.connect_chunk_and_module(chunk, module));
        assert_eq!(graph.chunk(chunk).modules.len(), 1);
        assert_eq!(graph.module(module).chunks.len(), 1);
    }

    #[test]
    fn test_disconnect_reports_missing_link() {
        let mut graph = ChunkGraph::new();
        let chunk = graph.add_chunk(None);
        let module = graph.add_module(Module::new(1));

        assert!(!graph.disconnect_chunk_and_module(chunk, module));
    }

    #[test]
    fn test_name_index_skips_anonymous_and_last_wins() {
        let mut graph = ChunkGraph::new();
        let first = graph.add_chunk(Some("app"));
        let anonymous = graph.add_chunk(None);
        let second = graph.add_chunk(Some("app"));
        let chunks: Vec<ChunkId> = vec![first, anonymous, second];

        let index = graph.name_index(&chunks);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("app"), Some(&second));
    }

    #[test]
    fn test_parent_child_links_are_bidirectional() {
        let mut graph = ChunkGraph::new();
        let parent = graph.add_chunk(Some("commons"));
        let child = graph.add_chunk(Some("page"));

        graph.link_parent_child(parent, child);
        graph.link_parent_child(parent, child);

        assert_eq!(graph.chunk(child).parents, vec![parent]);
        assert_eq!(graph.chunk(parent).children, vec![child]);
    }

    #[test]
    fn test_entrypoint_splice_preserves_order() {
        let mut graph = ChunkGraph::new();
        let x = graph.add_chunk(Some("x"));
        let child = graph.add_chunk(Some("child"));
        let y = graph.add_chunk(Some("y"));
        let parent = graph.add_chunk(Some("parent"));
        let entry = graph.add_entrypoint("main", &[x, child, y]);

        graph.insert_chunk_in_entrypoint(entry, parent, child);

        assert_eq!(graph.entrypoint(entry).chunks, vec![x, parent, child, y]);
        assert!(graph.chunk(parent).entrypoints.contains(&entry));
    }

    #[test]
    fn test_entrypoint_splice_moves_later_chunk_forward() {
        let mut graph = ChunkGraph::new();
        let child = graph.add_chunk(Some("child"));
        let parent = graph.add_chunk(Some("parent"));
        let entry = graph.add_entrypoint("main", &[child, parent]);

        graph.insert_chunk_in_entrypoint(entry, parent, child);

        assert_eq!(graph.entrypoint(entry).chunks, vec![parent, child]);
    }
}
