//! Graph utility API
//!
//! Primitive, composable operations over the chunk graph, bound to the live
//! chunk list of one compilation. This is the only sanctioned mutation
//! surface for extraction policies; policies are expected not to edit chunk
//! or module adjacency lists directly.

use std::collections::HashMap;

use tracing::debug;

use crate::error::OptimizeError;
use crate::graph::{ChunkGraph, ChunkId, Compilation, ModuleId};

/// Mutation handle over one compilation's chunk graph
///
/// Holds the chunk list as delivered by the optimization event; chunks
/// created through the api are appended to it.
pub struct ChunkApi<'a> {
    compilation: &'a mut Compilation,
    chunks: Vec<ChunkId>,
}

impl<'a> ChunkApi<'a> {
    /// Bind an api to the compilation's current chunk list
    pub fn new(compilation: &'a mut Compilation) -> Self {
        let chunks = compilation.graph.chunk_ids().collect();
        Self { compilation, chunks }
    }

    /// The live chunk list, including chunks created through this api
    pub fn chunks(&self) -> &[ChunkId] {
        &self.chunks
    }

    /// Read access to the underlying graph
    pub fn graph(&self) -> &ChunkGraph {
        &self.compilation.graph
    }

    /// Mutable access to the underlying graph
    ///
    /// Intended for bookkeeping fields (origins, reasons, flags); adjacency
    /// lists must be edited through the api operations so the relationship
    /// invariants hold.
    pub fn graph_mut(&mut self) -> &mut ChunkGraph {
        &mut self.compilation.graph
    }

    /// Report a configuration error on the compilation
    ///
    /// Reported errors abort the reporting policy's work only; they do not
    /// halt other policies or the build.
    pub fn report_error(&mut self, error: OptimizeError) {
        self.compilation.errors.push(error);
    }

    /// Build a name -> chunk lookup from the live chunk list
    ///
    /// Anonymous chunks are omitted; on duplicate names the later chunk wins.
    pub fn chunk_name_map(&self) -> HashMap<String, ChunkId> {
        self.compilation.graph.name_index(&self.chunks)
    }

    /// Allocate and register a new chunk with the compilation
    pub fn add_chunk(&mut self, name: Option<&str>) -> ChunkId {
        let chunk = self.compilation.graph.add_chunk(name);
        self.chunks.push(chunk);
        chunk
    }

    /// Establish the two-way membership link for each module and the target
    /// chunk; re-adding an existing link is a no-op
    pub fn add_modules_to_chunk(&mut self, modules: &[ModuleId], target: ChunkId) {
        for &module in modules {
            self.compilation.graph.connect_chunk_and_module(target, module);
        }
    }

    /// Attempt to remove every (module, chunk) link in the cross product
    ///
    /// Returns the de-duplicated set of chunks that actually lost at least
    /// one module, in first-removal order. This is the primary signal for
    /// which chunks need re-parenting afterwards.
    pub fn remove_modules_from_chunks(
        &mut self,
        modules: &[ModuleId],
        chunks: &[ChunkId],
    ) -> Vec<ChunkId> {
        let mut affected = Vec::new();
        for &module in modules {
            for &chunk in chunks {
                if self.compilation.graph.disconnect_chunk_and_module(chunk, module)
                    && !affected.contains(&chunk)
                {
                    affected.push(chunk);
                }
            }
        }
        affected
    }

    /// Make `parent` a parent of every chunk in `children`, splicing it into
    /// each reachable entrypoint's load sequence immediately before the child
    ///
    /// Async status of the parent and of all children is evaluated before
    /// any mutation, because [`ChunkApi::is_async`] walks live graph state.
    /// A previously-async parent gaining a non-async child is forced
    /// synchronous by discarding its blocks.
    pub fn add_chunk_as_parent(&mut self, parent: ChunkId, children: &[ChunkId]) {
        let was_async = self.is_async(parent);
        let children_async = children.iter().all(|&child| self.is_async(child));

        for &child in children {
            self.compilation.graph.link_parent_child(parent, child);

            let entrypoints = self.compilation.graph.chunk(child).entrypoints.clone();
            for entrypoint in entrypoints {
                self.compilation
                    .graph
                    .insert_chunk_in_entrypoint(entrypoint, parent, child);
            }
        }

        if was_async && !children_async {
            debug!("Chunk {} gained a synchronous child, dropping its blocks", parent);
            self.make_sync(parent);
        }
    }

    /// Move every async block owned by the source chunks onto the target
    ///
    /// The target is prepended to each block's trigger list so the target
    /// loads at the same async boundary as its new children. Block order
    /// within a chunk is preserved and target ownership is additive.
    pub fn move_all_blocks_to_chunk(&mut self, sources: &[ChunkId], target: ChunkId) {
        for &source in sources {
            let blocks = self.compilation.graph.chunk(source).blocks.clone();
            for block in blocks {
                self.compilation.graph.block_mut(block).chunks.insert(0, target);
                self.compilation.graph.chunk_mut(target).blocks.push(block);
            }
        }
    }

    /// Whether a chunk is fully async: no entrypoint routes through it
    /// directly and every child (recursively) is also fully async
    ///
    /// Pure read. Recurses over children without cycle detection; the caller
    /// must ensure the chunk graph is acyclic.
    pub fn is_async(&self, chunk: ChunkId) -> bool {
        let chunk = self.compilation.graph.chunk(chunk);
        if !chunk.entrypoints.is_empty() {
            return false;
        }
        chunk.children.iter().all(|&child| self.is_async(child))
    }

    /// Discard all async blocks from a chunk
    ///
    /// Used when a previously-async chunk gains a synchronous dependent and
    /// can no longer be treated as async-safe.
    pub fn make_sync(&mut self, chunk: ChunkId) {
        self.compilation.graph.chunk_mut(chunk).blocks.clear();
    }

    /// Create a new chunk holding `modules`, extracted from `sources`
    ///
    /// Creates the chunk, links the modules in, removes them from every
    /// source chunk (the new chunk is excluded from the source set), makes
    /// the new chunk a parent of each affected chunk, and - only when the new
    /// chunk ends up fully async - moves the affected chunks' blocks onto it
    /// so they load at the same async trigger point.
    ///
    /// When no source chunk actually loses a module the new chunk is still
    /// created and returned, but stays disconnected.
    pub fn create_chunk_from(
        &mut self,
        sources: &[ChunkId],
        modules: &[ModuleId],
        name: Option<&str>,
    ) -> ChunkId {
        let commons = self.add_chunk(name);
        self.add_modules_to_chunk(modules, commons);

        let sources: Vec<ChunkId> = sources.iter().copied().filter(|&c| c != commons).collect();
        let affected = self.remove_modules_from_chunks(modules, &sources);
        debug!(
            "Extracted {} modules into chunk {:?}, {} chunks affected",
            modules.len(),
            name,
            affected.len()
        );
        self.add_chunk_as_parent(commons, &affected);

        if self.is_async(commons) {
            // load the commons chunk at the same async boundary as its
            // new children
            self.move_all_blocks_to_chunk(&affected, commons);
        }
        commons
    }
}
