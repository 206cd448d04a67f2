//! Chunk graph surgery for module bundlers
//!
//! Restructures a compilation's chunk graph at the optimize-chunks phase:
//! shared modules are extracted into new commons or vendor chunks, and
//! parent/child, entrypoint, and async-block relationships are rewired so
//! the resulting bundle avoids duplicate module emission.
//!
//! The [`api::ChunkApi`] exposes the primitive graph operations; the
//! [`policy`] module contains the built-in extraction policies; the
//! [`plugin::ChunkPlugin`] invokes one policy per compilation.

pub mod api;
pub mod error;
pub mod graph;
pub mod plugin;
pub mod policy;

pub use api::ChunkApi;
pub use error::OptimizeError;
pub use graph::{
    Block, BlockId, Chunk, ChunkGraph, ChunkId, ChunkOrigin, Compilation, Entrypoint,
    EntrypointId, Module, ModuleId,
};
pub use plugin::ChunkPlugin;
pub use policy::{
    common_chunk, vendor_chunk, AsyncMode, CommonsChunkOptions, CommonsChunkPolicy, MinChunks,
};
