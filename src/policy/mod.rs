//! Extraction policies
//!
//! A policy decides which modules are common and where they move, then
//! drives the graph utility api to realize the decision. Policies are plain
//! callbacks over [`crate::api::ChunkApi`]; the built-in ones cover
//! threshold-based commons extraction, vendor extraction, and the fully
//! option-driven commons chunk policy.

pub mod commons;
pub mod threshold;
pub mod vendor;

use crate::graph::Module;

pub use commons::{AsyncMode, CommonsChunkOptions, CommonsChunkPolicy};
pub use threshold::common_chunk;
pub use vendor::vendor_chunk;

/// Minimum-use requirement for a module to count as common
///
/// Counts normalize to the predicate form internally: `Count(n)` keeps
/// modules used by at least `n` chunks, `Infinity` keeps none (useful to
/// create an empty chunk that only receives re-parented children), and
/// `Predicate` defers entirely to the caller.
#[derive(Debug, Clone, Copy)]
pub enum MinChunks {
    /// Module must belong to at least this many chunks
    Count(usize),

    /// No module qualifies
    Infinity,

    /// Custom check over the module and its use count
    Predicate(fn(&Module, usize) -> bool),
}

impl MinChunks {
    /// Whether a module with the given use count qualifies as common
    pub fn accepts(&self, module: &Module, count: usize) -> bool {
        match self {
            MinChunks::Count(min) => count >= *min,
            MinChunks::Infinity => false,
            MinChunks::Predicate(check) => check(module, count),
        }
    }
}
