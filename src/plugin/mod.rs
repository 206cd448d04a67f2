//! Invocation adapter
//!
//! Bridges a host bundler's optimize-chunks phase to a policy callback.
//! Some hosts document their optimization events as potentially re-firing
//! within one compilation; the adapter guards against that with its own
//! already-run flag, so the policy body executes at most once.

use tracing::debug;

use crate::api::ChunkApi;
use crate::graph::{ChunkId, Compilation};

/// Drives one extraction policy once per compilation
pub struct ChunkPlugin {
    policy: Box<dyn FnMut(&mut ChunkApi<'_>) -> Option<ChunkId>>,
    applied: bool,
}

impl ChunkPlugin {
    /// Wrap a policy callback
    pub fn new(policy: impl FnMut(&mut ChunkApi<'_>) -> Option<ChunkId> + 'static) -> Self {
        Self {
            policy: Box::new(policy),
            applied: false,
        }
    }

    /// Handle one firing of the host's optimize-chunks event
    ///
    /// Binds a [`ChunkApi`] to the compilation's live chunk list and invokes
    /// the policy synchronously. Re-fires are ignored; the policy's chunk
    /// (if it produced one) is returned from the first qualifying firing
    /// only.
    pub fn optimize_chunks(&mut self, compilation: &mut Compilation) -> Option<ChunkId> {
        if self.applied {
            debug!("Chunk optimization already applied, ignoring re-fired event");
            return None;
        }
        self.applied = true;

        let mut api = ChunkApi::new(compilation);
        (self.policy)(&mut api)
    }

    /// Whether the policy has already run
    pub fn applied(&self) -> bool {
        self.applied
    }
}
