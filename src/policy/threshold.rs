//! Threshold-based commons extraction
//!
//! Counts how many chunks each module belongs to and extracts every module
//! meeting a minimum-use count into one new chunk.

use std::collections::HashMap;

use tracing::debug;

use crate::api::ChunkApi;
use crate::graph::{ChunkId, ModuleId};

/// Build a policy extracting modules used by at least `min_count` chunks
/// into a new chunk
///
/// With `async_only` set, only chunks with no entrypoints contribute to the
/// use counts. Modules below the threshold never move. The new chunk is
/// created from the full chunk list, so every chunk that actually held a
/// common module ends up a child of it.
pub fn common_chunk(
    min_count: usize,
    async_only: bool,
    name: Option<&str>,
) -> impl FnMut(&mut ChunkApi<'_>) -> Option<ChunkId> {
    let name = name.map(str::to_string);
    move |api| {
        let mut use_counts: HashMap<ModuleId, usize> = HashMap::new();
        for &chunk in api.chunks() {
            if async_only && !api.graph().chunk(chunk).entrypoints.is_empty() {
                continue;
            }
            for &module in &api.graph().chunk(chunk).modules {
                *use_counts.entry(module).or_insert(0) += 1;
            }
        }

        // id order keeps the extraction deterministic
        let common_modules: Vec<ModuleId> = api
            .graph()
            .module_ids()
            .filter(|module| use_counts.get(module).is_some_and(|&count| count >= min_count))
            .collect();

        debug!(
            "{} of {} counted modules are common (min count {})",
            common_modules.len(),
            use_counts.len(),
            min_count
        );

        let sources = api.chunks().to_vec();
        let commons = api.create_chunk_from(&sources, &common_modules, name.as_deref());
        Some(commons)
    }
}
