//! Option-driven commons chunk policy
//!
//! The configurable counterpart of the simple threshold policy: targets can
//! be named chunks (reused or created), every chunk in children/async mode,
//! or an explicit selection; extraction can be gated on a minimum total size
//! and can route through a freshly inserted async commons chunk instead of a
//! synchronous parent.

use std::collections::HashMap;

use anyhow::{bail, Result};
use tracing::{debug, info};

use crate::api::ChunkApi;
use crate::error::OptimizeError;
use crate::graph::{ChunkId, ChunkOrigin, ModuleId};
use crate::policy::MinChunks;

/// How the async commons mode is configured
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AsyncMode {
    /// Synchronous commons chunk (the default)
    #[default]
    Off,

    /// Insert an anonymous async commons chunk under each target
    Unnamed,

    /// Insert a named async commons chunk under each target
    Named(String),
}

impl AsyncMode {
    /// Whether async commons insertion is enabled
    pub fn is_enabled(&self) -> bool {
        !matches!(self, AsyncMode::Off)
    }

    fn chunk_name(&self) -> Option<&str> {
        match self {
            AsyncMode::Named(name) => Some(name),
            _ => None,
        }
    }
}

/// Options controlling [`CommonsChunkPolicy`]
#[derive(Debug, Clone, Default)]
pub struct CommonsChunkOptions {
    /// Target chunk names; existing chunks are reused, missing ones created
    pub names: Vec<String>,

    /// Restrict the source chunks to this explicit name selection
    pub selected_chunks: Option<Vec<String>>,

    /// Extract from each target's child chunks instead
    pub children: bool,

    /// Insert the commons chunk as an async load-time dependency
    pub async_mode: AsyncMode,

    /// Minimum-use requirement; defaults to `max(2, affected chunk count)`
    pub min_chunks: Option<MinChunks>,

    /// Skip extraction when the selected modules total fewer bytes
    pub min_size: Option<usize>,
}

/// Commons chunk extraction with the full option surface
pub struct CommonsChunkPolicy {
    options: CommonsChunkOptions,
}

impl CommonsChunkPolicy {
    /// Validate the options and build the policy
    ///
    /// Fails fast on invalid mode combinations, before any graph mutation
    /// can happen.
    pub fn new(options: CommonsChunkOptions) -> Result<Self> {
        if options.children && options.selected_chunks.is_some() {
            bail!("the children mode and an explicit chunk selection cannot be used together");
        }
        Ok(Self { options })
    }

    /// Run the policy against one compilation's chunk graph
    ///
    /// Returns the commons chunk processed last, if any target made it past
    /// validation. Configuration errors are reported to the compilation and
    /// abort only this policy's work.
    pub fn run(&self, api: &mut ChunkApi<'_>) -> Option<ChunkId> {
        let targets = self.target_chunks(api)?;
        let mut last_commons = None;

        for (index, &target) in targets.iter().enumerate() {
            let Some(affected) = self.affected_chunks(api, target, &targets, index) else {
                continue;
            };

            // in async mode a fresh chunk is inserted below the target and
            // takes over as the extraction destination
            let target = if self.options.async_mode.is_enabled() {
                self.create_async_chunk(api, target)
            } else {
                target
            };

            let extractable = self.extractable_modules(api, &affected, target);

            if let Some(min_size) = self.options.min_size {
                let total: usize = extractable
                    .iter()
                    .map(|&module| api.graph().module(module).size)
                    .sum();
                if total < min_size {
                    debug!(
                        "Skipping extraction into chunk {}: {} bytes < min size {}",
                        target, total, min_size
                    );
                    continue;
                }
            }

            let affected_with_removed = api.remove_modules_from_chunks(&extractable, &affected);
            api.add_modules_to_chunk(&extractable, target);
            info!(
                "Moved {} common modules into chunk {}",
                extractable.len(),
                target
            );

            if self.options.async_mode.is_enabled() {
                // the commons chunk loads at the async boundaries of the
                // chunks it was extracted from
                api.move_all_blocks_to_chunk(&affected_with_removed, target);
                let origins = self.collect_origins(api, &affected_with_removed);
                api.graph_mut().chunk_mut(target).origins = origins;
                last_commons = Some(target);
                continue;
            }

            api.add_chunk_as_parent(target, &affected);
            last_commons = Some(target);
        }

        last_commons
    }

    /// Resolve the target chunks for extraction
    ///
    /// Named targets are looked up or created; without names the
    /// children/async modes target every chunk. Anything else is a
    /// configuration error reported to the compilation.
    fn target_chunks(&self, api: &mut ChunkApi<'_>) -> Option<Vec<ChunkId>> {
        if !self.options.names.is_empty() {
            let name_map = api.chunk_name_map();
            let targets = self
                .options
                .names
                .iter()
                .map(|name| match name_map.get(name) {
                    Some(&chunk) => chunk,
                    None => api.add_chunk(Some(name)),
                })
                .collect();
            return Some(targets);
        }

        if self.options.children || self.options.async_mode.is_enabled() {
            return Some(api.chunks().to_vec());
        }

        api.report_error(OptimizeError::NoTargetChunks);
        None
    }

    /// Chunks whose modules are candidates for extraction into `target`
    ///
    /// Returns None when the target is rejected (reported to the
    /// compilation); an empty selection is valid and continues.
    fn affected_chunks(
        &self,
        api: &mut ChunkApi<'_>,
        target: ChunkId,
        targets: &[ChunkId],
        index: usize,
    ) -> Option<Vec<ChunkId>> {
        if let Some(selected) = &self.options.selected_chunks {
            return Some(
                api.chunks()
                    .iter()
                    .copied()
                    .filter(|&chunk| {
                        let is_selected = api
                            .graph()
                            .chunk(chunk)
                            .name
                            .as_ref()
                            .is_some_and(|name| selected.contains(name));
                        chunk != target && is_selected
                    })
                    .collect(),
            );
        }

        if self.options.children || self.options.async_mode.is_enabled() {
            // modules may only move out of a child when the target is its
            // sole parent, unless the commons chunk loads asynchronously
            let async_enabled = self.options.async_mode.is_enabled();
            return Some(
                api.graph()
                    .chunk(target)
                    .children
                    .iter()
                    .copied()
                    .filter(|&child| {
                        async_enabled || api.graph().chunk(child).parents.len() == 1
                    })
                    .collect(),
            );
        }

        // past this point only entry chunks may become commons chunks
        if !api.graph().chunk(target).parents.is_empty() {
            let name = api
                .graph()
                .chunk(target)
                .name
                .clone()
                .unwrap_or_else(|| "<unnamed>".to_string());
            api.report_error(OptimizeError::NonEntryTarget(name));
            return None;
        }

        // runtime chunks listed before the current target hand their
        // modules (and with them the runtime) over to it
        Some(
            api.chunks()
                .iter()
                .copied()
                .filter(|&chunk| {
                    if let Some(position) = targets.iter().position(|&t| t == chunk) {
                        if position >= index {
                            return false;
                        }
                    }
                    api.graph().chunk(chunk).has_runtime
                })
                .collect(),
        )
    }

    /// Insert a fresh extra-async chunk below `target`
    fn create_async_chunk(&self, api: &mut ChunkApi<'_>, target: ChunkId) -> ChunkId {
        let async_chunk = api.add_chunk(self.options.async_mode.chunk_name());
        {
            let chunk = api.graph_mut().chunk_mut(async_chunk);
            chunk.reason = Some("async commons chunk".to_string());
            chunk.extra_async = true;
        }
        api.graph_mut().link_parent_child(target, async_chunk);
        async_chunk
    }

    /// Select the modules qualifying as common across the affected chunks
    ///
    /// Counts chunk membership per module, then applies the minimum-use
    /// filter and each module's own chunk condition against the target.
    fn extractable_modules(
        &self,
        api: &ChunkApi<'_>,
        affected: &[ChunkId],
        target: ChunkId,
    ) -> Vec<ModuleId> {
        let min_chunks = self
            .options
            .min_chunks
            .unwrap_or(MinChunks::Count(affected.len().max(2)));
        if matches!(min_chunks, MinChunks::Infinity) {
            return Vec::new();
        }

        let mut use_counts: HashMap<ModuleId, usize> = HashMap::new();
        for &chunk in affected {
            for &module in &api.graph().chunk(chunk).modules {
                *use_counts.entry(module).or_insert(0) += 1;
            }
        }

        api.graph()
            .module_ids()
            .filter(|&id| {
                let Some(&count) = use_counts.get(&id) else {
                    return false;
                };
                let module = api.graph().module(id);
                min_chunks.accepts(module, count) && module.accepts_chunk(api.graph(), target)
            })
            .collect()
    }

    /// Copy the origins of the chunks that lost modules, tagging each with
    /// the async commons reason
    fn collect_origins(&self, api: &ChunkApi<'_>, chunks: &[ChunkId]) -> Vec<ChunkOrigin> {
        let mut origins = Vec::new();
        for &chunk in chunks {
            for origin in &api.graph().chunk(chunk).origins {
                let mut origin = origin.clone();
                origin.reasons.push("async commons".to_string());
                origins.push(origin);
            }
        }
        origins
    }
}
