//! Serializable diagnostic snapshots of the chunk graph
//!
//! Useful for logging the graph shape after optimization and for asserting
//! on it in host integrations.

use serde::Serialize;

use super::ChunkGraph;

/// Flat per-chunk summary of the graph state
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChunkSummary {
    /// Chunk name, if any
    pub name: Option<String>,

    /// Number of member modules
    pub modules: usize,

    /// Names of entrypoints routing through the chunk
    pub entrypoints: Vec<String>,

    /// Names of parent chunks (None for anonymous parents)
    pub parents: Vec<Option<String>>,

    /// Names of child chunks
    pub children: Vec<Option<String>>,

    /// Number of async blocks owned by the chunk
    pub blocks: usize,

    /// Whether the chunk carries the runtime
    pub has_runtime: bool,

    /// Whether the chunk was created as an extra async commons chunk
    pub extra_async: bool,
}

/// Summarize every chunk in the graph, in creation order
pub fn summarize(graph: &ChunkGraph) -> Vec<ChunkSummary> {
    graph
        .chunk_ids()
        .map(|id| {
            let chunk = graph.chunk(id);
            ChunkSummary {
                name: chunk.name.clone(),
                modules: chunk.len(),
                entrypoints: chunk
                    .entrypoints
                    .iter()
                    .map(|&e| graph.entrypoint(e).name.clone())
                    .collect(),
                parents: chunk
                    .parents
                    .iter()
                    .map(|&p| graph.chunk(p).name.clone())
                    .collect(),
                children: chunk
                    .children
                    .iter()
                    .map(|&c| graph.chunk(c).name.clone())
                    .collect(),
                blocks: chunk.blocks.len(),
                has_runtime: chunk.has_runtime,
                extra_async: chunk.extra_async,
            }
        })
        .collect()
}

/// Render the graph summary as pretty-printed JSON
pub fn to_json(graph: &ChunkGraph) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&summarize(graph))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::graph::Module;

    #[test]
    fn test_summarize_reports_graph_shape() {
        let mut graph = ChunkGraph::new();
        let main = graph.add_chunk(Some("main"));
        let commons = graph.add_chunk(Some("commons"));
        let module = graph.add_module(Module::new(10));
        graph.connect_chunk_and_module(main, module);
        graph.link_parent_child(commons, main);
        graph.add_entrypoint("main", &[main]);

        let summaries = summarize(&graph);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].name.as_deref(), Some("main"));
        assert_eq!(summaries[0].modules, 1);
        assert_eq!(summaries[0].entrypoints, vec!["main".to_string()]);
        assert_eq!(summaries[0].parents, vec![Some("commons".to_string())]);
        assert_eq!(summaries[1].children, vec![Some("main".to_string())]);
    }

    #[test]
    fn test_to_json_round_trips_names() {
        let mut graph = ChunkGraph::new();
        graph.add_chunk(Some("vendor"));

        let json = to_json(&graph).unwrap();
        assert!(json.contains("\"vendor\""));
    }
}
