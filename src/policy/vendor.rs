//! Vendor chunk extraction
//!
//! Moves every module that originates from an installed dependency into a
//! single "vendor" chunk, leaving application-authored modules untouched.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::api::ChunkApi;
use crate::graph::{ChunkId, ModuleId};

/// Matches resource paths routed through a package install directory
static VENDOR_RESOURCE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\\/]node_modules[\\/]").unwrap());

/// Whether a resource path belongs to an externally-authored dependency
fn is_vendor_resource(resource: &std::path::Path) -> bool {
    VENDOR_RESOURCE_REGEX.is_match(&resource.to_string_lossy())
}

/// Build a policy extracting all externally-authored modules into a chunk
/// named "vendor"
///
/// Chunks named in `exclude` contribute no modules. After extraction, any
/// excluded chunk that still shares a module with the vendor chunk is
/// re-parented under it, so entry chunks depending on extracted modules load
/// the vendor chunk first.
pub fn vendor_chunk(exclude: Vec<String>) -> impl FnMut(&mut ChunkApi<'_>) -> Option<ChunkId> {
    move |api| {
        let name_map = api.chunk_name_map();
        let excluded: Vec<ChunkId> = exclude
            .iter()
            .filter_map(|name| name_map.get(name).copied())
            .collect();
        let other_chunks: Vec<ChunkId> = api
            .chunks()
            .iter()
            .copied()
            .filter(|chunk| !excluded.contains(chunk))
            .collect();

        let mut vendor_modules: Vec<ModuleId> = Vec::new();
        for &chunk in &other_chunks {
            for &module in &api.graph().chunk(chunk).modules {
                let is_vendor = api
                    .graph()
                    .module(module)
                    .resource
                    .as_deref()
                    .is_some_and(is_vendor_resource);
                if is_vendor && !vendor_modules.contains(&module) {
                    vendor_modules.push(module);
                }
            }
        }
        debug!(
            "Found {} vendor modules across {} chunks",
            vendor_modules.len(),
            other_chunks.len()
        );

        let vendor = api.create_chunk_from(&other_chunks, &vendor_modules, Some("vendor"));

        // excluded chunks keep their copies, but must still load the vendor
        // chunk first when they share a module with it
        for &chunk in &excluded {
            let shares_module = api
                .graph()
                .chunk(chunk)
                .modules
                .iter()
                .any(|module| api.graph().chunk(vendor).modules.contains(module));
            if shares_module {
                api.add_chunk_as_parent(vendor, &[chunk]);
            }
        }

        Some(vendor)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::graph::{Compilation, Module};

    fn vendor_module(compilation: &mut Compilation, package: &str) -> ModuleId {
        compilation.graph.add_module(Module::with_resource(
            100,
            format!("/app/node_modules/{package}/index.js"),
        ))
    }

    fn app_module(compilation: &mut Compilation, file: &str) -> ModuleId {
        compilation
            .graph
            .add_module(Module::with_resource(50, format!("/app/src/{file}")))
    }

    #[test]
    fn test_vendor_extraction_end_to_end() {
        let mut compilation = Compilation::new();
        let react = vendor_module(&mut compilation, "react");
        let lodash = vendor_module(&mut compilation, "lodash");
        let axios = vendor_module(&mut compilation, "axios");
        let app = app_module(&mut compilation, "app.js");
        let page = app_module(&mut compilation, "page.js");

        let one = compilation.graph.add_chunk(Some("one"));
        let two = compilation.graph.add_chunk(Some("two"));
        for (chunk, modules) in [(one, vec![react, lodash, app]), (two, vec![axios, page])] {
            for module in modules {
                compilation.graph.connect_chunk_and_module(chunk, module);
            }
        }

        let mut api = ChunkApi::new(&mut compilation);
        let vendor = vendor_chunk(vec![])(&mut api).unwrap();

        assert_eq!(api.graph().chunk(vendor).modules, vec![react, lodash, axios]);
        assert_eq!(api.graph().chunk(one).modules, vec![app]);
        assert_eq!(api.graph().chunk(two).modules, vec![page]);
        assert_eq!(api.graph().chunk(one).parents, vec![vendor]);
        assert_eq!(api.graph().chunk(two).parents, vec![vendor]);
        assert_eq!(api.graph().chunk(vendor).name.as_deref(), Some("vendor"));
    }

    #[test]
    fn test_excluded_chunk_contributes_nothing() {
        let mut compilation = Compilation::new();
        let react = vendor_module(&mut compilation, "react");
        let example = compilation.graph.add_chunk(Some("example"));
        compilation.graph.connect_chunk_and_module(example, react);

        let mut api = ChunkApi::new(&mut compilation);
        let vendor = vendor_chunk(vec!["example".to_string()])(&mut api).unwrap();

        assert!(api.graph().chunk(vendor).modules.is_empty());
        assert_eq!(api.graph().chunk(example).modules, vec![react]);
        assert!(api.graph().chunk(example).parents.is_empty());
    }

    #[test]
    fn test_excluded_chunk_sharing_vendor_module_is_reparented() {
        let mut compilation = Compilation::new();
        let react = vendor_module(&mut compilation, "react");
        let page = app_module(&mut compilation, "page.js");
        let example = compilation.graph.add_chunk(Some("example"));
        let other = compilation.graph.add_chunk(Some("other"));
        for (chunk, modules) in [(example, vec![react]), (other, vec![react, page])] {
            for module in modules {
                compilation.graph.connect_chunk_and_module(chunk, module);
            }
        }
        compilation.graph.add_entrypoint("example", &[example]);

        let mut api = ChunkApi::new(&mut compilation);
        let vendor = vendor_chunk(vec!["example".to_string()])(&mut api).unwrap();

        // "example" keeps its copy but now loads the vendor chunk first
        assert_eq!(api.graph().chunk(vendor).modules, vec![react]);
        assert_eq!(api.graph().chunk(example).modules, vec![react]);
        assert_eq!(api.graph().chunk(example).parents, vec![vendor]);
        assert!(api.graph().chunk(vendor).children.contains(&example));
        assert_eq!(api.graph().chunk(other).modules, vec![page]);
    }
}
