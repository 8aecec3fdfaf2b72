//! Helpers for building programs and chains and running remaps in memory.

use std::path::Path;
use std::sync::Arc;

use ravel::base::FileId;
use ravel::hir::{ProgramIndex, ReferenceLocator};
use ravel::mapping::{MappingChain, NamespaceMapping, parse_tiny_v2};
use ravel::remap::{MemoryDocumentStore, RemapConfig, RemapReport, Remapper};
use ravel::syntax::SyntaxFile;
use tokio_util::sync::CancellationToken;

/// Index source files given as `(path, text)` pairs.
pub fn program(sources: &[(&str, &str)]) -> ProgramIndex {
    let files: Vec<SyntaxFile> = sources
        .iter()
        .enumerate()
        .map(|(i, (path, text))| SyntaxFile::source(FileId::new(i as u32), *path, *text))
        .collect();
    for file in &files {
        assert!(
            !file.has_errors(),
            "Parse errors in '{}': {:?}",
            file.path().display(),
            file.errors()
        );
    }
    ProgramIndex::new(files)
}

/// A one-link chain reading `table` into its first destination namespace.
pub fn single_chain(table: NamespaceMapping) -> MappingChain {
    let destination = table.destination_namespaces()[0].to_string();
    MappingChain::from_tables([(Arc::new(table), destination.as_str())]).unwrap()
}

/// A one-link chain from a Tiny v2 document.
pub fn tiny_chain(tiny: &str) -> MappingChain {
    single_chain(parse_tiny_v2(tiny).unwrap())
}

/// Result of an in-memory remap.
pub struct RemapRun {
    pub report: RemapReport,
    pub store: MemoryDocumentStore,
}

impl RemapRun {
    /// Text of `path` after the run.
    pub fn text(&self, path: &str) -> String {
        self.store
            .get(Path::new(path))
            .unwrap_or_else(|| panic!("no document {path}"))
    }

    pub fn codes(&self) -> Vec<&'static str> {
        self.report.diagnostics.iter().map(|d| d.issue.code()).collect()
    }
}

/// Remap `program` into a memory store seeded with its own text.
pub fn run_remap(program: &ProgramIndex, chain: &MappingChain, config: RemapConfig) -> RemapRun {
    let store = MemoryDocumentStore::from_files(program.files());
    let report = Remapper::new(config).run(program, chain, &store, &CancellationToken::new());
    RemapRun { report, store }
}

/// Like [`run_remap`], with `locator` answering mixin usage searches.
pub fn run_remap_with_locator(
    program: &ProgramIndex,
    chain: &MappingChain,
    locator: &dyn ReferenceLocator,
    config: RemapConfig,
) -> RemapRun {
    let store = MemoryDocumentStore::from_files(program.files());
    let report =
        Remapper::new(config).run_with_locator(program, chain, locator, &store, &CancellationToken::new());
    RemapRun { report, store }
}

/// Config without inline comments, so unchanged files stay byte-identical.
pub fn quiet_config() -> RemapConfig {
    RemapConfig::default().with_comments(false)
}
