use std::path::{Path, PathBuf};

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::base::{FileId, Name};
use crate::hir::ProgramIndex;
use crate::mapping::NamespaceMapping;
use crate::syntax::{FileRole, SyntaxFile};

/// Errors raised while loading a workspace.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("directory not found: {0}")]
    MissingRoot(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Loads Java files from source roots (rewritten) and library roots
/// (resolution only) into a [`ProgramIndex`].
#[derive(Clone, Debug, Default)]
pub struct WorkspaceLoader {
    source_roots: Vec<PathBuf>,
    library_roots: Vec<PathBuf>,
    known_classes: Vec<Name>,
}

impl WorkspaceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.source_roots.push(root.into());
        self
    }

    pub fn with_library_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.library_roots.push(root.into());
        self
    }

    /// Classes without source that imports and qualified names may refer to.
    pub fn with_known_classes<N: Into<Name>>(mut self, classes: impl IntoIterator<Item = N>) -> Self {
        self.known_classes.extend(classes.into_iter().map(Into::into));
        self
    }

    /// Every class of `table`'s source namespace is known.
    pub fn with_mapping(self, table: &NamespaceMapping) -> Self {
        let classes: Vec<Name> = table.classes().map(|c| c.src.clone()).collect();
        self.with_known_classes(classes)
    }

    /// Read and parse every `*.java` file under the roots, then index them.
    pub fn load(&self) -> Result<ProgramIndex, LoadError> {
        let mut paths = Vec::new();
        for root in &self.source_roots {
            paths.extend(collect_java_files(root)?.into_iter().map(|p| (p, FileRole::Source)));
        }
        for root in &self.library_roots {
            paths.extend(collect_java_files(root)?.into_iter().map(|p| (p, FileRole::Library)));
        }

        // Parse files in parallel; ids are assigned by the index
        let files = paths
            .par_iter()
            .map(|(path, role)| {
                let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
                    path: path.clone(),
                    source,
                })?;
                let file = SyntaxFile::new(FileId::new(0), path.clone(), text, *role);
                if file.has_errors() {
                    debug!("[LOAD] {}: {} syntax errors", path.display(), file.errors().len());
                }
                Ok(file)
            })
            .collect::<Result<Vec<_>, LoadError>>()?;

        info!(
            "[LOAD] Loaded {} files from {} source and {} library roots",
            files.len(),
            self.source_roots.len(),
            self.library_roots.len()
        );
        Ok(ProgramIndex::build(files, self.known_classes.iter().cloned()))
    }
}

/// All `*.java` files under `root`, sorted by path.
pub fn collect_java_files(root: &Path) -> Result<Vec<PathBuf>, LoadError> {
    if !root.is_dir() {
        return Err(LoadError::MissingRoot(root.to_path_buf()));
    }
    let mut paths = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|e| e == "java") {
            paths.push(path.to_path_buf());
        }
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_root() {
        let result = WorkspaceLoader::new()
            .with_source_root("/definitely/not/here")
            .load();
        assert!(matches!(result, Err(LoadError::MissingRoot(_))));
    }

    #[test]
    fn test_load_roles() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src/a");
        let lib = dir.path().join("lib/b");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::create_dir_all(&lib).unwrap();
        std::fs::write(src.join("Foo.java"), "package a;\nclass Foo extends b.Base {}").unwrap();
        std::fs::write(src.join("notes.txt"), "ignored").unwrap();
        std::fs::write(lib.join("Base.java"), "package b;\npublic class Base {}").unwrap();

        let index = WorkspaceLoader::new()
            .with_source_root(dir.path().join("src"))
            .with_library_root(dir.path().join("lib"))
            .load()
            .unwrap();

        assert_eq!(index.files().len(), 2);
        assert_eq!(index.source_files().count(), 1);
        assert!(index.class_by_internal_name("a/Foo").is_some());
        assert!(index.class_by_internal_name("b/Base").is_some());
    }
}
