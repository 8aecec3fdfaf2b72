//! Write-back: per-file edit transactions and document stores.
//!
//! Analysis only queues [`Edit`]s. Each file's edits are applied together to
//! the current text and written back with a single write, so a file is
//! either fully rewritten or untouched on disk. A failing edit is skipped and
//! reported; its siblings still apply.

use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info, warn};

use super::error::WriteError;
use crate::base::{FileId, TextRange, TextSize};
use crate::syntax::SyntaxFile;

// ============================================================================
// EDITS
// ============================================================================

/// Replace the text at `range`, which must still read `expected`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Edit {
    pub range: TextRange,
    pub expected: String,
    pub replacement: String,
}

impl Edit {
    pub fn replace(range: TextRange, expected: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            range,
            expected: expected.into(),
            replacement: replacement.into(),
        }
    }

    pub fn insert(offset: TextSize, text: impl Into<String>) -> Self {
        Self {
            range: TextRange::empty(offset),
            expected: String::new(),
            replacement: text.into(),
        }
    }

    /// Insert a line comment on its own line above the line holding `anchor`,
    /// with the same indentation.
    pub fn comment(file: &SyntaxFile, anchor: TextSize, comment: &str) -> Self {
        let line_start = file.line_index().line_start(anchor);
        let indent = file.indentation_at(anchor);
        let mut text = String::new();
        for line in comment.lines() {
            text.push_str(indent);
            text.push_str(line);
            text.push('\n');
        }
        Self::insert(line_start, text)
    }
}

/// Result of applying a transaction to a text.
#[derive(Debug)]
pub struct AppliedEdits {
    pub text: String,
    pub applied: usize,
    pub failures: Vec<WriteError>,
}

// ============================================================================
// TRANSACTIONS
// ============================================================================

/// All pending edits of one file.
#[derive(Clone, Debug)]
pub struct FileTransaction {
    file: FileId,
    path: PathBuf,
    edits: Vec<Edit>,
}

impl FileTransaction {
    pub fn new(file: FileId, path: impl Into<PathBuf>) -> Self {
        Self {
            file,
            path: path.into(),
            edits: Vec::new(),
        }
    }

    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn push(&mut self, edit: Edit) {
        self.edits.push(edit);
    }

    /// Apply every edit to `text`. Identical edits apply once. Edits are
    /// ordered by position; insertions at an offset keep their queue order.
    pub fn apply(&self, text: &str) -> AppliedEdits {
        let mut seen = FxHashSet::default();
        let mut ordered: Vec<&Edit> = self.edits.iter().filter(|e| seen.insert(*e)).collect();
        ordered.sort_by_key(|e| (e.range.start(), e.range.end()));

        let mut out = String::with_capacity(text.len());
        let mut cursor = 0usize;
        let mut applied = 0;
        let mut failures = Vec::new();

        for edit in ordered {
            let start = usize::from(edit.range.start());
            let end = usize::from(edit.range.end());
            let offset = u32::from(edit.range.start());

            if end > text.len() || !text.is_char_boundary(start) || !text.is_char_boundary(end) {
                failures.push(WriteError::OutOfBounds { offset });
                continue;
            }
            if start < cursor {
                failures.push(WriteError::Overlap { offset });
                continue;
            }
            let found = &text[start..end];
            if found != edit.expected {
                failures.push(WriteError::Stale {
                    offset,
                    expected: edit.expected.clone(),
                    found: found.to_string(),
                });
                continue;
            }

            out.push_str(&text[cursor..start]);
            out.push_str(&edit.replacement);
            cursor = end;
            applied += 1;
        }
        out.push_str(&text[cursor..]);

        AppliedEdits {
            text: out,
            applied,
            failures,
        }
    }
}

/// Outcome of committing a [`TransactionSet`].
#[derive(Debug, Default)]
pub struct CommitSummary {
    pub files_changed: usize,
    pub edits_applied: usize,
    pub failures: Vec<(FileId, PathBuf, WriteError)>,
}

/// Transactions of a run, in the order files were first touched.
#[derive(Clone, Debug, Default)]
pub struct TransactionSet {
    transactions: IndexMap<FileId, FileTransaction>,
}

impl TransactionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transaction of `file`, created on first use.
    pub fn transaction_mut(&mut self, file: FileId, path: &Path) -> &mut FileTransaction {
        self.transactions
            .entry(file)
            .or_insert_with(|| FileTransaction::new(file, path))
    }

    pub fn get(&self, file: FileId) -> Option<&FileTransaction> {
        self.transactions.get(&file)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileTransaction> {
        self.transactions.values()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn edit_count(&self) -> usize {
        self.transactions.values().map(|t| t.edits.len()).sum()
    }

    /// Apply every transaction to `store`, one write per changed file.
    pub fn commit(self, store: &dyn DocumentStore) -> CommitSummary {
        let mut summary = CommitSummary::default();

        for (file, transaction) in self.transactions {
            if transaction.is_empty() {
                continue;
            }
            let path = transaction.path().to_path_buf();
            let current = match store.read(&path) {
                Ok(text) => text,
                Err(err) => {
                    warn!("[COMMIT] Could not read {}: {}", path.display(), err);
                    summary.failures.push((file, path, WriteError::Io(err)));
                    continue;
                }
            };

            let result = transaction.apply(&current);
            for failure in result.failures {
                warn!("[COMMIT] {}: {}", path.display(), failure);
                summary.failures.push((file, path.clone(), failure));
            }
            if result.text == current {
                continue;
            }

            match store.write(&path, &result.text) {
                Ok(()) => {
                    debug!("[COMMIT] {}: {} edits", path.display(), result.applied);
                    summary.files_changed += 1;
                    summary.edits_applied += result.applied;
                }
                Err(err) => {
                    warn!("[COMMIT] Could not write {}: {}", path.display(), err);
                    summary.failures.push((file, path, WriteError::Io(err)));
                }
            }
        }

        info!(
            "[COMMIT] {} files changed, {} edits applied, {} failures",
            summary.files_changed,
            summary.edits_applied,
            summary.failures.len()
        );
        summary
    }
}

// ============================================================================
// DOCUMENT STORES
// ============================================================================

/// Where committed text goes.
pub trait DocumentStore: Send + Sync {
    fn read(&self, path: &Path) -> io::Result<String>;

    /// Replace the whole document.
    fn write(&self, path: &Path, text: &str) -> io::Result<()>;
}

/// Reads and writes files on disk. Writes go to a sibling temp file that is
/// then renamed over the original.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsDocumentStore;

impl DocumentStore for FsDocumentStore {
    fn read(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, text: &str) -> io::Result<()> {
        let file_name = path
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
        let temp = path.with_file_name(format!(
            ".{}.{}.tmp",
            file_name.to_string_lossy(),
            uuid::Uuid::new_v4().simple()
        ));
        std::fs::write(&temp, text)?;
        std::fs::rename(&temp, path).inspect_err(|_| {
            let _ = std::fs::remove_file(&temp);
        })
    }
}

/// Keeps documents in memory: dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<FxHashMap<PathBuf, String>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with the text of every file.
    pub fn from_files<'f>(files: impl IntoIterator<Item = &'f SyntaxFile>) -> Self {
        let store = Self::new();
        for file in files {
            store.insert(file.path(), file.text());
        }
        store
    }

    pub fn insert(&self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.documents.write().insert(path.into(), text.into());
    }

    pub fn get(&self, path: &Path) -> Option<String> {
        self.documents.read().get(path).cloned()
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn read(&self, path: &Path) -> io::Result<String> {
        self.get(path).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no document {}", path.display()))
        })
    }

    fn write(&self, path: &Path, text: &str) -> io::Result<()> {
        self.insert(path, text);
        Ok(())
    }
}
