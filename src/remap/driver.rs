//! Run driver: references → analysis → commit.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::{Span, debug, info, info_span, warn};
use uuid::Uuid;

use super::config::RemapConfig;
use super::context::{FileOutcome, FileSink, RemapContext};
use super::diagnostics::{Diagnostic, Issue};
use super::error::WriteError;
use super::java::rewrite_references;
use super::mixin::rewrite_mixins;
use super::transaction::{DocumentStore, TransactionSet};
use crate::base::{FileId, LineCol, TextSize};
use crate::hir::{ProgramIndex, ReferenceIndex, ReferenceLocator};
use crate::mapping::MappingChain;
use crate::syntax::SyntaxFile;

/// Wall-clock time of each phase.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RemapTimings {
    pub references: Duration,
    pub analysis: Duration,
    pub commit: Duration,
}

/// What a run did.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RemapReport {
    pub run_id: Uuid,
    pub files_analysed: usize,
    pub files_changed: usize,
    pub edits_applied: usize,
    /// Constructs left untouched, in file order.
    pub diagnostics: Vec<Diagnostic>,
    /// Edits that could not be applied.
    pub failures: Vec<Diagnostic>,
    /// Cancelled before the write phase; nothing was written.
    pub cancelled: bool,
    pub timings: RemapTimings,
}

impl RemapReport {
    fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            files_analysed: 0,
            files_changed: 0,
            edits_applied: 0,
            diagnostics: Vec::new(),
            failures: Vec::new(),
            cancelled: false,
            timings: RemapTimings::default(),
        }
    }
}

/// Remaps the source files of a program through a mapping chain.
#[derive(Clone, Debug, Default)]
pub struct Remapper {
    config: RemapConfig,
}

impl Remapper {
    pub fn new(config: RemapConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RemapConfig {
        &self.config
    }

    /// Analyse every source file, then commit all edits to `store`.
    ///
    /// Cancellation is checked between files and once more before the write
    /// phase. A cancelled run writes nothing.
    pub fn run(
        &self,
        program: &ProgramIndex,
        chain: &MappingChain,
        store: &dyn DocumentStore,
        cancel: &CancellationToken,
    ) -> RemapReport {
        self.run_inner(program, chain, None, store, cancel)
    }

    /// Like [`run`](Self::run), with `locator` answering the usage searches
    /// for renamed mixin members.
    pub fn run_with_locator(
        &self,
        program: &ProgramIndex,
        chain: &MappingChain,
        locator: &dyn ReferenceLocator,
        store: &dyn DocumentStore,
        cancel: &CancellationToken,
    ) -> RemapReport {
        self.run_inner(program, chain, Some(locator), store, cancel)
    }

    fn run_inner(
        &self,
        program: &ProgramIndex,
        chain: &MappingChain,
        locator: Option<&dyn ReferenceLocator>,
        store: &dyn DocumentStore,
        cancel: &CancellationToken,
    ) -> RemapReport {
        let run_id = Uuid::new_v4();
        let span = info_span!("remap", run = %run_id);
        let _guard = span.enter();
        let mut report = RemapReport::new(run_id);

        let start = Instant::now();
        let references = ReferenceIndex::build(program);
        report.timings.references = start.elapsed();

        let mut ctx = RemapContext::new(program, chain, &self.config, &references);
        if let Some(locator) = locator {
            ctx = ctx.with_locator(locator);
        }
        let start = Instant::now();
        let outcomes = self.analyse(&ctx, cancel);
        report.timings.analysis = start.elapsed();
        report.files_analysed = outcomes.len();

        if cancel.is_cancelled() {
            info!("[REMAP] Cancelled after analysing {} files, nothing written", outcomes.len());
            report.cancelled = true;
            return report;
        }

        let mut transactions = TransactionSet::new();
        for outcome in outcomes {
            let path = program.file(outcome.file).path();
            let transaction = transactions.transaction_mut(outcome.file, path);
            for edit in outcome.edits {
                transaction.push(edit);
            }
            for (file, edit) in outcome.foreign {
                transactions
                    .transaction_mut(file, program.file(file).path())
                    .push(edit);
            }
            report.diagnostics.extend(outcome.diagnostics);
        }

        let start = Instant::now();
        let summary = transactions.commit(store);
        report.timings.commit = start.elapsed();
        report.files_changed = summary.files_changed;
        report.edits_applied = summary.edits_applied;
        report.failures = summary
            .failures
            .into_iter()
            .map(|(file, path, err)| write_failure(program, file, path, &err))
            .collect();

        info!(
            "[REMAP] {} files analysed, {} changed, {} edits, {} diagnostics, {} failures",
            report.files_analysed,
            report.files_changed,
            report.edits_applied,
            report.diagnostics.len(),
            report.failures.len()
        );
        report
    }

    fn analyse(&self, ctx: &RemapContext<'_>, cancel: &CancellationToken) -> Vec<FileOutcome> {
        let files: Vec<&SyntaxFile> = ctx.program.source_files().collect();
        let parent = Span::current();
        let work = || {
            files
                .par_iter()
                .filter_map(|file| {
                    if cancel.is_cancelled() {
                        return None;
                    }
                    let _guard = parent.enter();
                    Some(self.analyse_file(ctx, file))
                })
                .collect::<Vec<_>>()
        };

        match self.config.parallelism {
            Some(threads) => match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
                Ok(pool) => pool.install(work),
                Err(err) => {
                    warn!("[REMAP] Could not build a {}-thread pool: {}", threads, err);
                    work()
                }
            },
            None => work(),
        }
    }

    fn analyse_file<'a>(&self, ctx: &RemapContext<'a>, file: &'a SyntaxFile) -> FileOutcome {
        if file.has_errors() {
            debug!(
                "[REMAP] {} has {} syntax errors",
                file.path().display(),
                file.errors().len()
            );
        }
        let mut sink = FileSink::new(ctx, file);
        rewrite_references(ctx, &mut sink);
        if self.config.rewrite_mixins {
            if let Err(err) = rewrite_mixins(ctx, &mut sink) {
                sink.fail_file(&err);
            }
        }
        sink.finish()
    }
}

fn write_failure(program: &ProgramIndex, file: FileId, path: PathBuf, err: &WriteError) -> Diagnostic {
    let offset = match err {
        WriteError::Stale { offset, .. }
        | WriteError::Overlap { offset }
        | WriteError::OutOfBounds { offset } => Some(*offset),
        WriteError::Io(_) => None,
    };
    let position = offset
        .and_then(|o| program.files().get(file.index()).map(|f| (f, o)))
        .map_or(LineCol::default(), |(f, o)| {
            f.line_index().line_col(TextSize::from(o))
        });
    Diagnostic {
        file,
        path,
        position,
        context: None,
        issue: Issue::WriteFailure {
            message: err.to_string(),
        },
    }
}
