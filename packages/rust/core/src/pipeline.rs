//! End-to-end enrichment run: walk → classify → fetch → merge → delay.
//!
//! One [`Enricher`] serves both workflows. The [`Workflow`] decides which
//! files are selected and where the documentation is inserted; discovery,
//! fetching and formatting are shared.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use elemdoc_fetcher::DocSource;
use elemdoc_shared::{EnrichConfig, Result, Workflow};

use crate::classify::{Classification, Markers, inspect_file};
use crate::element::element_name_for_path;
use crate::merge::{merge, write_atomic};
use crate::walker::discover_element_files;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Why a file was left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The file could not be read.
    Unreadable,
    /// Append workflow: the file is a stub.
    NotImplemented,
    /// Prepend workflow: the file already has an implementation.
    AlreadyImplemented,
    /// A documentation block is already present.
    AlreadyDocumented,
    /// The file name has no `<element>` token.
    NoElementName,
    /// The documentation page could not be fetched or extracted.
    FetchFailed(String),
    /// The fetched documentation had no text.
    EmptyContent,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unreadable => f.write_str("file could not be read"),
            Self::NotImplemented => f.write_str("not implemented"),
            Self::AlreadyImplemented => f.write_str("already implemented"),
            Self::AlreadyDocumented => f.write_str("already has documentation"),
            Self::NoElementName => f.write_str("no element name in file name"),
            Self::FetchFailed(e) => write!(f, "fetch failed: {e}"),
            Self::EmptyContent => f.write_str("no content retrieved"),
        }
    }
}

/// Result of processing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Documentation was written into the file.
    Enriched { element: String, url: String },
    /// Dry run: the file would have been enriched with this element's page.
    Planned { element: String },
    /// Nothing was written.
    Skipped(SkipReason),
    /// The file was selected and fetched, but writing it failed.
    Failed(String),
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub workflow: Workflow,
    /// Element files discovered under the root.
    pub files_scanned: usize,
    /// Files that received documentation.
    pub enriched: Vec<PathBuf>,
    /// Dry run only: files that would have received documentation, with the
    /// element whose page would be fetched.
    pub planned: Vec<(PathBuf, String)>,
    /// Files left untouched, with the reason.
    pub skipped: Vec<(PathBuf, SkipReason)>,
    /// Files whose rewrite failed, with the error.
    pub failed: Vec<(PathBuf, String)>,
    pub elapsed: Duration,
}

impl RunSummary {
    fn new(workflow: Workflow, files_scanned: usize) -> Self {
        Self {
            workflow,
            files_scanned,
            enriched: Vec::new(),
            planned: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    fn record(&mut self, path: &Path, outcome: FileOutcome) {
        let path = path.to_path_buf();
        match outcome {
            FileOutcome::Enriched { .. } => self.enriched.push(path),
            FileOutcome::Planned { element } => self.planned.push((path, element)),
            FileOutcome::Skipped(reason) => self.skipped.push((path, reason)),
            FileOutcome::Failed(e) => self.failed.push((path, e)),
        }
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Progress callback for reporting run status.
pub trait ProgressReporter: Send + Sync {
    /// Called once discovery has found `total` files.
    fn started(&self, workflow: Workflow, total: usize);
    /// Called before a file is processed.
    fn file_started(&self, path: &Path, current: usize, total: usize);
    /// Called after a file is processed.
    fn file_finished(&self, path: &Path, outcome: &FileOutcome);
    /// Called when the run completes.
    fn done(&self, summary: &RunSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn started(&self, _workflow: Workflow, _total: usize) {}
    fn file_started(&self, _path: &Path, _current: usize, _total: usize) {}
    fn file_finished(&self, _path: &Path, _outcome: &FileOutcome) {}
    fn done(&self, _summary: &RunSummary) {}
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Decide whether `workflow` targets a file in state `state`.
///
/// Documented files are skipped by both workflows so that a second run over
/// an enriched tree changes nothing.
pub fn select(workflow: Workflow, state: &Classification) -> std::result::Result<(), SkipReason> {
    if !state.readable {
        return Err(SkipReason::Unreadable);
    }
    match workflow {
        Workflow::Append if !state.implemented => Err(SkipReason::NotImplemented),
        Workflow::Prepend if state.implemented => Err(SkipReason::AlreadyImplemented),
        _ if state.documented => Err(SkipReason::AlreadyDocumented),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Enricher
// ---------------------------------------------------------------------------

/// Runs one workflow over every element file under the configured root.
pub struct Enricher<S> {
    config: EnrichConfig,
    markers: Markers,
    source: S,
    workflow: Workflow,
    dry_run: bool,
}

impl<S: DocSource> Enricher<S> {
    /// Create an enricher. Fails if the configuration is invalid.
    pub fn new(config: EnrichConfig, source: S, workflow: Workflow) -> Result<Self> {
        config.validate()?;
        let markers = Markers::from(&config);
        Ok(Self {
            config,
            markers,
            source,
            workflow,
            dry_run: false,
        })
    }

    /// Classify and report only; no fetches, no writes.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Process every element file in sorted order, one at a time.
    ///
    /// Per-file problems are recorded in the summary; only a failed
    /// directory walk aborts the run.
    #[instrument(
        skip_all,
        fields(workflow = %self.workflow, root = %self.config.root_dir.display())
    )]
    pub async fn run(&self, progress: &dyn ProgressReporter) -> Result<RunSummary> {
        let start = Instant::now();
        let files = discover_element_files(&self.config.root_dir, &self.config.extension)?;
        let total = files.len();

        info!(total, dry_run = self.dry_run, "starting enrichment run");
        progress.started(self.workflow, total);

        let mut summary = RunSummary::new(self.workflow, total);

        for (idx, path) in files.iter().enumerate() {
            progress.file_started(path, idx + 1, total);

            let outcome = self.process_file(path).await;
            let enriched = matches!(outcome, FileOutcome::Enriched { .. });

            progress.file_finished(path, &outcome);
            summary.record(path, outcome);

            if enriched && !self.config.request_delay.is_zero() {
                tokio::time::sleep(self.config.request_delay).await;
            }
        }

        summary.elapsed = start.elapsed();

        info!(
            enriched = summary.enriched.len(),
            planned = summary.planned.len(),
            skipped = summary.skipped.len(),
            failed = summary.failed.len(),
            duration_ms = summary.elapsed.as_millis(),
            "enrichment run completed"
        );
        progress.done(&summary);

        Ok(summary)
    }

    /// Classify, fetch, merge and write a single file.
    #[instrument(skip_all, fields(file = %path.display()))]
    pub async fn process_file(&self, path: &Path) -> FileOutcome {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let state = inspect_file(path, &self.markers);
        if let Err(reason) = select(self.workflow, &state) {
            debug!(file = %file_name, %reason, "skipping");
            return FileOutcome::Skipped(reason);
        }

        let Some(element) = element_name_for_path(path) else {
            warn!(file = %file_name, "could not extract element name, skipping");
            return FileOutcome::Skipped(SkipReason::NoElementName);
        };

        info!(file = %file_name, %element, "processing");

        if self.dry_run {
            return FileOutcome::Planned { element };
        }

        debug!(%element, "fetching documentation");
        let doc = match self.source.fetch(&element).await {
            Ok(doc) => doc,
            Err(e) => {
                warn!(%element, error = %e, "could not fetch documentation");
                return FileOutcome::Skipped(SkipReason::FetchFailed(e.to_string()));
            }
        };

        if doc.text.trim().is_empty() {
            warn!(%element, "no content retrieved");
            return FileOutcome::Skipped(SkipReason::EmptyContent);
        }

        let original = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(error = %e, "could not read file for merge");
                return FileOutcome::Skipped(SkipReason::Unreadable);
            }
        };

        let merged = merge(
            self.workflow,
            &original,
            &element,
            &self.config.doc_title,
            &doc,
        );

        if let Err(e) = write_atomic(path, &merged) {
            error!(error = %e, "failed to write documentation");
            return FileOutcome::Failed(e.to_string());
        }

        let position = match self.workflow {
            Workflow::Append => "end",
            Workflow::Prepend => "start",
        };
        info!(%element, url = %doc.url, position, dest = %path.display(), "added documentation");

        FileOutcome::Enriched {
            element,
            url: doc.url,
        }
    }
}

// ---------------------------------------------------------------------------
// Scan report
// ---------------------------------------------------------------------------

/// One row of the scan report.
#[derive(Debug, Clone, Serialize)]
pub struct ScanEntry {
    pub path: PathBuf,
    pub element: Option<String>,
    pub classification: Classification,
    /// The documentation URL this element maps to.
    pub url: Option<String>,
    /// Workflow that would enrich this file, if any.
    pub target: Option<Workflow>,
}

/// Classify every element file under the configured root without fetching.
pub fn scan_tree(config: &EnrichConfig) -> Result<Vec<ScanEntry>> {
    let markers = Markers::from(config);
    let files = discover_element_files(&config.root_dir, &config.extension)?;

    Ok(files
        .into_iter()
        .map(|path| {
            let classification = inspect_file(&path, &markers);
            let element = element_name_for_path(&path);
            let url = element.as_deref().map(|e| config.doc_url(e));
            let target = element.as_ref().and_then(|_| {
                [Workflow::Append, Workflow::Prepend]
                    .into_iter()
                    .find(|w| select(*w, &classification).is_ok())
            });
            ScanEntry {
                path,
                element,
                classification,
                url,
                target,
            }
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
