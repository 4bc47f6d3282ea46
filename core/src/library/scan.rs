//! Scan coordination
//!
//! One task per source runs on a bounded rayon pool. Tasks merge their
//! entries into a shared accumulator keyed by game name (last writer wins)
//! and report completion over a channel. The coordinating thread keeps at
//! most one task per worker in flight, checking for cancellation before
//! each dispatch, then waits for the rest up to a fixed ceiling and returns
//! whatever has accumulated. Corruption prompts run on a separate
//! interaction thread so an unanswered dialog never holds up the wait.

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use hashbrown::HashMap;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::Serialize;

use mapdeck_shared::DEFAULT_MAX_WAIT_SECS;

use super::{
    ArchiveScan, CatalogEntry, CatalogModel, CorruptionRecoveryGate, DescriptorIngestor,
    DescriptorParser, Diagnostic, DiagnosticLog, GameSource, Interaction, InteractionExecutor,
    InteractionHandle, MapRoots, SourceKind, enumerate_sources, read_archive,
};

/// Wait ceilings longer than this are treated as this.
const LONGEST_WAIT: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Cooperative stop signal for a scan.
///
/// Checked before each source is dispatched; tasks already running are
/// never interrupted. Clones share the flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanState {
    Idle,
    Scanning,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// How long a scan may wait on its tasks before returning partial results.
    pub max_wait: Duration,
    /// Worker count; `None` uses [`default_worker_count`].
    pub workers: Option<usize>,
    /// Ask before deleting corrupt archives. When off they are kept.
    pub prompt_on_corrupt: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_wait: Duration::from_secs(DEFAULT_MAX_WAIT_SECS),
            workers: None,
            prompt_on_corrupt: true,
        }
    }
}

/// Half the available cores, at least one.
pub fn default_worker_count() -> usize {
    thread::available_parallelism()
        .map(|n| n.get() / 2)
        .unwrap_or(1)
        .max(1)
}

/// Result of one scan.
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Accumulated entries, one per game name, in no particular order.
    pub entries: Vec<CatalogEntry>,
    /// `Completed` or `Cancelled`.
    pub state: ScanState,
    /// The wait ceiling elapsed before every task finished. Sources not yet
    /// dispatched at that point are skipped.
    pub timed_out: bool,
    pub dispatched: usize,
    pub finished: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl ScanReport {
    pub fn into_catalog(self) -> CatalogModel {
        CatalogModel::build(self.entries)
    }
}

type Accumulator = Arc<Mutex<HashMap<String, CatalogEntry>>>;

/// Sent by every task when it ends, normally or by panicking.
struct TaskFinished {
    path: PathBuf,
    panicked: bool,
}

/// Runs scans over a pair of map roots.
pub struct ScanCoordinator {
    parser: Arc<dyn DescriptorParser>,
    interaction: Arc<dyn Interaction>,
    options: ScanOptions,
    state: Mutex<ScanState>,
}

impl ScanCoordinator {
    pub fn new(parser: Arc<dyn DescriptorParser>, interaction: Arc<dyn Interaction>) -> Self {
        Self {
            parser,
            interaction,
            options: ScanOptions::default(),
            state: Mutex::new(ScanState::Idle),
        }
    }

    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    pub fn state(&self) -> ScanState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: ScanState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    fn worker_count(&self) -> usize {
        self.options
            .workers
            .unwrap_or_else(default_worker_count)
            .max(1)
    }

    /// Scan both roots and return the accumulated entries.
    ///
    /// Blocks the calling thread for at most `max_wait` after enumeration.
    /// Corruption prompts are presented on a dedicated interaction thread;
    /// once the ceiling passes, prompts not yet shown are refused.
    pub fn scan(&self, roots: &MapRoots, token: &CancellationToken) -> ScanReport {
        let diagnostics = DiagnosticLog::new();
        let sources = enumerate_sources(roots, &diagnostics);
        self.set_state(ScanState::Scanning);
        let workers = self.worker_count();
        tracing::info!(sources = sources.len(), workers, "Scanning map sources");

        let started = Instant::now();
        let deadline = deadline_after(started, self.options.max_wait);
        let accumulator: Accumulator = Arc::default();
        let (events, inbox) = mpsc::channel();
        let executor = match InteractionExecutor::spawn(self.interaction.clone()) {
            Ok(executor) => Some(executor),
            Err(e) => {
                tracing::warn!(error = %e, "Could not start interaction context, corrupt archives will be kept");
                None
            }
        };
        let gate = CorruptionRecoveryGate::new(
            executor
                .as_ref()
                .map_or_else(InteractionHandle::closed, InteractionExecutor::handle),
        )
        .with_prompts(self.options.prompt_on_corrupt);
        let ingestor = DescriptorIngestor::new(self.parser.clone(), diagnostics.clone());

        let pool = self.build_pool(workers);
        let mut progress = Progress::default();
        let mut cancelled = false;
        let mut timed_out = false;
        'dispatch: for source in sources {
            while progress.pending() >= workers {
                match progress.await_one(&inbox, deadline, &diagnostics) {
                    Wake::Finished => {}
                    Wake::Expired => {
                        timed_out = true;
                        break 'dispatch;
                    }
                    Wake::Idle => break,
                }
            }
            if token.is_cancelled() {
                tracing::info!(
                    dispatched = progress.dispatched,
                    "Scan cancelled, not dispatching remaining sources"
                );
                cancelled = true;
                break;
            }
            let task = ScanTask {
                source,
                ingestor: ingestor.clone(),
                gate: gate.clone(),
                accumulator: accumulator.clone(),
                events: events.clone(),
            };
            progress.dispatched += 1;
            match &pool {
                Some(pool) => pool.spawn(move || task.run()),
                // the guard inside the task still reports a panic
                None => drop(panic::catch_unwind(AssertUnwindSafe(|| task.run()))),
            }
        }
        // No new tasks; workers exit once the queued ones are done.
        drop(pool);
        drop(gate);
        drop(events);

        if !timed_out {
            timed_out = !progress.await_all(&inbox, deadline, &diagnostics);
        }
        if timed_out {
            diagnostics.report(Diagnostic::WaitExpired {
                pending: progress.pending(),
                waited: started.elapsed(),
            });
        }
        // Queued and late dialog requests now fail with `ContextClosed`.
        drop(executor);
        drop(inbox);

        let entries: Vec<CatalogEntry> = accumulator
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        let state = if cancelled {
            ScanState::Cancelled
        } else {
            ScanState::Completed
        };
        self.set_state(state);
        tracing::info!(
            entries = entries.len(),
            dispatched = progress.dispatched,
            finished = progress.finished,
            timed_out,
            "Scan finished"
        );

        ScanReport {
            entries,
            state,
            timed_out,
            dispatched: progress.dispatched,
            finished: progress.finished,
            diagnostics: diagnostics.snapshot(),
        }
    }

    fn build_pool(&self, workers: usize) -> Option<ThreadPool> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("mapdeck-scan-{}", i))
            .panic_handler(|_| tracing::error!("Scan worker panicked"))
            .build();
        match pool {
            Ok(pool) => Some(pool),
            Err(e) => {
                tracing::warn!(error = %e, "Could not start scan workers, scanning inline");
                None
            }
        }
    }
}

/// `start + wait`, clamped so a huge ceiling cannot overflow.
fn deadline_after(start: Instant, wait: Duration) -> Instant {
    start.checked_add(wait.min(LONGEST_WAIT)).unwrap_or(start)
}

enum Wake {
    Finished,
    Expired,
    /// No task is left that could report.
    Idle,
}

#[derive(Debug, Default)]
struct Progress {
    dispatched: usize,
    finished: usize,
}

impl Progress {
    fn pending(&self) -> usize {
        self.dispatched - self.finished
    }

    fn await_one(
        &mut self,
        inbox: &Receiver<TaskFinished>,
        deadline: Instant,
        diagnostics: &DiagnosticLog,
    ) -> Wake {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match inbox.recv_timeout(remaining) {
            Ok(TaskFinished { path, panicked }) => {
                self.finished += 1;
                if panicked {
                    diagnostics.report(Diagnostic::TaskPanicked { path });
                }
                Wake::Finished
            }
            Err(RecvTimeoutError::Timeout) => Wake::Expired,
            Err(RecvTimeoutError::Disconnected) => Wake::Idle,
        }
    }

    /// Wait for every dispatched task. False if the deadline passed first.
    fn await_all(
        &mut self,
        inbox: &Receiver<TaskFinished>,
        deadline: Instant,
        diagnostics: &DiagnosticLog,
    ) -> bool {
        while self.pending() > 0 {
            match self.await_one(inbox, deadline, diagnostics) {
                Wake::Finished => {}
                Wake::Expired => return false,
                Wake::Idle => break,
            }
        }
        true
    }
}

/// Work for one source.
struct ScanTask {
    source: GameSource,
    ingestor: DescriptorIngestor,
    gate: CorruptionRecoveryGate,
    accumulator: Accumulator,
    events: Sender<TaskFinished>,
}

impl ScanTask {
    fn run(self) {
        let _finished = FinishGuard {
            path: self.source.path().to_path_buf(),
            events: self.events.clone(),
        };
        tracing::debug!(path = %self.source.path().display(), "Scanning source");

        let entries = match self.source.kind() {
            SourceKind::Directory => self.ingestor.ingest_directory(&self.source),
            SourceKind::Archive => match read_archive(&self.source, &self.ingestor) {
                ArchiveScan::Entries(entries) => entries,
                ArchiveScan::Corrupt { .. } => {
                    let outcome = self.gate.handle(self.source.path());
                    tracing::debug!(path = %self.source.path().display(), ?outcome, "Corrupt archive handled");
                    Vec::new()
                }
                ArchiveScan::Unreadable => Vec::new(),
            },
        };

        let mut accumulator = self
            .accumulator
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for entry in entries {
            accumulator.insert(entry.name().to_string(), entry);
        }
    }
}

/// Reports the task as finished when dropped, including during a panic.
struct FinishGuard {
    path: PathBuf,
    events: Sender<TaskFinished>,
}

impl Drop for FinishGuard {
    fn drop(&mut self) {
        // The coordinator may have stopped listening.
        let _ = self.events.send(TaskFinished {
            path: std::mem::take(&mut self.path),
            panicked: thread::panicking(),
        });
    }
}
