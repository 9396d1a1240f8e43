//! Debounced, per-line lint cycles.
//!
//! Each document moves through `idle -> pending -> checking -> idle`. Edits
//! restart the pending quiet period; when it elapses, the latest text is
//! split into lines, each line is normalised and checked on the worker pool,
//! and the results populate the document's [`DiagnosticSet`].

use std::collections::HashMap;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::checker::LineChecker;
use crate::debounce::Debouncer;
use crate::diagnostics::{Diagnostic, DiagnosticSet, DiagnosticSnapshot, Generation};
use crate::indent::normalize_line;
use crate::pool::WorkerPool;

const PIPELINE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::pipeline");

/// Tuning for a [`LintPipeline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LintSettings {
    /// Quiet period before an edited document is checked.
    pub debounce: Duration,
    /// Maximum number of concurrent line checks.
    pub workers: usize,
}

/// Coordinates debouncing, fan-out and diagnostic bookkeeping.
pub struct LintPipeline {
    // Declared first so its thread, which holds the pool, stops before the
    // pool is joined.
    debouncer: Debouncer<String, String>,
    cycles: Arc<CycleRunner>,
}

struct CycleRunner {
    checker: Arc<dyn LineChecker>,
    documents: Arc<DocumentTable>,
    pool: WorkerPool,
    generations: AtomicU64,
}

#[derive(Default)]
struct DocumentTable {
    sets: Mutex<HashMap<String, DiagnosticSet>>,
    changed: Condvar,
}

impl LintPipeline {
    /// Starts the debouncer thread and the worker pool.
    ///
    /// # Errors
    ///
    /// Returns an error when a thread cannot be spawned.
    pub fn new(checker: Arc<dyn LineChecker>, settings: LintSettings) -> io::Result<Self> {
        let cycles = Arc::new(CycleRunner {
            checker,
            documents: Arc::new(DocumentTable::default()),
            pool: WorkerPool::new(settings.workers)?,
            generations: AtomicU64::new(0),
        });
        let fired = Arc::clone(&cycles);
        let debouncer = Debouncer::spawn(settings.debounce, move |document: String, text: String| {
            fired.start(&document, &text);
        })?;
        Ok(Self { debouncer, cycles })
    }

    /// Records an edit; the document is checked once edits pause.
    pub fn edit(&self, document: &str, text: &str) {
        self.debouncer
            .schedule(document.to_owned(), text.to_owned());
    }

    /// Checks `text` immediately and waits for the cycle to finish.
    ///
    /// Any pending debounced edit of the document is cancelled. If a newer
    /// cycle starts while waiting, the snapshot of that newer cycle is
    /// returned as soon as this one is superseded.
    pub fn lint_now(&self, document: &str, text: &str) -> DiagnosticSnapshot {
        self.debouncer.cancel(document.to_owned());
        let generation = self.cycles.start(document, text);
        self.cycles.documents.wait_for(document, generation)
    }

    /// Current diagnostics of `document`.
    #[must_use]
    pub fn diagnostics(&self, document: &str) -> DiagnosticSnapshot {
        self.cycles.documents.snapshot(document)
    }

    /// Cancels pending work for `document` and forgets its diagnostics.
    pub fn close(&self, document: &str) {
        self.debouncer.cancel(document.to_owned());
        self.cycles.documents.forget(document);
    }
}

impl CycleRunner {
    fn start(&self, document: &str, text: &str) -> Generation {
        let generation = Generation::new(self.generations.fetch_add(1, Ordering::SeqCst) + 1);
        let lines: Vec<(usize, String)> = text
            .split('\n')
            .map(|line| normalize_line(line.strip_suffix('\r').unwrap_or(line)).into_owned())
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .collect();

        self.documents.begin(document, generation, lines.len());
        debug!(
            target: PIPELINE_TARGET,
            document,
            generation = generation.value(),
            lines = lines.len(),
            "starting lint cycle"
        );

        for (number, line) in lines {
            let checker = Arc::clone(&self.checker);
            let documents = Arc::clone(&self.documents);
            let key = document.to_owned();
            self.pool.execute(move || {
                if !documents.is_current(&key, generation) {
                    debug!(
                        target: PIPELINE_TARGET,
                        document = key.as_str(),
                        generation = generation.value(),
                        line = number,
                        "skipped line of superseded cycle"
                    );
                    return;
                }
                let checked = panic::catch_unwind(AssertUnwindSafe(|| checker.check(&line)));
                let found = match checked {
                    Ok(Ok(message)) => {
                        message.map(|text| Diagnostic::whole_line(number, &line, text))
                    }
                    Ok(Err(error)) => {
                        warn!(
                            target: PIPELINE_TARGET,
                            document = key.as_str(),
                            line = number,
                            %error,
                            "line check failed"
                        );
                        None
                    }
                    Err(_) => {
                        error!(
                            target: PIPELINE_TARGET,
                            document = key.as_str(),
                            line = number,
                            "line checker panicked"
                        );
                        None
                    }
                };
                documents.record(&key, generation, found);
            });
        }
        generation
    }
}

impl DocumentTable {
    fn lock(&self) -> MutexGuard<'_, HashMap<String, DiagnosticSet>> {
        self.sets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self, document: &str, generation: Generation, pending: usize) {
        let mut sets = self.lock();
        let started = sets
            .entry(document.to_owned())
            .or_default()
            .begin(generation, pending);
        drop(sets);
        if started {
            self.changed.notify_all();
        }
    }

    fn is_current(&self, document: &str, generation: Generation) -> bool {
        self.lock()
            .get(document)
            .is_some_and(|set| set.generation() == generation)
    }

    fn record(&self, document: &str, generation: Generation, diagnostic: Option<Diagnostic>) {
        let mut sets = self.lock();
        let accepted = sets
            .get_mut(document)
            .is_some_and(|set| set.record(generation, diagnostic));
        drop(sets);
        if accepted {
            self.changed.notify_all();
        } else {
            debug!(
                target: PIPELINE_TARGET,
                document,
                generation = generation.value(),
                "dropped result of superseded cycle"
            );
        }
    }

    fn snapshot(&self, document: &str) -> DiagnosticSnapshot {
        self.lock()
            .get(document)
            .map(DiagnosticSet::snapshot)
            .unwrap_or_default()
    }

    fn forget(&self, document: &str) {
        self.lock().remove(document);
        self.changed.notify_all();
    }

    fn wait_for(&self, document: &str, generation: Generation) -> DiagnosticSnapshot {
        let mut sets = self.lock();
        loop {
            match sets.get(document) {
                Some(set) if set.generation() == generation && !set.is_complete() => {}
                Some(set) => return set.snapshot(),
                None => return DiagnosticSnapshot::default(),
            }
            sets = self
                .changed
                .wait(sets)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}
