//! Background persistence.
//!
//! Every mutation bumps a generation counter and signals the writer thread.
//! Signals that arrive while a request is already pending collapse into it,
//! so a burst of mutations costs one write. A pass reads the generation
//! before copying the store; when it finishes, it only writes if nothing newer
//! has been requested in the meantime (background passes) and if nothing at
//! least as new has already been committed (all passes). The committed
//! generation therefore never moves backwards, and the file never goes back
//! to an older state than one it already held.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex};

use super::error::StoreError;
use super::file::SnapshotSink;
use super::memory::MemoryStore;
use super::snapshot::Snapshot;
use crate::logging::{debug, error, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PassMode {
    /// Run by the writer thread; abandoned when superseded.
    Background,
    /// Run on the caller's thread by `flush`; always completes.
    Flush,
}

#[derive(Debug)]
pub(crate) enum PassOutcome {
    Committed { generation: u64 },
    Cancelled { generation: u64, latest: u64 },
    AlreadyCommitted { generation: u64, committed: u64 },
    Failed { generation: u64, error: StoreError },
}

impl fmt::Display for PassOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Committed { generation } => write!(f, "generation {generation} committed"),
            Self::Cancelled { generation, latest } => {
                write!(f, "generation {generation} superseded by {latest}")
            }
            Self::AlreadyCommitted {
                generation,
                committed,
            } => write!(f, "generation {generation} covered by {committed}"),
            Self::Failed { generation, error } => {
                write!(f, "generation {generation} failed: {error}")
            }
        }
    }
}

#[derive(Debug)]
pub(crate) struct Pass {
    generation: u64,
    snapshot: Snapshot,
}

/// Counters describing the persistence activity of a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistStats {
    /// Mutations that asked for persistence.
    pub requested: u64,
    /// Passes that ran to a decision.
    pub passes: u64,
    /// Passes whose snapshot reached the file.
    pub committed: u64,
    /// Background passes abandoned because a newer request arrived.
    pub cancelled: u64,
    /// Passes whose write failed.
    pub failed: u64,
    /// Write attempts against the backing file.
    pub writes: u64,
    /// Generation of the newest snapshot on disk.
    pub committed_generation: u64,
    /// Generation of the newest mutation.
    pub latest_generation: u64,
    /// Entries dropped at load time because their type tag was unknown.
    pub skipped_on_load: usize,
}

#[derive(Debug, Default)]
struct Counters {
    requested: AtomicU64,
    passes: AtomicU64,
    committed: AtomicU64,
    cancelled: AtomicU64,
    failed: AtomicU64,
    writes: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

#[derive(Debug, Default)]
struct Signal {
    pending: bool,
    deferred: usize,
    shutdown: bool,
}

enum Wake {
    Run,
    Stop,
}

/// Passes run one at a time under `write`. The committed generation and the
/// last error live outside that lock so readers never wait on file I/O.
pub(crate) struct Coordinator<S> {
    memory: Arc<MemoryStore>,
    sink: S,
    generation: AtomicU64,
    committed: AtomicU64,
    signal: Mutex<Signal>,
    wakeup: Condvar,
    write: Mutex<()>,
    last_error: Mutex<Option<String>>,
    counters: Counters,
    flush_on_drop: bool,
    skipped_on_load: usize,
}

impl<S: SnapshotSink> Coordinator<S> {
    pub(crate) fn new(
        memory: Arc<MemoryStore>,
        sink: S,
        flush_on_drop: bool,
        skipped_on_load: usize,
    ) -> Self {
        Self {
            memory,
            sink,
            generation: AtomicU64::new(0),
            committed: AtomicU64::new(0),
            signal: Mutex::new(Signal::default()),
            wakeup: Condvar::new(),
            write: Mutex::new(()),
            last_error: Mutex::new(None),
            counters: Counters::default(),
            flush_on_drop,
            skipped_on_load,
        }
    }

    /// Record a mutation that already happened in memory.
    pub(crate) fn request(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        Counters::bump(&self.counters.requested);

        let mut signal = self.signal.lock();
        if signal.pending {
            trace!(
                generation = self.generation.load(Ordering::Relaxed),
                "persistence request coalesced"
            );
            return;
        }
        signal.pending = true;
        if signal.deferred == 0 {
            self.wakeup.notify_one();
        }
    }

    /// The generation must be read before the copy is taken.
    pub(crate) fn begin_pass(&self) -> Pass {
        let generation = self.generation.load(Ordering::SeqCst);
        let snapshot = self.memory.snapshot();
        Pass {
            generation,
            snapshot,
        }
    }

    pub(crate) fn finish_pass(&self, pass: Pass, mode: PassMode) -> PassOutcome {
        let _write = self.write.lock();
        Counters::bump(&self.counters.passes);

        // Only stored while `write` is held, so this read is current.
        let committed = self.committed.load(Ordering::SeqCst);
        if pass.generation <= committed {
            return PassOutcome::AlreadyCommitted {
                generation: pass.generation,
                committed,
            };
        }

        let latest = self.generation.load(Ordering::SeqCst);
        if mode == PassMode::Background && pass.generation < latest {
            Counters::bump(&self.counters.cancelled);
            return PassOutcome::Cancelled {
                generation: pass.generation,
                latest,
            };
        }

        Counters::bump(&self.counters.writes);
        match self.sink.write_snapshot(&pass.snapshot) {
            Ok(()) => {
                self.committed.store(pass.generation, Ordering::SeqCst);
                *self.last_error.lock() = None;
                Counters::bump(&self.counters.committed);
                PassOutcome::Committed {
                    generation: pass.generation,
                }
            }
            Err(error) => {
                *self.last_error.lock() = Some(error.to_string());
                Counters::bump(&self.counters.failed);
                PassOutcome::Failed {
                    generation: pass.generation,
                    error,
                }
            }
        }
    }

    /// Block until every mutation made before the call is on disk.
    pub(crate) fn flush(&self) -> Result<(), StoreError> {
        let target = self.generation.load(Ordering::SeqCst);
        if self.committed.load(Ordering::SeqCst) >= target {
            return Ok(());
        }

        let pass = self.begin_pass();
        let outcome = self.finish_pass(pass, PassMode::Flush);
        debug!(outcome = %outcome, "flush pass finished");

        match outcome {
            PassOutcome::Committed { .. } | PassOutcome::AlreadyCommitted { .. } => Ok(()),
            PassOutcome::Failed { error, .. } => {
                error!(error = %error, "flush failed");
                Err(error)
            }
            // Flush passes are never abandoned; kept for exhaustiveness.
            cancelled @ PassOutcome::Cancelled { .. } => {
                Err(StoreError::Io(std::io::Error::other(cancelled.to_string())))
            }
        }
    }

    pub(crate) fn defer(&self) {
        self.signal.lock().deferred += 1;
    }

    pub(crate) fn resume(&self) {
        let mut signal = self.signal.lock();
        signal.deferred = signal.deferred.saturating_sub(1);
        if signal.deferred == 0 && signal.pending {
            self.wakeup.notify_one();
        }
    }

    pub(crate) fn stats(&self) -> PersistStats {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);

        PersistStats {
            requested: load(&self.counters.requested),
            passes: load(&self.counters.passes),
            committed: load(&self.counters.committed),
            cancelled: load(&self.counters.cancelled),
            failed: load(&self.counters.failed),
            writes: load(&self.counters.writes),
            committed_generation: self.committed.load(Ordering::SeqCst),
            latest_generation: self.generation.load(Ordering::SeqCst),
            skipped_on_load: self.skipped_on_load,
        }
    }

    pub(crate) fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }

    fn wait_for_request(&self) -> Wake {
        let mut signal = self.signal.lock();
        loop {
            if signal.shutdown {
                return Wake::Stop;
            }
            if signal.pending && signal.deferred == 0 {
                signal.pending = false;
                return Wake::Run;
            }
            self.wakeup.wait(&mut signal);
        }
    }

    pub(crate) fn shutdown(&self) {
        self.signal.lock().shutdown = true;
        self.wakeup.notify_all();
    }

    fn run(&self) {
        debug!("writer started");
        while let Wake::Run = self.wait_for_request() {
            let pass = self.begin_pass();
            let outcome = self.finish_pass(pass, PassMode::Background);
            match &outcome {
                PassOutcome::Failed { .. } => {
                    error!(outcome = %outcome, "background write failed");
                }
                _ => {
                    trace!(outcome = %outcome, "background pass finished");
                }
            }
        }

        if self.flush_on_drop {
            let flushed = self.flush();
            if flushed.is_err() {
                error!(result = ?flushed, "final flush failed");
            }
        }
        debug!("writer stopped");
    }
}

/// Owns the writer thread. Dropping it stops the thread and waits for it.
pub(crate) struct Writer<S: SnapshotSink> {
    coordinator: Arc<Coordinator<S>>,
    join: Option<JoinHandle<()>>,
}

impl<S: SnapshotSink> Writer<S> {
    pub(crate) fn spawn(
        coordinator: Arc<Coordinator<S>>,
        thread_name: &str,
    ) -> Result<Self, StoreError> {
        let worker = Arc::clone(&coordinator);
        let join = thread::Builder::new()
            .name(thread_name.to_string())
            .spawn(move || worker.run())?;

        Ok(Self {
            coordinator,
            join: Some(join),
        })
    }
}

impl<S: SnapshotSink> Drop for Writer<S> {
    fn drop(&mut self) {
        self.coordinator.shutdown();
        if let Some(join) = self.join.take()
            && join.join().is_err()
        {
            error!("writer thread panicked");
        }
    }
}
