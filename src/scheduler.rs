// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Background cut scheduler
//!
//! Cut requests are queued onto a dedicated rayon pool and run off the
//! caller's thread. Each request carries an opaque token that comes back with
//! its result, so callers can correlate results with requests without any
//! shared state of their own. Results are collected into two lists that the
//! caller drains with [`JobScheduler::poll_results`], which never waits on
//! outstanding work.

use crate::config::EngineConfig;
use crate::error::{CutError, CutResult};
use crate::geometry::{Bisector, CutPieces, MeshSnapshot, Plane};
use anyhow::{Context, Result};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Signature of the routine a worker runs for each request
pub type CutFn = dyn Fn(&MeshSnapshot, &Plane) -> CutResult<CutPieces> + Send + Sync;

/// A finished cut and the token it was submitted with
#[derive(Debug, Clone)]
pub struct CutSuccess<T> {
    pub token: T,
    pub pieces: CutPieces,
}

/// A failed cut and the token it was submitted with
#[derive(Debug, Clone)]
pub struct CutFailure<T> {
    pub token: T,
    pub error: CutError,
}

impl<T> CutFailure<T> {
    /// The plane simply missed the mesh; usually nothing to report
    pub fn is_no_intersection(&self) -> bool {
        self.error.is_no_intersection()
    }
}

/// Everything that completed since the previous poll
#[derive(Debug)]
pub struct PollResults<T> {
    pub successes: Vec<CutSuccess<T>>,
    pub failures: Vec<CutFailure<T>>,
}

impl<T> PollResults<T> {
    pub fn len(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.successes.is_empty() && self.failures.is_empty()
    }
}

struct Shared<T> {
    successes: Mutex<Vec<CutSuccess<T>>>,
    failures: Mutex<Vec<CutFailure<T>>>,
    in_flight: AtomicUsize,
}

impl<T> Shared<T> {
    fn new() -> Self {
        Self {
            successes: Mutex::new(Vec::new()),
            failures: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
        }
    }

    fn deliver(&self, token: T, outcome: CutResult<CutPieces>) {
        match outcome {
            Ok(pieces) => self
                .successes
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(CutSuccess { token, pieces }),
            Err(error) => self
                .failures
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(CutFailure { token, error }),
        }
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Pool of cut workers returning token-correlated results.
///
/// `T` is an opaque token owned by the caller. It is moved into the job and
/// handed back untouched with the result.
pub struct JobScheduler<T> {
    pool: ThreadPool,
    shared: Arc<Shared<T>>,
    cut: Arc<CutFn>,
    workers: usize,
}

impl<T: Send + 'static> JobScheduler<T> {
    /// Start a scheduler whose workers run [`Bisector::run`]
    pub fn new(config: &EngineConfig) -> Result<Self> {
        Self::with_cut_fn(config, Bisector::run)
    }

    /// Start a scheduler whose workers run `cut` for every request
    pub fn with_cut_fn<F>(config: &EngineConfig, cut: F) -> Result<Self>
    where
        F: Fn(&MeshSnapshot, &Plane) -> CutResult<CutPieces> + Send + Sync + 'static,
    {
        let workers = config.resolved_workers();
        let prefix = config.thread_name_prefix.clone();

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(move |index| format!("{}-{}", prefix, index))
            .panic_handler(|payload| {
                error!(message = %panic_message(payload.as_ref()), "Cut worker panicked outside a job");
            })
            .build()
            .context("Failed to build cut worker pool")?;

        info!(workers, prefix = %config.thread_name_prefix, "Cut scheduler started");

        Ok(Self {
            pool,
            shared: Arc::new(Shared::new()),
            cut: Arc::new(cut),
            workers,
        })
    }

    /// Queue a cut; returns immediately.
    ///
    /// The snapshot is shared read-only with the worker, so the same source
    /// can be submitted many times without copying it.
    pub fn submit_cut(&self, token: T, snapshot: impl Into<Arc<MeshSnapshot>>, plane: Plane) {
        let snapshot = snapshot.into();
        let shared = Arc::clone(&self.shared);
        let cut = Arc::clone(&self.cut);

        shared.in_flight.fetch_add(1, Ordering::AcqRel);
        self.pool.spawn_fifo(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| cut(&snapshot, &plane)))
                .unwrap_or_else(|payload| Err(CutError::fault(panic_message(payload.as_ref()))));

            match &outcome {
                Err(CutError::NoIntersection) => debug!("Cut plane missed the mesh"),
                Err(err) => warn!(error = %err, "Cut failed"),
                Ok(pieces) => debug!(loops = pieces.loops, "Cut finished"),
            }

            shared.deliver(token, outcome);
        });
    }

    /// Take every result delivered since the last poll without blocking on
    /// outstanding work
    pub fn poll_results(&self) -> PollResults<T> {
        let successes = std::mem::take(
            &mut *self
                .shared
                .successes
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        let failures = std::mem::take(
            &mut *self
                .shared
                .failures
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        PollResults {
            successes,
            failures,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers
    }

    /// Requests submitted whose result has not been delivered yet
    pub fn in_flight(&self) -> usize {
        self.shared.in_flight.load(Ordering::Acquire)
    }

    /// Sleep until nothing is in flight or `timeout` passes.
    ///
    /// Returns whether the scheduler went idle. Results stay queued for the
    /// next [`poll_results`](Self::poll_results).
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let start = Instant::now();
        loop {
            if self.in_flight() == 0 {
                return true;
            }
            if start.elapsed() >= timeout {
                return false;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use nalgebra::{Point3, Vector3};

    fn cube() -> Arc<MeshSnapshot> {
        Arc::new(Primitive::cube(Vector3::new(1.0, 1.0, 1.0), true).to_snapshot())
    }

    #[test]
    fn test_single_cut_roundtrip() {
        let scheduler = JobScheduler::new(&EngineConfig::with_workers(2)).unwrap();
        assert_eq!(scheduler.worker_count(), 2);

        scheduler.submit_cut("left", cube(), Plane::new(Point3::new(0.1, 0.0, 0.0), Vector3::x()));
        assert!(scheduler.wait_idle(Duration::from_secs(10)));

        let results = scheduler.poll_results();
        assert_eq!(results.successes.len(), 1);
        assert_eq!(results.successes[0].token, "left");
        assert!(results.failures.is_empty());

        // Drained
        assert!(scheduler.poll_results().is_empty());
    }

    #[test]
    fn test_miss_is_reported_as_failure() {
        let scheduler = JobScheduler::new(&EngineConfig::with_workers(1)).unwrap();
        scheduler.submit_cut(7u32, cube(), Plane::new(Point3::new(3.0, 0.0, 0.0), Vector3::x()));
        assert!(scheduler.wait_idle(Duration::from_secs(10)));

        let results = scheduler.poll_results();
        assert!(results.successes.is_empty());
        assert_eq!(results.failures.len(), 1);
        assert_eq!(results.failures[0].token, 7);
        assert!(results.failures[0].is_no_intersection());
    }

    #[test]
    fn test_panic_becomes_fault() {
        let scheduler = JobScheduler::<u32>::with_cut_fn(&EngineConfig::with_workers(1), |_, _| {
            panic!("boom")
        })
        .unwrap();
        scheduler.submit_cut(1, cube(), Plane::new(Point3::origin(), Vector3::x()));
        assert!(scheduler.wait_idle(Duration::from_secs(10)));

        let results = scheduler.poll_results();
        assert_eq!(
            results.failures[0].error,
            CutError::ComputationFault {
                message: "boom".to_string()
            }
        );
    }

    #[test]
    fn test_panic_message_formats() {
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
        let payload: Box<dyn Any + Send> = Box::new(42);
        assert_eq!(panic_message(payload.as_ref()), "worker panicked");
    }
}
