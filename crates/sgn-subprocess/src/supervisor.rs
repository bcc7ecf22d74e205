//! [`Supervisor`]: owns the shared-memory roster and every spawned worker
//! for one pipeline run, and tears both down on exit regardless of outcome.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use sgn_runtime::Pipeline;
use strum::Display;
use tracing::{debug, info, warn};

use crate::error::{Result, SubprocessError};
use crate::shm::ShmRoster;
use crate::worker::WorkerHandle;

/// How a [`Supervisor`] is asking its tracked workers to wind down.
#[derive(Debug, Clone, Copy, Display)]
#[strum(serialize_all = "snake_case")]
enum ShutdownMode {
    /// Drain each worker's input queue, then exit.
    Graceful,
    /// Exit immediately, abandoning any queued input.
    Immediate,
}

/// Coordinates a [`Pipeline`] containing subprocess-backed elements.
///
/// Building one of those elements (`SubprocessTransform::new`,
/// `SubprocessSink::new`) spawns its worker immediately; a `Supervisor`
/// tracks the resulting handles so that, once the pipeline run ends — on
/// success or failure — every worker is asked to stop and given a bounded
/// window to exit before the run returns.
pub struct Supervisor {
    shm: Arc<ShmRoster>,
    workers: Mutex<Vec<Arc<WorkerHandle>>>,
    shutdown_timeout: Duration,
}

impl Supervisor {
    /// Build a supervisor with its own shared-memory roster, giving
    /// `shutdown_timeout` for every worker to exit once torn down.
    pub fn new(shutdown_timeout: Duration) -> Self {
        Self {
            shm: Arc::new(ShmRoster::new()),
            workers: Mutex::new(Vec::new()),
            shutdown_timeout,
        }
    }

    /// The shared-memory roster new subprocess elements should register
    /// into, and snapshot from, at construction time.
    pub fn shm(&self) -> &Arc<ShmRoster> {
        &self.shm
    }

    /// Track a worker handle obtained via `SubprocessTransform::worker_handle`
    /// or `SubprocessSink::worker_handle`, *before* moving the owning element
    /// into the pipeline.
    pub fn track(&self, worker: Arc<WorkerHandle>) {
        self.workers.lock().unwrap().push(worker);
    }

    /// Run `pipeline` to completion, then stop and join every tracked
    /// worker within the configured shutdown timeout, then unlink the
    /// shared-memory roster.
    ///
    /// A pipeline error takes precedence over anything teardown observes.
    /// Otherwise, a worker that failed after its host-side `pull`/`transform`
    /// already returned successfully — most commonly a sink's worker failing
    /// on the very frame that carried `eos`, after which the pipeline has
    /// nothing left to drive and no further call would ever notice — is
    /// still surfaced here, since teardown is the last point the supervisor
    /// controls. Remaining stragglers are reported only if neither of those
    /// produced an error.
    pub async fn run(&self, pipeline: &Pipeline) -> Result<()> {
        let outcome = pipeline.run().await;

        let (stragglers, worker_failure) = self.teardown(ShutdownMode::Graceful);

        match (outcome, worker_failure) {
            (Err(source), _) => Err(pipeline_failure_to_subprocess_error(source)),
            (Ok(()), Some(failure)) => Err(failure),
            (Ok(()), None) if stragglers.is_empty() => {
                info!("pipeline run complete, all subprocess workers joined");
                Ok(())
            }
            (Ok(()), None) => Err(SubprocessError::ShutdownTimeout(self.shutdown_timeout)),
        }
    }

    /// Ask every tracked worker to exit immediately, abandoning queued
    /// input, then block (up to the configured shutdown timeout) for every
    /// worker to join and unlink the shared-memory roster. Used when a fatal
    /// error elsewhere — or an external shutdown signal — means the run
    /// cannot continue and waiting for a graceful drain is pointless.
    ///
    /// Safe to call even if `run` is racing it or already returned: both
    /// paths tear down through the same `teardown` helper, and joining an
    /// already-terminated worker or unlinking an already-unlinked roster is
    /// a no-op.
    pub fn shutdown_now(&self) {
        let (stragglers, _worker_failure) = self.teardown(ShutdownMode::Immediate);
        if !stragglers.is_empty() {
            warn!(
                workers = ?stragglers,
                timeout = ?self.shutdown_timeout,
                "subprocess workers did not exit within the shutdown timeout during forced shutdown; abandoning their threads"
            );
        }
    }

    fn teardown(&self, mode: ShutdownMode) -> (Vec<String>, Option<SubprocessError>) {
        let workers = self.workers.lock().unwrap().clone();
        self.request(mode, &workers);

        let mut stragglers = Vec::new();
        for worker in &workers {
            if !worker.join(self.shutdown_timeout) {
                stragglers.push(worker_identity(worker));
            }
        }

        if !stragglers.is_empty() && matches!(mode, ShutdownMode::Graceful) {
            warn!(
                workers = ?stragglers,
                timeout = ?self.shutdown_timeout,
                "subprocess workers did not exit within the shutdown timeout; abandoning their threads"
            );
        }

        let worker_failure = workers.iter().find_map(|w| w.failure.lock().unwrap().take());
        self.shm.unlink_all();
        (stragglers, worker_failure)
    }

    fn request(&self, mode: ShutdownMode, workers: &[Arc<WorkerHandle>]) {
        debug!(%mode, workers = workers.len(), "requesting subprocess worker shutdown");
        for worker in workers {
            match mode {
                ShutdownMode::Graceful => worker.flags.request_shutdown(),
                ShutdownMode::Immediate => worker.flags.request_stop(),
            }
        }
    }
}

fn worker_identity(worker: &Arc<WorkerHandle>) -> String {
    worker
        .failure
        .lock()
        .unwrap()
        .as_ref()
        .map(|e| e.to_string())
        .unwrap_or_else(|| "running".to_string())
}

fn pipeline_failure_to_subprocess_error(source: sgn_runtime::RuntimeError) -> SubprocessError {
    SubprocessError::WorkerFailed(sgn_core::CoreError::callback(source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sgn_core::Frame;
    use sgn_elements::FakeSrc;
    use sgn_runtime::{Sink, Source};

    use crate::sink::SubprocessSink;
    use crate::worker::{SubprocessLogic, WorkerConfigBuilder, WorkerContext};

    struct Counting(Arc<std::sync::atomic::AtomicUsize>);
    impl SubprocessLogic for Counting {
        fn sub_process_internal(
            &self,
            _ctx: &WorkerContext,
            _frame: Frame,
        ) -> sgn_core::Result<Option<Frame>> {
            self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(None)
        }
    }

    #[tokio::test]
    async fn workers_join_after_pipeline_completes() {
        let supervisor = Supervisor::new(Duration::from_secs(5));
        let counter = Arc::new(std::sync::atomic::AtomicUsize::new(0));

        let config = WorkerConfigBuilder::default()
            .queue_capacity(8usize)
            .timeout(Duration::from_secs(1))
            .build()
            .unwrap();
        let sink = SubprocessSink::new(
            "snk1",
            Counting(Arc::clone(&counter)),
            config,
            supervisor.shm().snapshot(),
        );
        supervisor.track(sink.worker_handle());

        let mut pipeline = Pipeline::new();
        pipeline
            .insert(Source::new("src1", ["H1"], FakeSrc::new(1)), None)
            .unwrap();
        pipeline
            .insert(
                Sink::new("snk1", ["H1"], sink),
                Some(sgn_runtime::LinkMap::from([(
                    "snk1:sink:H1".to_string(),
                    "src1:src:H1".to_string(),
                )])),
            )
            .unwrap();

        supervisor.run(&pipeline).await.unwrap();
        assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn shutdown_now_joins_workers_and_unlinks_shm() {
        let supervisor = Supervisor::new(Duration::from_secs(5));
        let counter = Arc::new(std::sync::atomic::AtomicUsize::new(0));

        supervisor.shm().to_shm("region", b"abc").unwrap();

        let config = WorkerConfigBuilder::default()
            .queue_capacity(8usize)
            .build()
            .unwrap();
        let sink = SubprocessSink::new(
            "snk1",
            Counting(Arc::clone(&counter)),
            config,
            supervisor.shm().snapshot(),
        );
        supervisor.track(sink.worker_handle());

        supervisor.shutdown_now();

        assert!(supervisor.shm().get("region").is_none());
    }
}
