//! The "Subprocess" seed scenario: a transform and a sink offloaded to
//! isolated worker threads, coordinated by a [`Supervisor`].
//!
//! `FakeSrc` feeds a [`SubprocessTransform`] that uppercases each frame's
//! `"name"` metadata on its worker, feeding a [`SubprocessSink`] that logs
//! each frame it receives on its own worker. See
//! `sgn-subprocess/tests/happy_path.rs` for the assertion this mirrors.

use std::sync::Arc;

use sgn_core::Frame;
use sgn_elements::FakeSrc;
use sgn_runtime::{LinkMap, Pipeline, Sink, Source, Transform};
use sgn_subprocess::{
    Supervisor, SubprocessLogic, SubprocessSink, SubprocessTransform, WorkerConfigBuilder, WorkerContext,
};

const TRANSFORM_SINK_PAD: &str = "trans1:sink:H1";

/// Worker logic for the demo's subprocess transform: uppercases the nested
/// input frame's `"name"` metadata, forwarding `eos`.
struct UppercaseLogic;

impl SubprocessLogic for UppercaseLogic {
    fn sub_process_internal(&self, _ctx: &WorkerContext, frame: Frame) -> sgn_core::Result<Option<Frame>> {
        let nested = frame
            .metadata
            .get(TRANSFORM_SINK_PAD)
            .cloned()
            .unwrap_or_default();
        let input: Frame = serde_json::from_value(nested).unwrap_or_default();

        let mut out = Frame::new(frame.eos);
        if let Some(name) = input.name() {
            out.set_name(name.to_uppercase());
        }
        Ok(Some(out))
    }
}

/// Worker logic for the demo's subprocess sink: logs each frame it receives
/// and discards it.
struct LoggingSinkLogic;

impl SubprocessLogic for LoggingSinkLogic {
    fn sub_process_internal(&self, _ctx: &WorkerContext, frame: Frame) -> sgn_core::Result<Option<Frame>> {
        tracing::info!(
            name = frame.name().unwrap_or_default(),
            eos = frame.eos,
            "subprocess sink received frame"
        );
        Ok(None)
    }
}

/// Build and run the subprocess scenario against a supervisor the caller
/// owns, so that an external shutdown signal racing this future can still
/// reach the same workers and shared-memory roster through
/// [`Supervisor::shutdown_now`].
pub async fn run(supervisor: Arc<Supervisor>) -> anyhow::Result<()> {
    let transform_config = WorkerConfigBuilder::default().queue_capacity(1usize).build()?;
    let sink_config = WorkerConfigBuilder::default().queue_capacity(100usize).build()?;

    let transform = SubprocessTransform::new(
        "trans1",
        ["H1"],
        UppercaseLogic,
        transform_config,
        supervisor.shm().snapshot(),
    );
    supervisor.track(transform.worker_handle());

    let sink = SubprocessSink::new("snk1", LoggingSinkLogic, sink_config, supervisor.shm().snapshot());
    supervisor.track(sink.worker_handle());

    let mut pipeline = Pipeline::new();
    pipeline.insert(Source::new("src1", ["H1"], FakeSrc::new(3)), None)?;
    pipeline.insert(
        Transform::new("trans1", ["H1"], ["H1"], transform),
        Some(LinkMap::from([(
            "trans1:sink:H1".to_string(),
            "src1:src:H1".to_string(),
        )])),
    )?;
    pipeline.insert(
        Sink::new("snk1", ["H1"], sink),
        Some(LinkMap::from([(
            "snk1:sink:H1".to_string(),
            "trans1:src:H1".to_string(),
        )])),
    )?;

    supervisor.run(&pipeline).await.map_err(Into::into)
}
