//! A sink whose worker logic fails surfaces as a fatal pipeline error, and
//! every worker still gets stopped and joined within the shutdown timeout.

use std::time::Duration;

use sgn_core::Frame;
use sgn_elements::FakeSrc;
use sgn_runtime::{LinkMap, Pipeline, Sink, Source};
use sgn_subprocess::{Supervisor, SubprocessError, SubprocessLogic, SubprocessSink, WorkerConfigBuilder, WorkerContext};

struct AlwaysFails;
impl SubprocessLogic for AlwaysFails {
    fn sub_process_internal(
        &self,
        _ctx: &WorkerContext,
        _frame: Frame,
    ) -> sgn_core::Result<Option<Frame>> {
        Err(sgn_core::CoreError::callback(std::io::Error::other(
            "sink worker refuses to process this frame",
        )))
    }
}

#[tokio::test]
async fn failing_sink_worker_is_reported_and_torn_down() {
    let supervisor = Supervisor::new(Duration::from_secs(5));
    let config = WorkerConfigBuilder::default()
        .queue_capacity(4usize)
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap();

    let sink = SubprocessSink::new("snk1", AlwaysFails, config, supervisor.shm().snapshot());
    supervisor.track(sink.worker_handle());

    let mut pipeline = Pipeline::new();
    pipeline
        .insert(Source::new("src1", ["H1"], FakeSrc::new(1)), None)
        .unwrap();
    pipeline
        .insert(
            Sink::new("snk1", ["H1"], sink),
            Some(LinkMap::from([(
                "snk1:sink:H1".to_string(),
                "src1:src:H1".to_string(),
            )])),
        )
        .unwrap();

    let result = supervisor.run(&pipeline).await;
    assert!(result.is_err(), "expected the worker failure to surface as fatal");

    // A second run against a fresh supervisor confirms the roster was
    // unlinked even though the first run failed.
    assert!(supervisor.shm().snapshot().is_empty());
}

#[test]
fn subprocess_error_display_mentions_failure() {
    let error = SubprocessError::ShutdownTimeout(Duration::from_secs(5));
    assert!(error.to_string().contains("5s") || error.to_string().contains("timed out"));
}
