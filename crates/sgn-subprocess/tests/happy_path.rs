//! A transform and a sink each backed by a worker, run to clean completion.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sgn_core::Frame;
use sgn_elements::FakeSrc;
use sgn_runtime::{LinkMap, Pipeline, Sink, Source, Transform};
use sgn_subprocess::{Supervisor, SubprocessLogic, SubprocessSink, SubprocessTransform, WorkerConfigBuilder, WorkerContext};

struct Double;
impl SubprocessLogic for Double {
    fn sub_process_internal(
        &self,
        _ctx: &WorkerContext,
        mut frame: Frame,
    ) -> sgn_core::Result<Option<Frame>> {
        let input = frame
            .metadata
            .get("trans1:sink:H1")
            .and_then(|v| v.get("metadata"))
            .and_then(|v| v.get("name"))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        frame.metadata.clear();
        frame.set_name(format!("{input}-doubled"));
        Ok(Some(frame))
    }
}

struct CountAndDrop(Arc<AtomicUsize>);
impl SubprocessLogic for CountAndDrop {
    fn sub_process_internal(
        &self,
        _ctx: &WorkerContext,
        _frame: Frame,
    ) -> sgn_core::Result<Option<Frame>> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(None)
    }
}

#[tokio::test]
async fn subprocess_graph_terminates_cleanly() {
    let supervisor = Supervisor::new(Duration::from_secs(5));
    let received = Arc::new(AtomicUsize::new(0));

    let config = WorkerConfigBuilder::default()
        .queue_capacity(8usize)
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap();

    let transform = SubprocessTransform::new(
        "trans1",
        ["H1"],
        Double,
        config.clone(),
        supervisor.shm().snapshot(),
    );
    supervisor.track(transform.worker_handle());

    let sink = SubprocessSink::new(
        "snk1",
        CountAndDrop(Arc::clone(&received)),
        config,
        supervisor.shm().snapshot(),
    );
    supervisor.track(sink.worker_handle());

    let mut pipeline = Pipeline::new();
    pipeline
        .insert(Source::new("src1", ["H1"], FakeSrc::new(3)), None)
        .unwrap();
    pipeline
        .insert(
            Transform::new("trans1", ["H1"], ["H1"], transform),
            Some(LinkMap::from([(
                "trans1:sink:H1".to_string(),
                "src1:src:H1".to_string(),
            )])),
        )
        .unwrap();
    pipeline
        .insert(
            Sink::new("snk1", ["H1"], sink),
            Some(LinkMap::from([(
                "snk1:sink:H1".to_string(),
                "trans1:src:H1".to_string(),
            )])),
        )
        .unwrap();

    supervisor.run(&pipeline).await.unwrap();

    assert_eq!(received.load(Ordering::SeqCst), 3);
    assert!(supervisor.shm().snapshot().is_empty());
}
