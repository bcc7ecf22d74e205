//! End-to-end "Simple" scenario: one source, one transform, one sink pad.

use std::sync::Arc;

use sgn_elements::{CapturingSink, FakeSink, FakeSrc, FakeTransform};
use sgn_runtime::{LinkMap, Pipeline, Sink, Source, Transform};

#[tokio::test]
async fn simple_scenario_produces_expected_flow_lines() {
    let sink = CapturingSink::new();

    let mut pipeline = Pipeline::new();
    pipeline
        .insert(Source::new("src1", ["H1"], FakeSrc::new(3)), None)
        .unwrap();
    pipeline
        .insert(
            Transform::new("trans1", ["H1"], ["H1"], FakeTransform::new("trans1", ["H1"])),
            Some(LinkMap::from([(
                "trans1:sink:H1".to_string(),
                "src1:src:H1".to_string(),
            )])),
        )
        .unwrap();
    pipeline
        .insert(
            Sink::new("snk1", ["H1"], FakeSink::with_sink(Arc::new(sink.clone()))),
            Some(LinkMap::from([(
                "snk1:sink:H1".to_string(),
                "trans1:src:H1".to_string(),
            )])),
        )
        .unwrap();

    pipeline.run().await.unwrap();

    assert_eq!(
        sink.lines(),
        vec![
            "frame flow:  src1:src:H1[0] -> trans1:src:H1 -> snk1:sink:H1".to_string(),
            "frame flow:  src1:src:H1[1] -> trans1:src:H1 -> snk1:sink:H1".to_string(),
            "frame flow:  src1:src:H1[2] -> trans1:src:H1 -> snk1:sink:H1  EOS".to_string(),
        ]
    );
}
