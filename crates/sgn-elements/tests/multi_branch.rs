//! End-to-end "Multi-branch graph" scenario: two sources, four transforms,
//! two sinks with fan-out.
//!
//! `src1:src:L1` fans out to both `trans2` and `trans3`; `trans4` joins
//! `src2`'s two pads. Line order within one frame's sink wave is not
//! guaranteed (siblings with no dependency path between them may execute in
//! any interleaving), so this test compares each frame's five lines as an
//! unordered set.

use std::collections::HashSet;
use std::sync::Arc;

use sgn_elements::{CapturingSink, FakeSink, FakeSrc, FakeTransform};
use sgn_runtime::{LinkMap, Pipeline, Sink, Source, Transform};

#[tokio::test]
async fn multi_branch_scenario_produces_expected_flow_lines() {
    let sink = CapturingSink::new();

    let mut pipeline = Pipeline::new();
    pipeline
        .insert(Source::new("src1", ["H1", "L1"], FakeSrc::new(2)), None)
        .unwrap();
    pipeline
        .insert(Source::new("src2", ["V1", "K1"], FakeSrc::new(2)), None)
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
            Transform::new("trans2", ["L1"], ["L1"], FakeTransform::new("trans2", ["L1"])),
            Some(LinkMap::from([(
                "trans2:sink:L1".to_string(),
                "src1:src:L1".to_string(),
            )])),
        )
        .unwrap();
    pipeline
        .insert(
            Transform::new("trans3", ["L1"], ["L1"], FakeTransform::new("trans3", ["L1"])),
            Some(LinkMap::from([(
                "trans3:sink:L1".to_string(),
                "src1:src:L1".to_string(),
            )])),
        )
        .unwrap();
    pipeline
        .insert(
            Transform::new(
                "trans4",
                ["V1", "K1"],
                ["V1", "K1"],
                FakeTransform::new("trans4", ["V1", "K1"]),
            ),
            Some(LinkMap::from([
                ("trans4:sink:V1".to_string(), "src2:src:V1".to_string()),
                ("trans4:sink:K1".to_string(), "src2:src:K1".to_string()),
            ])),
        )
        .unwrap();

    pipeline
        .insert(
            Sink::new("snk1", ["H1", "L1"], FakeSink::with_sink(Arc::new(sink.clone()))),
            Some(LinkMap::from([
                ("snk1:sink:H1".to_string(), "trans1:src:H1".to_string()),
                ("snk1:sink:L1".to_string(), "trans2:src:L1".to_string()),
            ])),
        )
        .unwrap();
    pipeline
        .insert(
            Sink::new(
                "snk2",
                ["L1", "V1", "K1"],
                FakeSink::with_sink(Arc::new(sink.clone())),
            ),
            Some(LinkMap::from([
                ("snk2:sink:L1".to_string(), "trans3:src:L1".to_string()),
                ("snk2:sink:V1".to_string(), "trans4:src:V1".to_string()),
                ("snk2:sink:K1".to_string(), "trans4:src:K1".to_string()),
            ])),
        )
        .unwrap();

    pipeline.run().await.unwrap();

    let lines = sink.lines();
    assert_eq!(lines.len(), 10, "expected five lines per frame cycle, two cycles");

    let wave0: HashSet<&str> = lines[0..5].iter().map(String::as_str).collect();
    let wave1: HashSet<&str> = lines[5..10].iter().map(String::as_str).collect();

    let expected_wave0: HashSet<&str> = [
        "frame flow:  src1:src:H1[0] -> trans1:src:H1 -> snk1:sink:H1",
        "frame flow:  src1:src:L1[0] -> trans2:src:L1 -> snk1:sink:L1",
        "frame flow:  src1:src:L1[0] -> trans3:src:L1 -> snk2:sink:L1",
        "frame flow:  src2:src:V1[0]+src2:src:K1[0] -> trans4:src:V1 -> snk2:sink:V1",
        "frame flow:  src2:src:V1[0]+src2:src:K1[0] -> trans4:src:K1 -> snk2:sink:K1",
    ]
    .into_iter()
    .collect();
    let expected_wave1: HashSet<&str> = [
        "frame flow:  src1:src:H1[1] -> trans1:src:H1 -> snk1:sink:H1  EOS",
        "frame flow:  src1:src:L1[1] -> trans2:src:L1 -> snk1:sink:L1  EOS",
        "frame flow:  src1:src:L1[1] -> trans3:src:L1 -> snk2:sink:L1  EOS",
        "frame flow:  src2:src:V1[1]+src2:src:K1[1] -> trans4:src:V1 -> snk2:sink:V1  EOS",
        "frame flow:  src2:src:V1[1]+src2:src:K1[1] -> trans4:src:K1 -> snk2:sink:K1  EOS",
    ]
    .into_iter()
    .collect();

    assert_eq!(wave0, expected_wave0);
    assert_eq!(wave1, expected_wave1);
}
