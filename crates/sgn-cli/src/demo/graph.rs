//! The "Multi-branch graph" seed scenario: two sources, four transforms, two
//! sinks, with fan-out and fan-in.
//!
//! `src1:src:L1` fans out to both `trans2` and `trans3`; `trans4` joins
//! `src2`'s two pads. See `sgn-elements/tests/multi_branch.rs` for the
//! assertion this mirrors (there against a captured sink, here against
//! stdout).

use sgn_elements::{FakeSink, FakeSrc, FakeTransform};
use sgn_runtime::{LinkMap, Pipeline, Sink, Source, Transform};

/// Build and run the fan-out/fan-in scenario, printing each rendered flow
/// line to stdout.
pub async fn run() -> anyhow::Result<()> {
    let mut pipeline = Pipeline::new();
    pipeline.insert(Source::new("src1", ["H1", "L1"], FakeSrc::new(2)), None)?;
    pipeline.insert(Source::new("src2", ["V1", "K1"], FakeSrc::new(2)), None)?;

    pipeline.insert(
        Transform::new("trans1", ["H1"], ["H1"], FakeTransform::new("trans1", ["H1"])),
        Some(LinkMap::from([(
            "trans1:sink:H1".to_string(),
            "src1:src:H1".to_string(),
        )])),
    )?;
    pipeline.insert(
        Transform::new("trans2", ["L1"], ["L1"], FakeTransform::new("trans2", ["L1"])),
        Some(LinkMap::from([(
            "trans2:sink:L1".to_string(),
            "src1:src:L1".to_string(),
        )])),
    )?;
    pipeline.insert(
        Transform::new("trans3", ["L1"], ["L1"], FakeTransform::new("trans3", ["L1"])),
        Some(LinkMap::from([(
            "trans3:sink:L1".to_string(),
            "src1:src:L1".to_string(),
        )])),
    )?;
    pipeline.insert(
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
    )?;

    pipeline.insert(
        Sink::new("snk1", ["H1", "L1"], FakeSink::new()),
        Some(LinkMap::from([
            ("snk1:sink:H1".to_string(), "trans1:src:H1".to_string()),
            ("snk1:sink:L1".to_string(), "trans2:src:L1".to_string()),
        ])),
    )?;
    pipeline.insert(
        Sink::new("snk2", ["L1", "V1", "K1"], FakeSink::new()),
        Some(LinkMap::from([
            ("snk2:sink:L1".to_string(), "trans3:src:L1".to_string()),
            ("snk2:sink:V1".to_string(), "trans4:src:V1".to_string()),
            ("snk2:sink:K1".to_string(), "trans4:src:K1".to_string()),
        ])),
    )?;

    pipeline.run().await?;
    Ok(())
}
