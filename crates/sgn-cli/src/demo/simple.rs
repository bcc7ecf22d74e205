//! The "Simple" seed scenario: `FakeSrc -> FakeTransform -> FakeSink`.
//!
//! Three frames flow through a single linear chain; the third is tagged
//! `EOS`. See `sgn-elements/tests/simple.rs` for the assertion this mirrors.

use sgn_elements::{FakeSink, FakeSrc, FakeTransform};
use sgn_runtime::{LinkMap, Pipeline, Sink, Source, Transform};

/// Build and run the three-frame linear chain scenario, printing each
/// rendered flow line to stdout.
pub async fn run() -> anyhow::Result<()> {
    let mut pipeline = Pipeline::new();
    pipeline.insert(Source::new("src1", ["H1"], FakeSrc::new(3)), None)?;
    pipeline.insert(
        Transform::new("trans1", ["H1"], ["H1"], FakeTransform::new("trans1", ["H1"])),
        Some(LinkMap::from([(
            "trans1:sink:H1".to_string(),
            "src1:src:H1".to_string(),
        )])),
    )?;
    pipeline.insert(
        Sink::new("snk1", ["H1"], FakeSink::new()),
        Some(LinkMap::from([(
            "snk1:sink:H1".to_string(),
            "trans1:src:H1".to_string(),
        )])),
    )?;

    pipeline.run().await?;
    Ok(())
}
