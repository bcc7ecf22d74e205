//! Tracing initialization: `SGNLOGLEVEL`/`RUST_LOG`-based filtering.

use tracing::warn;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_FILTER: &str = "info,sgn_cli=trace";

/// Translate `SGNLOGLEVEL=<logger>:<level>[,<logger>:<level>...]` pairs into
/// `tracing-subscriber`'s `logger=level` directive grammar. Pairs that don't
/// contain a `:` are dropped rather than rejected outright.
fn translate_sgn_log_level(value: &str) -> String {
    value
        .split(',')
        .filter_map(|pair| pair.split_once(':'))
        .map(|(logger, level)| format!("{logger}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Build the [`EnvFilter`] honored by [`init_tracing`].
///
/// `log_level` (the CLI's `--log-level`/`SGNLOGLEVEL` value) is translated
/// and appended after `RUST_LOG`, since `EnvFilter` lets a later, more
/// specific directive for the same target take precedence over an earlier
/// one — this realizes the "`SGNLOGLEVEL` wins over `RUST_LOG`" contract.
/// With neither set, falls back to [`DEFAULT_FILTER`].
///
/// Directives are parsed and added one at a time rather than as a single
/// joined string: `EnvFilter::try_new` rejects the whole filter on the
/// first unparsable directive, which would silently discard an otherwise
/// valid `RUST_LOG` over one bad `SGNLOGLEVEL` pair (e.g. `pipeline:MEMPROF`,
/// not a `LevelFilter`). A directive that fails to parse on its own is
/// dropped with a warning instead of taking the rest down with it.
fn build_env_filter(log_level: Option<&str>) -> EnvFilter {
    let rust_log = std::env::var("RUST_LOG").ok();
    let sgn_directives = log_level.map(translate_sgn_log_level).filter(|s| !s.is_empty());

    let combined = match (rust_log, sgn_directives) {
        (Some(rust_log), Some(sgn)) => format!("{rust_log},{sgn}"),
        (Some(rust_log), None) => rust_log,
        (None, Some(sgn)) => format!("{DEFAULT_FILTER},{sgn}"),
        (None, None) => DEFAULT_FILTER.to_string(),
    };

    combined
        .split(',')
        .map(str::trim)
        .filter(|directive| !directive.is_empty())
        .fold(EnvFilter::new("off"), |filter, directive| {
            match directive.parse::<Directive>() {
                Ok(parsed) => filter.add_directive(parsed),
                Err(error) => {
                    warn!(directive, %error, "ignoring unparsable tracing filter directive");
                    filter
                }
            }
        })
}

/// Initialize the process-wide tracing subscriber.
///
/// `log_level` is the CLI's `--log-level`/`SGNLOGLEVEL` value, if any.
pub fn init_tracing(log_level: Option<&str>) {
    let env_filter = build_env_filter(log_level);
    let fmt_layer = layer().pretty();
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::trace!(target: "sgn_cli::telemetry", "initialized tracing subscriber");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_logger_level_pairs() {
        assert_eq!(
            translate_sgn_log_level("pipeline:debug,worker:trace"),
            "pipeline=debug,worker=trace"
        );
    }

    #[test]
    fn drops_malformed_pairs() {
        assert_eq!(translate_sgn_log_level("not-a-pair"), "");
    }

    #[test]
    fn single_pair_round_trips() {
        assert_eq!(translate_sgn_log_level("pipeline:MEMPROF"), "pipeline=MEMPROF");
    }

    #[test]
    fn unparsable_sgn_directive_does_not_discard_rust_log() {
        // "pipeline:MEMPROF" translates to "pipeline=MEMPROF", not a valid
        // LevelFilter, but a sibling valid directive must still take effect.
        let filter = build_env_filter(Some("pipeline:MEMPROF,worker:debug"));
        assert!(format!("{filter}").contains("worker=debug"));
    }
}
