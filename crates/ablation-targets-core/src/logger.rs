//! Stderr logger for the targeting pipeline.
//!
//! Lines look like `[  0.042s DEBUG finder] 12 boundaries accepted`, where the
//! last token of the record target names the emitting stage. Install it once
//! with `init_with_level`; the `tracing` feature adds `init_tracing`.

use std::fmt::Arguments;
use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

struct StageLogger {
    max: LevelFilter,
    epoch: Instant,
}

fn stage_of(target: &str) -> &str {
    target.rsplit("::").next().unwrap_or(target)
}

fn format_line(secs: f64, level: Level, target: &str, args: &Arguments<'_>) -> String {
    format!("[{secs:8.3}s {level:<5} {}] {args}", stage_of(target))
}

impl Log for StageLogger {
    fn enabled(&self, meta: &Metadata) -> bool {
        meta.level() <= self.max
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let line = format_line(
                self.epoch.elapsed().as_secs_f64(),
                record.level(),
                record.target(),
                record.args(),
            );
            let _ = writeln!(std::io::stderr().lock(), "{line}");
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static STAGE_LOGGER: OnceLock<StageLogger> = OnceLock::new();

/// Route `log` records to stderr at `level` and above.
///
/// Only the first call installs the logger; later calls return `Ok` and
/// keep the original level.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    let mut fresh = false;
    let logger = STAGE_LOGGER.get_or_init(|| {
        fresh = true;
        StageLogger {
            max: level,
            epoch: Instant::now(),
        }
    });
    if fresh {
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// Install a `tracing` subscriber filtered by `RUST_LOG` (default `info`).
///
/// With `json` each event is one JSON object; otherwise span closings are
/// printed with their busy time so stage costs show up in the output.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{fmt, registry, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let base = registry().with(filter);
    let installed = if json {
        base.with(fmt::layer().json().flatten_event(true)).try_init()
    } else {
        base.with(fmt::layer().with_span_events(FmtSpan::CLOSE).with_target(false))
            .try_init()
    };
    if installed.is_err() {
        log::debug!("tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_name_the_stage() {
        assert_eq!(stage_of("ablation_targets_finder::boundaries"), "boundaries");
        assert_eq!(stage_of("plain"), "plain");
        let line = format_line(
            1.5,
            Level::Info,
            "ablation_targets_targeter::spot",
            &format_args!("using spot size = {}", 12),
        );
        assert_eq!(line, "[   1.500s INFO  spot] using spot size = 12");
    }

    #[test]
    fn repeated_init_is_noop() {
        init_with_level(LevelFilter::Warn).expect("first init");
        init_with_level(LevelFilter::Debug).expect("second init");
        assert_eq!(log::max_level(), LevelFilter::Warn);
    }
}
