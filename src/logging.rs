//! Minimal stderr backend for the `log` facade, used by the CLI.
//!
//! Library code only emits through `log::*!` macros; embedding
//! applications install whatever logger they like.

use log::{Level, LevelFilter, Log, Metadata, Record};

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!("{}: {}", level_label(record.level()), record.args());
        }
    }

    fn flush(&self) {}
}

fn level_label(level: Level) -> &'static str {
    match level {
        Level::Error => "error",
        Level::Warn => "warning",
        Level::Info => "info",
        Level::Debug => "debug",
        Level::Trace => "trace",
    }
}

/// Install the stderr logger. `debug` lowers the threshold to `Debug`;
/// otherwise only warnings and errors print. Calling twice is harmless.
pub fn init(debug: bool) {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    // a logger may already be installed by an embedding application
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}
