use std::io::Write;
use std::sync::mpsc::Sender;

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use once_cell::sync::OnceCell;

use crate::state::Delta;

static LOGGER: OnceCell<LeagueLogger> = OnceCell::new();

enum Sink {
    Console(Sender<Delta>),
    Stderr,
}

/// `log` backend for the crate's own records, formatted as `[LEVEL] message`.
pub struct LeagueLogger {
    sink: Sink,
    level: LevelFilter,
}

impl LeagueLogger {
    /// Feeds the terminal console through the delta channel.
    pub fn console(tx: Sender<Delta>, level: LevelFilter) -> Self {
        Self {
            sink: Sink::Console(tx),
            level,
        }
    }

    pub fn stderr(level: LevelFilter) -> Self {
        Self {
            sink: Sink::Stderr,
            level,
        }
    }
}

impl Log for LeagueLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.target().starts_with(env!("CARGO_CRATE_NAME"))
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("[{}] {}", record.level(), record.args());
        match &self.sink {
            Sink::Console(tx) => {
                let _ = tx.send(Delta::Log(line));
            }
            Sink::Stderr => eprintln!("{line}"),
        }
    }

    fn flush(&self) {
        if let Sink::Stderr = self.sink {
            let _ = std::io::stderr().flush();
        }
    }
}

/// Installs `logger` as the process-wide logger. Only the first call wins.
pub fn install(logger: LeagueLogger) -> Result<(), SetLoggerError> {
    let level = logger.level;
    let logger = LOGGER.get_or_init(|| logger);
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;
    use std::sync::mpsc;

    #[test]
    fn console_sink_forwards_crate_records() {
        let (tx, rx) = mpsc::channel();
        let logger = LeagueLogger::console(tx, LevelFilter::Info);
        logger.log(
            &Record::builder()
                .args(format_args!("week 1 played"))
                .level(Level::Info)
                .target("league_terminal::engine")
                .build(),
        );
        match rx.try_recv() {
            Ok(Delta::Log(line)) => assert_eq!(line, "[INFO] week 1 played"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn records_below_level_or_from_other_crates_are_dropped() {
        let (tx, rx) = mpsc::channel();
        let logger = LeagueLogger::console(tx, LevelFilter::Info);
        logger.log(
            &Record::builder()
                .args(format_args!("noisy"))
                .level(Level::Debug)
                .target("league_terminal::engine")
                .build(),
        );
        logger.log(
            &Record::builder()
                .args(format_args!("foreign"))
                .level(Level::Warn)
                .target("rayon_core")
                .build(),
        );
        assert!(rx.try_recv().is_err());
    }
}
