use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, SecondsFormat, Utc};
use log::{Level, LevelFilter, Log, Metadata, Record};

struct DynLogger {
    level: AtomicUsize,
}

impl DynLogger {
    const fn new() -> Self {
        Self {
            level: AtomicUsize::new(LevelFilter::Info as usize),
        }
    }

    fn current_level(&self) -> LevelFilter {
        match self.level.load(Ordering::Relaxed) {
            0 => LevelFilter::Off,
            1 => LevelFilter::Error,
            2 => LevelFilter::Warn,
            3 => LevelFilter::Info,
            4 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    fn store_level(&self, level: LevelFilter) {
        self.level.store(level as usize, Ordering::Relaxed);
    }
}

fn format_line(now: DateTime<Utc>, level: Level, target: &str, message: &str) -> String {
    format!(
        "{} [{}] {}: {}",
        now.to_rfc3339_opts(SecondsFormat::Millis, true),
        level,
        target,
        message
    )
}

impl Log for DynLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.current_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let line = format_line(
                Utc::now(),
                record.level(),
                record.target(),
                &record.args().to_string(),
            );
            let _ = writeln!(io::stderr(), "{}", line);
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

static LOGGER: DynLogger = DynLogger::new();

pub fn init_logger(level: Level) -> Result<(), log::SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(LevelFilter::Trace);
    set_log_level(level);
    Ok(())
}

fn set_log_level(level: Level) {
    LOGGER.store_level(level.to_level_filter());
}
