pub use log::{debug, error, info, LevelFilter};
use log::{Level, Log, Metadata, Record, SetLoggerError};

static LOGGER: Logger = Logger;

struct Logger;

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let header = match record.level() {
            Level::Trace => yansi::Paint::fixed(244, "trace"),
            Level::Debug => yansi::Paint::default("debug"),
            Level::Info => yansi::Paint::green("info"),
            Level::Warn => yansi::Paint::yellow("warn"),
            Level::Error => yansi::Paint::red("error"),
        }
        .bold();
        let colon = yansi::Paint::default(":").bold();
        eprintln!("{}{} {}", header, colon, record.args());
    }

    fn flush(&self) {}
}

/// Install the logger, showing records up to the given level.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    if !atty::is(atty::Stream::Stderr) {
        yansi::Paint::disable();
    }
    log::set_logger(&LOGGER).map(|()| log::set_max_level(level))
}
