use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use log::LevelFilter;

/// Copies every log line to the console and, if set, to a log file.
struct Sinks {
    console: bool,
    file: Option<File>,
}

impl Write for Sinks {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.console {
            io::stderr().write_all(buf)?;
        }
        if let Some(file) = self.file.as_mut() {
            file.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        io::stderr().flush()
    }
}

/// `quiet` silences the console and wins over `debug`.
pub fn init(debug: bool, quiet: bool, logfile: Option<&Path>) -> io::Result<()> {
    let level = if debug && !quiet {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let file = match logfile {
        Some(path) => Some(OpenOptions::new().create(true).append(true).open(path)?),
        None => None,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .filter_module("reqwest", LevelFilter::Warn)
        .filter_module("hyper_util", LevelFilter::Warn)
        .format_timestamp_secs()
        .target(env_logger::Target::Pipe(Box::new(Sinks {
            console: !quiet,
            file,
        })))
        .try_init()
        .map_err(io::Error::other)?;

    if let Some(path) = logfile {
        log::info!("logging to {}", path.display());
    }
    log::debug!("debug mode: on");
    Ok(())
}
