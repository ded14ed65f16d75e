use simplelog::{CombinedLogger, Config, LevelFilter, WriteLogger};
use std::fs::{self, OpenOptions};
use std::io::{Error, ErrorKind};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;

static INIT: Once = Once::new();
static LOGGER_INITIALIZED: AtomicBool = AtomicBool::new(false);

pub fn log_dir() -> Result<PathBuf, Error> {
    let home = std::env::var("HOME")
        .map_err(|_| Error::new(ErrorKind::NotFound, "HOME environment variable not set"))?;

    Ok(PathBuf::from(home)
        .join(".local")
        .join("share")
        .join("ticksheet")
        .join("logs"))
}

/// Appends to `app.log` under [`log_dir`]. Later calls are no-ops.
pub fn init_logger(level: LevelFilter) -> Result<(), Error> {
    INIT.call_once(|| match open_log_file() {
        Ok(file) => {
            if CombinedLogger::init(vec![WriteLogger::new(level, Config::default(), file)]).is_ok()
            {
                LOGGER_INITIALIZED.store(true, Ordering::SeqCst);
            }
        }
        Err(e) => {
            // no writable home, log to stderr instead
            if env_logger::Builder::new()
                .filter_level(level)
                .try_init()
                .is_ok()
            {
                LOGGER_INITIALIZED.store(true, Ordering::SeqCst);
                log::warn!("Log file unavailable ({}), logging to stderr", e);
            }
        }
    });

    if LOGGER_INITIALIZED.load(Ordering::SeqCst) {
        Ok(())
    } else {
        Err(Error::new(ErrorKind::Other, "Logger initialization failed"))
    }
}

fn open_log_file() -> Result<fs::File, Error> {
    let log_dir = log_dir()?;
    fs::create_dir_all(&log_dir)?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("app.log"))
}
