//! tracing-subscriber setup. The TUI owns the terminal, so it logs to a file.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::profiles::config_dir;

pub enum LogTarget {
    Stderr,
    /// `<config dir>/dgos.log`, appended.
    File,
}

pub fn log_file_path() -> PathBuf {
    config_dir().join("dgos.log")
}

pub fn init(target: LogTarget) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dgos=info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    // a subscriber may already be installed (tests); keep it
    let _ = match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File => {
            let path = log_file_path();
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
    };
    Ok(())
}
