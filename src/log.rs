// src/log.rs
//! Append-only debug log: `[hh:mm:ss.mmm][LEVEL] target: msg`, elapsed since start.

use std::fs::{ self, OpenOptions };
use std::io::{ self, Write };
use std::path::{ Path, PathBuf };
use std::sync::atomic::{ AtomicBool, Ordering };
use std::sync::{ Mutex, OnceLock };
use std::time::Instant;

use log::{ LevelFilter, Log, Metadata, Record, SetLoggerError };

static START: OnceLock<Instant> = OnceLock::new();

fn start() -> Instant {
    *START.get_or_init(Instant::now)
}

fn fmt_elapsed(ms: u128) -> String {
    let total_ms = ms as u64;
    let h = total_ms / 3_600_000;
    let m = (total_ms % 3_600_000) / 60_000;
    let s = (total_ms % 60_000) / 1_000;
    let ms = total_ms % 1_000;
    format!("{h:02}:{m:02}:{s:02}.{ms:03}")
}

pub struct FileLogger {
    path: PathBuf,
    level: LevelFilter,
    lock: Mutex<()>,
    warned: AtomicBool,
}

impl FileLogger {
    pub fn new(path: impl Into<PathBuf>, level: LevelFilter) -> Self {
        start();
        Self { path: path.into(), level, lock: Mutex::new(()), warned: AtomicBool::new(false) }
    }

    fn line(&self, record: &Record) -> String {
        let elapsed = fmt_elapsed(start().elapsed().as_millis());
        format!("[{elapsed}][{}] {}: {}\n", record.level(), record.target(), record.args())
    }

    fn append(&self, line: &str) -> io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(line.as_bytes())
    }

    /// Only the first failure is reported; a logger has nowhere else to send it.
    fn report_failure(&self, err: &io::Error) {
        if !self.warned.swap(true, Ordering::Relaxed) {
            eprintln!("cannot write log file {}: {err}", self.path.display());
        }
    }
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = self.line(record);
        if let Ok(_guard) = self.lock.lock() {
            if let Err(e) = self.append(&line) {
                self.report_failure(&e);
            }
        }
    }

    fn flush(&self) {}
}

/// Install a `FileLogger` as the global logger. The parent directory is created if needed.
pub fn init(path: &Path, level: LevelFilter) -> Result<(), SetLoggerError> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    log::set_boxed_logger(Box::new(FileLogger::new(path, level)))?;
    log::set_max_level(level);
    Ok(())
}
