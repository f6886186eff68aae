//! Re-run triggers
//!
//! A [`Debouncer`] coalesces bursts of change signals into one run after a
//! quiet period. A [`SnippetFile`] turns modification-time polling of the
//! snippet into those signals.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

/// Quiet period used unless configured otherwise
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(300);

/// Fires once `quiet` has passed since the last trigger
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Debouncer {
            quiet,
            deadline: None,
        }
    }

    /// Record a change; supersedes any pending deadline
    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    /// True exactly once per quiet period that has elapsed
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn quiet(&self) -> Duration {
        self.quiet
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Debouncer::new(DEFAULT_QUIET_PERIOD)
    }
}

/// The snippet on disk, with the modification time last seen
#[derive(Debug, Clone)]
pub struct SnippetFile {
    path: PathBuf,
    modified: Option<SystemTime>,
}

impl SnippetFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SnippetFile {
            path: path.into(),
            modified: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snippet and remember its modification time
    pub fn read(&mut self) -> io::Result<String> {
        let source = fs::read_to_string(&self.path)?;
        self.modified = fs::metadata(&self.path)?.modified().ok();
        Ok(source)
    }

    /// Whether the modification time moved since the last read or poll
    pub fn poll(&mut self) -> io::Result<bool> {
        let modified = fs::metadata(&self.path)?.modified().ok();
        if modified == self.modified {
            return Ok(false);
        }
        self.modified = modified;
        Ok(true)
    }
}
