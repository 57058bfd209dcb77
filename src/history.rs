//! Persistent command history.
//!
//! The line reader owns the log and its file format; this module decides where
//! the file lives and when it is touched. The log is read once when interactive
//! mode starts and written back once, on clean shutdown. The reader keeps at
//! most [`HISTORY_MAX_ENTRIES`], so the file never grows past that.
//! History is best-effort: no failure in here ends a session.

use crate::line_reader::LineReader;
use crate::paths::{self, CONFIG_DIR_MODE};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Maximum number of entries kept in memory and on disk.
pub const HISTORY_MAX_ENTRIES: usize = 1000;

/// History log at a fixed path.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
    /// Set when the file exists but could not be read. Such a file is left
    /// alone so that a session never replaces a log it did not load.
    unreadable: bool,
}

impl HistoryStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            unreadable: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fill the reader's history from the file. A missing file is an empty log.
    pub fn load_into(&mut self, reader: &mut dyn LineReader) {
        self.unreadable = match reader.load_history(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "loaded history");
                false
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "could not read history");
                true
            }
        };
    }

    /// Write the reader's history to the file.
    ///
    /// Nothing is written when the parent directories cannot be created or the
    /// existing file could not be loaded. Returns whether the log reached the
    /// disk.
    pub fn persist(&self, reader: &mut dyn LineReader) -> bool {
        if self.unreadable {
            debug!(path = %self.path.display(), "keeping unreadable history file");
            return false;
        }
        if let Err(e) = paths::create_parent_dirs(&self.path, CONFIG_DIR_MODE) {
            debug!(path = %self.path.display(), error = %e, "skipping history, no config dir");
            return false;
        }
        match reader.save_history(&self.path) {
            Ok(()) => true,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "could not write history");
                false
            }
        }
    }
}
