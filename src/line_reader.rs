use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};
use std::collections::VecDeque;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Source of interactive command lines.
///
/// A reader owns the history log: every line it hands out is appended to it,
/// and it knows how to load the log from and save it to a file. The driver only
/// decides when that happens and where the file lives.
pub trait LineReader {
    /// Read one line. `Ok(None)` means the input is exhausted.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;

    /// Replace the in-memory history with the log stored at `path`.
    fn load_history(&mut self, path: &Path) -> io::Result<()>;

    /// Write the in-memory history, at most the configured maximum, to `path`.
    fn save_history(&mut self, path: &Path) -> io::Result<()>;
}

fn into_io_error(err: ReadlineError) -> io::Error {
    match err {
        ReadlineError::Io(e) => e,
        other => io::Error::other(other),
    }
}

/// Terminal line editor backed by `rustyline`.
pub struct RustylineReader {
    editor: DefaultEditor,
}

impl RustylineReader {
    /// Editor keeping at most `max_history` entries in memory and on disk.
    pub fn new(max_history: usize) -> Result<Self> {
        let config = Config::builder()
            .max_history_size(max_history)?
            .auto_add_history(false)
            .build();
        let editor = DefaultEditor::with_config(config).context("cannot set up line editor")?;
        Ok(Self { editor })
    }
}

impl LineReader for RustylineReader {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        loop {
            match self.editor.readline(prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        self.editor.add_history_entry(line.as_str())?;
                    }
                    return Ok(Some(line));
                }
                // Ctrl-C drops the current line only.
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => return Ok(None),
                Err(e) => return Err(e).context("reading from terminal"),
            }
        }
    }

    fn load_history(&mut self, path: &Path) -> io::Result<()> {
        self.editor.clear_history().map_err(into_io_error)?;
        self.editor.load_history(path).map_err(into_io_error)
    }

    fn save_history(&mut self, path: &Path) -> io::Result<()> {
        self.editor.save_history(path).map_err(into_io_error)
    }
}

/// Reader that replays a fixed list of lines, for tests and piped sessions.
///
/// Once the lines are used up it reports end of input, or an error when built
/// with [`ScriptedReader::failing`]. Its history file holds one entry per line.
#[derive(Debug)]
pub struct ScriptedReader {
    lines: VecDeque<String>,
    fail_at_end: bool,
    prompts: Vec<String>,
    history: VecDeque<String>,
    max_history: usize,
}

impl Default for ScriptedReader {
    fn default() -> Self {
        Self {
            lines: VecDeque::new(),
            fail_at_end: false,
            prompts: Vec::new(),
            history: VecDeque::new(),
            max_history: crate::history::HISTORY_MAX_ENTRIES,
        }
    }
}

impl ScriptedReader {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Same as [`ScriptedReader::new`], but reading past the last line fails.
    pub fn failing<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fail_at_end: true,
            ..Self::new(lines)
        }
    }

    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    /// Prompts shown so far, one per read attempt.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// In-memory history, oldest first.
    pub fn history(&self) -> Vec<&str> {
        self.history.iter().map(String::as_str).collect()
    }

    /// Append `line` unless it is blank or repeats the previous entry.
    fn record(&mut self, line: &str) {
        if line.trim().is_empty() || self.history.back().is_some_and(|last| last == line) {
            return;
        }
        self.history.push_back(line.to_string());
        while self.history.len() > self.max_history {
            self.history.pop_front();
        }
    }
}

impl LineReader for ScriptedReader {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        match self.lines.pop_front() {
            Some(line) => {
                self.record(&line);
                Ok(Some(line))
            }
            None if self.fail_at_end => Err(anyhow::anyhow!("input device error")),
            None => Ok(None),
        }
    }

    fn load_history(&mut self, path: &Path) -> io::Result<()> {
        let text = fs::read_to_string(path)?;
        self.history.clear();
        for line in text.lines() {
            self.record(line);
        }
        Ok(())
    }

    fn save_history(&mut self, path: &Path) -> io::Result<()> {
        let mut out = io::BufWriter::new(fs::File::create(path)?);
        for entry in &self.history {
            writeln!(out, "{entry}")?;
        }
        out.flush()
    }
}
