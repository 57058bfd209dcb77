//! One scanmem session, from engine startup to shutdown.
//!
//! The session runs in stages: startup, batch, interactive. Each stage either
//! hands over to the next one or settles the final [`Status`]. Engine cleanup
//! is tied to the interpreter's lifetime and therefore runs on every path.

use crate::batch::BatchOutcome;
use crate::cli::{self, InitialConfig};
use crate::console::Console;
use crate::engine::{Engine, EngineGuard};
use crate::history::HistoryStore;
use crate::interpreter::{Interpreter, LoopExit};
use crate::line_reader::LineReader;
use crate::paths::{self, EnvInputs, HISTORY_FILE, PathError};
use crate::session::Session;
use anyhow::Result;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

/// Final verdict of a session, mapped to the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Failure,
}

impl From<Status> for std::process::ExitCode {
    fn from(status: Status) -> Self {
        match status {
            Status::Success => std::process::ExitCode::SUCCESS,
            Status::Failure => std::process::ExitCode::FAILURE,
        }
    }
}

/// Failures that end a session before or instead of the interactive loop.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Initialization failed.")]
    EngineInit(#[source] anyhow::Error),
    #[error("cannot locate the config directory: {0}")]
    ConfigDir(#[from] PathError),
    #[error("cannot read input: {0:#}")]
    LineReader(#[source] anyhow::Error),
    #[error("an initial command failed")]
    BatchAborted,
}

/// Everything the session takes from the outside world.
pub struct Collaborators<E, F> {
    pub engine: E,
    pub console: Console,
    pub env: EnvInputs,
    /// Opens the line reader when interactive mode starts.
    pub open_reader: F,
    /// Whether the process runs with root privileges.
    pub is_root: bool,
}

/// Run a whole session.
pub fn run<E, R, F>(config: InitialConfig, collab: Collaborators<E, F>) -> Status
where
    E: Engine,
    R: LineReader,
    F: FnOnce() -> Result<R>,
{
    let Collaborators {
        engine,
        console,
        env,
        open_reader,
        is_root,
    } = collab;

    let mut interp = match start(&config, engine, console, is_root) {
        Ok(interp) => interp,
        // Already reported; the engine was cleaned up inside `start`.
        Err(e) => {
            debug!(error = ?e, "startup failed");
            return Status::Failure;
        }
    };

    let status = match run_stages(&config, &mut interp, &env, open_reader) {
        Ok(status) => status,
        Err(StartupError::BatchAborted) => Status::Failure,
        Err(e) => {
            interp.console().error(format_args!("{e}\n"));
            Status::Failure
        }
    };
    interp.console().flush();
    status
}

/// Initialize the engine and select the initial target.
fn start<E: Engine>(
    config: &InitialConfig,
    engine: E,
    mut console: Console,
    is_root: bool,
) -> Result<Interpreter<E>, StartupError> {
    console.user(format_args!("{}", cli::banner()));

    let mut engine = EngineGuard::new(engine);
    if let Err(e) = engine.initialize() {
        console.error(format_args!("Initialization failed.\n"));
        console.flush();
        return Err(StartupError::EngineInit(e));
    }

    if !is_root {
        console.warn(format_args!(
            "Run scanmem as root if memory regions are missing. See scanmem man page.\n\n"
        ));
    }

    let session = Session::new(config.target, config.options);
    let mut interp = Interpreter::new(session, engine, console);

    // Sets up matches and regions for the initial target.
    if interp.execute("reset").is_failure() {
        interp.session_mut().target = None;
    }
    interp.quick_help();
    Ok(interp)
}

fn run_stages<E, R, F>(
    config: &InitialConfig,
    interp: &mut Interpreter<E>,
    env: &EnvInputs,
    open_reader: F,
) -> Result<Status, StartupError>
where
    E: Engine,
    R: LineReader,
    F: FnOnce() -> Result<R>,
{
    if let Some(commands) = &config.commands {
        if interp.run_batch(commands, config.abort_on_error) == BatchOutcome::Aborted {
            return Err(StartupError::BatchAborted);
        }
    }
    if interp.session().exit_requested {
        return Ok(Status::Success);
    }

    let mut history = HistoryStore::new(history_path(env)?);
    let mut reader = open_reader().map_err(StartupError::LineReader)?;
    history.load_into(&mut reader);
    info!(path = %history.path().display(), "interactive mode");

    Ok(match interp.repl(&mut reader, Some(&history)) {
        LoopExit::Requested => Status::Success,
        LoopExit::InputFailed => Status::Failure,
    })
}

fn history_path(env: &EnvInputs) -> Result<PathBuf, PathError> {
    let dir = paths::config_dir(env)?;
    Ok(paths::file_in(&dir, HISTORY_FILE))
}
