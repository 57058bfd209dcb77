//! Session driver for the scanmem interactive memory scanner.
//!
//! This crate turns command line arguments into a running session: it starts
//! the engine, runs the commands given with `--command`, then reads commands
//! interactively until one of them asks to exit. Command history is kept in
//! `$XDG_CONFIG_HOME/scanmem/history` (or `~/.config/scanmem/history`).
//!
//! The entry point is [`driver::run`]. Commands themselves are carried out by
//! an [`engine::Engine`]; [`builtin::SessionEngine`] provides the session-level
//! commands (`pid`, `reset`, `exit`, `help`, `version`).

pub mod batch;
pub mod builtin;
pub mod cli;
pub mod command;
pub mod console;
pub mod driver;
pub mod engine;
pub mod history;
pub mod interpreter;
pub mod io_adapters;
pub mod line_reader;
pub mod paths;
pub mod session;

/// Just a convenient re-export of the command runner.
///
/// See [`Interpreter`] for batch and interactive execution.
pub use interpreter::Interpreter;
