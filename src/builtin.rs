use crate::console::Console;
use crate::engine::Engine;
use crate::session::{Pid, Session};
use anyhow::{Result, bail};
use argh::{EarlyExit, FromArgs};
use std::marker::PhantomData;
use std::path::PathBuf;

/// Session-level commands known at compile time.
///
/// Arguments are parsed with [`argh`] (`FromArgs`); the command then works on
/// the session state directly.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Names the command answers to; the first one is canonical.
    fn names() -> &'static [&'static str];

    fn execute(self, session: &mut Session, console: &mut Console) -> Result<()>;
}

/// Object-safe form of a parsed command.
trait ExecutableCommand {
    fn execute(self: Box<Self>, session: &mut Session, console: &mut Console) -> Result<()>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(self: Box<Self>, session: &mut Session, console: &mut Console) -> Result<()> {
        T::execute(*self, session, console)
    }
}

/// Arguments that did not parse, or a `--help` request.
struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(self: Box<Self>, _session: &mut Session, console: &mut Console) -> Result<()> {
        if self.is_error {
            bail!("{}", self.output.trim_end());
        }
        console.user(format_args!("{}\n", self.output.trim_end()));
        Ok(())
    }
}

/// Tries to create a command from a name and its arguments.
trait CommandFactory {
    fn try_create(&self, name: &str, args: &[&str]) -> Option<Box<dyn ExecutableCommand>>;
}

struct Factory<T> {
    _phantom: PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(&self, name: &str, args: &[&str]) -> Option<Box<dyn ExecutableCommand>> {
        if !T::names().contains(&name) {
            return None;
        }
        Some(match T::from_args(&[name], args) {
            Ok(cmd) => Box::new(cmd),
            Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                output,
                is_error: status.is_err(),
            }),
        })
    }
}

/// Engine that understands the session-level commands only.
///
/// It selects targets and tracks the exit request, but never touches target
/// memory. Lines are split on whitespace; the first word picks the command.
/// With [`Options::debug`](crate::session::Options) set, every dispatched line
/// is echoed as a `debug:` message first.
pub struct SessionEngine {
    commands: Vec<Box<dyn CommandFactory>>,
}

impl Default for SessionEngine {
    /// `pid`, `reset`, `exit`/`quit`, `help` and `version`.
    fn default() -> Self {
        Self {
            commands: vec![
                Box::new(Factory::<PidCommand>::default()),
                Box::new(Factory::<Reset>::default()),
                Box::new(Factory::<Exit>::default()),
                Box::new(Factory::<Help>::default()),
                Box::new(Factory::<Version>::default()),
            ],
        }
    }
}

impl Engine for SessionEngine {
    fn execute(&mut self, session: &mut Session, line: &str, console: &mut Console) -> Result<()> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(());
        };
        let args: Vec<&str> = words.collect();
        if session.options().debug {
            console.debug(format_args!("command `{name}`, arguments {args:?}\n"));
        }
        for factory in &self.commands {
            if let Some(cmd) = factory.try_create(name, &args) {
                return cmd.execute(session, console);
            }
        }
        bail!("unknown command `{name}`")
    }
}

const COMMAND_SUMMARY: &[(&str, &str)] = &[
    ("pid [PID]", "select the target process, or print the current one"),
    ("reset", "forget all matches and re-check the target"),
    ("exit, quit", "leave scanmem"),
    ("help", "print this list"),
    ("version", "print version information"),
];

fn proc_dir(pid: Pid) -> PathBuf {
    PathBuf::from("/proc").join(pid.to_string())
}

/// Drop tracked matches and make sure the target still exists.
fn reset(session: &mut Session) -> Result<()> {
    session.matches = None;
    if let Some(pid) = session.target {
        if !proc_dir(pid).exists() {
            session.target = None;
            bail!("cannot inspect pid {pid}, it may be invalid or you don't have permission");
        }
    }
    Ok(())
}

#[derive(FromArgs)]
/// Select the process to operate on; without an argument print the current one.
pub struct PidCommand {
    #[argh(positional)]
    /// process id, decimal, 0x-prefixed hex or 0-prefixed octal.
    pub pid: Option<Pid>,
}

impl BuiltinCommand for PidCommand {
    fn names() -> &'static [&'static str] {
        &["pid"]
    }

    fn execute(self, session: &mut Session, console: &mut Console) -> Result<()> {
        match (self.pid, session.target) {
            (Some(pid), _) => {
                session.target = Some(pid);
                reset(session)
            }
            (None, Some(current)) => {
                console.info(format_args!("target pid is {current}.\n"));
                Ok(())
            }
            (None, None) => bail!("no target process selected"),
        }
    }
}

#[derive(FromArgs)]
/// Forget all matches and re-check the target process.
pub struct Reset {}

impl BuiltinCommand for Reset {
    fn names() -> &'static [&'static str] {
        &["reset"]
    }

    fn execute(self, session: &mut Session, _console: &mut Console) -> Result<()> {
        reset(session)
    }
}

#[derive(FromArgs)]
/// Leave scanmem.
pub struct Exit {}

impl BuiltinCommand for Exit {
    fn names() -> &'static [&'static str] {
        &["exit", "quit"]
    }

    fn execute(self, session: &mut Session, _console: &mut Console) -> Result<()> {
        session.request_exit();
        Ok(())
    }
}

#[derive(FromArgs)]
/// Print the available commands.
pub struct Help {}

impl BuiltinCommand for Help {
    fn names() -> &'static [&'static str] {
        &["help"]
    }

    fn execute(self, _session: &mut Session, console: &mut Console) -> Result<()> {
        for (usage, summary) in COMMAND_SUMMARY {
            console.user(format_args!("{usage:<12} {summary}\n"));
        }
        Ok(())
    }
}

#[derive(FromArgs)]
/// Print version information.
pub struct Version {}

impl BuiltinCommand for Version {
    fn names() -> &'static [&'static str] {
        &["version"]
    }

    fn execute(self, _session: &mut Session, console: &mut Console) -> Result<()> {
        console.user(format_args!("{}\n", crate::cli::version_line()));
        Ok(())
    }
}
