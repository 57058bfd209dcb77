use crate::session::{Options, Pid};
use argh::FromArgs;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const COPYRIGHT: &str = "\
Copyright (C) 2006-2017 Scanmem authors
See https://github.com/scanmem/scanmem/blob/main/AUTHORS for a full author list

scanmem comes with ABSOLUTELY NO WARRANTY.
This is free software, and you are welcome to redistribute it
under certain conditions.
";

pub fn version_line() -> String {
    format!("scanmem version {VERSION}")
}

/// Version line followed by the copyright notice, shown at startup.
pub fn banner() -> String {
    format!("{}\n\n{COPYRIGHT}\n", version_line())
}

#[derive(FromArgs, Debug)]
/// Interactively locate and modify variables in an executing process.
/// Enter `help` at the prompt for further assistance.
pub struct Args {
    #[argh(option, short = 'p')]
    /// set the target process pid.
    pub pid: Option<Pid>,

    #[argh(option, short = 'c')]
    /// run given commands (separated by `;`) before the interactive prompt.
    pub command: Option<String>,

    #[argh(switch, short = 'v')]
    /// print version information.
    pub version: bool,

    #[argh(switch, short = 'd')]
    /// enable debug mode.
    pub debug: bool,

    #[argh(switch, short = 'e')]
    /// exit on the first failing initial command.
    pub errexit: bool,

    #[argh(positional)]
    /// target process pid, overrides --pid.
    pub target: Option<Pid>,
}

/// Everything the session needs from the command line, fixed before startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitialConfig {
    pub target: Option<Pid>,
    pub commands: Option<String>,
    pub abort_on_error: bool,
    pub options: Options,
}

impl From<Args> for InitialConfig {
    fn from(args: Args) -> Self {
        Self {
            // The positional pid is parsed last and wins over `-p`.
            target: args.target.or(args.pid),
            commands: args.command,
            abort_on_error: args.errexit,
            options: Options { debug: args.debug },
        }
    }
}
