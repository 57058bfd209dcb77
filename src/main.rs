use scanmem::builtin::SessionEngine;
use scanmem::cli::{self, Args, InitialConfig};
use scanmem::console::Console;
use scanmem::driver::{self, Collaborators};
use scanmem::history::HISTORY_MAX_ENTRIES;
use scanmem::line_reader::RustylineReader;
use scanmem::paths::EnvInputs;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("SCANMEM_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let args: Args = argh::from_env();
    if args.version {
        eprintln!("{}", cli::version_line());
        return ExitCode::SUCCESS;
    }

    let config = InitialConfig::from(args);
    init_tracing(config.options.debug);

    // SAFETY: geteuid has no preconditions and cannot fail.
    let is_root = unsafe { libc::geteuid() } == 0;

    driver::run(
        config,
        Collaborators {
            engine: SessionEngine::default(),
            console: Console::stderr(),
            env: EnvInputs::from_process(),
            open_reader: || RustylineReader::new(HISTORY_MAX_ENTRIES),
            is_root,
        },
    )
    .into()
}
