use crate::console::Console;
use crate::engine::Engine;
use crate::session::Session;

/// Verdict on a single executed command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn is_failure(self) -> bool {
        self == Outcome::Failure
    }
}

/// Run one command line through the engine.
///
/// The engine's error, if any, is reported on the console; what happens after
/// a failure is up to the caller. There is no retry.
pub fn execute<E: Engine + ?Sized>(
    engine: &mut E,
    session: &mut Session,
    line: &str,
    console: &mut Console,
) -> Outcome {
    match engine.execute(session, line, console) {
        Ok(()) => Outcome::Success,
        Err(e) => {
            console.error(format_args!("{e:#}\n"));
            Outcome::Failure
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io_adapters::MemWriter;
    use anyhow::{Result, bail};

    struct Picky;

    impl Engine for Picky {
        fn execute(&mut self, session: &mut Session, line: &str, _: &mut Console) -> Result<()> {
            match line {
                "ok" => Ok(()),
                "quit" => {
                    session.request_exit();
                    Ok(())
                }
                _ => bail!("unknown command `{line}`"),
            }
        }
    }

    #[test]
    fn test_success_and_failure_verdicts() {
        let writer = MemWriter::new();
        let mut console = Console::new(Box::new(writer.clone()));
        let mut session = Session::default();

        assert_eq!(execute(&mut Picky, &mut session, "ok", &mut console), Outcome::Success);
        assert_eq!(writer.contents(), "");

        let outcome = execute(&mut Picky, &mut session, "bogus", &mut console);
        assert!(outcome.is_failure());
        assert_eq!(writer.contents(), "error: unknown command `bogus`\n");
    }

    #[test]
    fn test_engine_mutates_session() {
        let mut console = Console::new(Box::new(MemWriter::new()));
        let mut session = Session::default();
        execute(&mut Picky, &mut session, "quit", &mut console);
        assert!(session.exit_requested);
    }
}
