use crate::batch::{BatchOutcome, split_commands};
use crate::command::{self, Outcome};
use crate::console::Console;
use crate::engine::{Engine, EngineGuard};
use crate::history::HistoryStore;
use crate::line_reader::LineReader;
use crate::session::Session;
use tracing::debug;

/// How the interactive loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// A command requested exit.
    Requested,
    /// The next line could not be read.
    InputFailed,
}

/// Runs command lines against an engine, in batch or interactively.
///
/// The interpreter owns the [`Session`] and the engine. The engine is wrapped
/// in an [`EngineGuard`], so its cleanup runs when the interpreter is dropped.
pub struct Interpreter<E: Engine> {
    session: Session,
    engine: EngineGuard<E>,
    console: Console,
}

impl<E: Engine> Interpreter<E> {
    pub fn new(session: Session, engine: EngineGuard<E>, console: Console) -> Self {
        Self {
            session,
            engine,
            console,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn console(&mut self) -> &mut Console {
        &mut self.console
    }

    /// Run a single command line and report its verdict.
    pub fn execute(&mut self, line: &str) -> Outcome {
        command::execute(&mut *self.engine, &mut self.session, line, &mut self.console)
    }

    pub fn quick_help(&mut self) {
        self.console.quick_help(self.session.target.is_some());
    }

    /// Run the `;`/newline separated commands of `batch` in order.
    ///
    /// Each line is echoed with the current prompt before it runs. A failing
    /// line ends the batch when `abort_on_error` is set and otherwise only
    /// prints the quick help. An exit request stops the batch in any case.
    pub fn run_batch(&mut self, batch: &str, abort_on_error: bool) -> BatchOutcome {
        for line in split_commands(batch) {
            let prompt = self.session.prompt();
            self.console.user(format_args!("{prompt}{line}\n"));

            if self.execute(line).is_failure() {
                if abort_on_error {
                    debug!(line, "batch aborted");
                    self.console.flush();
                    return BatchOutcome::Aborted;
                }
                self.quick_help();
            }
            self.console.flush();

            if self.session.exit_requested {
                break;
            }
        }
        BatchOutcome::Completed
    }

    /// Read and execute lines until a command requests exit or input fails.
    ///
    /// On a requested exit the reader's history is written through `history`,
    /// if one is given. A failed read leaves the history file untouched.
    pub fn repl(
        &mut self,
        reader: &mut dyn LineReader,
        history: Option<&HistoryStore>,
    ) -> LoopExit {
        loop {
            let prompt = self.session.prompt();
            let line = match reader.read_line(&prompt) {
                Ok(Some(line)) => line,
                Ok(None) => {
                    debug!("end of input");
                    return self.input_failed();
                }
                Err(e) => {
                    debug!(error = %format!("{e:#}"), "read failed");
                    return self.input_failed();
                }
            };

            // A failed command is never fatal here.
            if self.execute(&line).is_failure() {
                self.quick_help();
            }
            self.console.flush();

            if self.session.exit_requested {
                if let Some(store) = history {
                    store.persist(reader);
                }
                return LoopExit::Requested;
            }
        }
    }

    fn input_failed(&mut self) -> LoopExit {
        self.console
            .error(format_args!("failed to read in a command.\n"));
        self.console.flush();
        LoopExit::InputFailed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io_adapters::MemWriter;
    use crate::line_reader::ScriptedReader;
    use anyhow::{Result, bail};
    use std::cell::RefCell;
    use std::fs;
    use std::rc::Rc;

    /// Records every line; `fail*` lines fail, `exit` requests exit, `match N`
    /// sets the match count.
    #[derive(Default)]
    struct Recorder {
        seen: Rc<RefCell<Vec<String>>>,
    }

    impl Engine for Recorder {
        fn execute(&mut self, session: &mut Session, line: &str, _: &mut Console) -> Result<()> {
            self.seen.borrow_mut().push(line.to_string());
            if line.starts_with("fail") {
                bail!("{line} failed");
            }
            if line == "exit" {
                session.request_exit();
            }
            if let Some(n) = line.strip_prefix("match ") {
                session.matches = Some(n.parse()?);
            }
            Ok(())
        }
    }

    fn interpreter() -> (Interpreter<Recorder>, Rc<RefCell<Vec<String>>>, MemWriter) {
        let engine = Recorder::default();
        let seen = engine.seen.clone();
        let writer = MemWriter::new();
        let console = Console::new(Box::new(writer.clone()));
        let interp = Interpreter::new(Session::default(), EngineGuard::new(engine), console);
        (interp, seen, writer)
    }

    #[test]
    fn test_batch_runs_every_line_in_order() {
        let (mut interp, seen, _) = interpreter();
        let outcome = interp.run_batch("one;two\nthree", false);
        assert_eq!(outcome, BatchOutcome::Completed);
        assert_eq!(*seen.borrow(), ["one", "two", "three"]);
    }

    #[test]
    fn test_batch_abort_on_error_skips_rest() {
        let (mut interp, seen, _) = interpreter();
        let outcome = interp.run_batch("one;fail;three", true);
        assert_eq!(outcome, BatchOutcome::Aborted);
        assert_eq!(*seen.borrow(), ["one", "fail"]);
    }

    #[test]
    fn test_batch_continue_on_error_runs_all() {
        let (mut interp, seen, out) = interpreter();
        let outcome = interp.run_batch("one;fail;three", false);
        assert_eq!(outcome, BatchOutcome::Completed);
        assert_eq!(*seen.borrow(), ["one", "fail", "three"]);
        assert!(out.contains_quick_help());
    }

    #[test]
    fn test_batch_stops_at_exit_request() {
        let (mut interp, seen, _) = interpreter();
        let outcome = interp.run_batch("one;exit;three;four", false);
        assert_eq!(outcome, BatchOutcome::Completed);
        assert_eq!(*seen.borrow(), ["one", "exit"]);
    }

    #[test]
    fn test_batch_echo_uses_match_count() {
        let (mut interp, _, out) = interpreter();
        interp.run_batch("first;match 5;second", false);
        assert_eq!(out.contents(), "> first\n> match 5\n5> second\n");
    }

    #[test]
    fn test_repl_until_exit_persists_history() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("scanmem").join("history");
        fs::create_dir(tmp.path().join("scanmem")).unwrap();
        fs::write(&path, "old\n").unwrap();
        let mut store = HistoryStore::new(path.clone());
        let (mut interp, seen, _) = interpreter();
        let mut reader = ScriptedReader::new(["match 3", "fail", "exit", "never"]);
        store.load_into(&mut reader);

        let exit = interp.repl(&mut reader, Some(&store));

        assert_eq!(exit, LoopExit::Requested);
        assert_eq!(*seen.borrow(), ["match 3", "fail", "exit"]);
        assert_eq!(reader.prompts(), ["> ", "3> ", "3> "]);
        assert_eq!(fs::read_to_string(&path).unwrap(), "old\nmatch 3\nfail\nexit\n");
    }

    #[test]
    fn test_repl_failed_command_shows_hint_and_continues() {
        let (mut interp, seen, out) = interpreter();
        let mut reader = ScriptedReader::new(["fail", "exit"]);
        assert_eq!(interp.repl(&mut reader, None), LoopExit::Requested);
        assert_eq!(seen.borrow().len(), 2);
        assert!(out.contents().contains("error: fail failed\n"));
        assert!(out.contains_quick_help());
    }

    #[test]
    fn test_repl_end_of_input_fails_without_history() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("history");
        let store = HistoryStore::new(path.clone());
        let (mut interp, _, out) = interpreter();
        let mut reader = ScriptedReader::new(["one"]);

        assert_eq!(interp.repl(&mut reader, Some(&store)), LoopExit::InputFailed);
        assert!(out.contents().ends_with("error: failed to read in a command.\n"));
        assert!(!path.exists());
    }

    #[test]
    fn test_repl_read_error_fails() {
        let (mut interp, seen, _) = interpreter();
        let mut reader = ScriptedReader::failing(["one"]);
        assert_eq!(interp.repl(&mut reader, None), LoopExit::InputFailed);
        assert_eq!(*seen.borrow(), ["one"]);
    }

    trait QuickHelpExt {
        fn contains_quick_help(&self) -> bool;
    }

    impl QuickHelpExt for MemWriter {
        fn contains_quick_help(&self) -> bool {
            self.contents().contains("Enter \"help\" for other commands.")
        }
    }
}
