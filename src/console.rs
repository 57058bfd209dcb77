use std::fmt;
use std::io::{self, Write};

/// Sink for user-visible messages.
///
/// Messages come in the classes the command line users of scanmem are used to:
/// plain user text, `info:`, `warn:`, `error:` and `debug:` lines. Everything goes to
/// standard error by default so that standard output stays reserved for
/// command results.
pub struct Console {
    out: Box<dyn Write>,
}

impl Console {
    pub fn new(out: Box<dyn Write>) -> Self {
        Self { out }
    }

    pub fn stderr() -> Self {
        Self::new(Box::new(io::stderr()))
    }

    /// Plain message, written exactly as formatted.
    pub fn user(&mut self, args: fmt::Arguments<'_>) {
        self.emit("", args);
    }

    pub fn info(&mut self, args: fmt::Arguments<'_>) {
        self.emit("info: ", args);
    }

    pub fn warn(&mut self, args: fmt::Arguments<'_>) {
        self.emit("warn: ", args);
    }

    pub fn error(&mut self, args: fmt::Arguments<'_>) {
        self.emit("error: ", args);
    }

    /// Diagnostic line; callers only emit these when `--debug` is set.
    pub fn debug(&mut self, args: fmt::Arguments<'_>) {
        self.emit("debug: ", args);
    }

    /// Hint printed after a failed command.
    pub fn quick_help(&mut self, has_target: bool) {
        if has_target {
            self.user(format_args!(
                "Please enter current value, or \"help\" for other commands.\n"
            ));
        } else {
            self.user(format_args!(
                "Enter the pid of the process to search using the \"pid\" command.\n"
            ));
            self.user(format_args!("Enter \"help\" for other commands.\n"));
        }
    }

    /// Flush this console together with standard output so that interleaved
    /// command output and messages keep their relative order.
    pub fn flush(&mut self) {
        let _ = io::stdout().flush();
        let _ = self.out.flush();
    }

    fn emit(&mut self, prefix: &str, args: fmt::Arguments<'_>) {
        // Nowhere left to report a failing message sink.
        let _ = write!(self.out, "{prefix}{args}");
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::stderr()
    }
}
