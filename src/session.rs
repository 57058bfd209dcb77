use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;
use thiserror::Error;

/// Identifier of the process under inspection.
///
/// A `Pid` can only be built through [`Pid::from_str`] (or [`Pid::new`]), so a
/// stored target is always positive and within the range of `pid_t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pid(NonZeroU32);

/// Returned when a textual pid is empty, malformed, zero, negative or too large.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid pid specified: `{0}`")]
pub struct InvalidPid(pub String);

impl Pid {
    /// Build a pid from a raw value, rejecting zero and values above `pid_t::MAX`.
    pub fn new(raw: u32) -> Option<Self> {
        if raw > libc::pid_t::MAX as u32 {
            return None;
        }
        NonZeroU32::new(raw).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl FromStr for Pid {
    type Err = InvalidPid;

    /// Parses a pid with C `strtoul(.., 0)` radix rules: `0x`/`0X` prefix for
    /// hexadecimal, a leading `0` for octal, decimal otherwise. Unlike
    /// `strtoul`, trailing garbage and a minus sign are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidPid(s.to_string());
        let digits = s.strip_prefix('+').unwrap_or(s);
        let (digits, radix) = if let Some(hex) = digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
        {
            (hex, 16)
        } else if digits.len() > 1 && digits.starts_with('0') {
            (&digits[1..], 8)
        } else {
            (digits, 10)
        };
        // from_str_radix would accept another sign here.
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return Err(invalid());
        }
        let raw = u32::from_str_radix(digits, radix).map_err(|_| invalid())?;
        Pid::new(raw).ok_or_else(invalid)
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Flags fixed at startup and only read afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// Verbose diagnostics were requested with `--debug`. The session engine
    /// then reports each dispatched command on the console.
    pub debug: bool,
}

/// Mutable state shared by every command executed during one session.
///
/// The session is created once by the driver and passed by `&mut` into each
/// engine call; commands are free to change the target, the tracked matches
/// and the exit flag.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Process under inspection, `None` when no target is selected.
    pub target: Option<Pid>,
    /// Number of tracked matches, `None` when no match set exists.
    pub matches: Option<u64>,
    /// Set by a command to end the session at the next loop boundary.
    pub exit_requested: bool,
    options: Options,
}

impl Session {
    pub fn new(target: Option<Pid>, options: Options) -> Self {
        Self {
            target,
            matches: None,
            exit_requested: false,
            options,
        }
    }

    pub fn options(&self) -> Options {
        self.options
    }

    /// Prompt shown before a command: `"<n>> "` while matches are tracked,
    /// `"> "` otherwise.
    pub fn prompt(&self) -> String {
        match self.matches {
            Some(n) => format!("{n}> "),
            None => "> ".to_string(),
        }
    }

    /// Mark the session as finished.
    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }
}
