use crate::console::Console;
use crate::session::Session;
use anyhow::Result;
use std::ops::{Deref, DerefMut};

/// The component that carries out commands.
///
/// The session driver never interprets a command line itself: it hands every
/// line to an engine together with the session state, which the engine may
/// change in any way.
pub trait Engine {
    /// One-time setup, called before the first command.
    fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    /// Execute one command line. An error means the command failed.
    fn execute(&mut self, session: &mut Session, line: &str, console: &mut Console) -> Result<()>;

    /// Release engine resources. Called exactly once, at the end of the process.
    fn cleanup(&mut self) {}
}

impl<E: Engine + ?Sized> Engine for Box<E> {
    fn initialize(&mut self) -> Result<()> {
        (**self).initialize()
    }

    fn execute(&mut self, session: &mut Session, line: &str, console: &mut Console) -> Result<()> {
        (**self).execute(session, line, console)
    }

    fn cleanup(&mut self) {
        (**self).cleanup()
    }
}

/// Owns an engine and runs its `cleanup` when dropped, whatever path the
/// session took to get there.
pub struct EngineGuard<E: Engine> {
    engine: E,
}

impl<E: Engine> EngineGuard<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn initialize(&mut self) -> Result<()> {
        self.engine.initialize()
    }
}

impl<E: Engine> Deref for EngineGuard<E> {
    type Target = E;

    fn deref(&self) -> &E {
        &self.engine
    }
}

impl<E: Engine> DerefMut for EngineGuard<E> {
    fn deref_mut(&mut self) -> &mut E {
        &mut self.engine
    }
}

impl<E: Engine> Drop for EngineGuard<E> {
    fn drop(&mut self) {
        self.engine.cleanup();
    }
}
