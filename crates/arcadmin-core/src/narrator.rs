//! Scoped action narration.
//!
//! Every step of a command runs inside a labelled scope. The label of the
//! innermost scope that sees an ordinary fault is reported exactly once as
//! `Error <action>: <message>`; every enclosing scope then receives
//! [`Fault::Reported`] and passes it outward without printing anything.
//!
//! ```text
//! attempt("looking up cluster")          push
//!   └─ body()  ── Err(ClusterNotFound) ─▶ pop, report, Err(Reported)
//! attempt("outer")                       sees Reported, pops, stays quiet
//! ```

use std::cell::RefCell;
use std::io::Write;

use thiserror::Error;

use crate::error::AdminError;

/// Exit status of a command that stopped on a narrated fault.
pub const FAILURE_EXIT_CODE: i32 = 1;

/// Outcome of a failed narrated step.
#[derive(Debug, Error)]
pub enum Fault {
    /// The failure was already reported by an inner scope.
    #[error("command aborted after a reported failure")]
    Reported,

    #[error(transparent)]
    Error(#[from] AdminError),
}

impl Fault {
    pub fn exit_code(&self) -> i32 {
        FAILURE_EXIT_CODE
    }

    pub fn is_reported(&self) -> bool {
        matches!(self, Fault::Reported)
    }
}

/// Tracks the stack of in-progress actions for one command invocation.
pub struct Narrator {
    stack: RefCell<Vec<String>>,
    sink: RefCell<Box<dyn Write>>,
}

impl Default for Narrator {
    fn default() -> Self {
        Self::stderr()
    }
}

impl Narrator {
    /// Narrator that reports to the process error stream.
    pub fn stderr() -> Self {
        Self::with_sink(Box::new(std::io::stderr()))
    }

    pub fn with_sink(sink: Box<dyn Write>) -> Self {
        Self {
            stack: RefCell::new(Vec::new()),
            sink: RefCell::new(sink),
        }
    }

    /// Push `action` and return a guard that pops it when dropped.
    pub fn enter(&self, action: impl Into<String>) -> ActionGuard<'_> {
        let action = action.into();
        let mut stack = self.stack.borrow_mut();
        tracing::debug!(action = %action, depth = stack.len() + 1, "begin");
        stack.push(action);
        ActionGuard {
            narrator: self,
            depth: stack.len(),
        }
    }

    /// Run `body` inside a scope labelled `action`.
    ///
    /// An ordinary fault escaping the body is written to the sink and turned
    /// into [`Fault::Reported`]; a fault that was already reported is passed
    /// through untouched.
    pub fn attempt<T, E>(
        &self,
        action: impl Into<String>,
        body: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, Fault>
    where
        E: Into<Fault>,
    {
        let action = action.into();
        let result = {
            let _guard = self.enter(action.clone());
            body().map_err(Into::into)
        };
        match result {
            Ok(value) => Ok(value),
            Err(Fault::Reported) => Err(Fault::Reported),
            Err(Fault::Error(err)) => {
                self.report(&action, &err);
                Err(Fault::Reported)
            }
        }
    }

    /// The innermost action currently in progress.
    pub fn current(&self) -> Option<String> {
        self.stack.borrow().last().cloned()
    }

    pub fn depth(&self) -> usize {
        self.stack.borrow().len()
    }

    fn report(&self, action: &str, err: &AdminError) {
        tracing::debug!(action, error = ?err, "action failed");
        let mut sink = self.sink.borrow_mut();
        // Nothing else can be done if the error stream itself is gone.
        let _ = writeln!(sink, "Error {action}: {err}");
        let _ = sink.flush();
    }
}

/// Keeps one action on the narrator's stack for as long as it lives.
#[must_use = "the action is popped as soon as the guard is dropped"]
pub struct ActionGuard<'n> {
    narrator: &'n Narrator,
    depth: usize,
}

impl Drop for ActionGuard<'_> {
    fn drop(&mut self) {
        let mut stack = self.narrator.stack.borrow_mut();
        debug_assert_eq!(stack.len(), self.depth, "action guards dropped out of order");
        if let Some(action) = stack.pop() {
            tracing::debug!(action = %action, "end");
        }
    }
}
