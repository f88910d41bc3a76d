//! Deadline and cancellation scoping for a single invocation.
//!
//! A [`Context`] carries an optional absolute deadline and a cancellation
//! token. Child contexts inherit both: cancelling a parent cancels every
//! child, while cancelling a child leaves the parent untouched. Every
//! network round-trip and the discovery event loop are bounded by one.

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, sleep_until};
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::errors::Error;

/// The reason a [`Context`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cancellation {
    /// The context, or one of its parents, was cancelled explicitly.
    Cancelled,
    /// The context deadline passed.
    DeadlineExceeded,
}

impl From<Cancellation> for Error {
    fn from(reason: Cancellation) -> Self {
        match reason {
            Cancellation::Cancelled => Error::Cancelled,
            Cancellation::DeadlineExceeded => Error::DeadlineExceeded,
        }
    }
}

/// Cancellation scope with an optional deadline.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use keylight_rs::{Cancellation, Context};
///
/// let root = Context::new();
/// let scoped = root.with_timeout(Duration::from_secs(10));
/// assert!(scoped.err().is_none());
///
/// root.cancel();
/// assert_eq!(scoped.err(), Some(Cancellation::Cancelled));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// Create a root context with no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a context that can be cancelled on its own.
    pub fn child(&self) -> Self {
        Context {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Derive a context that expires `timeout` from now, or earlier if the
    /// parent expires first.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self.child(),
        }
    }

    /// Derive a context that expires at `deadline`, or earlier if the parent
    /// expires first.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(parent) => parent.min(deadline),
            None => deadline,
        };
        Context {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cancel this context and all of its children.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns a guard that cancels this context when dropped.
    pub fn drop_guard(&self) -> DropGuard {
        self.token.clone().drop_guard()
    }

    /// Returns why the context ended, or `None` while it is still live.
    pub fn err(&self) -> Option<Cancellation> {
        if self.token.is_cancelled() {
            return Some(Cancellation::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Cancellation::DeadlineExceeded),
            _ => None,
        }
    }

    /// Wait until the context ends and report why.
    pub async fn done(&self) -> Cancellation {
        match self.deadline {
            Some(deadline) => tokio::select! {
                biased;
                () = self.token.cancelled() => Cancellation::Cancelled,
                () = sleep_until(deadline) => Cancellation::DeadlineExceeded,
            },
            None => {
                self.token.cancelled().await;
                Cancellation::Cancelled
            }
        }
    }

    /// Drive `future` to completion unless the context ends first.
    pub async fn run<F: Future>(&self, future: F) -> Result<F::Output, Cancellation> {
        tokio::select! {
            biased;
            reason = self.done() => Err(reason),
            output = future => Ok(output),
        }
    }
}
