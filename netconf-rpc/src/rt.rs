use std::{fmt, future::Future, pin::Pin, sync::Arc};
use tokio::runtime::Handle;
use tracing::warn;

/// A pinned, boxed, `Send` future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Runs futures to completion somewhere other than the calling thread.
///
/// Handler completions are observed on an executor so that whichever thread
/// settles a handler future never runs protocol work itself.
pub trait Executor<F> {
    /// Place the future into the executor to be run.
    fn execute(&self, fut: F);
}

/// Spawns onto the ambient tokio runtime.
///
/// Outside of a runtime the future is dropped with a warning. Dropping an
/// observer completes its [`PendingResponse`](crate::PendingResponse) with
/// `operation-failed`, so nothing waits forever.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioExec;

impl<F> Executor<F> for TokioExec
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    fn execute(&self, fut: F) {
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(fut);
            }
            Err(err) => warn!("no tokio runtime to observe handler completion: {}", err),
        }
    }
}

/// Spawns onto a specific runtime, typically one dedicated to handler
/// completions.
#[derive(Clone, Debug)]
pub struct HandleExec {
    handle: Handle,
}

impl HandleExec {
    /// Spawn onto the runtime behind `handle`.
    pub fn new(handle: Handle) -> Self {
        HandleExec { handle }
    }
}

impl<F> Executor<F> for HandleExec
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    fn execute(&self, fut: F) {
        self.handle.spawn(fut);
    }
}

/// A cheaply cloneable, type-erased [`Executor`].
#[derive(Clone)]
pub struct SharedExec {
    inner: Arc<dyn Executor<BoxFuture<'static, ()>> + Send + Sync + 'static>,
}

impl SharedExec {
    /// Erase `exec`.
    pub fn new<E>(exec: E) -> Self
    where
        E: Executor<BoxFuture<'static, ()>> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(exec),
        }
    }

    /// The ambient tokio runtime.
    pub fn tokio() -> Self {
        Self::new(TokioExec)
    }
}

impl Default for SharedExec {
    fn default() -> Self {
        SharedExec::tokio()
    }
}

impl fmt::Debug for SharedExec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedExec").finish_non_exhaustive()
    }
}

impl<F> Executor<F> for SharedExec
where
    F: Future<Output = ()> + Send + 'static,
{
    fn execute(&self, fut: F) {
        self.inner.execute(Box::pin(fut))
    }
}
