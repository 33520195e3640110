//! One-shot background computations with a write-once result cell.

use crate::chain::BoxError;
use crate::effects::panic_message;
use crate::future::error::FutureError;
use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::future::{Future as StdFuture, IntoFuture};
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Single-writer, read-many result cell shared by a future and its producer.
struct Cell<T> {
    slot: Mutex<Slot<T>>,
    resolved: Condvar,
}

struct Slot<T> {
    result: Option<Result<T, FutureError>>,
    wakers: Vec<Waker>,
}

impl<T> Cell<T> {
    fn pending() -> Self {
        Self {
            slot: Mutex::new(Slot {
                result: None,
                wakers: Vec::new(),
            }),
            resolved: Condvar::new(),
        }
    }

    /// Write the result. Only the first write is kept.
    fn resolve(&self, result: Result<T, FutureError>) {
        let wakers = {
            let mut slot = self.slot.lock();
            if slot.result.is_some() {
                return;
            }
            slot.result = Some(result);
            std::mem::take(&mut slot.wakers)
        };
        self.resolved.notify_all();
        for waker in wakers {
            waker.wake();
        }
    }
}

/// Result of a computation running on its own thread.
///
/// The producer starts immediately and writes its result exactly once:
/// either a value or a [`FutureError`]. The result stays in the cell, so
/// every wait (and every clone of the future) observes the same outcome.
///
/// # Example
///
/// ```rust
/// use catena::Future;
/// use std::time::Duration;
///
/// let future = Future::spawn(|| {
///     std::thread::sleep(Duration::from_millis(10));
///     Ok::<_, std::io::Error>(42)
/// });
///
/// assert_eq!(future.wait().unwrap(), 42);
/// assert_eq!(future.wait().unwrap(), 42); // Result is cached
/// ```
pub struct Future<T> {
    cell: Arc<Cell<T>>,
}

impl<T> Future<T> {
    /// A future that is already resolved with `value`. No thread is started.
    pub fn ready(value: T) -> Self {
        let cell = Cell::pending();
        cell.resolve(Ok(value));
        Self {
            cell: Arc::new(cell),
        }
    }

    /// A future that has already failed with `error`. No thread is started.
    pub fn failed<E: Into<BoxError>>(error: E) -> Self {
        let cell = Cell::pending();
        cell.resolve(Err(FutureError::Failed(Arc::from(error.into()))));
        Self {
            cell: Arc::new(cell),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.cell.slot.lock().result.is_some()
    }
}

impl<T: Send + 'static> Future<T> {
    /// Run `producer` on a new thread and return the future of its result.
    ///
    /// A panicking producer resolves the future with
    /// [`FutureError::Panicked`].
    pub fn spawn<F, E>(producer: F) -> Self
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
        E: Into<BoxError>,
    {
        Self::spawn_resolving(move || {
            producer().map_err(|error| FutureError::Failed(Arc::from(error.into())))
        })
    }

    fn spawn_resolving<F>(producer: F) -> Self
    where
        F: FnOnce() -> Result<T, FutureError> + Send + 'static,
    {
        let future = Self {
            cell: Arc::new(Cell::pending()),
        };
        let cell = Arc::clone(&future.cell);

        let spawned = thread::Builder::new()
            .name("catena-future".to_string())
            .spawn(move || {
                let result = match panic::catch_unwind(AssertUnwindSafe(producer)) {
                    Ok(result) => result,
                    Err(payload) => Err(FutureError::Panicked(panic_message(&*payload))),
                };
                debug!(ok = result.is_ok(), "future resolved");
                cell.resolve(result);
            });

        if let Err(error) = spawned {
            debug!(error = %error, "failed to spawn future producer");
            future.cell.resolve(Err(FutureError::Spawn(error.to_string())));
        }
        future
    }
}

impl<T: Clone> Future<T> {
    /// Block until the future resolves and return its result.
    ///
    /// May be called any number of times; every call returns the same result.
    pub fn wait(&self) -> Result<T, FutureError> {
        let mut slot = self.cell.slot.lock();
        loop {
            if let Some(result) = &slot.result {
                return result.clone();
            }
            self.cell.resolved.wait(&mut slot);
        }
    }

    /// Like [`wait`](Future::wait), but give up after `timeout` with
    /// [`FutureError::TimedOut`]. The producer keeps running.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<T, FutureError> {
        let mut slot = self.cell.slot.lock();
        if slot.result.is_none() {
            // Resolution notifies under the lock, so it cannot slip past this wait.
            self.cell.resolved.wait_for(&mut slot, timeout);
        }
        slot.result.clone().unwrap_or(Err(FutureError::TimedOut(timeout)))
    }

    /// The result if the future has resolved, without blocking.
    pub fn try_get(&self) -> Option<Result<T, FutureError>> {
        self.cell.slot.lock().result.clone()
    }

    /// An async handle resolving to the same result.
    pub fn resolved(&self) -> Resolved<T> {
        Resolved {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T: Clone + Send + 'static> Future<T> {
    /// Derive a future applying `f` to this future's value.
    ///
    /// Errors propagate without calling `f`.
    pub fn map<U, F>(&self, f: F) -> Future<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        let upstream = self.clone();
        Future::spawn_resolving(move || upstream.wait().map(f))
    }

    /// Derive a future running the fallible `f` on this future's value.
    ///
    /// ```rust
    /// use catena::Future;
    ///
    /// let parsed = Future::ready("21".to_string())
    ///     .and_then(|text| text.parse::<i32>())
    ///     .map(|n| n * 2);
    ///
    /// assert_eq!(parsed.wait().unwrap(), 42);
    /// ```
    pub fn and_then<U, F, E>(&self, f: F) -> Future<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Result<U, E> + Send + 'static,
        E: Into<BoxError>,
    {
        let upstream = self.clone();
        Future::spawn_resolving(move || {
            let value = upstream.wait()?;
            f(value).map_err(|error| FutureError::Failed(Arc::from(error.into())))
        })
    }
}

impl<T> Clone for Future<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T> fmt::Debug for Future<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Future")
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

impl<T: Clone> IntoFuture for Future<T> {
    type Output = Result<T, FutureError>;
    type IntoFuture = Resolved<T>;

    fn into_future(self) -> Self::IntoFuture {
        self.resolved()
    }
}

/// Async view of a [`Future`]'s result cell.
pub struct Resolved<T> {
    cell: Arc<Cell<T>>,
}

impl<T: Clone> StdFuture for Resolved<T> {
    type Output = Result<T, FutureError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut slot = self.cell.slot.lock();
        if let Some(result) = &slot.result {
            return Poll::Ready(result.clone());
        }
        if !slot.wakers.iter().any(|waker| waker.will_wake(cx.waker())) {
            slot.wakers.push(cx.waker().clone());
        }
        Poll::Pending
    }
}

impl<T> fmt::Debug for Resolved<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolved").finish_non_exhaustive()
    }
}
