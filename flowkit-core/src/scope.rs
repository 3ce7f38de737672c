// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Structured-concurrency scope and fork handles.
//!
//! A [`Scope`] owns the child tasks ("forks") spawned within it. A
//! *supervised* scope waits for every `fork_user` task to finish before its
//! constructor returns, and cancels the rest of the scope as soon as any one
//! of them fails. An *unsupervised* scope does none of that bookkeeping —
//! its tasks must route their own failures through a channel's error state,
//! which is exactly what `mapPar`'s producer/collector/main-emitter trio does.
//!
//! Built on [`tokio::task::JoinHandle`] directly rather than `JoinSet`: each
//! `fork_user` task reports its own failure back to the owning `Scope` as it
//! completes, so the scope only has to `.await` the handles it already holds
//! rather than race an initially-empty join queue.

use std::future::Future;
use std::sync::{Arc, Mutex as StdMutex};

use flowkit_error::FlowError;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::CancellationToken;

/// Default `BufferCapacity` consulted by an operator that creates an
/// internal channel and isn't told otherwise.
pub const DEFAULT_BUFFER_CAPACITY: usize = 16;

/// A structured-concurrency region.
///
/// Cheaply `Clone`-able; every clone refers to the same underlying region,
/// so forking from a cloned handle still contributes to the same supervision
/// bookkeeping and shares the same cancellation token.
#[derive(Clone)]
pub struct Scope {
    inner: Arc<ScopeInner>,
}

struct ScopeInner {
    cancellation: CancellationToken,
    buffer_capacity: usize,
    supervised: bool,
    user_tasks: StdMutex<Vec<JoinHandle<()>>>,
    first_error: StdMutex<Option<FlowError>>,
}

/// A handle to a task spawned with [`Scope::fork`] or [`Scope::fork_cancellable`].
pub struct Fork<T> {
    handle: JoinHandle<T>,
}

impl<T> Fork<T> {
    /// Await the task's result, re-raising a panic or cancellation as a
    /// [`FlowError`].
    pub async fn join(self) -> Result<T, FlowError> {
        self.handle.await.map_err(FlowError::user)
    }

    /// Best-effort immediate interruption of the task's current blocking
    /// operation.
    pub fn cancel_now(&self) {
        self.handle.abort();
    }

    /// `true` once the task has finished (successfully, with a panic, or via
    /// `cancel_now`).
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Scope {
    /// Run `body` in a fresh supervised scope with the default buffer
    /// capacity (16).
    pub async fn supervised<F, Fut, R>(body: F) -> Result<R, FlowError>
    where
        F: FnOnce(Scope) -> Fut,
        Fut: Future<Output = Result<R, FlowError>>,
    {
        Self::supervised_with_capacity(DEFAULT_BUFFER_CAPACITY, body).await
    }

    /// As [`Scope::supervised`], with an explicit `BufferCapacity`.
    pub async fn supervised_with_capacity<F, Fut, R>(
        buffer_capacity: usize,
        body: F,
    ) -> Result<R, FlowError>
    where
        F: FnOnce(Scope) -> Fut,
        Fut: Future<Output = Result<R, FlowError>>,
    {
        let scope = Self::new(true, buffer_capacity);
        let body_result = body(scope.clone()).await;

        // Signal cancellation regardless of outcome so any cooperative
        // (non-user) forks still running wind down promptly.
        scope.inner.cancellation.cancel();

        let join_result = scope.join_user_tasks().await;

        match (body_result, join_result) {
            (Err(e), _) => Err(e),
            (Ok(_), Err(e)) => Err(e),
            (Ok(v), Ok(())) => Ok(v),
        }
    }

    /// Run `body` in a fresh unsupervised scope with the default buffer
    /// capacity. Children spawned with `fork`/`fork_cancellable` are not
    /// awaited automatically; their failures must be routed explicitly
    /// (typically through a channel's error state).
    pub async fn unsupervised<F, Fut, R>(body: F) -> R
    where
        F: FnOnce(Scope) -> Fut,
        Fut: Future<Output = R>,
    {
        Self::unsupervised_with_capacity(DEFAULT_BUFFER_CAPACITY, body).await
    }

    /// As [`Scope::unsupervised`], with an explicit `BufferCapacity`.
    pub async fn unsupervised_with_capacity<F, Fut, R>(buffer_capacity: usize, body: F) -> R
    where
        F: FnOnce(Scope) -> Fut,
        Fut: Future<Output = R>,
    {
        let scope = Self::new(false, buffer_capacity);
        let result = body(scope.clone()).await;
        scope.inner.cancellation.cancel();
        result
    }

    fn new(supervised: bool, buffer_capacity: usize) -> Self {
        Self {
            inner: Arc::new(ScopeInner {
                cancellation: CancellationToken::new(),
                buffer_capacity,
                supervised,
                user_tasks: StdMutex::new(Vec::new()),
                first_error: StdMutex::new(None),
            }),
        }
    }

    /// Return a scope identical to this one but with a different
    /// `BufferCapacity`, sharing the same cancellation token (so cancelling
    /// either cancels both) but starting with fresh fork bookkeeping — meant
    /// to be passed straight into a nested `supervised`/`unsupervised` call.
    #[must_use]
    pub fn with_buffer_capacity(&self, buffer_capacity: usize) -> Scope {
        Scope {
            inner: Arc::new(ScopeInner {
                cancellation: self.inner.cancellation.clone(),
                buffer_capacity,
                supervised: self.inner.supervised,
                user_tasks: StdMutex::new(Vec::new()),
                first_error: StdMutex::new(None),
            }),
        }
    }

    /// The `BufferCapacity` in effect for this scope.
    pub fn buffer_capacity(&self) -> usize {
        self.inner.buffer_capacity
    }

    /// The scope's cancellation token. Cooperative tasks should `select!`
    /// against `cancellation().cancelled()` at their suspension points.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.inner.cancellation
    }

    /// Spawn a child task whose completion the scope does not wait for
    /// automatically. The caller owns the returned [`Fork`] and is
    /// responsible for joining or cancelling it.
    pub fn fork<T, Fut>(&self, task: Fut) -> Fork<T>
    where
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        Fork {
            handle: tokio::spawn(task),
        }
    }

    /// Spawn a child task that additionally supports preemptive
    /// `cancel_now()` — identical to [`Scope::fork`] under tokio, where
    /// every spawned task is already abortable; kept as a distinct name to
    /// mirror the source algebra's `forkCancellable`.
    pub fn fork_cancellable<T, Fut>(&self, task: Fut) -> Fork<T>
    where
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.fork(task)
    }

    /// Spawn a child task that the scope waits for at exit (if supervised).
    /// If `task` resolves to `Err`, the scope records it as the first error
    /// (if none is set yet) and cancels the scope's token so siblings can
    /// unwind.
    pub fn fork_user<Fut>(&self, task: Fut)
    where
        Fut: Future<Output = Result<(), FlowError>> + Send + 'static,
    {
        let scope = self.clone();
        let handle = tokio::spawn(async move {
            if let Err(error) = task.await {
                scope.record_first_error_and_cancel(error);
            }
        });
        if self.inner.supervised {
            self.inner.user_tasks.lock().unwrap().push(handle);
        }
    }

    /// Immediately cancel the scope: signals the cancellation token and
    /// aborts every `fork_user` task registered so far. Plain `fork`/
    /// `fork_cancellable` handles are left to their owners.
    pub fn cancel_now(&self) {
        self.inner.cancellation.cancel();
        for handle in self.inner.user_tasks.lock().unwrap().iter() {
            handle.abort();
        }
    }

    fn record_first_error_and_cancel(&self, error: FlowError) {
        let mut slot = self.inner.first_error.lock().unwrap();
        if slot.is_none() {
            debug!(error = %error, "scope: first child failure, cancelling siblings");
            *slot = Some(error);
        } else {
            debug!(error = %error, "scope: suppressed child failure (not first)");
        }
        drop(slot);
        self.cancel_now();
    }

    async fn join_user_tasks(&self) -> Result<(), FlowError> {
        let handles = std::mem::take(&mut *self.inner.user_tasks.lock().unwrap());
        for handle in handles {
            // Errors from the task body were already routed through
            // `record_first_error_and_cancel`; a panic surfaces here instead.
            if let Err(join_err) = handle.await {
                if !join_err.is_cancelled() {
                    self.record_first_error_and_cancel(FlowError::user(join_err));
                }
            }
        }
        match self.inner.first_error.lock().unwrap().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn supervised_waits_for_user_tasks() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();
        let result = Scope::supervised(move |scope| {
            let c = c.clone();
            async move {
                scope.fork_user(async move {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    c.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                });
                Ok(())
            }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn supervised_propagates_first_user_task_error() {
        #[derive(Debug, thiserror::Error)]
        #[error("boom")]
        struct Boom;

        let result: Result<(), FlowError> = Scope::supervised(|scope| async move {
            scope.fork_user(async move { Err(FlowError::user(Boom)) });
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok(())
        })
        .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn cancel_now_cancels_token() {
        Scope::supervised(|scope| async move {
            assert!(!scope.cancellation().is_cancelled());
            scope.cancel_now();
            assert!(scope.cancellation().is_cancelled());
            Ok(())
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn unsupervised_does_not_await_forks() {
        let started = std::time::Instant::now();
        Scope::unsupervised(|scope| async move {
            scope.fork_user(async move {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            });
        })
        .await;
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn fork_returns_joinable_handle() {
        Scope::supervised(|scope| async move {
            let fork = scope.fork(async move { 42 });
            let value = fork.join().await.unwrap();
            assert_eq!(value, 42);
            Ok(())
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn with_buffer_capacity_overrides_value_but_shares_cancellation() {
        Scope::supervised(|scope| async move {
            let child = scope.with_buffer_capacity(64);
            assert_eq!(child.buffer_capacity(), 64);
            child.cancel_now();
            assert!(scope.cancellation().is_cancelled());
            Ok(())
        })
        .await
        .unwrap();
    }
}
