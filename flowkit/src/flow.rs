// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! [`Flow`] and [`Emit`]: the push-based core of the combinator algebra.
//!
//! A `Flow<T>` is a recipe for producing a sequence of `T`s into a downstream
//! [`Emit<T>`] sink once driven by [`Flow::run`]. Unlike `futures::Stream`,
//! nothing happens until `run` is called — there is no `poll_next` to drive
//! from the outside, and a `Flow` has no representation of "the next value"
//! independent of actually producing it. Composition works by wrapping: every
//! operator takes ownership of an upstream `Flow<T>` and returns a new
//! `Flow<U>` whose `run` body builds an adapted `Emit<T>` (one that
//! transforms, filters, buffers, or fans out each value before handing it to
//! the real downstream sink) and feeds that to the upstream's own `run`.
//!
//! A `Flow` runs exactly once: `run` consumes `self`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use flowkit_core::{EmitAborted, Scope};
use flowkit_error::FlowError;

/// A boxed, `'static` future — the common currency of this crate's
/// type-erased combinator chain.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

pub(crate) type RunFuture = BoxFuture<Result<(), EmitAborted>>;
type EmitFuture = BoxFuture<Result<(), EmitAborted>>;

/// The downstream sink a [`Flow`] pushes values into.
///
/// Cheaply `Clone`-able (an `Arc` underneath); operators fan values out to
/// more than one branch (`also_to`) or hand a clone into several concurrent
/// worker tasks (`map_par`) without needing the original back.
pub struct Emit<T> {
    f: Arc<dyn Fn(T) -> EmitFuture + Send + Sync>,
}

impl<T> Clone for Emit<T> {
    fn clone(&self) -> Self {
        Self { f: self.f.clone() }
    }
}

impl<T: 'static> Emit<T> {
    /// Build an `Emit` from a plain async closure.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), EmitAborted>> + Send + 'static,
    {
        Self {
            f: Arc::new(move |value| Box::pin(f(value))),
        }
    }

    /// Push one value downstream, suspending for as long as the sink applies
    /// backpressure.
    pub async fn emit(&self, value: T) -> Result<(), EmitAborted> {
        (self.f)(value).await
    }
}

/// A recipe for producing a sequence of `T`s, to be driven by [`Flow::run`].
pub struct Flow<T> {
    run: Box<dyn FnOnce(Scope, Emit<T>) -> RunFuture + Send>,
}

impl<T: 'static> Flow<T> {
    /// Build a `Flow` directly from its `run` body. Operators are thin
    /// wrappers around this constructor; see [`crate::ops`] for the
    /// combinator surface built on top of it.
    pub fn new<F>(run: F) -> Self
    where
        F: FnOnce(Scope, Emit<T>) -> RunFuture + Send + 'static,
    {
        Self { run: Box::new(run) }
    }

    pub(crate) fn into_run(self) -> Box<dyn FnOnce(Scope, Emit<T>) -> RunFuture + Send> {
        self.run
    }

    /// Drive this flow to completion, in a freshly created supervised
    /// [`Scope`], pushing every produced value into `emit`.
    ///
    /// A `take`/`take_while` completing early (its own [`EmitAborted::TakeComplete`])
    /// is a successful run, not a failure; only [`EmitAborted::Error`]
    /// surfaces as `Err`.
    pub async fn run(self, emit: Emit<T>) -> Result<(), FlowError> {
        Scope::supervised(move |scope| async move {
            match (self.run)(scope, emit).await {
                Ok(()) => Ok(()),
                Err(EmitAborted::TakeComplete(_)) => Ok(()),
                Err(EmitAborted::Error(e)) => Err(e),
            }
        })
        .await
    }

    /// As [`Flow::run`], but inside a scope whose internal operators (those
    /// that create their own buffered channels) default to `buffer_capacity`
    /// rather than [`flowkit_core::DEFAULT_BUFFER_CAPACITY`].
    pub async fn run_with_buffer_capacity(
        self,
        buffer_capacity: usize,
        emit: Emit<T>,
    ) -> Result<(), FlowError> {
        Scope::supervised_with_capacity(buffer_capacity, move |scope| async move {
            match (self.run)(scope, emit).await {
                Ok(()) => Ok(()),
                Err(EmitAborted::TakeComplete(_)) => Ok(()),
                Err(EmitAborted::Error(e)) => Err(e),
            }
        })
        .await
    }
}
