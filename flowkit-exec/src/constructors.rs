// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Minimal producers the combinator algebra is agnostic to.

use std::future::Future;

use flowkit::{BoxFuture, Emit, Flow};
use flowkit_channel::{Closed, Receiver};
use flowkit_core::{EmitAborted, Scope};
use flowkit_error::FlowError;

/// A `Flow` that emits every item of `items`, in order, then completes.
pub fn from_iterable<T, I>(items: I) -> Flow<T>
where
    T: Send + 'static,
    I: IntoIterator<Item = T> + Send + 'static,
    I::IntoIter: Send,
{
    Flow::new(move |_scope, emit: Emit<T>| {
        Box::pin(async move {
            for v in items {
                emit.emit(v).await?;
            }
            Ok(())
        })
    })
}

/// A `Flow` that drains `receiver` and completes per its terminal state
/// (`Closed::Done` is a clean finish; `Closed::Error` fails the flow).
pub fn from_channel<T>(mut receiver: Receiver<T>) -> Flow<T>
where
    T: Send + 'static,
{
    Flow::new(move |_scope, emit: Emit<T>| {
        Box::pin(async move {
            loop {
                match receiver.receive().await {
                    Ok(v) => emit.emit(v).await?,
                    Err(Closed::Done) => return Ok(()),
                    Err(Closed::Error(e)) => return Err(EmitAborted::Error(e)),
                }
            }
        })
    })
}

/// Build a `Flow` whose `run` body is `body` verbatim — the thin wrapper
/// every operator in `flowkit::ops` is itself built on top of, exposed here
/// so callers don't need to box the future by hand.
pub fn using_emit_inline<T, F, Fut>(body: F) -> Flow<T>
where
    T: Send + 'static,
    F: FnOnce(Scope, Emit<T>) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), EmitAborted>> + Send + 'static,
{
    Flow::new(move |scope, emit| -> BoxFuture<Result<(), EmitAborted>> {
        Box::pin(body(scope, emit))
    })
}

/// Run every flow in `flows` to completion, in order, into the same
/// downstream. An empty list is a `Flow` that completes immediately.
pub fn concat<T>(flows: Vec<Flow<T>>) -> Flow<T>
where
    T: Send + 'static,
{
    let mut iter = flows.into_iter();
    let Some(first) = iter.next() else {
        return Flow::new(|_scope, _emit: Emit<T>| Box::pin(async move { Ok(()) }));
    };
    iter.fold(first, |acc, next| acc.concat(next))
}

/// Interleave every flow in `flows` pairwise via [`Flow::interleave`],
/// left to right. Rejects `segment_size == 0`; an empty or single-element
/// list degenerates to an empty flow or that one flow, respectively.
pub fn interleave_all<T>(
    flows: Vec<Flow<T>>,
    segment_size: usize,
    eager_complete: bool,
) -> flowkit::Result<Flow<T>>
where
    T: Send + 'static,
{
    if segment_size == 0 {
        return Err(FlowError::precondition(
            "interleave_all: segment_size must be > 0",
        ));
    }
    let mut iter = flows.into_iter();
    let Some(first) = iter.next() else {
        return Ok(Flow::new(|_scope, _emit: Emit<T>| {
            Box::pin(async move { Ok(()) })
        }));
    };
    iter.try_fold(first, |acc, next| acc.interleave(next, segment_size, eager_complete))
}
