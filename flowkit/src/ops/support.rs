// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Shared plumbing for the operators that materialize an upstream `Flow`
//! into a [`flowkit_channel`] channel (`merge`, `flatten`, `interleave`,
//! `zip`, `async_boundary`, `grouped_within`, ...).

use std::pin::Pin;

use flowkit_channel::{Closed, Receiver, Sender};
use flowkit_core::{EmitAborted, Scope};
use flowkit_error::FlowError;
use futures::Stream;

use crate::flow::{BoxFuture, Emit};
use crate::telemetry::{flow_debug, flow_trace};

/// A boxed run body, as returned by [`crate::Flow::into_run`].
pub(crate) type RunBody<T> = Box<dyn FnOnce(Scope, Emit<T>) -> BoxFuture<Result<(), EmitAborted>> + Send>;

/// Forward one value to a channel, translating `Closed` into `EmitAborted`.
pub(crate) async fn forward_to_sender<T>(
    sender: &Sender<T>,
    value: T,
) -> Result<(), EmitAborted> {
    sender.send(value).await.map_err(|closed| {
        EmitAborted::Error(match closed {
            Closed::Error(e) => e,
            Closed::Done => FlowError::precondition("internal channel closed early"),
        })
    })
}

/// Close a channel the way an upstream run's outcome dictates: a clean
/// completion (including a `take`'s `TakeComplete`) marks it `Done`; a real
/// failure marks it `Errored`.
pub(crate) fn close_with_outcome<T>(sender: &Sender<T>, outcome: Result<(), EmitAborted>) {
    match outcome {
        Ok(()) | Err(EmitAborted::TakeComplete(_)) => {
            flow_trace!("channel closing as done");
            sender.done();
        }
        Err(EmitAborted::Error(e)) => {
            flow_debug!(error = %e, "channel closing as errored");
            sender.error(e);
        }
    }
}

/// Spawn `run` as a task that drains into `sender`, closing it on exit.
pub(crate) fn spawn_into_channel<T: Send + 'static>(
    scope: &Scope,
    run: RunBody<T>,
    sender: Sender<T>,
) {
    let task_scope = scope.clone();
    scope.fork(async move {
        let forward_sender = sender.clone();
        let inner = Emit::new(move |v: T| {
            let sender = forward_sender.clone();
            async move { forward_to_sender(&sender, v).await }
        });
        let outcome = run(task_scope, inner).await;
        close_with_outcome(&sender, outcome);
    });
}

/// Drain every remaining value from `receiver` into `emit`, returning the
/// terminal outcome once the channel closes.
pub(crate) async fn drain_into<T>(
    receiver: &mut Receiver<T>,
    emit: &Emit<T>,
) -> Result<(), EmitAborted> {
    loop {
        match receiver.receive().await {
            Ok(v) => emit.emit(v).await?,
            Err(Closed::Done) => {
                flow_trace!("channel observed as done");
                return Ok(());
            }
            Err(Closed::Error(e)) => {
                flow_debug!(error = %e, "channel observed as errored");
                return Err(EmitAborted::Error(e));
            }
        }
    }
}

/// The common item type of a materialized channel: either a value or the
/// single terminal error a channel surfaces before ending.
pub(crate) type ChannelItem<T> = Result<T, FlowError>;

pub(crate) type BoxStream<T> = Pin<Box<dyn Stream<Item = ChannelItem<T>> + Send>>;

/// Adapt a [`Receiver`] into a `futures::Stream`, for use with
/// `futures::stream::SelectAll` (see `flatten`).
pub(crate) fn receiver_stream<T: Send + 'static>(receiver: Receiver<T>) -> BoxStream<T> {
    Box::pin(futures::stream::unfold(
        Some(receiver),
        |state| async move {
            let mut receiver = state?;
            match receiver.receive().await {
                Ok(v) => Some((Ok(v), Some(receiver))),
                Err(Closed::Done) => None,
                Err(Closed::Error(e)) => Some((Err(e), None)),
            }
        },
    ))
}
