// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `flatten`: run a dynamically growing pool of child flows concurrently.
//!
//! The outer flow's elements are themselves `Flow<T>`s. Each one is
//! materialized into its own channel as soon as it arrives and its receiver
//! is folded into a `futures::stream::SelectAll`; the outer channel and the
//! pool are polled concurrently until both are exhausted.

use flowkit_channel::Closed;
use flowkit_core::EmitAborted;
use futures::stream::{SelectAll, StreamExt};

use crate::flow::{Emit, Flow};
use crate::ops::support;

impl<T: Send + 'static> Flow<Flow<T>> {
    /// Run every child flow this flow produces, merging their elements as
    /// they arrive.
    pub fn flatten(self) -> Flow<T> {
        let run = self.into_run();
        Flow::new(move |scope, emit: Emit<T>| {
            Box::pin(async move {
                let buffer_capacity = scope.buffer_capacity();
                let (outer_tx, mut outer_rx) =
                    flowkit_channel::channel::<Flow<T>>(buffer_capacity);
                support::spawn_into_channel(&scope, run, outer_tx);

                let mut children: SelectAll<support::BoxStream<T>> = SelectAll::new();
                let mut outer_done = false;

                loop {
                    if outer_done && children.is_empty() {
                        return Ok(());
                    }

                    tokio::select! {
                        outer_item = outer_rx.receive(), if !outer_done => {
                            match outer_item {
                                Ok(child) => {
                                    let (child_tx, child_rx) =
                                        flowkit_channel::channel::<T>(buffer_capacity);
                                    support::spawn_into_channel(&scope, child.into_run(), child_tx);
                                    children.push(support::receiver_stream(child_rx));
                                }
                                Err(Closed::Done) => outer_done = true,
                                Err(Closed::Error(e)) => return Err(EmitAborted::Error(e)),
                            }
                        }
                        child_item = children.next(), if !children.is_empty() => {
                            match child_item {
                                Some(Ok(v)) => emit.emit(v).await?,
                                Some(Err(e)) => return Err(EmitAborted::Error(e)),
                                None => {}
                            }
                        }
                    }
                }
            })
        })
    }
}
