// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `grouped_within`, `grouped_weighted_within`: count/weight-bounded
//! windowing with a deadline.
//!
//! The timer runs as a forked task that sleeps for `duration` and then wakes
//! the main loop through a one-slot sentinel channel. Three states thread
//! through the loop: armed (a timer fork is outstanding), just-fired (the
//! buffer was flushed and a fresh timer was armed), and suspended (the timer
//! fired on an empty buffer; no new timer is armed until the next element
//! arrives, so an idle upstream doesn't spin a timer forever). Every exit
//! path cancels the outstanding timer fork.

use std::sync::Arc;
use std::time::Duration;

use flowkit_channel::Closed;
use flowkit_core::{EmitAborted, Fork, Scope};

use crate::flow::{Emit, Flow};
use crate::ops::support;
use crate::telemetry::flow_trace;
use crate::FlowError;

fn spawn_timer(scope: &Scope, duration: Duration, sentinel: flowkit_channel::Sender<()>) -> Fork<()> {
    scope.fork(async move {
        tokio::time::sleep(duration).await;
        let _ = sentinel.send(()).await;
    })
}

impl<T: Send + 'static> Flow<T> {
    /// Batch elements into groups of up to `n`, flushing early if `duration`
    /// elapses since the last flush.
    pub fn grouped_within(self, n: usize, duration: Duration) -> crate::Result<Flow<Vec<T>>> {
        if n == 0 {
            return Err(FlowError::precondition("grouped_within: n must be > 0"));
        }
        self.grouped_weighted_within(n as u64, duration, |_: &T| Ok(1))
    }

    /// As [`Flow::grouped_within`], but weighted by `cost` rather than
    /// plain element count.
    pub fn grouped_weighted_within<F>(
        self,
        min_weight: u64,
        duration: Duration,
        cost: F,
    ) -> crate::Result<Flow<Vec<T>>>
    where
        F: Fn(&T) -> crate::Result<u64> + Send + Sync + 'static,
    {
        if min_weight == 0 {
            return Err(FlowError::precondition(
                "grouped_weighted_within: min_weight must be > 0",
            ));
        }
        if duration.is_zero() {
            return Err(FlowError::precondition(
                "grouped_weighted_within: duration must be > 0",
            ));
        }
        let run = self.into_run();
        let cost = Arc::new(cost);
        Ok(Flow::new(move |scope, emit: Emit<Vec<T>>| {
            Box::pin(async move {
                let buffer_capacity = scope.buffer_capacity();
                let (upstream_tx, mut upstream_rx) = flowkit_channel::channel::<T>(buffer_capacity);
                support::spawn_into_channel(&scope, run, upstream_tx);

                let (timer_tx, mut timer_rx) = flowkit_channel::channel::<()>(1);

                let mut buffer: Vec<T> = Vec::new();
                let mut accumulated: u64 = 0;
                let mut timer: Option<Fork<()>> = Some(spawn_timer(&scope, duration, timer_tx.clone()));

                loop {
                    tokio::select! {
                        upstream_item = upstream_rx.receive() => {
                            match upstream_item {
                                Ok(v) => {
                                    let weight = match cost(&v) {
                                        Ok(w) => w,
                                        Err(e) => {
                                            if let Some(fork) = timer.take() {
                                                fork.cancel_now();
                                            }
                                            return Err(EmitAborted::Error(e));
                                        }
                                    };
                                    let timer_was_suspended = timer.is_none();
                                    buffer.push(v);
                                    accumulated = accumulated.saturating_add(weight);
                                    if timer_was_suspended {
                                        // The timer fired on an empty buffer and was left
                                        // suspended; this element arrives into a fresh window
                                        // and is flushed on its own rather than accumulated.
                                        flow_trace!("flushing element arriving after an idle timeout");
                                        let batch = std::mem::take(&mut buffer);
                                        accumulated = 0;
                                        emit.emit(batch).await?;
                                        timer = Some(spawn_timer(&scope, duration, timer_tx.clone()));
                                    } else if accumulated >= min_weight {
                                        if let Some(fork) = timer.take() {
                                            fork.cancel_now();
                                        }
                                        flow_trace!("flushing on reaching min_weight");
                                        let batch = std::mem::take(&mut buffer);
                                        accumulated = 0;
                                        emit.emit(batch).await?;
                                        timer = Some(spawn_timer(&scope, duration, timer_tx.clone()));
                                    }
                                }
                                Err(Closed::Done) => {
                                    if let Some(fork) = timer.take() {
                                        fork.cancel_now();
                                    }
                                    if !buffer.is_empty() {
                                        emit.emit(std::mem::take(&mut buffer)).await?;
                                    }
                                    return Ok(());
                                }
                                Err(Closed::Error(e)) => {
                                    if let Some(fork) = timer.take() {
                                        fork.cancel_now();
                                    }
                                    return Err(EmitAborted::Error(e));
                                }
                            }
                        }
                        _ = timer_rx.receive(), if timer.is_some() => {
                            timer = None;
                            if !buffer.is_empty() {
                                flow_trace!("flushing on timer fire");
                                let batch = std::mem::take(&mut buffer);
                                accumulated = 0;
                                emit.emit(batch).await?;
                                timer = Some(spawn_timer(&scope, duration, timer_tx.clone()));
                            } else {
                                flow_trace!("timer fired on an empty buffer, suspending");
                            }
                        }
                    }
                }
            })
        }))
    }
}
