// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `zip`, `zip_all`: pair elements positionally from two flows running
//! concurrently.

use flowkit_channel::Closed;
use flowkit_core::EmitAborted;

use crate::flow::{Emit, Flow};
use crate::ops::support;

impl<T: Send + 'static> Flow<T> {
    /// Pair up elements positionally; completes as soon as either side runs
    /// out.
    pub fn zip<O: Send + 'static>(self, other: Flow<O>) -> Flow<(T, O)> {
        let run_a = self.into_run();
        let run_b = other.into_run();
        Flow::new(move |scope, emit: Emit<(T, O)>| {
            Box::pin(async move {
                let buffer_capacity = scope.buffer_capacity();
                let (tx_a, mut rx_a) = flowkit_channel::channel::<T>(buffer_capacity);
                let (tx_b, mut rx_b) = flowkit_channel::channel::<O>(buffer_capacity);
                support::spawn_into_channel(&scope, run_a, tx_a);
                support::spawn_into_channel(&scope, run_b, tx_b);

                loop {
                    let left = match rx_a.receive().await {
                        Ok(v) => v,
                        Err(Closed::Done) => return Ok(()),
                        Err(Closed::Error(e)) => return Err(EmitAborted::Error(e)),
                    };
                    let right = match rx_b.receive().await {
                        Ok(v) => v,
                        Err(Closed::Done) => return Ok(()),
                        Err(Closed::Error(e)) => return Err(EmitAborted::Error(e)),
                    };
                    emit.emit((left, right)).await?;
                }
            })
        })
    }

    /// As [`Flow::zip`], but continues until both sides are exhausted,
    /// padding the side that ran out first with a default value.
    pub fn zip_all<O>(self, other: Flow<O>, left_default: T, right_default: O) -> Flow<(T, O)>
    where
        O: Send + 'static,
        T: Clone,
        O: Clone,
    {
        let run_a = self.into_run();
        let run_b = other.into_run();
        Flow::new(move |scope, emit: Emit<(T, O)>| {
            Box::pin(async move {
                let buffer_capacity = scope.buffer_capacity();
                let (tx_a, mut rx_a) = flowkit_channel::channel::<T>(buffer_capacity);
                let (tx_b, mut rx_b) = flowkit_channel::channel::<O>(buffer_capacity);
                support::spawn_into_channel(&scope, run_a, tx_a);
                support::spawn_into_channel(&scope, run_b, tx_b);

                let mut a_done = false;
                let mut b_done = false;
                loop {
                    if a_done && b_done {
                        return Ok(());
                    }
                    let left = if a_done {
                        None
                    } else {
                        match rx_a.receive().await {
                            Ok(v) => Some(v),
                            Err(Closed::Done) => {
                                a_done = true;
                                None
                            }
                            Err(Closed::Error(e)) => return Err(EmitAborted::Error(e)),
                        }
                    };
                    let right = if b_done {
                        None
                    } else {
                        match rx_b.receive().await {
                            Ok(v) => Some(v),
                            Err(Closed::Done) => {
                                b_done = true;
                                None
                            }
                            Err(Closed::Error(e)) => return Err(EmitAborted::Error(e)),
                        }
                    };
                    if left.is_none() && right.is_none() {
                        continue;
                    }
                    let left = left.unwrap_or_else(|| left_default.clone());
                    let right = right.unwrap_or_else(|| right_default.clone());
                    emit.emit((left, right)).await?;
                }
            })
        })
    }
}
