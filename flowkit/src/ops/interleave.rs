// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `interleave`: alternate fixed-size segments from two flows.

use flowkit_channel::{Closed, Receiver};
use flowkit_core::EmitAborted;

use crate::flow::{Emit, Flow};
use crate::ops::support;
use crate::FlowError;

/// Pull up to `n` elements from `rx`, emitting each. Returns `Ok(true)` if
/// `rx` reported `Done` partway through the segment.
async fn take_segment<T>(
    rx: &mut Receiver<T>,
    emit: &Emit<T>,
    n: usize,
) -> Result<bool, EmitAborted> {
    for _ in 0..n {
        match rx.receive().await {
            Ok(v) => emit.emit(v).await?,
            Err(Closed::Done) => return Ok(true),
            Err(Closed::Error(e)) => return Err(EmitAborted::Error(e)),
        }
    }
    Ok(false)
}

impl<T: Send + 'static> Flow<T> {
    /// Alternate `segment_size`-element chunks from `self` and `other`. Once
    /// one side closes, if `eager_complete` is set the whole flow completes
    /// immediately; otherwise the remaining side keeps being drained in
    /// `segment_size` chunks until it, too, closes.
    pub fn interleave(
        self,
        other: Flow<T>,
        segment_size: usize,
        eager_complete: bool,
    ) -> crate::Result<Flow<T>> {
        if segment_size == 0 {
            return Err(FlowError::precondition(
                "interleave: segment_size must be > 0",
            ));
        }
        let run_a = self.into_run();
        let run_b = other.into_run();
        Ok(Flow::new(move |scope, emit: Emit<T>| {
            Box::pin(async move {
                let buffer_capacity = scope.buffer_capacity();
                let (tx_a, mut rx_a) = flowkit_channel::channel::<T>(buffer_capacity);
                let (tx_b, mut rx_b) = flowkit_channel::channel::<T>(buffer_capacity);
                support::spawn_into_channel(&scope, run_a, tx_a);
                support::spawn_into_channel(&scope, run_b, tx_b);

                let mut a_open = true;
                let mut b_open = true;
                let mut turn_a = true;

                loop {
                    if !a_open && !b_open {
                        return Ok(());
                    }
                    if turn_a && !a_open {
                        turn_a = false;
                    } else if !turn_a && !b_open {
                        turn_a = true;
                    }

                    let closed_mid_segment = if turn_a {
                        take_segment(&mut rx_a, &emit, segment_size).await?
                    } else {
                        take_segment(&mut rx_b, &emit, segment_size).await?
                    };

                    if closed_mid_segment {
                        if turn_a {
                            a_open = false;
                        } else {
                            b_open = false;
                        }
                        if eager_complete || (!a_open && !b_open) {
                            return Ok(());
                        }
                    }
                    turn_a = !turn_a;
                }
            })
        }))
    }
}
