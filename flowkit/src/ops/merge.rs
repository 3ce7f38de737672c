// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `merge`: interleave two flows as their elements become available.
//!
//! Both sides run concurrently into their own channel; a `tokio::select!`
//! pulls from whichever has a value ready. Once one side reports `Done`, the
//! other is drained in full before completing.

use flowkit_channel::Closed;
use flowkit_core::EmitAborted;

use crate::flow::{Emit, Flow};
use crate::ops::support;

impl<T: Send + 'static> Flow<T> {
    /// Merge `self` and `other` into a single flow, emitting elements as
    /// either side produces them.
    pub fn merge(self, other: Flow<T>) -> Flow<T> {
        let run_a = self.into_run();
        let run_b = other.into_run();
        Flow::new(move |scope, emit: Emit<T>| {
            Box::pin(async move {
                let buffer_capacity = scope.buffer_capacity();
                let (tx_a, mut rx_a) = flowkit_channel::channel::<T>(buffer_capacity);
                let (tx_b, mut rx_b) = flowkit_channel::channel::<T>(buffer_capacity);

                support::spawn_into_channel(&scope, run_a, tx_a);
                support::spawn_into_channel(&scope, run_b, tx_b);

                let mut a_open = true;
                let mut b_open = true;
                loop {
                    match (a_open, b_open) {
                        (false, false) => return Ok(()),
                        (true, false) => return support::drain_into(&mut rx_a, &emit).await,
                        (false, true) => return support::drain_into(&mut rx_b, &emit).await,
                        (true, true) => {
                            tokio::select! {
                                r = rx_a.receive() => match r {
                                    Ok(v) => emit.emit(v).await?,
                                    Err(Closed::Done) => a_open = false,
                                    Err(Closed::Error(e)) => return Err(EmitAborted::Error(e)),
                                },
                                r = rx_b.receive() => match r {
                                    Ok(v) => emit.emit(v).await?,
                                    Err(Closed::Done) => b_open = false,
                                    Err(Closed::Error(e)) => return Err(EmitAborted::Error(e)),
                                },
                            }
                        }
                    }
                }
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::tests_support::collect_into_vec;
    use std::collections::HashSet;

    fn flow_of(values: Vec<i32>) -> Flow<i32> {
        Flow::new(move |_scope, emit: Emit<i32>| {
            Box::pin(async move {
                for v in values {
                    emit.emit(v).await?;
                }
                Ok(())
            })
        })
    }

    #[tokio::test]
    async fn merge_emits_every_element_from_both_sides() {
        let seen = collect_into_vec(flow_of(vec![1, 2, 3]).merge(flow_of(vec![4, 5]))).await;
        let seen: HashSet<i32> = seen.into_iter().collect();
        assert_eq!(seen, [1, 2, 3, 4, 5].into_iter().collect());
    }

    #[tokio::test]
    async fn merge_drains_the_slower_side_after_the_faster_one_finishes() {
        let seen = collect_into_vec(flow_of(vec![]).merge(flow_of(vec![1, 2, 3]))).await;
        assert_eq!(seen.len(), 3);
    }
}
