// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `async_boundary`: decouple upstream production from downstream
//! consumption with a buffered channel, so a slow downstream stage no longer
//! directly backpressures a fast upstream one beyond the buffer.
//!
//! Named `async_boundary` rather than the `async()` of the original algebra,
//! since `async` is a reserved word in Rust.

use crate::flow::{Emit, Flow};
use crate::ops::support;

impl<T: Send + 'static> Flow<T> {
    /// Insert a buffered async boundary: upstream runs in its own task,
    /// filling a channel of `scope`'s buffer capacity; this flow's output is
    /// that channel drained back into the real downstream.
    pub fn async_boundary(self) -> Flow<T> {
        let run = self.into_run();
        Flow::new(move |scope, emit: Emit<T>| {
            Box::pin(async move {
                let buffer_capacity = scope.buffer_capacity();
                let (tx, mut rx) = flowkit_channel::channel::<T>(buffer_capacity);
                support::spawn_into_channel(&scope, run, tx);
                support::drain_into(&mut rx, &emit).await
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::tests_support::collect_into_vec;

    #[tokio::test]
    async fn passes_every_element_through_the_boundary() {
        let flow = Flow::new(|_scope, emit: Emit<i32>| {
            Box::pin(async move {
                for v in 0..10 {
                    emit.emit(v).await?;
                }
                Ok(())
            })
        });
        let seen = collect_into_vec(flow.async_boundary()).await;
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
    }
}
