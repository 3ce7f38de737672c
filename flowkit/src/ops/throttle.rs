// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `throttle`: cap the emission rate at `elements` per `per`.
//!
//! Implemented as a tap that sleeps for `per / elements` after every
//! emission; the measured rate naturally includes however long downstream
//! took to accept the value, so this is an upper bound on throughput, not an
//! exact pacer.

use std::time::Duration;

use crate::flow::{Emit, Flow};
use crate::FlowError;

impl<T: Send + 'static> Flow<T> {
    /// Emit at most `elements` values per `per`.
    pub fn throttle(self, elements: usize, per: Duration) -> crate::Result<Flow<T>> {
        if elements == 0 {
            return Err(FlowError::precondition("throttle: elements must be > 0"));
        }
        if per.is_zero() {
            return Err(FlowError::precondition("throttle: per must be > 0"));
        }
        let run = self.into_run();
        let interval = per / elements as u32;
        Ok(Flow::new(move |scope, emit: Emit<T>| {
            Box::pin(async move {
                let inner = Emit::new(move |v: T| {
                    let emit = emit.clone();
                    async move {
                        emit.emit(v).await?;
                        tokio::time::sleep(interval).await;
                        Ok(())
                    }
                });
                run(scope, inner).await
            })
        }))
    }
}
