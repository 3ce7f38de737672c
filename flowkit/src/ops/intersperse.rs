// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `intersperse`: inject a separator between elements, with optional
//! leading/trailing bookends.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::flow::{Emit, Flow};

impl<T: Clone + Send + 'static> Flow<T> {
    /// Emit `start` (if any) before the first element, `inject` between every
    /// pair of elements, and `end` (if any) after the last. `start`/`end` are
    /// emitted even if the upstream produces nothing, and `end` is skipped if
    /// the flow fails.
    pub fn intersperse(self, start: Option<T>, inject: T, end: Option<T>) -> Flow<T> {
        let run = self.into_run();
        Flow::new(move |scope, emit: Emit<T>| {
            let start = start.clone();
            let inject = inject.clone();
            let end = end.clone();
            Box::pin(async move {
                if let Some(s) = start {
                    emit.emit(s).await?;
                }
                let trailing_emit = emit.clone();
                let first = Arc::new(AtomicBool::new(true));
                let inner = Emit::new(move |v: T| {
                    let emit = emit.clone();
                    let inject = inject.clone();
                    let first = first.clone();
                    async move {
                        if !first.swap(false, Ordering::AcqRel) {
                            emit.emit(inject).await?;
                        }
                        emit.emit(v).await
                    }
                });
                let outcome = run(scope, inner).await;
                if outcome.is_ok() {
                    if let Some(e) = end {
                        trailing_emit.emit(e).await?;
                    }
                }
                outcome
            })
        })
    }
}
