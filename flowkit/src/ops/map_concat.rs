// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `map_concat`, `map_stateful`, `map_stateful_concat`: one-to-many and
//! stateful element-wise transforms.
//!
//! Stateful variants own their state exclusively within the single task
//! driving the fused pipeline (§4.3); it's wrapped in a `parking_lot::Mutex`
//! only because `Emit`'s callback is a `Fn`, not a `FnMut` — there is never
//! real contention on the lock.

use std::sync::Arc;

use flowkit_core::EmitAborted;
use parking_lot::Mutex;

use crate::flow::{Emit, Flow};

impl<T: Send + 'static> Flow<T> {
    /// Map each element to zero or more output elements, in order.
    pub fn map_concat<U, I, F>(self, f: F) -> Flow<U>
    where
        U: Send + 'static,
        I: IntoIterator<Item = U> + Send + 'static,
        F: Fn(T) -> I + Send + Sync + 'static,
    {
        let run = self.into_run();
        let f = Arc::new(f);
        Flow::new(move |scope, emit: Emit<U>| {
            let f = f.clone();
            Box::pin(async move {
                let inner = Emit::new(move |v: T| {
                    let emit = emit.clone();
                    let f = f.clone();
                    async move {
                        for item in f(v) {
                            emit.emit(item).await?;
                        }
                        Ok(())
                    }
                });
                run(scope, inner).await
            })
        })
    }

    /// A `fold`-and-emit-at-most-one-value-per-element transform, with an
    /// optional trailing value derived from the final state once upstream
    /// completes cleanly.
    pub fn map_stateful<S, U, F, C>(self, init: S, f: F, on_complete: C) -> Flow<U>
    where
        S: Send + 'static,
        U: Send + 'static,
        F: Fn(&mut S, T) -> crate::Result<Option<U>> + Send + Sync + 'static,
        C: Fn(S) -> Option<U> + Send + Sync + 'static,
    {
        let run = self.into_run();
        let f = Arc::new(f);
        let on_complete = Arc::new(on_complete);
        Flow::new(move |scope, emit: Emit<U>| {
            let f = f.clone();
            let on_complete = on_complete.clone();
            Box::pin(async move {
                let state = Arc::new(Mutex::new(Some(init)));
                let trailing_emit = emit.clone();
                let trailing_state = state.clone();
                let inner = Emit::new(move |v: T| {
                    let emit = emit.clone();
                    let f = f.clone();
                    let state = state.clone();
                    async move {
                        let outcome = {
                            let mut guard = state.lock();
                            let s = guard.as_mut().expect("map_stateful: state missing");
                            f(s, v)
                        };
                        match outcome.map_err(EmitAborted::Error)? {
                            Some(u) => emit.emit(u).await,
                            None => Ok(()),
                        }
                    }
                });
                let result = run(scope, inner).await;
                if result.is_ok() {
                    if let Some(final_state) = trailing_state.lock().take() {
                        if let Some(u) = on_complete(final_state) {
                            trailing_emit.emit(u).await?;
                        }
                    }
                }
                result
            })
        })
    }

    /// As [`Flow::map_stateful`], but each step (and the trailing step) may
    /// emit any number of values.
    pub fn map_stateful_concat<S, U, I, CI, F, C>(self, init: S, f: F, on_complete: C) -> Flow<U>
    where
        S: Send + 'static,
        U: Send + 'static,
        I: IntoIterator<Item = U> + Send + 'static,
        CI: IntoIterator<Item = U> + Send + 'static,
        F: Fn(&mut S, T) -> crate::Result<I> + Send + Sync + 'static,
        C: Fn(S) -> CI + Send + Sync + 'static,
    {
        let run = self.into_run();
        let f = Arc::new(f);
        let on_complete = Arc::new(on_complete);
        Flow::new(move |scope, emit: Emit<U>| {
            let f = f.clone();
            let on_complete = on_complete.clone();
            Box::pin(async move {
                let state = Arc::new(Mutex::new(Some(init)));
                let trailing_emit = emit.clone();
                let trailing_state = state.clone();
                let inner = Emit::new(move |v: T| {
                    let emit = emit.clone();
                    let f = f.clone();
                    let state = state.clone();
                    async move {
                        let outcome = {
                            let mut guard = state.lock();
                            let s = guard.as_mut().expect("map_stateful_concat: state missing");
                            f(s, v)
                        };
                        for item in outcome.map_err(EmitAborted::Error)? {
                            emit.emit(item).await?;
                        }
                        Ok(())
                    }
                });
                let result = run(scope, inner).await;
                if result.is_ok() {
                    if let Some(final_state) = trailing_state.lock().take() {
                        for item in on_complete(final_state) {
                            trailing_emit.emit(item).await?;
                        }
                    }
                }
                result
            })
        })
    }
}
