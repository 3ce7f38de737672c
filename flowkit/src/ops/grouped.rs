// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `grouped`, `grouped_weighted`, `sliding`: count/weight-bounded windowing,
//! purely driven by upstream demand (no timer — see `grouped_within` for
//! the timed variants).

use std::collections::VecDeque;
use std::sync::Arc;

use flowkit_core::EmitAborted;
use parking_lot::Mutex;

use crate::flow::{Emit, Flow};
use crate::FlowError;

impl<T: Send + 'static> Flow<T> {
    /// Batch elements into fixed-size, non-overlapping `Vec`s. The final
    /// batch may be smaller than `n` if upstream runs dry first.
    pub fn grouped(self, n: usize) -> crate::Result<Flow<Vec<T>>> {
        if n == 0 {
            return Err(FlowError::precondition("grouped: n must be > 0"));
        }
        let run = self.into_run();
        Ok(Flow::new(move |scope, emit: Emit<Vec<T>>| {
            Box::pin(async move {
                let buffer: Arc<Mutex<Vec<T>>> = Arc::new(Mutex::new(Vec::with_capacity(n)));
                let trailing_emit = emit.clone();
                let trailing_buffer = buffer.clone();
                let inner = Emit::new(move |v: T| {
                    let emit = emit.clone();
                    let buffer = buffer.clone();
                    async move {
                        let full = {
                            let mut buf = buffer.lock();
                            buf.push(v);
                            buf.len() >= n
                        };
                        if full {
                            let batch = std::mem::take(&mut *buffer.lock());
                            emit.emit(batch).await?;
                        }
                        Ok(())
                    }
                });
                let result = run(scope, inner).await;
                if result.is_ok() {
                    let remainder = std::mem::take(&mut *trailing_buffer.lock());
                    if !remainder.is_empty() {
                        trailing_emit.emit(remainder).await?;
                    }
                }
                result
            })
        }))
    }

    /// Batch elements by cumulative weight: flush once `cost` of the
    /// buffered elements reaches `min_weight`.
    pub fn grouped_weighted<F>(self, min_weight: u64, cost: F) -> crate::Result<Flow<Vec<T>>>
    where
        F: Fn(&T) -> crate::Result<u64> + Send + Sync + 'static,
    {
        if min_weight == 0 {
            return Err(FlowError::precondition(
                "grouped_weighted: min_weight must be > 0",
            ));
        }
        let run = self.into_run();
        let cost = Arc::new(cost);
        Ok(Flow::new(move |scope, emit: Emit<Vec<T>>| {
            let cost = cost.clone();
            Box::pin(async move {
                let buffer: Arc<Mutex<(Vec<T>, u64)>> = Arc::new(Mutex::new((Vec::new(), 0)));
                let trailing_emit = emit.clone();
                let trailing_buffer = buffer.clone();
                let inner = Emit::new(move |v: T| {
                    let emit = emit.clone();
                    let cost = cost.clone();
                    let buffer = buffer.clone();
                    async move {
                        let weight = cost(&v).map_err(EmitAborted::Error)?;
                        let full = {
                            let mut guard = buffer.lock();
                            guard.0.push(v);
                            guard.1 += weight;
                            guard.1 >= min_weight
                        };
                        if full {
                            let batch = {
                                let mut guard = buffer.lock();
                                guard.1 = 0;
                                std::mem::take(&mut guard.0)
                            };
                            emit.emit(batch).await?;
                        }
                        Ok(())
                    }
                });
                let result = run(scope, inner).await;
                if result.is_ok() {
                    let remainder = std::mem::take(&mut trailing_buffer.lock().0);
                    if !remainder.is_empty() {
                        trailing_emit.emit(remainder).await?;
                    }
                }
                result
            })
        }))
    }

    /// Overlapping windows of `n` elements, advancing `step` elements at a
    /// time. The first window is emitted as soon as `n` elements are
    /// available; a shorter trailing window is emitted only if it wasn't
    /// already covered by the last full one.
    pub fn sliding(self, n: usize, step: usize) -> crate::Result<Flow<Vec<T>>>
    where
        T: Clone,
    {
        if n == 0 {
            return Err(FlowError::precondition("sliding: n must be > 0"));
        }
        if step == 0 {
            return Err(FlowError::precondition("sliding: step must be > 0"));
        }
        let run = self.into_run();
        Ok(Flow::new(move |scope, emit: Emit<Vec<T>>| {
            Box::pin(async move {
                let state: Arc<Mutex<(VecDeque<T>, usize)>> =
                    Arc::new(Mutex::new((VecDeque::with_capacity(n), 0)));
                let trailing_emit = emit.clone();
                let trailing_state = state.clone();
                let inner = Emit::new(move |v: T| {
                    let emit = emit.clone();
                    let state = state.clone();
                    async move {
                        let window = {
                            let mut guard = state.lock();
                            let (buffer, skip) = &mut *guard;
                            if *skip > 0 {
                                *skip -= 1;
                                None
                            } else {
                                buffer.push_back(v);
                                if buffer.len() == n {
                                    let window: Vec<T> = buffer.iter().cloned().collect();
                                    if step >= n {
                                        buffer.clear();
                                        *skip = step - n;
                                    } else {
                                        for _ in 0..step {
                                            buffer.pop_front();
                                        }
                                    }
                                    Some(window)
                                } else {
                                    None
                                }
                            }
                        };
                        if let Some(window) = window {
                            emit.emit(window).await?;
                        }
                        Ok(())
                    }
                });
                let result = run(scope, inner).await;
                if result.is_ok() {
                    let remainder: Vec<T> = trailing_state.lock().0.iter().cloned().collect();
                    if !remainder.is_empty() {
                        trailing_emit.emit(remainder).await?;
                    }
                }
                result
            })
        }))
    }
}
