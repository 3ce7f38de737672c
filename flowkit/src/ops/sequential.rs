// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Element-wise sequential operators: `map`, `filter`, `collect`, `tap`.
//!
//! None of these allocate a channel. Each wraps the upstream's `run` body in
//! an adapted `Emit`, so a chain of these still drives as a single task with
//! zero inter-stage buffering (§4.3).

use std::sync::Arc;

use flowkit_core::EmitAborted;

use crate::flow::{Emit, Flow};

impl<T: Send + 'static> Flow<T> {
    /// Transform each element with a total, order-preserving function.
    pub fn map<U, F>(self, f: F) -> Flow<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let run = self.into_run();
        let f = Arc::new(f);
        Flow::new(move |scope, emit: Emit<U>| {
            let f = f.clone();
            Box::pin(async move {
                let inner = Emit::new(move |v: T| {
                    let emit = emit.clone();
                    let f = f.clone();
                    async move { emit.emit(f(v)).await }
                });
                run(scope, inner).await
            })
        })
    }

    /// Keep only elements for which `predicate` holds.
    pub fn filter<F>(self, predicate: F) -> Flow<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let run = self.into_run();
        let predicate = Arc::new(predicate);
        Flow::new(move |scope, emit: Emit<T>| {
            let predicate = predicate.clone();
            Box::pin(async move {
                let inner = Emit::new(move |v: T| {
                    let emit = emit.clone();
                    let predicate = predicate.clone();
                    async move {
                        if predicate(&v) {
                            emit.emit(v).await
                        } else {
                            Ok(())
                        }
                    }
                });
                run(scope, inner).await
            })
        })
    }

    /// Apply a partial function: elements for which `pf` returns `None` are
    /// dropped, everything else passes through unwrapped.
    pub fn collect<U, F>(self, pf: F) -> Flow<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Option<U> + Send + Sync + 'static,
    {
        let run = self.into_run();
        let pf = Arc::new(pf);
        Flow::new(move |scope, emit: Emit<U>| {
            let pf = pf.clone();
            Box::pin(async move {
                let inner = Emit::new(move |v: T| {
                    let emit = emit.clone();
                    let pf = pf.clone();
                    async move {
                        match pf(v) {
                            Some(u) => emit.emit(u).await,
                            None => Ok(()),
                        }
                    }
                });
                run(scope, inner).await
            })
        })
    }

    /// Run `f` for its side effect, then pass the element through unchanged.
    /// A failing `f` fails the flow.
    pub fn tap<F>(self, f: F) -> Flow<T>
    where
        F: Fn(&T) -> crate::Result<()> + Send + Sync + 'static,
    {
        let run = self.into_run();
        let f = Arc::new(f);
        Flow::new(move |scope, emit: Emit<T>| {
            let f = f.clone();
            Box::pin(async move {
                let inner = Emit::new(move |v: T| {
                    let emit = emit.clone();
                    let f = f.clone();
                    async move {
                        f(&v).map_err(EmitAborted::Error)?;
                        emit.emit(v).await
                    }
                });
                run(scope, inner).await
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::tests_support::collect_into_vec;
    use flowkit_error::FlowError;

    #[tokio::test]
    async fn map_transforms_every_element() {
        let flow = Flow::new(|_scope, emit: Emit<i32>| {
            Box::pin(async move {
                for v in [1, 2, 3] {
                    emit.emit(v).await?;
                }
                Ok(())
            })
        });
        let seen = collect_into_vec(flow.map(|v| v * 2)).await;
        assert_eq!(seen, vec![2, 4, 6]);
    }

    #[tokio::test]
    async fn filter_drops_non_matching_elements() {
        let flow = Flow::new(|_scope, emit: Emit<i32>| {
            Box::pin(async move {
                for v in 0..6 {
                    emit.emit(v).await?;
                }
                Ok(())
            })
        });
        let seen = collect_into_vec(flow.filter(|v| v % 2 == 0)).await;
        assert_eq!(seen, vec![0, 2, 4]);
    }

    #[tokio::test]
    async fn collect_applies_partial_function() {
        let flow = Flow::new(|_scope, emit: Emit<i32>| {
            Box::pin(async move {
                for v in 0..5 {
                    emit.emit(v).await?;
                }
                Ok(())
            })
        });
        let seen = collect_into_vec(flow.collect(|v| if v % 2 == 0 { Some(v * 10) } else { None })).await;
        assert_eq!(seen, vec![0, 20, 40]);
    }

    #[tokio::test]
    async fn tap_observes_without_changing_the_sequence() {
        use std::sync::atomic::{AtomicI32, Ordering};
        let sum = Arc::new(AtomicI32::new(0));
        let tap_sum = sum.clone();
        let flow = Flow::new(|_scope, emit: Emit<i32>| {
            Box::pin(async move {
                for v in [1, 2, 3] {
                    emit.emit(v).await?;
                }
                Ok(())
            })
        });
        let seen = collect_into_vec(flow.tap(move |v| {
            tap_sum.fetch_add(*v, Ordering::SeqCst);
            Ok(())
        }))
        .await;
        assert_eq!(seen, vec![1, 2, 3]);
        assert_eq!(sum.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn tap_failure_fails_the_flow() {
        let flow = Flow::new(|_scope, emit: Emit<i32>| {
            Box::pin(async move {
                emit.emit(1).await?;
                emit.emit(2).await?;
                Ok(())
            })
        });
        let flow = flow.tap(|v| {
            if *v == 2 {
                Err(FlowError::precondition("boom"))
            } else {
                Ok(())
            }
        });
        let (emit, _seen) = crate::ops::tests_support::recording_emit();
        assert!(flow.run(emit).await.is_err());
    }
}
