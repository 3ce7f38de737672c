// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `map_par_unordered`: bounded-concurrency mapping, results emitted as soon
//! as they're ready rather than in input order.
//!
//! A single forked driver task runs a supervised inner scope: upstream is
//! driven through an adapted `Emit` that, per element, acquires a semaphore
//! permit and registers a `fork_user` task to run the mapping and forward
//! its result. The supervised scope's first-error-wins cancellation takes
//! care of tearing down outstanding mappings on failure; the driver then
//! closes the results channel from the scope's final outcome.

use std::future::Future;
use std::sync::Arc;

use flowkit_channel::Closed;
use flowkit_core::{EmitAborted, Scope};
use flowkit_error::FlowError;
use tokio::sync::Semaphore;

use crate::flow::{Emit, Flow};

impl<T: Send + 'static> Flow<T> {
    /// As [`Flow::map_par`], but results are emitted in completion order
    /// rather than input order.
    pub fn map_par_unordered<U, F, Fut>(self, parallelism: usize, f: F) -> crate::Result<Flow<U>>
    where
        U: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = crate::Result<U>> + Send + 'static,
    {
        if parallelism == 0 {
            return Err(FlowError::precondition(
                "map_par_unordered: parallelism must be > 0",
            ));
        }
        let run = self.into_run();
        let f = Arc::new(f);

        Ok(Flow::new(move |scope, emit: Emit<U>| {
            let f = f.clone();
            Box::pin(async move {
                let buffer_capacity = scope.buffer_capacity();
                let semaphore = Arc::new(Semaphore::new(parallelism));
                let (results_tx, mut results_rx) = flowkit_channel::channel::<U>(buffer_capacity);

                let driver_results_tx = results_tx.clone();
                scope.fork(async move {
                    let final_tx = driver_results_tx.clone();
                    let outcome = Scope::supervised_with_capacity(buffer_capacity, move |inner_scope| {
                        let f = f.clone();
                        let semaphore = semaphore.clone();
                        let results_tx = driver_results_tx.clone();
                        async move {
                            let task_scope = inner_scope.clone();
                            let producer_emit = Emit::new(move |v: T| {
                                let semaphore = semaphore.clone();
                                let f = f.clone();
                                let results_tx = results_tx.clone();
                                let task_scope = task_scope.clone();
                                async move {
                                    let permit = semaphore.acquire_owned().await.map_err(|_| {
                                        EmitAborted::Error(FlowError::precondition(
                                            "map_par_unordered: semaphore closed",
                                        ))
                                    })?;
                                    let fut = f(v);
                                    task_scope.fork_user(async move {
                                        let outcome = fut.await;
                                        drop(permit);
                                        match outcome {
                                            Ok(u) => {
                                                let _ = results_tx.send(u).await;
                                                Ok(())
                                            }
                                            Err(e) => Err(e),
                                        }
                                    });
                                    Ok(())
                                }
                            });

                            match run(inner_scope, producer_emit).await {
                                Ok(()) | Err(EmitAborted::TakeComplete(_)) => Ok(()),
                                Err(EmitAborted::Error(e)) => Err(e),
                            }
                        }
                    })
                    .await;

                    match outcome {
                        Ok(()) => final_tx.done(),
                        Err(e) => final_tx.error(e),
                    }
                });

                loop {
                    match results_rx.receive().await {
                        Ok(v) => emit.emit(v).await?,
                        Err(Closed::Done) => return Ok(()),
                        Err(Closed::Error(e)) => return Err(EmitAborted::Error(e)),
                    }
                }
            })
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::tests_support::collect_into_vec;
    use std::collections::HashSet;

    #[tokio::test]
    async fn map_par_unordered_maps_every_element() {
        let flow = Flow::new(|_scope, emit: Emit<i32>| {
            Box::pin(async move {
                for v in 0..8 {
                    emit.emit(v).await?;
                }
                Ok(())
            })
        });
        let seen = collect_into_vec(
            flow.map_par_unordered(3, |v| async move {
                tokio::time::sleep(std::time::Duration::from_millis((8 - v) as u64)).await;
                Ok(v * 2)
            })
            .unwrap(),
        )
        .await;
        let seen: HashSet<i32> = seen.into_iter().collect();
        assert_eq!(seen, (0..8).map(|v| v * 2).collect::<HashSet<_>>());
    }

    #[tokio::test]
    async fn map_par_unordered_propagates_mapping_failures() {
        let flow = Flow::new(|_scope, emit: Emit<i32>| {
            Box::pin(async move {
                for v in 0..4 {
                    emit.emit(v).await?;
                }
                Ok(())
            })
        });
        let flow = flow
            .map_par_unordered(2, |v| async move {
                if v == 2 {
                    Err(FlowError::precondition("boom"))
                } else {
                    Ok(v)
                }
            })
            .unwrap();
        let (emit, _seen) = crate::ops::tests_support::recording_emit();
        assert!(flow.run(emit).await.is_err());
    }

    #[tokio::test]
    async fn map_par_unordered_rejects_zero_parallelism() {
        let flow: Flow<i32> = Flow::new(|_scope, _emit| Box::pin(async move { Ok(()) }));
        assert!(flow
            .map_par_unordered(0, |v: i32| async move { Ok(v) })
            .is_err());
    }
}
