// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `map_par`: bounded-concurrency mapping that preserves input order.
//!
//! Three concurrent actors inside an unsupervised scope: a producer that
//! drains upstream and, for each element, acquires a semaphore permit and
//! forks a mapping task, handing the `Fork` handle to a collector; the
//! collector joins those handles strictly in order and forwards results to
//! a `results` channel; the main task (outside the unsupervised scope)
//! drains `results` into the real downstream. A mapping failure is routed
//! straight to `results.error()`, which — being first-write-wins — preempts
//! whatever the collector later reports.

use std::future::Future;
use std::sync::Arc;

use flowkit_channel::Closed;
use flowkit_core::{EmitAborted, Fork, Scope};
use flowkit_error::FlowError;
use tokio::sync::Semaphore;

use crate::flow::{Emit, Flow};

impl<T: Send + 'static> Flow<T> {
    /// Apply `f` to each element with at most `parallelism` invocations in
    /// flight, emitting results in input order.
    pub fn map_par<U, F, Fut>(self, parallelism: usize, f: F) -> crate::Result<Flow<U>>
    where
        U: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = crate::Result<U>> + Send + 'static,
    {
        if parallelism == 0 {
            return Err(FlowError::precondition("map_par: parallelism must be > 0"));
        }
        let run = self.into_run();
        let f = Arc::new(f);

        Ok(Flow::new(move |scope, emit: Emit<U>| {
            let f = f.clone();
            Box::pin(async move {
                let buffer_capacity = scope.buffer_capacity();
                let semaphore = Arc::new(Semaphore::new(parallelism));
                let (inflight_tx, mut inflight_rx) =
                    flowkit_channel::channel::<Fork<Option<U>>>(parallelism);
                let (results_tx, mut results_rx) = flowkit_channel::channel::<U>(buffer_capacity);

                Scope::unsupervised_with_capacity(buffer_capacity, move |inner_scope| {
                    let f = f.clone();
                    async move {
                        let producer_scope = inner_scope.clone();
                        let producer_inflight_tx = inflight_tx.clone();
                        let producer_results_tx = results_tx.clone();
                        let producer_semaphore = semaphore.clone();
                        inner_scope.fork_user(async move {
                            let mapping_scope = producer_scope.clone();
                            let producer_emit = Emit::new(move |v: T| {
                                let semaphore = producer_semaphore.clone();
                                let f = f.clone();
                                let inflight_tx = producer_inflight_tx.clone();
                                let results_tx = producer_results_tx.clone();
                                let mapping_scope = mapping_scope.clone();
                                async move {
                                    let permit = semaphore.acquire_owned().await.map_err(|_| {
                                        EmitAborted::Error(FlowError::precondition(
                                            "map_par: semaphore closed",
                                        ))
                                    })?;
                                    let fut = f(v);
                                    let fork_results_tx = results_tx.clone();
                                    let mapping_fork = mapping_scope.fork(async move {
                                        let outcome = fut.await;
                                        drop(permit);
                                        match outcome {
                                            Ok(u) => Some(u),
                                            Err(e) => {
                                                fork_results_tx.error(e);
                                                None
                                            }
                                        }
                                    });
                                    inflight_tx.send(mapping_fork).await.map_err(|closed| {
                                        EmitAborted::Error(match closed {
                                            Closed::Error(e) => e,
                                            Closed::Done => {
                                                FlowError::precondition("map_par: collector gone")
                                            }
                                        })
                                    })
                                }
                            });

                            match run(producer_scope, producer_emit).await {
                                Ok(()) | Err(EmitAborted::TakeComplete(_)) => {
                                    inflight_tx.done();
                                    Ok(())
                                }
                                Err(EmitAborted::Error(e)) => {
                                    results_tx.error(e.clone());
                                    inflight_tx.done();
                                    Err(e)
                                }
                            }
                        });

                        let collector_results_tx = results_tx.clone();
                        inner_scope.fork_user(async move {
                            loop {
                                match inflight_rx.receive().await {
                                    Ok(fork) => match fork.join().await {
                                        Ok(Some(value)) => {
                                            if collector_results_tx.send(value).await.is_err() {
                                                return Ok(());
                                            }
                                        }
                                        Ok(None) => {}
                                        Err(e) => collector_results_tx.error(e),
                                    },
                                    Err(Closed::Done) => {
                                        collector_results_tx.done();
                                        return Ok(());
                                    }
                                    Err(Closed::Error(e)) => {
                                        collector_results_tx.error(e);
                                        return Ok(());
                                    }
                                }
                            }
                        });
                    }
                })
                .await;

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
