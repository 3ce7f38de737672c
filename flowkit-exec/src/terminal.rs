// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Terminal drivers: ways to actually run a `Flow` and get a result back.

use std::future::Future;
use std::sync::Arc;

use flowkit::{Emit, Flow};
use flowkit_core::EmitAborted;
use flowkit_error::{FlowError, Result};
use parking_lot::Mutex;

/// Run `flow` to completion, collecting every emitted value into a `Vec` in
/// order.
pub async fn run_collect<T>(flow: Flow<T>) -> Result<Vec<T>>
where
    T: Send + Clone + 'static,
{
    let collected = Arc::new(Mutex::new(Vec::new()));
    let sink = collected.clone();
    let emit = Emit::new(move |v: T| {
        sink.lock().push(v);
        async move { Ok(()) }
    });
    flow.run(emit).await?;
    Ok(Arc::try_unwrap(collected)
        .unwrap_or_else(|arc| Mutex::new(arc.lock().clone()))
        .into_inner())
}

/// Run `flow` to completion, discarding every value it produces.
pub async fn run_drain<T>(flow: Flow<T>) -> Result<()>
where
    T: Send + 'static,
{
    let emit = Emit::new(|_v: T| async move { Ok(()) });
    flow.run(emit).await
}

/// Run `flow` to completion, invoking `f` for every value. A failing `f`
/// fails the whole run.
pub async fn run_for_each<T, F, Fut>(flow: Flow<T>, f: F) -> Result<()>
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    let f = Arc::new(f);
    let emit = Emit::new(move |v: T| {
        let f = f.clone();
        async move { f(v).await.map_err(EmitAborted::Error) }
    });
    flow.run(emit).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::from_iterable;

    #[tokio::test]
    async fn run_collect_gathers_every_value_in_order() {
        let values = run_collect(from_iterable(vec![1, 2, 3])).await.unwrap();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn run_drain_discards_values_but_propagates_failure() {
        run_drain(from_iterable(vec![1, 2, 3])).await.unwrap();

        let failing = Flow::new(|_scope, _emit: Emit<i32>| {
            Box::pin(async move { Err(FlowError::precondition("boom").into()) })
        });
        assert!(run_drain(failing).await.is_err());
    }

    #[tokio::test]
    async fn run_for_each_invokes_the_callback_per_value() {
        let sum = Arc::new(Mutex::new(0));
        let acc = sum.clone();
        run_for_each(from_iterable(vec![1, 2, 3]), move |v: i32| {
            let acc = acc.clone();
            async move {
                *acc.lock() += v;
                Ok(())
            }
        })
        .await
        .unwrap();
        assert_eq!(*sum.lock(), 6);
    }

    #[tokio::test]
    async fn run_for_each_failure_aborts_the_flow() {
        let result = run_for_each(from_iterable(vec![1, 2, 3]), |v: i32| async move {
            if v == 2 {
                Err(FlowError::precondition("boom"))
            } else {
                Ok(())
            }
        })
        .await;
        assert!(result.is_err());
    }
}
