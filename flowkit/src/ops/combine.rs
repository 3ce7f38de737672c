// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `concat`, `prepend`, `or_else`: sequencing whole flows one after another.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::flow::{Emit, Flow};

impl<T: Send + 'static> Flow<T> {
    /// Run `self` to completion, then run `other` into the same downstream.
    /// A `take` spanning the boundary keeps counting across both halves,
    /// since both share the one `emit` all the way through.
    pub fn concat(self, other: Flow<T>) -> Flow<T> {
        let run_a = self.into_run();
        let run_b = other.into_run();
        Flow::new(move |scope, emit: Emit<T>| {
            Box::pin(async move {
                run_a(scope.clone(), emit.clone()).await?;
                run_b(scope, emit).await
            })
        })
    }

    /// Run `other` before `self`.
    pub fn prepend(self, other: Flow<T>) -> Flow<T> {
        other.concat(self)
    }

    /// Run `self`; if it completes cleanly without producing a single
    /// element, run `alternative` instead. A failure in `self` propagates
    /// without trying `alternative`.
    pub fn or_else(self, alternative: Flow<T>) -> Flow<T> {
        let run = self.into_run();
        let run_alt = alternative.into_run();
        Flow::new(move |scope, emit: Emit<T>| {
            Box::pin(async move {
                let emitted_any = Arc::new(AtomicBool::new(false));
                let flag = emitted_any.clone();
                let alt_emit = emit.clone();
                let inner = Emit::new(move |v: T| {
                    let emit = emit.clone();
                    let flag = flag.clone();
                    async move {
                        flag.store(true, Ordering::Release);
                        emit.emit(v).await
                    }
                });
                run(scope.clone(), inner).await?;
                if emitted_any.load(Ordering::Acquire) {
                    Ok(())
                } else {
                    run_alt(scope, alt_emit).await
                }
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::tests_support::collect_into_vec;

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
    async fn concat_runs_both_flows_in_order() {
        let seen = collect_into_vec(flow_of(vec![1, 2]).concat(flow_of(vec![3, 4]))).await;
        assert_eq!(seen, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn prepend_runs_the_other_flow_first() {
        let seen = collect_into_vec(flow_of(vec![3, 4]).prepend(flow_of(vec![1, 2]))).await;
        assert_eq!(seen, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn take_spans_the_concat_boundary() {
        let seen = collect_into_vec(flow_of(vec![1, 2]).concat(flow_of(vec![3, 4])).take(3)).await;
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn or_else_falls_back_only_when_upstream_was_empty() {
        let seen = collect_into_vec(flow_of(vec![]).or_else(flow_of(vec![9]))).await;
        assert_eq!(seen, vec![9]);

        let seen = collect_into_vec(flow_of(vec![1]).or_else(flow_of(vec![9]))).await;
        assert_eq!(seen, vec![1]);
    }
}
