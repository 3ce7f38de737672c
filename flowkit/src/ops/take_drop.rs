// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `take`, `take_while`, `drop`: prefix/suffix element selection.
//!
//! `take`/`take_while` signal early completion with an [`EmitAborted::TakeComplete`]
//! carrying a fresh [`AbortToken`], which only the instance that raised it
//! catches and converts back to success — this is what makes
//! `take(n).take(m) == take(min(n, m))` hold even though both layers see the
//! same abort traveling through them (§7).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use flowkit_core::{AbortToken, EmitAborted};

use crate::flow::{Emit, Flow};

impl<T: Send + 'static> Flow<T> {
    /// Keep only the first `n` elements, then complete.
    pub fn take(self, n: usize) -> Flow<T> {
        if n == 0 {
            return Flow::new(|_scope, _emit| Box::pin(async move { Ok(()) }));
        }
        let run = self.into_run();
        let token = AbortToken::new();
        Flow::new(move |scope, emit: Emit<T>| {
            Box::pin(async move {
                let remaining = Arc::new(AtomicUsize::new(n));
                let inner = Emit::new(move |v: T| {
                    let emit = emit.clone();
                    let remaining = remaining.clone();
                    async move {
                        let before = remaining.fetch_sub(1, Ordering::AcqRel);
                        emit.emit(v).await?;
                        if before == 1 {
                            Err(EmitAborted::TakeComplete(token))
                        } else {
                            Ok(())
                        }
                    }
                });
                match run(scope, inner).await {
                    Err(e) if e.is_take_complete_for(token) => Ok(()),
                    other => other,
                }
            })
        })
    }

    /// Keep elements while `predicate` holds. If `include_first_failing` is
    /// set, the first element for which `predicate` fails is emitted before
    /// completing; otherwise it's dropped.
    pub fn take_while<F>(self, predicate: F, include_first_failing: bool) -> Flow<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let run = self.into_run();
        let token = AbortToken::new();
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
                        } else if include_first_failing {
                            emit.emit(v).await?;
                            Err(EmitAborted::TakeComplete(token))
                        } else {
                            Err(EmitAborted::TakeComplete(token))
                        }
                    }
                });
                match run(scope, inner).await {
                    Err(e) if e.is_take_complete_for(token) => Ok(()),
                    other => other,
                }
            })
        })
    }

    /// Skip the first `n` elements, then pass the rest through unchanged.
    pub fn drop(self, n: usize) -> Flow<T> {
        let run = self.into_run();
        Flow::new(move |scope, emit: Emit<T>| {
            Box::pin(async move {
                let remaining = Arc::new(AtomicUsize::new(n));
                let inner = Emit::new(move |v: T| {
                    let emit = emit.clone();
                    let remaining = remaining.clone();
                    async move {
                        if remaining.load(Ordering::Acquire) > 0 {
                            remaining.fetch_sub(1, Ordering::AcqRel);
                            Ok(())
                        } else {
                            emit.emit(v).await
                        }
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

    #[tokio::test]
    async fn take_stops_after_n_elements() {
        let flow = Flow::new(|_scope, emit: Emit<i32>| {
            Box::pin(async move {
                for v in 0..100 {
                    emit.emit(v).await?;
                }
                Ok(())
            })
        });
        let seen = collect_into_vec(flow.take(3)).await;
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn take_zero_never_runs_upstream() {
        let flow: Flow<i32> = Flow::new(|_scope, _emit: Emit<i32>| {
            Box::pin(async move { panic!("upstream should not run") })
        });
        let seen = collect_into_vec(flow.take(0)).await;
        assert!(seen.is_empty());
    }

    #[tokio::test]
    async fn nested_take_keeps_the_smaller_bound() {
        let flow = Flow::new(|_scope, emit: Emit<i32>| {
            Box::pin(async move {
                for v in 0..100 {
                    emit.emit(v).await?;
                }
                Ok(())
            })
        });
        let seen = collect_into_vec(flow.take(10).take(3)).await;
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn take_while_stops_at_first_non_matching_element() {
        let flow = Flow::new(|_scope, emit: Emit<i32>| {
            Box::pin(async move {
                for v in [1, 2, 3, -1, 4] {
                    emit.emit(v).await?;
                }
                Ok(())
            })
        });
        let seen = collect_into_vec(flow.take_while(|v| *v > 0, false)).await;
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn take_while_can_include_the_first_failing_element() {
        let flow = Flow::new(|_scope, emit: Emit<i32>| {
            Box::pin(async move {
                for v in [1, 2, -1, 4] {
                    emit.emit(v).await?;
                }
                Ok(())
            })
        });
        let seen = collect_into_vec(flow.take_while(|v| *v > 0, true)).await;
        assert_eq!(seen, vec![1, 2, -1]);
    }

    #[tokio::test]
    async fn drop_skips_the_first_n_elements() {
        let flow = Flow::new(|_scope, emit: Emit<i32>| {
            Box::pin(async move {
                for v in 0..5 {
                    emit.emit(v).await?;
                }
                Ok(())
            })
        });
        let seen = collect_into_vec(flow.drop(2)).await;
        assert_eq!(seen, vec![2, 3, 4]);
    }
}
