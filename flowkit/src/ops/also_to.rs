// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `also_to`, `also_to_tap`: fan a copy of every element out to a companion
//! [`Sink`].

use std::sync::Arc;

use flowkit_channel::{Closed, Sink};
use flowkit_core::EmitAborted;

use crate::flow::{Emit, Flow};
use crate::FlowError;

impl<T: Clone + Send + 'static> Flow<T> {
    /// Send every element downstream, then to `sink` (suspending on sink
    /// backpressure). A downstream failure is also reported to `sink` before
    /// being rethrown; a clean completion marks `sink` done.
    pub fn also_to<S: Sink<T> + 'static>(self, sink: Arc<S>) -> Flow<T> {
        let run = self.into_run();
        Flow::new(move |scope, emit: Emit<T>| {
            let sink = sink.clone();
            Box::pin(async move {
                let inner_sink = sink.clone();
                let inner = Emit::new(move |v: T| {
                    let emit = emit.clone();
                    let sink = inner_sink.clone();
                    async move {
                        if let Err(e) = emit.emit(v.clone()).await {
                            match &e {
                                EmitAborted::Error(flow_err) => sink.error(flow_err.clone()),
                                EmitAborted::TakeComplete(_) => sink.done(),
                            }
                            return Err(e);
                        }
                        sink.send(v).await.map_err(|closed| {
                            EmitAborted::Error(match closed {
                                Closed::Error(err) => err,
                                Closed::Done => FlowError::sink("also_to: sink closed"),
                            })
                        })
                    }
                });
                let outcome = run(scope, inner).await;
                if let Ok(()) = outcome {
                    sink.done();
                }
                outcome
            })
        })
    }

    /// As [`Flow::also_to`], but the copy to `sink` is non-blocking and its
    /// failures are swallowed — the companion sink can never slow down or
    /// break the primary flow.
    pub fn also_to_tap<S: Sink<T> + 'static>(self, sink: Arc<S>) -> Flow<T> {
        let run = self.into_run();
        Flow::new(move |scope, emit: Emit<T>| {
            let sink = sink.clone();
            Box::pin(async move {
                let inner_sink = sink.clone();
                let inner = Emit::new(move |v: T| {
                    let emit = emit.clone();
                    let sink = inner_sink.clone();
                    async move {
                        let _ = sink.try_send(v.clone());
                        emit.emit(v).await
                    }
                });
                let outcome = run(scope, inner).await;
                match &outcome {
                    Ok(()) => sink.done(),
                    Err(EmitAborted::TakeComplete(_)) => sink.done(),
                    Err(EmitAborted::Error(e)) => sink.error(e.clone()),
                }
                outcome
            })
        })
    }
}
