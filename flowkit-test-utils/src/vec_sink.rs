// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `VecSink[T]`: an in-memory recorder implementing [`Sink`] for tests.
//!
//! Separates mutation (the values pushed through `send`/`try_send`) from
//! inspection (`values()`, `is_done()`, `error_seen()`), mirroring the
//! teacher's `TestChannel` split between imperative push and stream read.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

use flowkit_channel::{Closed, Sink, TrySendError};
use flowkit_error::FlowError;

struct State<T> {
    values: Vec<T>,
    done: bool,
    error: Option<FlowError>,
}

/// A [`Sink`] that records every value it receives, for assertions in tests.
pub struct VecSink<T> {
    state: Mutex<State<T>>,
    refuse: bool,
}

impl<T> VecSink<T> {
    /// A sink that accepts everything sent to it.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State {
                values: Vec::new(),
                done: false,
                error: None,
            }),
            refuse: false,
        })
    }

    /// A sink that rejects every send (`send` errors, `try_send` errors),
    /// for exercising a caller's failure handling.
    #[must_use]
    pub fn refusing() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State {
                values: Vec::new(),
                done: false,
                error: None,
            }),
            refuse: true,
        })
    }

    /// The values recorded so far, in arrival order.
    pub fn values(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.state.lock().values.clone()
    }

    /// Whether `done()` has been called.
    pub fn is_done(&self) -> bool {
        self.state.lock().done
    }

    /// The error reported via `error()`, if any.
    pub fn error_seen(&self) -> Option<FlowError> {
        self.state.lock().error.clone()
    }
}

#[async_trait]
impl<T: Send + Sync + 'static> Sink<T> for VecSink<T> {
    async fn send(&self, value: T) -> Result<(), Closed> {
        if self.refuse {
            return Err(Closed::Error(FlowError::sink("VecSink: refusing sends")));
        }
        self.state.lock().values.push(value);
        Ok(())
    }

    fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
        if self.refuse {
            return Err(TrySendError::Closed(Closed::Error(FlowError::sink(
                "VecSink: refusing sends",
            ))));
        }
        self.state.lock().values.push(value);
        Ok(())
    }

    fn done(&self) {
        self.state.lock().done = true;
    }

    fn error(&self, error: FlowError) {
        self.state.lock().error = Some(error);
    }
}
