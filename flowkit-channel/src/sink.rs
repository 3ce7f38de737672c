// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `Sink[T]`: the contract `also_to`/`also_to_tap` fan out into.
//!
//! [`Sender<T>`] is the production implementation; test code typically
//! implements this against an in-memory recorder instead (see
//! `flowkit-test-utils`).

use async_trait::async_trait;
use flowkit_error::FlowError;

use crate::channel::{Closed, Sender, TrySendError};

/// A companion destination a `Flow` can tee values into without becoming its
/// primary downstream.
#[async_trait]
pub trait Sink<T>: Send + Sync {
    /// Push a value, suspending while the sink applies backpressure.
    async fn send(&self, value: T) -> Result<(), Closed>;

    /// Non-blocking push; fails instead of suspending when there's no room.
    fn try_send(&self, value: T) -> Result<(), TrySendError<T>>;

    /// Mark the sink `Done`.
    fn done(&self);

    /// Mark the sink `Errored(error)`.
    fn error(&self, error: FlowError);
}

#[async_trait]
impl<T: Send + 'static> Sink<T> for Sender<T> {
    async fn send(&self, value: T) -> Result<(), Closed> {
        Sender::send(self, value).await
    }

    fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
        Sender::try_send(self, value)
    }

    fn done(&self) {
        Sender::done(self)
    }

    fn error(&self, error: FlowError) {
        Sender::error(self, error)
    }
}
