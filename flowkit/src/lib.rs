// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions)]
//! A pull-push hybrid streaming combinator library: bounded backpressure,
//! structured concurrency, and deterministic shutdown, built on
//! [`flowkit_core::Scope`] and [`flowkit_channel`].
//!
//! The core type is [`Flow<T>`], a recipe for producing a sequence of `T`s
//! that does nothing until [`Flow::run`] drives it. Every combinator in
//! [`ops`] is an `impl<T> Flow<T>` method that wraps the upstream `run` body
//! in an adapted [`Emit<T>`].

mod flow;
mod ops;
mod telemetry;

pub use flow::{BoxFuture, Emit, Flow};
pub use flowkit_error::{FlowError, Result};
