// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions)]
//! Structured-concurrency substrate shared by the flowkit workspace: a
//! runtime-independent [`CancellationToken`], the [`AbortToken`] identity and
//! [`EmitAborted`] signal used by `take`/`take_while`'s early-termination
//! path, and the [`Scope`]/[`Fork`] pair that realizes §4.1 of the flow
//! algebra specification.

mod abort_token;
mod cancellation_token;
mod emit_aborted;
mod scope;

pub use abort_token::AbortToken;
pub use cancellation_token::CancellationToken;
pub use emit_aborted::EmitAborted;
pub use scope::{Fork, Scope, DEFAULT_BUFFER_CAPACITY};
