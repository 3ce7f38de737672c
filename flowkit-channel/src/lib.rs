// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions)]
//! Bounded, backpressured `Channel[T]` with the `Open`/`Done`/`Errored`
//! terminal lifecycle described in §4.2 of the flow algebra specification.

mod channel;
mod sink;

pub use channel::{channel, Closed, Receiver, Sender, TryReceiveError, TrySendError};
pub use sink::Sink;
