// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions)]
//! Flow constructors and terminal drivers.
//!
//! The combinator algebra in `flowkit` is agnostic to how a `Flow` is
//! produced or how its output is finally consumed — this crate supplies the
//! minimal concrete producers (`from_iterable`, `from_channel`,
//! `using_emit_inline`, `concat`, `interleave_all`) and terminal drivers
//! (`run_collect`, `run_drain`, `run_for_each`) needed to exercise it.

mod constructors;
mod terminal;

pub use constructors::{concat, from_channel, from_iterable, interleave_all, using_emit_inline};
pub use terminal::{run_collect, run_drain, run_for_each};
