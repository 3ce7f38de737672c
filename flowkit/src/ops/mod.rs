// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The combinator surface: one `impl<T> Flow<T>` block per module, each
//! wrapping an upstream `run` body in an adapted `Emit`.

mod support;

#[cfg(test)]
pub(crate) mod tests_support;

mod also_to;
mod combine;
mod flatten;
mod grouped;
mod grouped_within;
mod interleave;
mod intersperse;
mod map_concat;
mod map_par;
mod map_par_unordered;
mod merge;
mod async_boundary;
mod sequential;
mod take_drop;
mod throttle;
mod zip;
