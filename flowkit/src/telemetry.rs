// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Conditional logging, gated behind the `tracing` feature so a caller who
//! doesn't want the dependency can opt out entirely.

#[cfg(feature = "tracing")]
macro_rules! flow_debug {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*);
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! flow_debug {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! flow_trace {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*);
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! flow_trace {
    ($($arg:tt)*) => {};
}

pub(crate) use flow_debug;
pub(crate) use flow_trace;
