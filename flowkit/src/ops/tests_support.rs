// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Small helpers shared by the `#[cfg(test)]` modules colocated with each
//! operator.

use std::sync::{Arc, Mutex};

use crate::flow::Emit;
use crate::Flow;

/// An `Emit` that records every value it sees, plus a handle to read them
/// back.
pub(crate) fn recording_emit<T: Send + 'static>() -> (Emit<T>, Arc<Mutex<Vec<T>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();
    let emit = Emit::new(move |v: T| {
        recorder.lock().unwrap().push(v);
        async move { Ok(()) }
    });
    (emit, seen)
}

/// Run `flow` to completion against a recording `Emit` and return what it
/// saw. Panics if the flow fails.
pub(crate) async fn collect_into_vec<T: Send + Clone + 'static>(flow: Flow<T>) -> Vec<T> {
    let (emit, seen) = recording_emit();
    flow.run(emit).await.expect("flow should not fail");
    let values = seen.lock().unwrap().clone();
    values
}
