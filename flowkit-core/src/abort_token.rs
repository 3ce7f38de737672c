// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Identity for the "take-complete" early-termination signal.
//!
//! `take(n)` and `take_while(p)` mint one [`AbortToken`] per operator
//! instance and stamp it onto the `EmitAborted::TakeComplete` they raise once
//! satisfied. The operator that owns a token is the only one allowed to
//! swallow it — a token from a nested `take` propagates through outer
//! operators unchanged, which is what makes `take(n).take(m)` behave like
//! `take(min(n, m))` instead of either side hiding the other's completion.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// Opaque identity minted once per `take`/`take_while` operator instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AbortToken(u64);

impl AbortToken {
    /// Mint a fresh, process-wide unique token.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique() {
        let a = AbortToken::new();
        let b = AbortToken::new();
        assert_ne!(a, b);
    }

    #[test]
    fn token_equals_itself() {
        let a = AbortToken::new();
        assert_eq!(a, a);
    }
}
