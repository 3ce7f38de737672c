// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The control signal threaded back through an emit call.
//!
//! `Emit::emit` returns `Result<(), EmitAborted>` rather than a plain
//! `Result<(), FlowError>` so that early termination (`take`, `take_while`)
//! can unwind the producer side of a flow without being mistaken for a
//! failure. `TakeComplete` carries the [`AbortToken`] of the operator that
//! raised it, so an operator catching it downstream only swallows the one it
//! minted itself — a nested `take` propagates untouched.

use flowkit_error::FlowError;

use crate::AbortToken;

/// Signal carried back through the emit chain to stop a flow early.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EmitAborted {
    /// A `take`/`take_while` downstream has seen enough; unwind to the
    /// operator instance identified by this token and stop there.
    #[error("take complete")]
    TakeComplete(AbortToken),
    /// A real failure; propagate to the flow's final result.
    #[error(transparent)]
    Error(#[from] FlowError),
}

impl EmitAborted {
    /// `true` if this is the operator's own take-completion signal.
    pub fn is_take_complete_for(&self, token: AbortToken) -> bool {
        matches!(self, EmitAborted::TakeComplete(t) if *t == token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("boom")]
    struct Boom;

    #[test]
    fn take_complete_matches_only_its_own_token() {
        let mine = AbortToken::new();
        let theirs = AbortToken::new();
        let signal = EmitAborted::TakeComplete(mine);
        assert!(signal.is_take_complete_for(mine));
        assert!(!signal.is_take_complete_for(theirs));
    }

    #[test]
    fn error_is_never_take_complete() {
        let signal = EmitAborted::Error(FlowError::user(Boom));
        assert!(!signal.is_take_complete_for(AbortToken::new()));
    }
}
