// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions)]
//! Root error type for flowkit's flow/channel/scope substrate.
//!
//! Every fallible surface in the workspace — channel terminal states, scope
//! failures, user-callback failures — ultimately reports a [`FlowError`].
//!
//! ```
//! use flowkit_error::{FlowError, Result};
//!
//! fn process() -> Result<()> {
//!     Err(FlowError::precondition("parallelism must be > 0"))
//! }
//! ```

/// Root error type for all flowkit operations.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// A user-supplied callback (`f`, `cost_fn`, `initialize_state`, ...) failed.
    #[error("user callback failed: {0}")]
    User(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// An operator builder rejected its parameters (e.g. `parallelism == 0`).
    ///
    /// Raised synchronously from the builder, never at run time (§7).
    #[error("precondition violated: {context}")]
    Precondition { context: String },

    /// A companion sink (`also_to`'s target) reported a failure or was closed.
    #[error("sink error: {context}")]
    Sink { context: String },

    /// Multiple independent failures were aggregated (e.g. `also_to` failing
    /// on both the downstream emit and the sink send).
    #[error("{count} errors occurred")]
    Multiple { count: usize, errors: Vec<FlowError> },
}

impl FlowError {
    /// Wrap an arbitrary user error.
    pub fn user(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::User(Box::new(error))
    }

    /// Build a precondition-violation error.
    pub fn precondition(context: impl Into<String>) -> Self {
        Self::Precondition {
            context: context.into(),
        }
    }

    /// Build a sink error.
    pub fn sink(context: impl Into<String>) -> Self {
        Self::Sink {
            context: context.into(),
        }
    }

    /// Aggregate several errors, keeping the first as primary context.
    pub fn from_many(errors: Vec<FlowError>) -> Self {
        Self::Multiple {
            count: errors.len(),
            errors,
        }
    }
}

/// `Box<dyn Error>` isn't `Clone`; collapse it to its rendered message instead.
///
/// `EmitAborted` (in `flowkit-core`) derives `Clone` so a take-complete token
/// can be compared after the fact, which drags `FlowError` along for the ride.
impl Clone for FlowError {
    fn clone(&self) -> Self {
        match self {
            Self::User(e) => Self::Precondition {
                context: format!("user callback failed: {e}"),
            },
            Self::Precondition { context } => Self::Precondition {
                context: context.clone(),
            },
            Self::Sink { context } => Self::Sink {
                context: context.clone(),
            },
            Self::Multiple { count, errors } => Self::Multiple {
                count: *count,
                errors: errors.clone(),
            },
        }
    }
}

/// Specialized `Result` alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, FlowError>;
