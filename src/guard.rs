//! Cancellation-safe execution
//!
//! Wraps a computation so that host cancellation always propagates, while any
//! other failure (an error or a panic) degrades to a caller-chosen default.

use std::panic::{self, AssertUnwindSafe};

use tokio_util::sync::CancellationToken;

use crate::error::{Cancelled, ResolveError, ResolveResult};

/// Run `f`, keeping cancellation and swallowing everything else into `default`.
pub fn cancellation_safe<T>(
    default: T,
    f: impl FnOnce() -> ResolveResult<T>,
) -> Result<T, Cancelled> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => match err.into_cancelled() {
            Ok(cancelled) => Err(cancelled),
            Err(err) => {
                tracing::debug!("degrading to default after failure: {err}");
                Ok(default)
            }
        },
        Err(payload) => {
            if payload.downcast_ref::<Cancelled>().is_some() {
                return Err(Cancelled);
            }
            tracing::debug!("degrading to default after panic: {}", panic_message(payload.as_ref()));
            Ok(default)
        }
    }
}

/// Same as [`cancellation_safe`] but keeps the error type of the resolver so it
/// can be used with `?` inside resolution code.
pub fn recover<T>(default: T, f: impl FnOnce() -> ResolveResult<T>) -> ResolveResult<T> {
    cancellation_safe(default, f).map_err(ResolveError::from)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

/// Cooperative cancellation checks threaded through one resolution.
#[derive(Debug, Clone, Default)]
pub struct ResolveContext {
    token: CancellationToken,
}

impl ResolveContext {
    pub fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// A context that is never cancelled.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Abort the current resolution if the host has cancelled it.
    pub fn checkpoint(&self) -> ResolveResult<()> {
        if self.token.is_cancelled() {
            Err(Cancelled.into())
        } else {
            Ok(())
        }
    }
}
