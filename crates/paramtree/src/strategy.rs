//! Pluggable handling of type errors.
//!
//! Every decode or ingestion mismatch is funneled through a
//! [`TypeErrorStrategy`]. The strategy decides whether the mismatch is only
//! reported (decoding then degrades to "absent") or aborts the operation by
//! returning a [`TypeError`] that callers propagate with `?`.

use crate::param::Param;
use once_cell::sync::Lazy;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::Level;

/// A reported mismatch between a parameter and the requested shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parameter {path} has wrong type: {message}")]
pub struct TypeError {
    /// Rendered path of the offending parameter.
    pub path: String,
    pub message: String,
}

impl TypeError {
    pub fn new(param: &Param<'_>, message: impl Into<String>) -> Self {
        Self {
            path: param.path().to_string(),
            message: message.into(),
        }
    }
}

/// Callback invoked with the parameter at the point of failure and a
/// human-readable message.
///
/// Returning `Ok(())` lets the caller continue (the failed decode yields
/// absence); returning `Err` aborts the surrounding decode. Strategies are
/// shared between threads, so implementations guard their own state.
pub trait TypeErrorStrategy: Send + Sync {
    fn on_type_error(&self, param: &Param<'_>, message: &str) -> Result<(), TypeError>;
}

impl<F> TypeErrorStrategy for F
where
    F: Fn(&Param<'_>, &str) -> Result<(), TypeError> + Send + Sync,
{
    fn on_type_error(&self, param: &Param<'_>, message: &str) -> Result<(), TypeError> {
        self(param, message)
    }
}

/// Shared handle to a strategy, as carried by parameters.
pub type SharedStrategy = Arc<dyn TypeErrorStrategy>;

/// Logs at [`Level::WARN`] and continues. The default strategy.
pub static LOG_TYPE_ERROR: Lazy<SharedStrategy> = Lazy::new(|| Arc::new(LogTypeError::default()));

/// Aborts the surrounding decode with a [`TypeError`].
pub static FAIL_ON_TYPE_ERROR: Lazy<SharedStrategy> = Lazy::new(|| Arc::new(FailOnTypeError));

/// Logs each mismatch through `tracing` at a configurable level.
#[derive(Debug, Clone, Copy)]
pub struct LogTypeError {
    level: Level,
}

impl LogTypeError {
    pub const fn new(level: Level) -> Self {
        Self { level }
    }

    pub fn level(&self) -> Level {
        self.level
    }
}

impl Default for LogTypeError {
    fn default() -> Self {
        Self::new(Level::WARN)
    }
}

impl TypeErrorStrategy for LogTypeError {
    fn on_type_error(&self, param: &Param<'_>, message: &str) -> Result<(), TypeError> {
        let error = TypeError::new(param, message);
        // tracing needs the level at compile time
        if self.level == Level::ERROR {
            tracing::error!("{}", error);
        } else if self.level == Level::WARN {
            tracing::warn!("{}", error);
        } else if self.level == Level::INFO {
            tracing::info!("{}", error);
        } else if self.level == Level::DEBUG {
            tracing::debug!("{}", error);
        } else {
            tracing::trace!("{}", error);
        }
        Ok(())
    }
}

/// Turns every mismatch into an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailOnTypeError;

impl TypeErrorStrategy for FailOnTypeError {
    fn on_type_error(&self, param: &Param<'_>, message: &str) -> Result<(), TypeError> {
        Err(TypeError::new(param, message))
    }
}

/// Records every mismatch and continues.
///
/// Useful when all problems of a configuration should be shown at once
/// instead of stopping at the first one.
#[derive(Debug, Default)]
pub struct CollectTypeErrors {
    errors: Mutex<Vec<TypeError>>,
}

impl CollectTypeErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors recorded so far, oldest first.
    pub fn errors(&self) -> Vec<TypeError> {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes and returns the recorded errors.
    pub fn take(&self) -> Vec<TypeError> {
        std::mem::take(&mut *self.errors.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl TypeErrorStrategy for CollectTypeErrors {
    fn on_type_error(&self, param: &Param<'_>, message: &str) -> Result<(), TypeError> {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(TypeError::new(param, message));
        Ok(())
    }
}
