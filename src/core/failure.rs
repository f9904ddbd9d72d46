//! Failure taxonomy and typed crash payloads.

use std::any::Any;

use thiserror::Error;

use crate::registry::{SurfaceId, SurfaceKind};

/// Recoverable failures observed by the orchestration core.
///
/// Configuration defects (unknown ids, catalog mismatches) are deliberately
/// not represented here: those panic at the call site.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("surface '{id}' ({kind}) crashed while rendering: {message}")]
    RenderCrash {
        id: SurfaceId,
        kind: SurfaceKind,
        message: String,
    },

    #[error("component load for surface '{id}' ({kind}) failed: {message}")]
    LoadFailed {
        id: SurfaceId,
        kind: SurfaceKind,
        message: String,
    },

    #[error("error toast displayed: {message}")]
    ErrorToast { message: String },
}

/// Where a reported error came from, for the error-logging collaborator.
#[derive(Clone, Copy, Debug)]
pub struct ErrorContext {
    pub surface: Option<SurfaceId>,
    pub kind: Option<SurfaceKind>,
    /// Short machine-readable site tag, e.g. `"render"` or `"toast-display"`.
    pub site: &'static str,
}

impl ErrorContext {
    pub fn surface(id: SurfaceId, kind: SurfaceKind, site: &'static str) -> Self {
        Self {
            surface: Some(id),
            kind: Some(kind),
            site,
        }
    }

    pub fn site(site: &'static str) -> Self {
        Self {
            surface: None,
            kind: None,
            site,
        }
    }
}

/// Retry hook attached to a crash by the failing component, typically
/// re-triggering the data fetch whose failure caused the crash.
///
/// Hooks must be `Send` because they cross the unwind boundary as part of the
/// panic payload.
pub type RetryHook = Box<dyn FnOnce() + Send>;

/// Typed panic payload for surface render failures.
///
/// Components raise this (via [`SurfaceFailure::raise`]) instead of a bare
/// string panic when they can attach context; the recovery boundary also
/// accepts plain `String`/`&str` panics and wraps anything else as an opaque
/// crash.
pub struct SurfaceFailure {
    message: String,
    retry: Option<RetryHook>,
}

impl SurfaceFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retry: None,
        }
    }

    pub fn with_retry(message: impl Into<String>, retry: impl FnOnce() + Send + 'static) -> Self {
        Self {
            message: message.into(),
            retry: Some(Box::new(retry)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn has_retry(&self) -> bool {
        self.retry.is_some()
    }

    pub(crate) fn take_retry(&mut self) -> Option<RetryHook> {
        self.retry.take()
    }

    /// Unwinds out of the surface with this failure as the payload.
    pub fn raise(self) -> ! {
        std::panic::panic_any(self)
    }

    /// Normalizes a caught panic payload into a failure description.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        match payload.downcast::<SurfaceFailure>() {
            Ok(failure) => *failure,
            Err(payload) => match payload.downcast::<String>() {
                Ok(message) => Self::new(*message),
                Err(payload) => match payload.downcast::<&'static str>() {
                    Ok(message) => Self::new(*message),
                    Err(_) => Self::new("surface panicked with a non-string payload"),
                },
            },
        }
    }
}

impl std::fmt::Debug for SurfaceFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceFailure")
            .field("message", &self.message)
            .field("retry", &self.retry.is_some())
            .finish()
    }
}
