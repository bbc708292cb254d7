//! Error types for waypost.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`RouteError`] - Errors from route templates and reverse lookup
//! - [`CallbackError`] - Errors from naming callbacks
//! - [`ListenerError`] - A listener invocation that failed or panicked

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur when working with route templates.
///
/// Failing to match a request is never an error; it resolves to the
/// router's not-found action instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// The compiled pattern of a template is not a valid regular expression.
    #[error("invalid pattern for route `{template}`: {reason}")]
    InvalidPattern {
        /// The template as registered.
        template: String,
        /// Compiler message.
        reason: String,
    },

    /// No route carries the requested name.
    #[error("no route named `{0}`")]
    UnknownRoute(String),

    /// A parameter needed to build a path was not supplied.
    #[error("route `{template}` requires parameter `{param}`")]
    MissingParam {
        /// The template being filled.
        template: String,
        /// The missing parameter name.
        param: String,
    },

    /// A supplied value does not satisfy the placeholder constraint.
    #[error("value `{value}` for parameter `{param}` of route `{template}` does not satisfy its constraint")]
    ParamMismatch {
        /// The template being filled.
        template: String,
        /// The parameter name.
        param: String,
        /// The rejected value.
        value: String,
    },
}

/// Errors that can occur when naming callbacks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallbackError {
    /// The name is not a `::`-separated path of identifiers.
    #[error("invalid callback name: `{0}`")]
    InvalidName(String),

    /// A callback with this name is already registered.
    #[error("callback `{0}` is already registered")]
    Duplicate(String),
}

/// A single listener invocation that did not complete.
#[derive(Error, Debug)]
pub enum ListenerError {
    /// The listener returned an error.
    #[error("listener failed: {0}")]
    Failed(#[source] BoxError),

    /// The listener panicked.
    #[error("listener panicked: {0}")]
    Panic(String),
}

impl From<BoxError> for ListenerError {
    fn from(err: BoxError) -> Self {
        ListenerError::Failed(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_error_from_boxed_error() {
        let boxed: BoxError = "connection reset".into();
        let err = ListenerError::from(boxed);
        assert!(matches!(err, ListenerError::Failed(_)));
        assert_eq!(err.to_string(), "listener failed: connection reset");
    }
}
