//! Error types shared by appenders, the callable registry and the host
//!
//! Construction failures (`ConfigurationError`, `ResolutionError`) never
//! yield an appender. `InvocationError` is the only per-event error.

use thiserror::Error;

/// Error returned by a sink callable
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Result returned by a sink callable
pub type SinkResult = Result<(), SinkError>;

/// A required construction parameter is missing or invalid
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("missing name")]
    MissingName,

    #[error("missing callable identifier")]
    MissingCallableIdentifier,

    #[error("missing formatter")]
    MissingFormatter,

    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    #[error("unknown plugin type '{0}'")]
    UnknownPlugin(String),

    #[error("plugin '{0}' has no factory bound")]
    UnboundPlugin(String),

    #[error("duplicate appender name '{0}'")]
    DuplicateName(String),
}

/// A callable identifier could not be turned into a callable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("malformed callable identifier '{0}': expected 'namespace/name'")]
    MalformedIdentifier(String),

    #[error("unknown namespace '{namespace}' while resolving '{identifier}'")]
    UnknownNamespace { identifier: String, namespace: String },

    #[error("no callable named '{0}'")]
    UnknownCallable(String),
}

/// Failure while building an appender
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppenderError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

/// The resolved callable failed while handling one event
#[derive(Debug, Error)]
#[error("appender '{appender}' failed invoking '{identifier}': {source}")]
pub struct InvocationError {
    pub appender: String,
    pub identifier: String,
    #[source]
    pub source: SinkError,
}
