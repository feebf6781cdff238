//! Appenders receive events from the host and forward them somewhere

use serde::{Deserialize, Serialize};

pub mod dynamic_sink;
pub mod error_handler;

pub use dynamic_sink::{AppenderConfig, DynamicSinkAppender, DynamicSinkAppenderBuilder};
pub use error_handler::{DefaultErrorHandler, ErrorHandler};

use crate::error::InvocationError;
use crate::event::LogEvent;

/// A destination for log events
///
/// `append` may be called concurrently from any number of threads.
pub trait Appender: Send + Sync {
    fn name(&self) -> &str;

    fn append(&self, event: &LogEvent) -> Result<(), InvocationError>;
}

/// What to do when a sink fails while handling an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExceptionPolicy {
    /// Report to the error handler and carry on
    #[default]
    Ignore,
    /// Return the error to the caller
    Propagate,
}

impl From<bool> for ExceptionPolicy {
    /// Maps an `ignore_exceptions` flag
    fn from(ignore: bool) -> Self {
        if ignore { Self::Ignore } else { Self::Propagate }
    }
}
