//! Appender that hands each formatted line to a callable resolved by name
//!
//! The callable is resolved once, when the appender is built. An appender
//! whose callable could not be resolved is never constructed, so `append`
//! always has something to call.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use super::error_handler::{DefaultErrorHandler, ErrorHandler};
use super::{Appender, ExceptionPolicy};
use crate::callable::{Callable, Resolve};
use crate::config::AppenderSection;
use crate::error::{AppenderError, ConfigurationError, InvocationError, ResolutionError, SinkError};
use crate::event::LogEvent;
use crate::filter::{Filter, FilterDecision};
use crate::layout::Layout;

/// Validated, immutable appender settings
#[derive(Clone)]
pub struct AppenderConfig {
    pub name: String,
    pub callable_identifier: String,
    pub layout: Arc<dyn Layout>,
    pub filter: Option<Arc<dyn Filter>>,
    pub exception_policy: ExceptionPolicy,
}

impl fmt::Debug for AppenderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppenderConfig")
            .field("name", &self.name)
            .field("callable_identifier", &self.callable_identifier)
            .field("has_filter", &self.filter.is_some())
            .field("exception_policy", &self.exception_policy)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct DynamicSinkAppenderBuilder {
    name: Option<String>,
    callable_identifier: Option<String>,
    layout: Option<Arc<dyn Layout>>,
    filter: Option<Arc<dyn Filter>>,
    exception_policy: ExceptionPolicy,
    error_handler: Option<Arc<dyn ErrorHandler>>,
}

impl DynamicSinkAppenderBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn callable_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.callable_identifier = Some(identifier.into());
        self
    }

    pub fn layout(self, layout: impl Layout + 'static) -> Self {
        self.shared_layout(Arc::new(layout))
    }

    pub fn shared_layout(mut self, layout: Arc<dyn Layout>) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn filter(self, filter: impl Filter + 'static) -> Self {
        self.shared_filter(Arc::new(filter))
    }

    pub fn shared_filter(mut self, filter: Arc<dyn Filter>) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn exception_policy(mut self, policy: ExceptionPolicy) -> Self {
        self.exception_policy = policy;
        self
    }

    pub fn error_handler(mut self, handler: Arc<dyn ErrorHandler>) -> Self {
        self.error_handler = Some(handler);
        self
    }

    /// Validate, then resolve the callable identifier through `resolver`
    pub fn build<R: Resolve + ?Sized>(self, resolver: &R) -> Result<DynamicSinkAppender, AppenderError> {
        let (config, error_handler) = self.validate()?;
        let callable = resolver.resolve(&config.callable_identifier)?;
        Ok(DynamicSinkAppender::assemble(config, callable, error_handler))
    }

    /// Validate, then use a callable the caller already resolved
    pub fn build_with(
        self,
        resolved: Result<Callable, ResolutionError>,
    ) -> Result<DynamicSinkAppender, AppenderError> {
        let (config, error_handler) = self.validate()?;
        Ok(DynamicSinkAppender::assemble(config, resolved?, error_handler))
    }

    fn validate(self) -> Result<(AppenderConfig, Arc<dyn ErrorHandler>), ConfigurationError> {
        let name = non_empty(self.name).ok_or(ConfigurationError::MissingName)?;
        let callable_identifier =
            non_empty(self.callable_identifier).ok_or(ConfigurationError::MissingCallableIdentifier)?;
        let layout = self.layout.ok_or(ConfigurationError::MissingFormatter)?;

        let config = AppenderConfig {
            name,
            callable_identifier,
            layout,
            filter: self.filter,
            exception_policy: self.exception_policy,
        };
        let error_handler = self
            .error_handler
            .unwrap_or_else(|| Arc::new(DefaultErrorHandler::new()));

        Ok((config, error_handler))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Formats events and passes each line to a resolved callable
pub struct DynamicSinkAppender {
    config: AppenderConfig,
    callable: Callable,
    error_handler: Arc<dyn ErrorHandler>,
}

impl DynamicSinkAppender {
    pub fn builder() -> DynamicSinkAppenderBuilder {
        DynamicSinkAppenderBuilder::default()
    }

    fn assemble(config: AppenderConfig, callable: Callable, error_handler: Arc<dyn ErrorHandler>) -> Self {
        log::debug!(
            "Appender '{}' bound to {} ({:?})",
            config.name,
            callable.identifier(),
            config.exception_policy
        );
        Self {
            config,
            callable,
            error_handler,
        }
    }

    /// Plugin factory: build from a configuration section
    ///
    /// Name and identifier are checked before the layout and filters are
    /// parsed, so a section fails on the same field the builder would.
    pub fn factory(section: &AppenderSection, resolver: &dyn Resolve) -> Result<Arc<dyn Appender>, AppenderError> {
        let name = non_empty(section.name.clone()).ok_or(ConfigurationError::MissingName)?;
        let identifier =
            non_empty(section.callable.clone()).ok_or(ConfigurationError::MissingCallableIdentifier)?;

        let mut builder = Self::builder()
            .name(name)
            .callable_identifier(identifier)
            .exception_policy(ExceptionPolicy::from(section.ignore_exceptions));

        if let Some(layout) = &section.layout {
            builder = builder.shared_layout(layout.build()?);
        }
        if let Some(filter) = section.build_filter()? {
            builder = builder.shared_filter(filter);
        }

        Ok(Arc::new(builder.build(resolver)?))
    }

    pub fn config(&self) -> &AppenderConfig {
        &self.config
    }

    pub fn callable_identifier(&self) -> &str {
        &self.config.callable_identifier
    }

    pub fn exception_policy(&self) -> ExceptionPolicy {
        self.config.exception_policy
    }

    fn invoke(&self, line: &str) -> Result<(), SinkError> {
        panic::catch_unwind(AssertUnwindSafe(|| self.callable.invoke(line)))
            .unwrap_or_else(|payload| Err(panic_message(payload).into()))
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    let detail = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    };
    format!("callable panicked: {}", detail)
}

impl Appender for DynamicSinkAppender {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn append(&self, event: &LogEvent) -> Result<(), InvocationError> {
        if let Some(filter) = &self.config.filter {
            if filter.decide(event) == FilterDecision::Deny {
                return Ok(());
            }
        }

        let line = self.config.layout.render(event);

        match self.invoke(&line) {
            Ok(()) => Ok(()),
            Err(source) => {
                let err = InvocationError {
                    appender: self.config.name.clone(),
                    identifier: self.callable.identifier().to_string(),
                    source,
                };
                match self.config.exception_policy {
                    ExceptionPolicy::Ignore => {
                        self.error_handler.error(&err);
                        Ok(())
                    }
                    ExceptionPolicy::Propagate => Err(err),
                }
            }
        }
    }
}

impl fmt::Debug for DynamicSinkAppender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicSinkAppender")
            .field("config", &self.config)
            .field("callable", &self.callable)
            .finish_non_exhaustive()
    }
}
