//! Delivers events to the configured appenders
//!
//! `Dispatcher` is also a `log::Log`, so it can be installed as the global
//! logger for the `log` facade.

use log::{LevelFilter, Metadata, Record};
use std::cell::Cell;
use std::sync::Arc;
use thiserror::Error;

use crate::appender::Appender;
use crate::callable::Resolve;
use crate::config::Config;
use crate::error::{AppenderError, ConfigurationError, InvocationError};
use crate::event::LogEvent;
use crate::plugin::PluginManager;

/// An appender section that failed to build
#[derive(Debug, Clone)]
pub struct RejectedAppender {
    pub name: Option<String>,
    pub kind: String,
    pub error: AppenderError,
}

/// Appenders that propagated a failure for one event
#[derive(Debug, Error)]
#[error("{} appender(s) failed{}", .0.len(), first_failure(.0))]
pub struct DispatchError(Vec<InvocationError>);

impl DispatchError {
    /// Failures in appender order
    pub fn errors(&self) -> &[InvocationError] {
        &self.0
    }

    pub fn into_errors(self) -> Vec<InvocationError> {
        self.0
    }
}

fn first_failure(errors: &[InvocationError]) -> String {
    errors.first().map(|e| format!("; first: {}", e)).unwrap_or_default()
}

pub struct Dispatcher {
    level: LevelFilter,
    appenders: Vec<Arc<dyn Appender>>,
    rejected: Vec<RejectedAppender>,
}

impl Dispatcher {
    pub fn new(level: LevelFilter) -> Self {
        Self {
            level,
            appenders: Vec::new(),
            rejected: Vec::new(),
        }
    }

    /// Build every configured appender
    ///
    /// A section that fails is recorded in `rejected` and logged; the rest
    /// are still attached.
    pub fn from_config(config: &Config, plugins: &PluginManager, resolver: &dyn Resolve) -> Self {
        let mut dispatcher = Self::new(config.root.level.as_filter());
        let refs = &config.root.appender_refs;

        for section in &config.appenders {
            let built = plugins.create_appender(section, resolver);
            let attached = built.and_then(|appender| {
                if refs.is_empty() || refs.iter().any(|r| r == appender.name()) {
                    dispatcher.add(appender).map_err(AppenderError::from)
                } else {
                    log::debug!("Appender '{}' is not referenced by root, skipping", appender.name());
                    Ok(())
                }
            });

            if let Err(error) = attached {
                log::error!(
                    "Appender '{}' ({}) rejected: {}",
                    section.name.as_deref().unwrap_or("<unnamed>"),
                    section.kind,
                    error
                );
                dispatcher.rejected.push(RejectedAppender {
                    name: section.name.clone(),
                    kind: section.kind.clone(),
                    error,
                });
            }
        }

        for name in refs {
            if !config.appenders.iter().any(|s| s.name.as_deref() == Some(name.as_str())) {
                log::warn!("Root references unknown appender '{}'", name);
            }
        }

        dispatcher
    }

    /// Attach an appender; names must be unique
    pub fn add(&mut self, appender: Arc<dyn Appender>) -> Result<(), ConfigurationError> {
        if self.appenders.iter().any(|a| a.name() == appender.name()) {
            return Err(ConfigurationError::DuplicateName(appender.name().to_string()));
        }
        self.appenders.push(appender);
        Ok(())
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    pub fn appender_names(&self) -> Vec<&str> {
        self.appenders.iter().map(|a| a.name()).collect()
    }

    pub fn rejected(&self) -> &[RejectedAppender] {
        &self.rejected
    }

    /// Deliver one event to every appender, in order
    ///
    /// Every appender sees the event even if an earlier one fails.
    pub fn dispatch(&self, event: &LogEvent) -> Result<(), DispatchError> {
        if event.level > self.level {
            return Ok(());
        }

        let errors: Vec<InvocationError> = self
            .appenders
            .iter()
            .filter_map(|appender| appender.append(event).err())
            .collect();

        if errors.is_empty() { Ok(()) } else { Err(DispatchError(errors)) }
    }

    /// Install as the global `log` logger
    pub fn install(self) -> Result<(), log::SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }
}

thread_local! {
    static DISPATCHING: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as inside `Dispatcher::log`
struct ReentrancyGuard;

impl ReentrancyGuard {
    fn enter() -> Option<Self> {
        DISPATCHING.with(|flag| if flag.replace(true) { None } else { Some(ReentrancyGuard) })
    }
}

impl Drop for ReentrancyGuard {
    fn drop(&mut self) {
        DISPATCHING.with(|flag| flag.set(false));
    }
}

impl log::Log for Dispatcher {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    /// Records logged from inside an appender on the same thread are dropped.
    /// A propagated sink failure panics, since `log` has no error channel.
    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let Some(_guard) = ReentrancyGuard::enter() else {
            return;
        };

        if let Err(e) = self.dispatch(&LogEvent::from(record)) {
            panic!("{}", e);
        }
    }

    fn flush(&self) {}
}
