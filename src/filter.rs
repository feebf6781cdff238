//! Filters decide whether an appender handles an event

use log::LevelFilter;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::event::LogEvent;

/// Outcome of a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterDecision {
    Accept,
    Deny,
}

impl FilterDecision {
    /// The other decision
    pub fn invert(self) -> Self {
        match self {
            Self::Accept => Self::Deny,
            Self::Deny => Self::Accept,
        }
    }
}

pub trait Filter: Send + Sync {
    fn decide(&self, event: &LogEvent) -> FilterDecision;
}

impl<F> Filter for F
where
    F: Fn(&LogEvent) -> FilterDecision + Send + Sync,
{
    fn decide(&self, event: &LogEvent) -> FilterDecision {
        self(event)
    }
}

/// Accepts events at `level` or more severe
#[derive(Debug, Clone, Copy)]
pub struct ThresholdFilter {
    level: LevelFilter,
}

impl ThresholdFilter {
    pub fn new(level: LevelFilter) -> Self {
        Self { level }
    }
}

impl Filter for ThresholdFilter {
    fn decide(&self, event: &LogEvent) -> FilterDecision {
        if event.level <= self.level {
            FilterDecision::Accept
        } else {
            FilterDecision::Deny
        }
    }
}

/// Matches the rendered message against a regex
#[derive(Debug, Clone)]
pub struct RegexFilter {
    regex: Regex,
    on_match: FilterDecision,
}

impl RegexFilter {
    pub fn new(pattern: &str, on_match: FilterDecision) -> Result<Self, ConfigurationError> {
        let regex = Regex::new(pattern)
            .map_err(|e| ConfigurationError::InvalidFilter(format!("bad regex '{}': {}", pattern, e)))?;
        Ok(Self { regex, on_match })
    }
}

impl Filter for RegexFilter {
    fn decide(&self, event: &LogEvent) -> FilterDecision {
        if self.regex.is_match(&event.message) {
            self.on_match
        } else {
            self.on_match.invert()
        }
    }
}

/// Runs filters in order; the first `Deny` wins
#[derive(Default)]
pub struct CompositeFilter {
    filters: Vec<Box<dyn Filter>>,
}

impl CompositeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn push(&mut self, filter: Box<dyn Filter>) {
        self.filters.push(filter);
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl Filter for CompositeFilter {
    fn decide(&self, event: &LogEvent) -> FilterDecision {
        if self.filters.iter().any(|f| f.decide(event) == FilterDecision::Deny) {
            FilterDecision::Deny
        } else {
            FilterDecision::Accept
        }
    }
}
