//! Host-side plugin management
//!
//! This module handles:
//! - Loading plugin entries from a `PluginService`
//! - Binding factories to the entries' class names
//! - Creating appenders from configuration sections

use std::collections::HashMap;
use std::sync::Arc;

pub mod manifest;

use crate::appender::{Appender, DynamicSinkAppender};
use crate::callable::Resolve;
use crate::config::AppenderSection;
use crate::error::{AppenderError, ConfigurationError};
use manifest::{ElementType, FN_APPENDER_CLASS, FnAppenderPlugin, PluginEntry, PluginService};

/// Builds an appender from its configuration section
pub type AppenderFactory = fn(&AppenderSection, &dyn Resolve) -> Result<Arc<dyn Appender>, AppenderError>;

/// Plugin manager responsible for plugin lookup and instantiation
#[derive(Default)]
pub struct PluginManager {
    entries: Vec<PluginEntry>,
    factories: HashMap<&'static str, AppenderFactory>,
}

impl PluginManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// A manager with this crate's plugins loaded and bound
    pub fn with_defaults() -> Self {
        let mut manager = Self::new();
        manager.load(&FnAppenderPlugin);
        manager.bind(FN_APPENDER_CLASS, DynamicSinkAppender::factory);
        manager
    }

    /// Add every entry of a plugin service, returning how many were new
    pub fn load(&mut self, service: &dyn PluginService) -> usize {
        let mut count = 0;
        for entry in service.entries() {
            let duplicate = self
                .entries
                .iter()
                .any(|e| e.element_type == entry.element_type && e.key.eq_ignore_ascii_case(entry.key));
            if duplicate {
                log::warn!("Duplicate {} plugin key '{}' ignored", entry.element_type, entry.key);
                continue;
            }
            log::debug!("Loaded {} plugin '{}' ({})", entry.element_type, entry.name, entry.class_name);
            self.entries.push(*entry);
            count += 1;
        }
        count
    }

    /// Bind a factory to a class name
    pub fn bind(&mut self, class_name: &'static str, factory: AppenderFactory) {
        self.factories.insert(class_name, factory);
    }

    /// Find an appender entry by key or display name
    pub fn entry(&self, kind: &str) -> Option<&PluginEntry> {
        self.entries.iter().find(|e| {
            e.element_type == ElementType::Appender
                && (e.key.eq_ignore_ascii_case(kind) || e.name.eq_ignore_ascii_case(kind))
        })
    }

    /// List all loaded entries
    pub fn list(&self) -> impl Iterator<Item = &PluginEntry> {
        self.entries.iter()
    }

    /// Instantiate the appender a section describes
    pub fn create_appender(
        &self,
        section: &AppenderSection,
        resolver: &dyn Resolve,
    ) -> Result<Arc<dyn Appender>, AppenderError> {
        let entry = self
            .entry(&section.kind)
            .ok_or_else(|| ConfigurationError::UnknownPlugin(section.kind.clone()))?;
        let factory = self
            .factories
            .get(entry.class_name)
            .ok_or_else(|| ConfigurationError::UnboundPlugin(entry.name.to_string()))?;
        factory(section, resolver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callable::CallableRegistry;
    use crate::config::{Config, LayoutConfig};

    fn section(kind: &str) -> AppenderSection {
        AppenderSection {
            kind: kind.to_string(),
            name: Some("clj".to_string()),
            callable: Some("ns/sink".to_string()),
            layout: Some(LayoutConfig::Json),
            filters: Vec::new(),
            ignore_exceptions: true,
        }
    }

    fn registry() -> CallableRegistry {
        let registry = CallableRegistry::new();
        registry.register("ns/sink", |_| Ok(())).unwrap();
        registry
    }

    #[test]
    fn test_with_defaults_lists_fn_appender() {
        let manager = PluginManager::with_defaults();
        let keys: Vec<&str> = manager.list().map(|e| e.key).collect();
        assert_eq!(keys, vec!["fn"]);
    }

    #[test]
    fn test_entry_lookup_is_case_insensitive() {
        let manager = PluginManager::with_defaults();
        assert!(manager.entry("fn").is_some());
        assert!(manager.entry("FN").is_some());
        assert!(manager.entry("Fn").is_some());
        assert!(manager.entry("file").is_none());
    }

    #[test]
    fn test_load_skips_duplicates() {
        let mut manager = PluginManager::with_defaults();
        assert_eq!(manager.load(&FnAppenderPlugin), 0);
        assert_eq!(manager.list().count(), 1);
    }

    #[test]
    fn test_create_appender() {
        let manager = PluginManager::with_defaults();
        let appender = manager.create_appender(&section("Fn"), &registry()).unwrap();
        assert_eq!(appender.name(), "clj");
    }

    #[test]
    fn test_create_unknown_plugin() {
        let manager = PluginManager::with_defaults();
        let err = manager.create_appender(&section("kafka"), &registry()).err().unwrap();
        assert_eq!(
            err,
            AppenderError::Configuration(ConfigurationError::UnknownPlugin("kafka".to_string()))
        );
    }

    #[test]
    fn test_create_unbound_plugin() {
        let mut manager = PluginManager::new();
        manager.load(&FnAppenderPlugin);
        let err = manager.create_appender(&section("fn"), &registry()).err().unwrap();
        assert_eq!(
            err,
            AppenderError::Configuration(ConfigurationError::UnboundPlugin("Fn".to_string()))
        );
    }

    #[test]
    fn test_create_from_default_config() {
        let manager = PluginManager::with_defaults();
        let config = Config::default();
        let appender = manager
            .create_appender(&config.appenders[0], crate::callable::global())
            .unwrap();
        assert_eq!(appender.name(), "console");
    }
}
