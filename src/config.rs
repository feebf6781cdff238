use eyre::{Context, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::ConfigurationError;
use crate::filter::{CompositeFilter, Filter, FilterDecision, RegexFilter, ThresholdFilter};
use crate::layout::{JsonLayout, Layout, PatternLayout};

pub const DEFAULT_PATTERN: &str = "%d [%p] %c - %m";

/// Main flog configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Level for flog's own diagnostics
    pub status: LogLevel,
    pub appenders: Vec<AppenderSection>,
    pub root: RootConfig,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Off => LevelFilter::Off,
        }
    }
}

/// One appender as written in the config file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppenderSection {
    /// Plugin key or display name, e.g. `fn`
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub name: Option<String>,

    /// Callable identifier, `namespace/name`
    #[serde(default, rename = "fn")]
    pub callable: Option<String>,

    #[serde(default)]
    pub layout: Option<LayoutConfig>,

    #[serde(default)]
    pub filters: Vec<FilterConfig>,

    #[serde(default = "default_true")]
    pub ignore_exceptions: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayoutConfig {
    Pattern {
        #[serde(default = "default_pattern")]
        pattern: String,
    },
    Json,
}

fn default_pattern() -> String {
    DEFAULT_PATTERN.to_string()
}

impl LayoutConfig {
    pub fn build(&self) -> Result<Arc<dyn Layout>, ConfigurationError> {
        Ok(match self {
            LayoutConfig::Pattern { pattern } => Arc::new(PatternLayout::new(pattern)?),
            LayoutConfig::Json => Arc::new(JsonLayout),
        })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FilterConfig {
    Threshold {
        level: LogLevel,
    },
    Regex {
        regex: String,
        #[serde(default = "default_on_match")]
        on_match: FilterDecision,
    },
}

fn default_on_match() -> FilterDecision {
    FilterDecision::Accept
}

impl FilterConfig {
    pub fn build(&self) -> Result<Box<dyn Filter>, ConfigurationError> {
        Ok(match self {
            FilterConfig::Threshold { level } => Box::new(ThresholdFilter::new(level.as_filter())),
            FilterConfig::Regex { regex, on_match } => Box::new(RegexFilter::new(regex, *on_match)?),
        })
    }
}

impl AppenderSection {
    /// Build the section's filters; several filters become one composite
    pub fn build_filter(&self) -> Result<Option<Arc<dyn Filter>>, ConfigurationError> {
        match self.filters.as_slice() {
            [] => Ok(None),
            [single] => Ok(Some(Arc::from(single.build()?))),
            many => {
                let mut composite = CompositeFilter::new();
                for filter in many {
                    composite.push(filter.build()?);
                }
                Ok(Some(Arc::new(composite)))
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RootConfig {
    pub level: LogLevel,
    /// Appenders receiving events; empty means all of them
    pub appender_refs: Vec<String>,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            appender_refs: Vec::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            status: LogLevel::Warn,
            appenders: vec![AppenderSection {
                kind: "fn".to_string(),
                name: Some("console".to_string()),
                callable: Some("flog.sink/stdout".to_string()),
                layout: Some(LayoutConfig::Pattern {
                    pattern: DEFAULT_PATTERN.to_string(),
                }),
                filters: Vec::new(),
                ignore_exceptions: true,
            }],
            root: RootConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            let path = Self::expand_path(path);
            return Self::load_from_file(&path).context(format!("Failed to load config from {}", path.display()));
        }

        // Check FLOG_CONFIG env var
        if let Ok(env_path) = std::env::var("FLOG_CONFIG") {
            let path = Self::expand_path(Path::new(&env_path));
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from FLOG_CONFIG: {}", e);
                    }
                }
            }
        }

        // Try ~/.config/flog/flog.yaml
        if let Some(config_dir) = dirs::config_dir() {
            let path = config_dir.join("flog").join("flog.yaml");
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", path.display(), e);
                    }
                }
            }
        }

        // Try ./flog.yaml (for development)
        let local_config = PathBuf::from("flog.yaml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load local config: {}", e);
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config = Self::from_str(&content)?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Parse a configuration from a YAML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Expand a path that may contain ~ or env vars
    pub fn expand_path(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        let expanded = shellexpand::full(&path_str).unwrap_or_else(|_| path_str.clone());
        PathBuf::from(expanded.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::LogEvent;
    use log::Level;
    use tempfile::tempdir;

    const FULL_CONFIG: &str = r#"
status: debug
appenders:
  - type: fn
    name: clj
    fn: myapp.sink/write-line
    ignore_exceptions: false
    layout:
      type: pattern
      pattern: "%p %m"
    filters:
      - type: threshold
        level: info
      - type: regex
        regex: "^health"
        on_match: deny
  - type: Fn
    name: json
    fn: flog.sink/discard
    layout:
      type: json
root:
  level: debug
  appender_refs: [clj]
"#;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.status, LogLevel::Warn);
        assert_eq!(config.appenders.len(), 1);
        assert_eq!(config.appenders[0].callable.as_deref(), Some("flog.sink/stdout"));
        assert_eq!(config.root.level, LogLevel::Info);
        assert!(config.root.appender_refs.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let config = Config::from_str(FULL_CONFIG).unwrap();
        assert_eq!(config.status, LogLevel::Debug);
        assert_eq!(config.appenders.len(), 2);

        let clj = &config.appenders[0];
        assert_eq!(clj.kind, "fn");
        assert_eq!(clj.name.as_deref(), Some("clj"));
        assert_eq!(clj.callable.as_deref(), Some("myapp.sink/write-line"));
        assert!(!clj.ignore_exceptions);
        assert_eq!(
            clj.layout,
            Some(LayoutConfig::Pattern {
                pattern: "%p %m".to_string()
            })
        );
        assert_eq!(clj.filters.len(), 2);

        let json = &config.appenders[1];
        assert!(json.ignore_exceptions);
        assert_eq!(json.layout, Some(LayoutConfig::Json));
        assert_eq!(config.root.appender_refs, vec!["clj".to_string()]);
    }

    #[test]
    fn test_missing_fields_stay_empty() {
        let config = Config::from_str("appenders:\n  - type: fn\n").unwrap();
        let section = &config.appenders[0];
        assert!(section.name.is_none());
        assert!(section.callable.is_none());
        assert!(section.layout.is_none());
    }

    #[test]
    fn test_section_filters_build() {
        let config = Config::from_str(FULL_CONFIG).unwrap();
        let filter = config.appenders[0].build_filter().unwrap().unwrap();

        use crate::filter::FilterDecision::*;
        assert_eq!(filter.decide(&LogEvent::new(Level::Info, "a", "user login")), Accept);
        assert_eq!(filter.decide(&LogEvent::new(Level::Info, "a", "healthcheck")), Deny);
        assert_eq!(filter.decide(&LogEvent::new(Level::Debug, "a", "user login")), Deny);

        assert!(config.appenders[1].build_filter().unwrap().is_none());
    }

    #[test]
    fn test_pattern_default() {
        let layout: LayoutConfig = serde_yaml::from_str("type: pattern").unwrap();
        assert_eq!(
            layout,
            LayoutConfig::Pattern {
                pattern: DEFAULT_PATTERN.to_string()
            }
        );
    }

    #[test]
    fn test_invalid_pattern_fails_build() {
        let layout = LayoutConfig::Pattern {
            pattern: "%zz".to_string(),
        };
        assert!(layout.build().is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("flog.yaml");
        fs::write(&path, FULL_CONFIG).unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.appenders.len(), 2);
    }

    #[test]
    fn test_load_explicit_missing_path_fails() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("missing.yaml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_expand_path_no_expansion() {
        let path = PathBuf::from("/usr/local/bin");
        let expanded = Config::expand_path(&path);
        assert_eq!(expanded, PathBuf::from("/usr/local/bin"));
    }

    #[test]
    fn test_expand_path_with_env_var() {
        // SAFETY: Test runs single-threaded, env var is test-specific
        unsafe {
            std::env::set_var("FLOG_TEST_VAR", "/custom/path");
        }
        let path = PathBuf::from("$FLOG_TEST_VAR/flog.yaml");
        let expanded = Config::expand_path(&path);
        assert_eq!(expanded, PathBuf::from("/custom/path/flog.yaml"));
        unsafe {
            std::env::remove_var("FLOG_TEST_VAR");
        }
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = Config::from_str(FULL_CONFIG).unwrap();
        let yaml_str = serde_yaml::to_string(&config).expect("Failed to serialize");
        let parsed = Config::from_str(&yaml_str).expect("Failed to deserialize");
        assert_eq!(parsed.appenders.len(), config.appenders.len());
        assert_eq!(parsed.appenders[0].filters, config.appenders[0].filters);
    }
}
