//! Static plugin descriptors
//!
//! Pure metadata: a host reads these once at startup to learn which
//! element types this crate provides and under which keys.

use serde::Serialize;

/// Kind of configuration element a plugin provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Appender,
    Layout,
    Filter,
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ElementType::Appender => "appender",
            ElementType::Layout => "layout",
            ElementType::Filter => "filter",
        };
        f.write_str(s)
    }
}

/// One entry in a plugin table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PluginEntry {
    /// Lookup key used in configuration (matched case-insensitively)
    pub key: &'static str,
    /// Path of the implementing type; hosts bind factories to it
    pub class_name: &'static str,
    /// Display name
    pub name: &'static str,
    pub namespace: &'static str,
    pub element_type: ElementType,
}

/// A source of plugin entries
pub trait PluginService {
    fn entries(&self) -> &'static [PluginEntry];
}

/// Descriptor for [`DynamicSinkAppender`](crate::appender::DynamicSinkAppender)
#[derive(Debug, Clone, Copy, Default)]
pub struct FnAppenderPlugin;

pub const FN_APPENDER_CLASS: &str = "flog::appender::DynamicSinkAppender";

static FN_APPENDER_ENTRIES: [PluginEntry; 1] = [PluginEntry {
    key: "fn",
    class_name: FN_APPENDER_CLASS,
    name: "Fn",
    namespace: "Core",
    element_type: ElementType::Appender,
}];

impl PluginService for FnAppenderPlugin {
    fn entries(&self) -> &'static [PluginEntry] {
        &FN_APPENDER_ENTRIES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fn_appender_entry() {
        let entries = FnAppenderPlugin.entries();
        assert_eq!(entries.len(), 1);

        let entry = entries[0];
        assert_eq!(entry.key, "fn");
        assert_eq!(entry.class_name, "flog::appender::DynamicSinkAppender");
        assert_eq!(entry.name, "Fn");
        assert_eq!(entry.namespace, "Core");
        assert_eq!(entry.element_type, ElementType::Appender);
    }

    #[test]
    fn test_entry_serializes() {
        let value = serde_json::to_value(FnAppenderPlugin.entries()).unwrap();
        assert_eq!(value[0]["key"], "fn");
        assert_eq!(value[0]["element_type"], "appender");
    }

    #[test]
    fn test_element_type_display() {
        assert_eq!(ElementType::Appender.to_string(), "appender");
        assert_eq!(ElementType::Filter.to_string(), "filter");
    }
}
