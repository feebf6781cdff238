//! Named sink callables and their resolution
//!
//! A callable is identified by `namespace/name`, e.g. `myapp.sink/write-line`.
//! Hosts resolve identifiers through anything implementing [`Resolve`]; the
//! process-wide [`CallableRegistry`] is available through [`global`].

use lazy_regex::regex_is_match;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

pub mod builtin;

use crate::error::{ResolutionError, SinkResult};

type SinkFn = dyn Fn(&str) -> SinkResult + Send + Sync;

/// A resolved sink function
///
/// Cheap to clone; clones share the same function.
#[derive(Clone)]
pub struct Callable {
    identifier: Arc<str>,
    func: Arc<SinkFn>,
}

impl Callable {
    pub fn new<F>(identifier: &str, func: F) -> Self
    where
        F: Fn(&str) -> SinkResult + Send + Sync + 'static,
    {
        Self {
            identifier: Arc::from(identifier),
            func: Arc::new(func),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Call the sink with one formatted line
    pub fn invoke(&self, line: &str) -> SinkResult {
        (self.func)(line)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}

/// A parsed `namespace/name` identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallableId {
    pub namespace: String,
    pub name: String,
}

impl CallableId {
    pub fn parse(identifier: &str) -> Result<Self, ResolutionError> {
        let malformed = || ResolutionError::MalformedIdentifier(identifier.to_string());
        let (namespace, name) = identifier.trim().split_once('/').ok_or_else(malformed)?;

        if !regex_is_match!(r"^[A-Za-z_][A-Za-z0-9_.\-]*$", namespace) {
            return Err(malformed());
        }
        if !regex_is_match!(r"^[A-Za-z_*+!?<>=\-][A-Za-z0-9_*+!?<>=\-]*$", name) {
            return Err(malformed());
        }

        Ok(Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for CallableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Turns an identifier into a callable
pub trait Resolve {
    fn resolve(&self, identifier: &str) -> Result<Callable, ResolutionError>;
}

/// Thread-safe map from identifiers to callables, grouped by namespace
#[derive(Default)]
pub struct CallableRegistry {
    namespaces: RwLock<HashMap<String, HashMap<String, Callable>>>,
}

impl CallableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sink, returning the callable it replaced
    pub fn register<F>(&self, identifier: &str, func: F) -> Result<Option<Callable>, ResolutionError>
    where
        F: Fn(&str) -> SinkResult + Send + Sync + 'static,
    {
        let id = CallableId::parse(identifier)?;
        let callable = Callable::new(&id.to_string(), func);

        log::debug!("Registering callable {}", id);
        let mut namespaces = self.namespaces.write().unwrap_or_else(PoisonError::into_inner);
        Ok(namespaces.entry(id.namespace).or_default().insert(id.name, callable))
    }

    /// Remove a sink; empty namespaces are dropped
    pub fn unregister(&self, identifier: &str) -> Option<Callable> {
        let id = CallableId::parse(identifier).ok()?;
        let mut namespaces = self.namespaces.write().unwrap_or_else(PoisonError::into_inner);

        let names = namespaces.get_mut(&id.namespace)?;
        let removed = names.remove(&id.name);
        if names.is_empty() {
            namespaces.remove(&id.namespace);
        }
        removed
    }

    /// Check if an identifier is registered
    pub fn has(&self, identifier: &str) -> bool {
        self.resolve(identifier).is_ok()
    }

    /// All registered identifiers, sorted
    pub fn identifiers(&self) -> Vec<String> {
        let namespaces = self.namespaces.read().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<String> = namespaces
            .iter()
            .flat_map(|(ns, names)| names.keys().map(move |name| format!("{}/{}", ns, name)))
            .collect();
        ids.sort();
        ids
    }
}

impl Resolve for CallableRegistry {
    fn resolve(&self, identifier: &str) -> Result<Callable, ResolutionError> {
        let id = CallableId::parse(identifier)?;
        let namespaces = self.namespaces.read().unwrap_or_else(PoisonError::into_inner);

        let names = namespaces
            .get(&id.namespace)
            .ok_or_else(|| ResolutionError::UnknownNamespace {
                identifier: id.to_string(),
                namespace: id.namespace.clone(),
            })?;

        names
            .get(&id.name)
            .cloned()
            .ok_or_else(|| ResolutionError::UnknownCallable(id.to_string()))
    }
}

static GLOBAL: Lazy<CallableRegistry> = Lazy::new(|| {
    let registry = CallableRegistry::new();
    builtin::install(&registry);
    registry
});

/// The process-wide registry, seeded with the built-in sinks
pub fn global() -> &'static CallableRegistry {
    &GLOBAL
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_parse_identifier() {
        let id = CallableId::parse("myapp.sink/write-line").unwrap();
        assert_eq!(id.namespace, "myapp.sink");
        assert_eq!(id.name, "write-line");
        assert_eq!(id.to_string(), "myapp.sink/write-line");
    }

    #[test]
    fn test_parse_malformed_identifiers() {
        for bad in ["", "no-slash", "/name", "ns/", "ns/a/b", "1ns/name", "ns/with space"] {
            assert!(
                matches!(CallableId::parse(bad), Err(ResolutionError::MalformedIdentifier(_))),
                "expected '{}' to be malformed",
                bad
            );
        }
    }

    #[test]
    fn test_register_and_resolve() {
        let registry = CallableRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        registry
            .register("myapp.sink/write-line", move |line| {
                sink.lock().unwrap().push(line.to_string());
                Ok(())
            })
            .unwrap();

        let callable = registry.resolve("myapp.sink/write-line").unwrap();
        assert_eq!(callable.identifier(), "myapp.sink/write-line");
        callable.invoke("INFO hello").unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["INFO hello".to_string()]);
    }

    #[test]
    fn test_resolve_unknown_namespace() {
        let registry = CallableRegistry::new();
        let err = registry.resolve("missing.ns/write").unwrap_err();
        assert!(matches!(err, ResolutionError::UnknownNamespace { .. }));
    }

    #[test]
    fn test_resolve_unknown_name() {
        let registry = CallableRegistry::new();
        registry.register("myapp.sink/a", |_| Ok(())).unwrap();
        let err = registry.resolve("myapp.sink/b").unwrap_err();
        assert_eq!(err, ResolutionError::UnknownCallable("myapp.sink/b".to_string()));
    }

    #[test]
    fn test_register_replaces() {
        let registry = CallableRegistry::new();
        assert!(registry.register("ns/f", |_| Ok(())).unwrap().is_none());
        assert!(registry.register("ns/f", |_| Err("second".into())).unwrap().is_some());
        assert!(registry.resolve("ns/f").unwrap().invoke("x").is_err());
    }

    #[test]
    fn test_register_rejects_malformed() {
        let registry = CallableRegistry::new();
        assert!(registry.register("nope", |_| Ok(())).is_err());
    }

    #[test]
    fn test_unregister() {
        let registry = CallableRegistry::new();
        registry.register("ns/f", |_| Ok(())).unwrap();
        assert!(registry.unregister("ns/f").is_some());
        assert!(!registry.has("ns/f"));
        assert!(registry.identifiers().is_empty());
        assert!(registry.unregister("ns/f").is_none());
    }

    #[test]
    fn test_identifiers_sorted() {
        let registry = CallableRegistry::new();
        registry.register("b.ns/z", |_| Ok(())).unwrap();
        registry.register("a.ns/y", |_| Ok(())).unwrap();
        registry.register("b.ns/a", |_| Ok(())).unwrap();
        assert_eq!(registry.identifiers(), vec!["a.ns/y", "b.ns/a", "b.ns/z"]);
    }

    #[test]
    fn test_global_has_builtins() {
        assert!(global().has("flog.sink/stdout"));
        assert!(global().has("flog.sink/stderr"));
        assert!(global().has("flog.sink/discard"));
    }
}
