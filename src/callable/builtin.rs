//! Built-in sinks under the `flog.sink` namespace

use std::io::{self, Write};

use super::CallableRegistry;
use crate::error::SinkResult;

pub const NAMESPACE: &str = "flog.sink";

/// Write the line to stdout
pub fn stdout(line: &str) -> SinkResult {
    let mut out = io::stdout().lock();
    writeln!(out, "{}", line)?;
    Ok(())
}

/// Write the line to stderr
pub fn stderr(line: &str) -> SinkResult {
    let mut err = io::stderr().lock();
    writeln!(err, "{}", line)?;
    Ok(())
}

/// Drop the line
pub fn discard(_line: &str) -> SinkResult {
    Ok(())
}

/// Register every built-in sink
pub fn install(registry: &CallableRegistry) {
    let sinks: [(&str, fn(&str) -> SinkResult); 3] = [("stdout", stdout), ("stderr", stderr), ("discard", discard)];

    for (name, func) in sinks {
        let identifier = format!("{}/{}", NAMESPACE, name);
        if let Err(e) = registry.register(&identifier, func) {
            log::error!("Failed to register built-in sink {}: {}", identifier, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callable::Resolve;

    #[test]
    fn test_install_registers_all() {
        let registry = CallableRegistry::new();
        install(&registry);
        assert_eq!(
            registry.identifiers(),
            vec!["flog.sink/discard", "flog.sink/stderr", "flog.sink/stdout"]
        );
    }

    #[test]
    fn test_discard_succeeds() {
        let registry = CallableRegistry::new();
        install(&registry);
        assert!(registry.resolve("flog.sink/discard").unwrap().invoke("anything").is_ok());
    }
}
