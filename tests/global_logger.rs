//! Integration test for installing the dispatcher as the global logger
//!
//! Kept in its own test binary: the `log` facade accepts one logger per
//! process.

use std::sync::{Arc, Mutex};

use flog::callable::CallableRegistry;
use flog::config::Config;
use flog::dispatch::Dispatcher;
use flog::plugin::PluginManager;

const CONFIG: &str = r#"
appenders:
  - type: fn
    name: capture
    fn: test.sink/capture
    layout: { type: pattern, pattern: "%-5p %c{1} %m" }
root:
  level: info
"#;

#[test]
fn test_install_routes_log_macros() {
    let registry = CallableRegistry::new();
    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&lines);
    registry
        .register("test.sink/capture", move |line| {
            sink.lock().unwrap().push(line.to_string());
            // logging from inside a sink must not recurse into the dispatcher
            log::error!(target: "inner", "from sink");
            Ok(())
        })
        .unwrap();

    let config = Config::from_str(CONFIG).unwrap();
    let dispatcher = Dispatcher::from_config(&config, &PluginManager::with_defaults(), &registry);
    assert!(dispatcher.rejected().is_empty());

    dispatcher.install().unwrap();
    assert_eq!(log::max_level(), log::LevelFilter::Info);

    log::warn!(target: "myapp.core", "disk almost full");
    log::debug!(target: "myapp.core", "below root level");
    log::info!(target: "myapp.net", "connected");

    assert_eq!(
        *lines.lock().unwrap(),
        vec!["WARN  core disk almost full".to_string(), "INFO  net connected".to_string()]
    );

    let second = Dispatcher::new(log::LevelFilter::Trace);
    assert!(second.install().is_err());
}
