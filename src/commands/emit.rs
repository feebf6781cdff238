//! Send one event through the configured appenders

use eyre::{Context, Result};
use log::Level;

use flog::callable;
use flog::config::Config;
use flog::dispatch::Dispatcher;
use flog::event::LogEvent;
use flog::plugin::PluginManager;

pub fn run(level: Level, target: &str, context: Vec<(String, String)>, message: &str, config: &Config) -> Result<()> {
    let dispatcher = Dispatcher::from_config(config, &PluginManager::with_defaults(), callable::global());

    if dispatcher.appender_names().is_empty() {
        log::warn!("No appenders are attached; the event goes nowhere");
    }

    let event = context
        .into_iter()
        .fold(LogEvent::new(level, target, message), |event, (key, value)| {
            event.with_context(key, value)
        });

    dispatcher.dispatch(&event).context("Failed to emit event")?;
    Ok(())
}
