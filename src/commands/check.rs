//! Build every configured appender and report which ones were rejected

use colored::*;
use eyre::Result;

use flog::callable;
use flog::config::Config;
use flog::dispatch::Dispatcher;
use flog::plugin::PluginManager;

pub fn run(config: &Config) -> Result<()> {
    let dispatcher = Dispatcher::from_config(config, &PluginManager::with_defaults(), callable::global());

    println!("{}", "Appenders".bold());
    println!("{}", "═".repeat(50));

    for name in dispatcher.appender_names() {
        println!("{} {}", "✓".green(), name);
    }

    for rejected in dispatcher.rejected() {
        println!(
            "{} {} ({}): {}",
            "✗".red(),
            rejected.name.as_deref().unwrap_or("<unnamed>"),
            rejected.kind.dimmed(),
            rejected.error
        );
    }

    println!();
    println!("Root level: {}", dispatcher.level().to_string().cyan());

    let issues = dispatcher.rejected().len();
    if issues > 0 {
        eyre::bail!("{} appender(s) rejected", issues);
    }

    println!("{} All appenders ready", "✓".green());
    Ok(())
}
