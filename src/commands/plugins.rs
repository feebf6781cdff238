//! Show the plugin descriptors flog registers

use colored::*;
use eyre::{Context, Result};

use crate::cli::OutputFormat;
use flog::plugin::PluginManager;
use flog::plugin::manifest::PluginEntry;

pub fn run(format: OutputFormat) -> Result<()> {
    let manager = PluginManager::with_defaults();
    let entries: Vec<PluginEntry> = manager.list().copied().collect();

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&entries).context("Failed to serialize plugins")?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(&entries).context("Failed to serialize plugins")?;
            print!("{}", yaml);
        }
        OutputFormat::Text => print_text(&entries),
    }

    Ok(())
}

fn print_text(entries: &[PluginEntry]) {
    println!("{}", "Registered plugins:".bold());
    println!();

    if entries.is_empty() {
        println!("  {}", "(none)".dimmed());
        return;
    }

    for entry in entries {
        println!(
            "  {} {} {}",
            entry.name.green(),
            format!("[{}]", entry.element_type).dimmed(),
            entry.class_name
        );
        println!("    key: {}  namespace: {}", entry.key.cyan(), entry.namespace);
    }
}
