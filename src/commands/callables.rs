use colored::*;
use eyre::Result;

use flog::callable;

pub fn run() -> Result<()> {
    println!("{}", "Available callables:".bold());
    println!();

    for identifier in callable::global().identifiers() {
        println!("  {}", identifier.cyan());
    }

    Ok(())
}
