use crate::config::Config;
use anyhow::{bail, Result};
use colored::Colorize;
use gitsim_core::{operation, OPERATIONS};
use std::path::Path;

pub fn show(config: &Config, path: &Path, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(config)?);
        return Ok(());
    }

    println!("{}", "Command allow-list".bold().cyan());
    println!("  {}: {}", "File".bold(), path.display());
    println!();
    for op in OPERATIONS {
        let mark = if config.is_enabled(op.name) {
            "enabled".green()
        } else {
            "disabled".red()
        };
        println!("  {:<10} {}", op.name, mark);
    }
    Ok(())
}

pub fn set(mut config: Config, path: &Path, name: &str, enabled: bool) -> Result<()> {
    if operation::lookup(name).is_none() {
        bail!("Unknown command '{name}'");
    }

    let changed = if enabled {
        config.enable(name)
    } else {
        config.disable(name)
    };
    let state = if enabled { "enabled" } else { "disabled" };

    if changed {
        config.save(path)?;
        println!("{} {} {}", "✓".green(), name.bold(), state);
    } else {
        println!("{} is already {}", name.bold(), state);
    }
    Ok(())
}
