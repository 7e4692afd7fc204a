use super::{Context, Step};
use crate::display;
use anyhow::{bail, Context as _, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Runs a script line by line. Blank lines and `#` comments are skipped.
/// Scripts never prompt, so `pr clear` runs unconfirmed.
pub fn run(ctx: &mut Context, script: &Path, keep_going: bool) -> Result<()> {
    let source = fs::read_to_string(script)
        .with_context(|| format!("Failed to read script {}", script.display()))?;

    let mut failures = 0usize;
    for (index, line) in source.lines().enumerate() {
        let number = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        debug!(line = number, command = trimmed, "running script line");
        if !ctx.json {
            println!("{} {}", "$".dimmed(), trimmed.dimmed());
        }

        match ctx.run_line(trimmed, None) {
            Ok(Step::Continue) => {}
            Ok(Step::Exit) => break,
            Err(err) => {
                display::error(&err);
                failures += 1;
                if !keep_going {
                    bail!("{}: stopped at line {number}", script.display());
                }
            }
        }
    }

    if failures > 0 {
        bail!("{}: {failures} command(s) failed", script.display());
    }
    Ok(())
}
