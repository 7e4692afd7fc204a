use super::{Context, Step};
use crate::display;
use anyhow::{Context as _, Result};
use colored::Colorize;
use dialoguer::Confirm;
use gitsim_core::Head;
use std::io::{self, BufRead, Write};

pub fn run(ctx: &mut Context) -> Result<()> {
    println!(
        "{} {}",
        "gitsim".bold().cyan(),
        "interactive shell; type 'help' for commands, 'exit' to quit".dimmed()
    );

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let confirm: &dyn Fn(&str) -> bool = &|prompt: &str| {
        Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or(false)
    };

    loop {
        print!("{} ", prompt(ctx).green().bold());
        io::stdout().flush().context("Failed to flush stdout")?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line.context("Failed to read from stdin")?;

        match ctx.run_line(&line, Some(confirm)) {
            Ok(Step::Continue) => {}
            Ok(Step::Exit) => break,
            Err(err) => display::error(&err),
        }
    }

    Ok(())
}

fn prompt(ctx: &Context) -> String {
    match ctx.session.active() {
        Ok(repo) => match repo.head() {
            Head::Branch(name) => format!("gitsim ({}:{})>", repo.name(), name),
            Head::Detached(id) => format!(
                "gitsim ({}:{})>",
                repo.name(),
                &id[..id.len().min(7)]
            ),
        },
        Err(_) => "gitsim>".to_string(),
    }
}
