use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

mod commands;
mod config;
mod display;
mod tokenize;

use commands::{exec, shell, Context};
use config::{Config, DEFAULT_CONFIG_FILE};
use gitsim_core::DEFAULT_AUTHOR;

#[derive(Parser)]
#[command(name = "gitsim")]
#[command(version, about = "Simulate a git-style workflow in memory", long_about = None)]
struct Cli {
    /// Path of the command allow-list
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Author recorded on commits and pull requests
    #[arg(long, global = true, default_value = DEFAULT_AUTHOR)]
    author: String,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print command results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive shell (default)
    Shell,

    /// Run the commands in a script file, one per line
    Exec {
        /// Script to run
        script: PathBuf,

        /// Continue after a failing command
        #[arg(long)]
        keep_going: bool,
    },

    /// Inspect or edit the command allow-list
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the enabled commands
    Show,
    /// Allow a command
    Enable { name: String },
    /// Disallow a command
    Disable { name: String },
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_create(&cli.config)?;

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => {
            let mut ctx = Context::new(config, &cli.author, cli.json);
            shell::run(&mut ctx)?;
        }
        Commands::Exec { script, keep_going } => {
            let mut ctx = Context::new(config, &cli.author, cli.json);
            exec::run(&mut ctx, &script, keep_going)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&config, &cli.config, cli.json)?,
            ConfigAction::Enable { name } => {
                commands::config::set(config, &cli.config, &name, true)?
            }
            ConfigAction::Disable { name } => {
                commands::config::set(config, &cli.config, &name, false)?
            }
        },
    }

    Ok(())
}
