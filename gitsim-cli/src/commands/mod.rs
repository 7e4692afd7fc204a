pub mod config;
pub mod exec;
pub mod shell;

use crate::config::Config;
use crate::display;
use crate::tokenize::tokenize;
use gitsim_core::operation::{self, Invocation};
use gitsim_core::{Error, Session};

/// State shared by the shell and script runners.
pub struct Context {
    pub session: Session,
    pub config: Config,
    pub json: bool,
}

/// What the runner should do after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Exit,
}

impl Context {
    pub fn new(config: Config, author: &str, json: bool) -> Self {
        Self {
            session: Session::new(author),
            config,
            json,
        }
    }

    /// Runs one input line and prints its result. `confirm` is asked before
    /// destructive commands; without it they run unprompted.
    pub fn run_line(
        &mut self,
        line: &str,
        confirm: Option<&dyn Fn(&str) -> bool>,
    ) -> Result<Step, Error> {
        let tokens = tokenize(line)?;
        let Some(command) = tokens.first() else {
            return Ok(Step::Continue);
        };

        match command.as_str() {
            "exit" | "quit" => return Ok(Step::Exit),
            "help" => {
                display::help(&self.config);
                return Ok(Step::Continue);
            }
            _ => {}
        }

        if operation::lookup(command).is_some() && !self.config.is_enabled(command) {
            return Err(Error::CommandDisabled(command.clone()));
        }
        let invocation = Invocation::parse(&tokens)?;

        if is_clear(&invocation) {
            if let Some(confirm) = confirm {
                let count = self.session.pull_requests().len();
                if !confirm(&format!("Remove all {count} pull request(s)?")) {
                    display::notice("Aborted");
                    return Ok(Step::Continue);
                }
            }
        }

        let outcome = self.session.run(&invocation)?;
        if self.json {
            display::json(&outcome);
        } else {
            display::outcome(&outcome);
        }
        Ok(Step::Continue)
    }
}

fn is_clear(invocation: &Invocation) -> bool {
    invocation.command() == "pr" && invocation.positional.first().map(String::as_str) == Some("clear")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn context() -> Context {
        Context::new(Config::default(), "me@x.com", true)
    }

    #[test]
    fn test_disabled_command_is_rejected_before_running() {
        let mut config = Config::default();
        config.disable("init");
        let mut ctx = Context::new(config, "me@x.com", true);

        assert_eq!(
            ctx.run_line("init demo /tmp/demo", None).unwrap_err(),
            Error::CommandDisabled("init".to_string())
        );
        assert!(ctx.session.repositories().is_empty());
    }

    #[test]
    fn test_builtins_and_blank_lines() {
        let mut ctx = context();
        assert_eq!(ctx.run_line("   ", None).unwrap(), Step::Continue);
        assert_eq!(ctx.run_line("help", None).unwrap(), Step::Continue);
        assert_eq!(ctx.run_line("quit", None).unwrap(), Step::Exit);
        assert_eq!(
            ctx.run_line("frobnicate", None).unwrap_err(),
            Error::UnknownCommand("frobnicate".to_string())
        );
    }

    #[test]
    fn test_errors_leave_session_usable() {
        let mut ctx = context();
        assert_eq!(
            ctx.run_line("status", None).unwrap_err(),
            Error::NoActiveRepository
        );
        ctx.run_line("init demo /tmp/demo", None).unwrap();
        ctx.run_line(r#"add "my file.txt" "hello world""#, None).unwrap();

        let repo = ctx.session.active().unwrap();
        assert_eq!(repo.working_tree()["my file.txt"], "hello world");
    }

    #[test]
    fn test_declined_clear_keeps_pull_requests() {
        let mut ctx = context();
        for line in [
            "init demo /tmp/demo",
            "add a.txt hello",
            "commit -m init",
            "checkout -b feature",
            "add b.txt x",
            "commit -m feat",
            "pr create T feature main",
        ] {
            ctx.run_line(line, None).unwrap();
        }

        let asked = Cell::new(false);
        let decline: &dyn Fn(&str) -> bool = &|_: &str| {
            asked.set(true);
            false
        };
        ctx.run_line("pr clear", Some(decline)).unwrap();
        assert!(asked.get());
        assert_eq!(ctx.session.pull_requests().len(), 1);

        ctx.run_line("pr clear", None).unwrap();
        assert!(ctx.session.pull_requests().is_empty());
    }
}
