//! Static command table and argument parsing.
//!
//! Every command the session understands is described once in [`OPERATIONS`]:
//! its name, usage line, flags and handler. Argument splitting, validation and
//! help output are all driven from this table.

use crate::error::{Error, Result};
use crate::outcome::{Outcome, PrAction};
use crate::session::Session;
use std::collections::BTreeMap;

/// Flag name (without dashes) to its value, `None` for switches.
pub type NamedArgs = BTreeMap<String, Option<String>>;

pub type Handler = fn(&mut Session, &Invocation) -> Result<Outcome>;

#[derive(Debug)]
pub struct FlagSpec {
    pub name: &'static str,
    pub takes_value: bool,
    pub help: &'static str,
}

#[derive(Debug)]
pub struct ActionSpec {
    pub name: &'static str,
    pub usage: &'static str,
    pub summary: &'static str,
}

pub struct OperationSpec {
    pub name: &'static str,
    pub usage: &'static str,
    pub summary: &'static str,
    pub flags: &'static [FlagSpec],
    /// Sub-actions selected by the first positional argument.
    pub actions: &'static [ActionSpec],
    pub handler: Handler,
}

impl std::fmt::Debug for OperationSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationSpec")
            .field("name", &self.name)
            .field("usage", &self.usage)
            .field("flags", &self.flags)
            .field("actions", &self.actions)
            .finish_non_exhaustive()
    }
}

impl OperationSpec {
    pub fn flag(&self, name: &str) -> Option<&'static FlagSpec> {
        self.flags.iter().find(|flag| flag.name == name)
    }
}

pub static OPERATIONS: &[OperationSpec] = &[
    OperationSpec {
        name: "init",
        usage: "init <name> <path>",
        summary: "Create a repository and make it active",
        flags: &[],
        actions: &[],
        handler: init,
    },
    OperationSpec {
        name: "repo",
        usage: "repo list | repo switch <name> | repo delete <name>",
        summary: "List, switch or delete repositories",
        flags: &[],
        actions: &[
            ActionSpec {
                name: "list",
                usage: "repo list",
                summary: "List repositories",
            },
            ActionSpec {
                name: "switch",
                usage: "repo switch <name>",
                summary: "Make a repository active",
            },
            ActionSpec {
                name: "delete",
                usage: "repo delete <name>",
                summary: "Remove a repository",
            },
        ],
        handler: repo,
    },
    OperationSpec {
        name: "add",
        usage: "add <path> <content...>",
        summary: "Stage a file with the given content",
        flags: &[],
        actions: &[],
        handler: add,
    },
    OperationSpec {
        name: "rm",
        usage: "rm <path>",
        summary: "Stage the deletion of a file",
        flags: &[],
        actions: &[],
        handler: rm,
    },
    OperationSpec {
        name: "reset",
        usage: "reset [--one]",
        summary: "Discard staged changes",
        flags: &[FlagSpec {
            name: "one",
            takes_value: false,
            help: "only drop the most recently staged entry",
        }],
        actions: &[],
        handler: reset,
    },
    OperationSpec {
        name: "commit",
        usage: "commit -m <message> [--author <email>]",
        summary: "Record staged changes",
        flags: &[
            FlagSpec {
                name: "m",
                takes_value: true,
                help: "commit message",
            },
            FlagSpec {
                name: "author",
                takes_value: true,
                help: "author recorded on the commit",
            },
        ],
        actions: &[],
        handler: commit,
    },
    OperationSpec {
        name: "checkout",
        usage: "checkout [-b] <branch|commit>",
        summary: "Switch branches or detach HEAD at a commit",
        flags: &[FlagSpec {
            name: "b",
            takes_value: false,
            help: "create the branch first",
        }],
        actions: &[],
        handler: checkout,
    },
    OperationSpec {
        name: "branch",
        usage: "branch [<name>] | branch -d <name>",
        summary: "List, create or delete branches",
        flags: &[FlagSpec {
            name: "d",
            takes_value: false,
            help: "delete the named branch",
        }],
        actions: &[],
        handler: branch,
    },
    OperationSpec {
        name: "status",
        usage: "status",
        summary: "Show HEAD, staged changes and the working tree",
        flags: &[],
        actions: &[],
        handler: status,
    },
    OperationSpec {
        name: "log",
        usage: "log [-n <count>]",
        summary: "Show commit history from HEAD",
        flags: &[FlagSpec {
            name: "n",
            takes_value: true,
            help: "maximum number of commits",
        }],
        actions: &[],
        handler: log,
    },
    OperationSpec {
        name: "show",
        usage: "show [<commit>]",
        summary: "Show a commit and its diff",
        flags: &[],
        actions: &[],
        handler: show,
    },
    OperationSpec {
        name: "pr",
        usage: "pr <action> [args...]",
        summary: "Work with pull requests",
        flags: &[FlagSpec {
            name: "author",
            takes_value: true,
            help: "author recorded on a new pull request",
        }],
        actions: &[
            ActionSpec {
                name: "create",
                usage: "pr create <title> <source> <target> [<description...>]",
                summary: "Open a pull request",
            },
            ActionSpec {
                name: "status",
                usage: "pr status <id>",
                summary: "Show a pull request",
            },
            ActionSpec {
                name: "review",
                usage: "pr review <id> <reviewer>",
                summary: "Add a reviewer",
            },
            ActionSpec {
                name: "approve",
                usage: "pr approve <id>",
                summary: "Approve an open pull request",
            },
            ActionSpec {
                name: "reject",
                usage: "pr reject <id>",
                summary: "Reject an open pull request",
            },
            ActionSpec {
                name: "cancel",
                usage: "pr cancel <id>",
                summary: "Cancel an open or approved pull request",
            },
            ActionSpec {
                name: "merge",
                usage: "pr merge <id>",
                summary: "Fast-forward the target branch of an approved pull request",
            },
            ActionSpec {
                name: "list",
                usage: "pr list",
                summary: "List every pull request",
            },
            ActionSpec {
                name: "next",
                usage: "pr next",
                summary: "Show the oldest open pull request",
            },
            ActionSpec {
                name: "tag",
                usage: "pr tag <id> <label>",
                summary: "Attach a label",
            },
            ActionSpec {
                name: "clear",
                usage: "pr clear",
                summary: "Remove every pull request",
            },
        ],
        handler: pull_request,
    },
];

pub fn lookup(name: &str) -> Option<&'static OperationSpec> {
    OPERATIONS.iter().find(|op| op.name == name)
}

/// A command resolved against its descriptor with validated flags.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub spec: &'static OperationSpec,
    pub positional: Vec<String>,
    pub named: NamedArgs,
}

impl Invocation {
    /// Builds an invocation from pre-split arguments, rejecting flags the
    /// command does not declare and value flags without a value.
    pub fn new(command: &str, positional: Vec<String>, named: NamedArgs) -> Result<Self> {
        let spec = lookup(command).ok_or_else(|| Error::UnknownCommand(command.to_string()))?;

        for (name, value) in &named {
            let flag = spec.flag(name).ok_or_else(|| unknown_flag(spec, name))?;
            match (flag.takes_value, value) {
                (true, None) => {
                    return Err(Error::InvalidArguments(format!(
                        "{} requires a value",
                        dashed(name)
                    )))
                }
                (false, Some(_)) => {
                    return Err(Error::InvalidArguments(format!(
                        "{} does not take a value",
                        dashed(name)
                    )))
                }
                _ => {}
            }
        }

        Ok(Self {
            spec,
            positional,
            named,
        })
    }

    /// Splits a tokenized line. The first token names the command; `-x` and
    /// `--name` are flags when the command declares them, `--name=value` is
    /// accepted for value flags and everything after `--` is positional.
    /// Commands without flags take every token as positional.
    pub fn parse(tokens: &[String]) -> Result<Self> {
        let (command, rest) = tokens
            .split_first()
            .ok_or_else(|| Error::InvalidArguments("empty command".to_string()))?;
        let spec = lookup(command).ok_or_else(|| Error::UnknownCommand(command.to_string()))?;

        let mut positional = Vec::new();
        let mut named = NamedArgs::new();
        let mut tokens = rest.iter();
        let mut flags_done = spec.flags.is_empty();

        while let Some(token) = tokens.next() {
            if flags_done {
                positional.push(token.clone());
                continue;
            }
            if token == "--" {
                flags_done = true;
                continue;
            }

            let Some((name, inline)) = flag_name(token) else {
                positional.push(token.clone());
                continue;
            };
            let flag = spec.flag(name).ok_or_else(|| unknown_flag(spec, name))?;

            let value = match (flag.takes_value, inline) {
                (true, Some(value)) => Some(value.to_string()),
                (true, None) => Some(tokens.next().cloned().ok_or_else(|| {
                    Error::InvalidArguments(format!("{} requires a value", dashed(name)))
                })?),
                (false, None) => None,
                (false, Some(_)) => {
                    return Err(Error::InvalidArguments(format!(
                        "{} does not take a value",
                        dashed(name)
                    )))
                }
            };
            named.insert(name.to_string(), value);
        }

        Self::new(spec.name, positional, named)
    }

    pub fn command(&self) -> &'static str {
        self.spec.name
    }

    pub fn arg(&self, index: usize, what: &str) -> Result<&str> {
        self.positional
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| self.usage_error(&format!("missing <{what}>")))
    }

    /// Positional arguments from `index` on, joined by single spaces.
    pub fn rest(&self, index: usize) -> String {
        self.positional
            .get(index..)
            .map(|args| args.join(" "))
            .unwrap_or_default()
    }

    pub fn at_most(&self, count: usize) -> Result<()> {
        if self.positional.len() > count {
            return Err(self.usage_error(&format!(
                "unexpected argument '{}'",
                self.positional[count]
            )));
        }
        Ok(())
    }

    pub fn flag(&self, name: &str) -> bool {
        self.named.contains_key(name)
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.named.get(name).and_then(|value| value.as_deref())
    }

    fn usage_error(&self, problem: &str) -> Error {
        Error::InvalidArguments(format!("{problem} (usage: {})", self.spec.usage))
    }

    fn action_usage_error(&self, action: &str, problem: &str) -> Error {
        let usage = self
            .spec
            .actions
            .iter()
            .find(|a| a.name == action)
            .map_or(self.spec.usage, |a| a.usage);
        Error::InvalidArguments(format!("{problem} (usage: {usage})"))
    }
}

fn flag_name(token: &str) -> Option<(&str, Option<&str>)> {
    if let Some(long) = token.strip_prefix("--") {
        if long.is_empty() {
            return None;
        }
        return Some(match long.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (long, None),
        });
    }
    let short = token.strip_prefix('-')?;
    let mut chars = short.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Some((short, None)),
        _ => None,
    }
}

fn dashed(name: &str) -> String {
    if name.len() == 1 {
        format!("-{name}")
    } else {
        format!("--{name}")
    }
}

fn unknown_flag(spec: &OperationSpec, name: &str) -> Error {
    Error::InvalidArguments(format!(
        "unknown flag {} for '{}' (usage: {})",
        dashed(name),
        spec.name,
        spec.usage
    ))
}

fn init(session: &mut Session, inv: &Invocation) -> Result<Outcome> {
    inv.at_most(2)?;
    let name = inv.arg(0, "name")?;
    let path = inv.arg(1, "path")?;
    Ok(Outcome::RepositoryCreated(session.init(name, path)?))
}

fn repo(session: &mut Session, inv: &Invocation) -> Result<Outcome> {
    let action = inv.arg(0, "action")?;
    match action {
        "list" => {
            inv.at_most(1)?;
            Ok(Outcome::Repositories(session.repositories().list()))
        }
        "switch" => {
            inv.at_most(2)?;
            let name = inv.arg(1, "name")?;
            session.repositories_mut().switch(name)?;
            let info = session
                .repositories()
                .list()
                .into_iter()
                .find(|info| info.name == name)
                .ok_or_else(|| Error::RepositoryNotFound(name.to_string()))?;
            Ok(Outcome::RepositorySwitched(info))
        }
        "delete" => {
            inv.at_most(2)?;
            let name = inv.arg(1, "name")?;
            let removed = session.repositories_mut().remove(name)?;
            Ok(Outcome::RepositoryRemoved {
                name: removed.name().to_string(),
            })
        }
        other => Err(inv.usage_error(&format!("unknown repo action '{other}'"))),
    }
}

fn add(session: &mut Session, inv: &Invocation) -> Result<Outcome> {
    let path = inv.arg(0, "path")?;
    inv.arg(1, "content")?;
    let content = inv.rest(1);
    Ok(Outcome::Staged(session.active_mut()?.add(path, &content)?))
}

fn rm(session: &mut Session, inv: &Invocation) -> Result<Outcome> {
    inv.at_most(1)?;
    let path = inv.arg(0, "path")?;
    Ok(Outcome::Staged(session.active_mut()?.remove(path)?))
}

fn reset(session: &mut Session, inv: &Invocation) -> Result<Outcome> {
    inv.at_most(0)?;
    let repo = session.active_mut()?;
    if inv.flag("one") {
        Ok(Outcome::Unstaged(repo.unstage_last()?))
    } else {
        Ok(Outcome::Reset {
            discarded: repo.reset()?,
        })
    }
}

fn commit(session: &mut Session, inv: &Invocation) -> Result<Outcome> {
    inv.at_most(0)?;
    let message = inv
        .value("m")
        .ok_or_else(|| inv.usage_error("missing -m <message>"))?;
    let author = inv.value("author").unwrap_or(session.author()).to_string();
    let commit = session.active_mut()?.commit(message, &author)?;
    Ok(Outcome::Committed(commit))
}

fn checkout(session: &mut Session, inv: &Invocation) -> Result<Outcome> {
    inv.at_most(1)?;
    let target = inv.arg(0, "branch|commit")?;
    let summary = session.active_mut()?.checkout(target, inv.flag("b"))?;
    Ok(Outcome::CheckedOut(summary))
}

fn branch(session: &mut Session, inv: &Invocation) -> Result<Outcome> {
    inv.at_most(1)?;
    let repo = session.active_mut()?;

    if inv.flag("d") {
        let name = inv.arg(0, "name")?;
        return Ok(Outcome::BranchDeleted(repo.delete_branch(name)?));
    }
    match inv.positional.first() {
        Some(name) => Ok(Outcome::BranchCreated(repo.create_branch(name)?)),
        None => Ok(Outcome::Branches {
            current: repo.current_branch().map(str::to_string),
            branches: repo.branches().to_vec(),
        }),
    }
}

fn status(session: &mut Session, inv: &Invocation) -> Result<Outcome> {
    inv.at_most(0)?;
    Ok(Outcome::Status(session.active()?.status()))
}

fn log(session: &mut Session, inv: &Invocation) -> Result<Outcome> {
    inv.at_most(0)?;
    let limit = inv
        .value("n")
        .map(|count| {
            count
                .parse::<usize>()
                .map_err(|_| inv.usage_error(&format!("invalid count '{count}'")))
        })
        .transpose()?;
    let repo = session.active()?;
    Ok(Outcome::Log {
        commits: repo.log(limit)?,
        total: repo.log(None)?.len(),
    })
}

fn show(session: &mut Session, inv: &Invocation) -> Result<Outcome> {
    inv.at_most(1)?;
    let target = inv.positional.first().map(String::as_str);
    Ok(Outcome::Show(session.active()?.show(target)?))
}

fn pull_request(session: &mut Session, inv: &Invocation) -> Result<Outcome> {
    let action = inv.arg(0, "action")?;
    let id = || {
        inv.positional
            .get(1)
            .map(String::as_str)
            .ok_or_else(|| inv.action_usage_error(action, "missing <id>"))
    };
    let arity = |count: usize| {
        if inv.positional.len() > count {
            Err(inv.action_usage_error(
                action,
                &format!("unexpected argument '{}'", inv.positional[count]),
            ))
        } else {
            Ok(())
        }
    };
    let shown = |action: PrAction, pr: &crate::models::PullRequest| Outcome::PullRequest {
        action,
        pull_request: pr.clone(),
    };

    match action {
        "create" => {
            let missing = |what: &str| inv.action_usage_error(action, &format!("missing <{what}>"));
            let title = inv.positional.get(1).ok_or_else(|| missing("title"))?;
            let source = inv.positional.get(2).ok_or_else(|| missing("source"))?;
            let target = inv.positional.get(3).ok_or_else(|| missing("target"))?;
            let description = inv.rest(4);
            let author = inv.value("author").unwrap_or(session.author()).to_string();

            let pr = session.create_pull_request(title, source, target, &description, &author)?;
            Ok(shown(PrAction::Created, &pr))
        }
        "status" => {
            arity(2)?;
            let pr = session.pull_requests().get(id()?)?;
            Ok(shown(PrAction::Shown, pr))
        }
        "review" => {
            arity(3)?;
            let reviewer = inv
                .positional
                .get(2)
                .ok_or_else(|| inv.action_usage_error(action, "missing <reviewer>"))?;
            let pr = session.pull_requests_mut().review(id()?, reviewer)?;
            Ok(shown(
                PrAction::Reviewed {
                    reviewer: reviewer.clone(),
                },
                pr,
            ))
        }
        "approve" => {
            arity(2)?;
            let pr = session.pull_requests_mut().approve(id()?)?;
            Ok(shown(PrAction::Approved, pr))
        }
        "reject" => {
            arity(2)?;
            let pr = session.pull_requests_mut().reject(id()?)?;
            Ok(shown(PrAction::Rejected, pr))
        }
        "cancel" => {
            arity(2)?;
            let pr = session.pull_requests_mut().cancel(id()?)?;
            Ok(shown(PrAction::Cancelled, pr))
        }
        "merge" => {
            arity(2)?;
            let (pr, head) = session.merge_pull_request(id()?)?;
            Ok(shown(PrAction::Merged { head }, &pr))
        }
        "tag" => {
            arity(3)?;
            let label = inv
                .positional
                .get(2)
                .ok_or_else(|| inv.action_usage_error(action, "missing <label>"))?;
            let pr = session.pull_requests_mut().tag(id()?, label)?;
            Ok(shown(
                PrAction::Tagged {
                    label: label.clone(),
                },
                pr,
            ))
        }
        "list" => {
            arity(1)?;
            let prs = session.pull_requests().list().cloned().collect();
            Ok(Outcome::PullRequests(prs))
        }
        "next" => {
            arity(1)?;
            Ok(Outcome::NextPullRequest(
                session.pull_requests().next().cloned(),
            ))
        }
        "clear" => {
            arity(1)?;
            Ok(Outcome::PullRequestsCleared {
                count: session.pull_requests_mut().clear(),
            })
        }
        other => Err(inv.usage_error(&format!("unknown pr action '{other}'"))),
    }
}
