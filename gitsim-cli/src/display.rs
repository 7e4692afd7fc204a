use crate::config::Config;
use colored::{ColoredString, Colorize};
use gitsim_core::diff::{DiffLineType, FileDiff};
use gitsim_core::manager::RepositoryInfo;
use gitsim_core::repository::{CheckoutSummary, StatusReport};
use gitsim_core::{
    Commit, Error, FileStatus, Head, Outcome, PrAction, PrStatus, PullRequest, StagedFile,
    OPERATIONS,
};
use serde::Serialize;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn error(err: &Error) {
    eprintln!("{} {}", format!("error[{}]:", err.kind()).red().bold(), err);
}

pub fn notice(message: &str) {
    println!("{}", message.yellow());
}

pub fn json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("{} {}", "error[Serialization]:".red().bold(), err),
    }
}

/// Lists the enabled commands with their usage.
pub fn help(config: &Config) {
    println!("{}", "Commands".bold().cyan());
    for op in OPERATIONS.iter().filter(|op| config.is_enabled(op.name)) {
        println!("  {:<40} {}", op.usage.green(), op.summary);
        for action in op.actions {
            println!("    {:<38} {}", action.usage, action.summary.dimmed());
        }
    }
    println!();
    println!("  {:<40} {}", "help".green(), "Show this list");
    println!("  {:<40} {}", "exit | quit".green(), "Leave the shell");
}

fn status_marker(status: FileStatus) -> ColoredString {
    match status {
        FileStatus::Added => "+".green(),
        FileStatus::Modified => "~".yellow(),
        FileStatus::Deleted => "-".red(),
    }
}

fn pr_status(status: PrStatus) -> ColoredString {
    match status {
        PrStatus::Open => status.as_str().cyan(),
        PrStatus::Approved => status.as_str().green(),
        PrStatus::Rejected => status.as_str().red(),
        PrStatus::Cancelled => status.as_str().dimmed(),
        PrStatus::Merged => status.as_str().magenta(),
    }
}

fn short(id: &str) -> &str {
    &id[..id.len().min(7)]
}

pub fn outcome(outcome: &Outcome) {
    match outcome {
        Outcome::RepositoryCreated(info) => {
            println!(
                "{} Initialized repository {} at {}",
                "✓".green(),
                info.name.bold(),
                info.path
            );
        }
        Outcome::RepositorySwitched(info) => {
            println!("Switched to repository {}", info.name.bold());
        }
        Outcome::RepositoryRemoved { name } => {
            println!("{} Removed repository {}", "✓".green(), name.bold());
        }
        Outcome::Repositories(repos) => repositories(repos),
        Outcome::Staged(file) => staged(file),
        Outcome::Unstaged(Some(file)) => {
            println!("Unstaged {} {}", status_marker(file.status), file.path);
        }
        Outcome::Unstaged(None) => notice("Nothing to unstage"),
        Outcome::Reset { discarded } => {
            println!("Discarded {} staged change(s)", discarded.to_string().yellow());
        }
        Outcome::Committed(commit) => {
            println!(
                "[{} {}] {}",
                commit.branch.cyan(),
                commit.short_id().yellow(),
                commit.message
            );
            println!("  {} file(s) changed", commit.changes.len().to_string().cyan());
        }
        Outcome::CheckedOut(summary) => checked_out(summary),
        Outcome::BranchCreated(branch) => {
            println!("Created branch {}", branch.name.green());
        }
        Outcome::BranchDeleted(branch) => {
            println!("Deleted branch {}", branch.name.red());
        }
        Outcome::Branches { current, branches } => {
            for branch in branches {
                let head = branch
                    .head
                    .as_deref()
                    .map_or_else(|| "(no commits)".dimmed(), |id| short(id).yellow());
                if current.as_deref() == Some(branch.name.as_str()) {
                    println!("* {} {}", branch.name.green().bold(), head);
                } else {
                    println!("  {} {}", branch.name, head);
                }
            }
        }
        Outcome::Status(report) => status(report),
        Outcome::Log { commits, total } => log(commits, *total),
        Outcome::Show(detail) => {
            commit_header(&detail.commit);
            for diff in &detail.diffs {
                file_diff(diff);
            }
        }
        Outcome::PullRequest {
            action,
            pull_request,
        } => {
            match action {
                PrAction::Created => println!(
                    "{} Created pull request {}",
                    "✓".green(),
                    pull_request.id.bold()
                ),
                PrAction::Shown => {}
                PrAction::Reviewed { reviewer } => println!(
                    "Added reviewer {} to {}",
                    reviewer.cyan(),
                    pull_request.id.bold()
                ),
                PrAction::Approved | PrAction::Rejected | PrAction::Cancelled => println!(
                    "Pull request {} is now {}",
                    pull_request.id.bold(),
                    pr_status(pull_request.status)
                ),
                PrAction::Merged { head } => println!(
                    "{} Merged {}: {} now at {}",
                    "✓".green(),
                    pull_request.id.bold(),
                    pull_request.target_branch.cyan(),
                    short(head).yellow()
                ),
                PrAction::Tagged { label } => println!(
                    "Tagged {} with {}",
                    pull_request.id.bold(),
                    label.magenta()
                ),
            }
            if matches!(action, PrAction::Created | PrAction::Shown) {
                pr_detail(pull_request);
            }
        }
        Outcome::PullRequests(prs) => {
            if prs.is_empty() {
                notice("No pull requests");
            }
            for pr in prs {
                pr_line(pr);
            }
        }
        Outcome::NextPullRequest(Some(pr)) => pr_detail(pr),
        Outcome::NextPullRequest(None) => notice("No open pull requests"),
        Outcome::PullRequestsCleared { count } => {
            println!("Cleared {} pull request(s)", count.to_string().yellow());
        }
    }
}

fn repositories(repos: &[RepositoryInfo]) {
    if repos.is_empty() {
        notice("No repositories");
        return;
    }
    for repo in repos {
        if repo.active {
            println!("* {} {}", repo.name.green().bold(), repo.path.dimmed());
        } else {
            println!("  {} {}", repo.name, repo.path.dimmed());
        }
    }
}

fn staged(file: &StagedFile) {
    match file.status {
        FileStatus::Deleted => println!("Staged removal of {}", file.path.bold()),
        status => println!(
            "Staged {} {} ({})",
            status_marker(status),
            file.path.bold(),
            short(&file.checksum).dimmed()
        ),
    }
}

fn checked_out(summary: &CheckoutSummary) {
    if summary.discarded > 0 {
        notice(&format!(
            "Discarded {} staged change(s)",
            summary.discarded
        ));
    }
    if summary.detached {
        println!(
            "HEAD is now at {} {}",
            summary
                .head
                .as_deref()
                .map_or(summary.target.as_str(), short)
                .yellow(),
            "(detached)".dimmed()
        );
    } else if summary.created {
        println!("Switched to a new branch '{}'", summary.target.green());
    } else {
        println!("Switched to branch '{}'", summary.target.green());
    }
}

fn status(report: &StatusReport) {
    println!("{}", "Repository Status".bold().cyan());
    println!("  {}: {}", "Repository".bold(), report.repository);
    match &report.head {
        Head::Branch(name) => println!("  {}: {}", "Branch".bold(), name.green()),
        Head::Detached(id) => println!(
            "  {}: {} {}",
            "HEAD".bold(),
            short(id).yellow(),
            "(detached)".dimmed()
        ),
    }
    if let Some(id) = &report.head_commit {
        println!("  {}: {}", "Commit".bold(), short(id).yellow());
    }
    println!();

    if report.is_clean() {
        println!("{}", "Nothing staged".green());
    } else {
        println!(
            "{} {}",
            "Changes to be committed:".bold(),
            format!("({})", report.pending.len()).yellow()
        );
        for file in &report.pending {
            println!("  {} {}", status_marker(file.status), file.path);
        }
    }

    if !report.working_tree.is_empty() {
        println!();
        println!("{}", "Working tree:".bold());
        for path in &report.working_tree {
            println!("  {}", path.dimmed());
        }
    }
}

fn commit_header(commit: &Commit) {
    println!(
        "{} {}",
        "commit".yellow().bold(),
        commit.id.to_string().yellow()
    );
    println!("{}: {}", "Author".bold(), commit.author);
    println!("{}: {}", "Branch".bold(), commit.branch);
    println!("{}: {}", "Date".bold(), commit.timestamp.format(DATE_FORMAT));
    println!();
    println!("    {}", commit.message);
    println!();
}

fn log(commits: &[Commit], total: usize) {
    if total == 0 {
        notice("No commits yet");
        return;
    }
    if commits.is_empty() {
        notice(&format!("No commits shown ({total} in history)"));
        return;
    }
    for commit in commits {
        commit_header(commit);
        for (path, change) in &commit.changes {
            println!(
                "      {} {}",
                status_marker(change.status),
                path.dimmed()
            );
        }
        println!();
    }
    if total > commits.len() {
        println!(
            "{}",
            format!("... and {} more commit(s)", total - commits.len()).dimmed()
        );
    }
}

fn file_diff(diff: &FileDiff) {
    println!("{}", "━".repeat(80).bright_black());

    let status = match diff.status {
        FileStatus::Added => "NEW".green(),
        FileStatus::Modified => "MOD".yellow(),
        FileStatus::Deleted => "DEL".red(),
    };
    let (additions, deletions) = diff.stats();
    println!(
        "{} {} {} {}",
        status,
        diff.path.white().bold(),
        format!("+{additions}").green(),
        format!("-{deletions}").red()
    );
    println!();

    for line in &diff.diff_lines {
        let (prefix, color): (&str, fn(&str) -> ColoredString) = match line.line_type {
            DiffLineType::Addition => ("+", |s| s.green()),
            DiffLineType::Deletion => ("-", |s| s.red()),
            DiffLineType::Context => (" ", |s| s.normal()),
        };
        print!("{}", color(&format!("{}{}", prefix, line.content)));
        if !line.content.ends_with('\n') {
            println!();
        }
    }
    println!();
}

fn pr_line(pr: &PullRequest) {
    let tags = if pr.tags.is_empty() {
        String::new()
    } else {
        let labels: Vec<&str> = pr.tags.iter().map(String::as_str).collect();
        format!("[{}]", labels.join(", "))
    };
    println!(
        "{:<8} {:<10} {} {} {}",
        pr.id.bold(),
        pr_status(pr.status),
        pr.title,
        format!("{} → {}", pr.source_branch, pr.target_branch).dimmed(),
        tags.magenta()
    );
}

fn pr_detail(pr: &PullRequest) {
    println!("{} {}", pr.id.bold().cyan(), pr.title.bold());
    println!("  {}: {}", "Status".bold(), pr_status(pr.status));
    println!("  {}: {}", "Repository".bold(), pr.repository);
    println!(
        "  {}: {} → {}",
        "Branches".bold(),
        pr.source_branch.cyan(),
        pr.target_branch.cyan()
    );
    println!("  {}: {}", "Author".bold(), pr.author);
    println!(
        "  {}: {}",
        "Created".bold(),
        pr.created_at.format(DATE_FORMAT)
    );
    if let Some(closed) = pr.closed_at {
        println!("  {}: {}", "Closed".bold(), closed.format(DATE_FORMAT));
    }
    if !pr.description.is_empty() {
        println!();
        println!("    {}", pr.description);
    }
    println!();
    println!(
        "  {} commit(s), {} file(s)",
        pr.commit_ids.len().to_string().cyan(),
        pr.modified_files.len().to_string().cyan()
    );
    for path in &pr.modified_files {
        println!("      • {}", path.dimmed());
    }
    if !pr.reviewers.is_empty() {
        let reviewers: Vec<&str> = pr.reviewers.iter().map(String::as_str).collect();
        println!("  {}: {}", "Reviewers".bold(), reviewers.join(", "));
    }
    if !pr.tags.is_empty() {
        let tags: Vec<&str> = pr.tags.iter().map(String::as_str).collect();
        println!("  {}: {}", "Tags".bold(), tags.join(", ").magenta());
    }
}
