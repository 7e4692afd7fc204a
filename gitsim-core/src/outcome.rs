use crate::manager::RepositoryInfo;
use crate::models::{Branch, Commit, CommitId, PullRequest, StagedFile};
use crate::repository::{CheckoutSummary, CommitDetail, StatusReport};
use serde::Serialize;

/// What a pull-request command did to the PR it returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PrAction {
    Created,
    Shown,
    Reviewed { reviewer: String },
    Approved,
    Rejected,
    Cancelled,
    Merged { head: CommitId },
    Tagged { label: String },
}

/// Structured result of a successful [`crate::Session::execute`] call.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Outcome {
    RepositoryCreated(RepositoryInfo),
    RepositorySwitched(RepositoryInfo),
    RepositoryRemoved { name: String },
    Repositories(Vec<RepositoryInfo>),
    Staged(StagedFile),
    Unstaged(Option<StagedFile>),
    Reset { discarded: usize },
    Committed(Commit),
    CheckedOut(CheckoutSummary),
    BranchCreated(Branch),
    BranchDeleted(Branch),
    Branches {
        current: Option<String>,
        branches: Vec<Branch>,
    },
    Status(StatusReport),
    /// `total` counts every commit reachable from HEAD, shown or not.
    Log {
        commits: Vec<Commit>,
        total: usize,
    },
    Show(CommitDetail),
    PullRequest {
        action: PrAction,
        pull_request: PullRequest,
    },
    PullRequests(Vec<PullRequest>),
    NextPullRequest(Option<PullRequest>),
    PullRequestsCleared { count: usize },
}
