//! The context object every command runs against.
//!
//! A [`Session`] is created once at startup and owns all state: the
//! repositories and the pull-request registry. Callers pass it by `&mut` into
//! each operation.

use crate::error::{Error, Result};
use crate::manager::{RepositoryInfo, RepositoryManager};
use crate::models::{CommitId, PrStatus, PullRequest, PullRequestDraft};
use crate::operation::{Invocation, NamedArgs};
use crate::outcome::Outcome;
use crate::pull_request::PullRequestRegistry;
use crate::repository::Repository;
use tracing::debug;

pub const DEFAULT_AUTHOR: &str = "user@example.com";

#[derive(Debug)]
pub struct Session {
    repositories: RepositoryManager,
    pull_requests: PullRequestRegistry,
    author: String,
}

impl Session {
    pub fn new(author: impl Into<String>) -> Self {
        Self {
            repositories: RepositoryManager::new(),
            pull_requests: PullRequestRegistry::new(),
            author: author.into(),
        }
    }

    /// Identity recorded on commits and pull requests unless overridden.
    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn repositories(&self) -> &RepositoryManager {
        &self.repositories
    }

    pub fn repositories_mut(&mut self) -> &mut RepositoryManager {
        &mut self.repositories
    }

    pub fn pull_requests(&self) -> &PullRequestRegistry {
        &self.pull_requests
    }

    pub fn pull_requests_mut(&mut self) -> &mut PullRequestRegistry {
        &mut self.pull_requests
    }

    pub fn active(&self) -> Result<&Repository> {
        self.repositories.active()
    }

    pub fn active_mut(&mut self) -> Result<&mut Repository> {
        self.repositories.active_mut()
    }

    /// Runs one command by name. Flags in `named` are checked against the
    /// command's descriptor before anything is touched.
    pub fn execute(
        &mut self,
        command: &str,
        positional: Vec<String>,
        named: NamedArgs,
    ) -> Result<Outcome> {
        let invocation = Invocation::new(command, positional, named)?;
        self.run(&invocation)
    }

    pub fn run(&mut self, invocation: &Invocation) -> Result<Outcome> {
        debug!(
            command = invocation.command(),
            positional = ?invocation.positional,
            named = ?invocation.named,
            "executing"
        );
        (invocation.spec.handler)(self, invocation)
    }

    pub fn init(&mut self, name: &str, path: &str) -> Result<RepositoryInfo> {
        let repo = self.repositories.create(name, path)?;
        Ok(RepositoryInfo {
            name: repo.name().to_string(),
            path: repo.path().to_string(),
            active: true,
        })
    }

    /// Opens a pull request against the active repository. Both branches must
    /// exist and the source must carry commits the target does not have.
    pub fn create_pull_request(
        &mut self,
        title: &str,
        source: &str,
        target: &str,
        description: &str,
        author: &str,
    ) -> Result<PullRequest> {
        let repo = self.repositories.active()?;
        if source == target {
            return Err(Error::InvalidOperation(
                "source and target branches must differ".to_string(),
            ));
        }

        let (commit_ids, modified_files) = repo.unique_commits(source, target)?;
        if commit_ids.is_empty() {
            return Err(Error::InvalidOperation(format!(
                "'{source}' has no commits missing from '{target}'"
            )));
        }

        let draft = PullRequestDraft {
            repository: repo.name().to_string(),
            title: title.to_string(),
            description: description.to_string(),
            author: author.to_string(),
            source_branch: source.to_string(),
            target_branch: target.to_string(),
            commit_ids,
            modified_files,
        };
        Ok(self.pull_requests.create(draft)?.clone())
    }

    /// Merges an approved PR by fast-forwarding its target branch. Nothing
    /// changes unless both the transition and the fast-forward are possible.
    pub fn merge_pull_request(&mut self, id: &str) -> Result<(PullRequest, CommitId)> {
        let pr = self
            .pull_requests
            .check_transition(id, PrStatus::Merged)?
            .clone();
        let repo = self.repositories.get_mut(&pr.repository)?;
        repo.can_fast_forward(&pr.target_branch, &pr.source_branch)?;

        let head = repo.fast_forward(&pr.target_branch, &pr.source_branch)?;
        let merged = self.pull_requests.merge(id)?.clone();
        Ok((merged, head))
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_AUTHOR)
    }
}
