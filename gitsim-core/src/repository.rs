//! A single in-memory repository: staging area, commit history, branch table,
//! HEAD and the working tree derived from them.

use crate::branch::{BranchTable, DEFAULT_BRANCH};
use crate::diff::FileDiff;
use crate::error::{Error, Result};
use crate::history::{CommitDraft, CommitHistory};
use crate::models::{Branch, Commit, CommitId, FileStatus, StagedFile};
use crate::staging::StagingArea;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Branch label recorded on commits made with a detached HEAD.
pub const DETACHED_LABEL: &str = "HEAD";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "target", rename_all = "lowercase")]
pub enum Head {
    Branch(String),
    Detached(CommitId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutSummary {
    pub target: String,
    pub created: bool,
    pub detached: bool,
    pub head: Option<CommitId>,
    pub discarded: usize,
    pub files: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub repository: String,
    pub head: Head,
    pub head_commit: Option<CommitId>,
    /// Top of the staging stack first; may repeat a path.
    pub staged: Vec<StagedFile>,
    /// Effective change per path once last-write-wins is applied.
    pub pending: Vec<StagedFile>,
    pub working_tree: Vec<String>,
}

impl StatusReport {
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommitDetail {
    pub commit: Commit,
    pub diffs: Vec<FileDiff>,
}

#[derive(Debug, Clone)]
pub struct Repository {
    name: String,
    path: String,
    staging: StagingArea,
    history: CommitHistory,
    branches: BranchTable,
    head: Head,
    working_tree: BTreeMap<String, String>,
}

impl Repository {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            staging: StagingArea::new(),
            history: CommitHistory::new(),
            branches: BranchTable::new(),
            head: Head::Branch(DEFAULT_BRANCH.to_string()),
            working_tree: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn head(&self) -> &Head {
        &self.head
    }

    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    pub fn history(&self) -> &CommitHistory {
        &self.history
    }

    pub fn working_tree(&self) -> &BTreeMap<String, String> {
        &self.working_tree
    }

    /// `None` while HEAD is detached.
    pub fn current_branch(&self) -> Option<&str> {
        match &self.head {
            Head::Branch(name) => Some(name),
            Head::Detached(_) => None,
        }
    }

    pub fn head_commit(&self) -> Option<&CommitId> {
        match &self.head {
            Head::Branch(name) => self.branches.get(name).ok()?.head.as_ref(),
            Head::Detached(id) => Some(id),
        }
    }

    /// Most recent commit reachable from HEAD that recorded `path`.
    fn last_recorded(&self, path: &str) -> Result<Option<CommitId>> {
        let Some(head) = self.head_commit() else {
            return Ok(None);
        };
        Ok(self
            .history
            .history_from(head)?
            .find(|commit| commit.changes.contains_key(path))
            .map(|commit| commit.id.clone()))
    }

    fn tree_at_head(&self) -> Result<BTreeMap<String, String>> {
        match self.head_commit() {
            Some(id) => self.history.materialize(id),
            None => Ok(BTreeMap::new()),
        }
    }

    pub fn add(&mut self, path: &str, content: &str) -> Result<StagedFile> {
        if path.trim().is_empty() {
            return Err(Error::InvalidOperation("path cannot be empty".to_string()));
        }

        let status = if self.tree_at_head()?.contains_key(path) {
            FileStatus::Modified
        } else {
            FileStatus::Added
        };
        let staged = StagedFile::new(
            path.to_string(),
            content.to_string(),
            status,
            self.last_recorded(path)?,
        );

        self.working_tree
            .insert(path.to_string(), content.to_string());
        self.staging.stage(staged.clone());
        Ok(staged)
    }

    pub fn remove(&mut self, path: &str) -> Result<StagedFile> {
        let last_commit_id = self.last_recorded(path)?;
        if last_commit_id.is_none() && !self.staging.contains(path) {
            return Err(Error::FileNotFound(path.to_string()));
        }

        let staged = StagedFile::deletion(path.to_string(), last_commit_id);
        self.working_tree.remove(path);
        self.staging.stage(staged.clone());
        Ok(staged)
    }

    /// Drops the most recently staged entry.
    pub fn unstage_last(&mut self) -> Result<Option<StagedFile>> {
        let popped = self.staging.pop();
        self.refresh_working_tree()?;
        Ok(popped)
    }

    /// Discards everything staged without committing.
    pub fn reset(&mut self) -> Result<usize> {
        let discarded = self.staging.clear();
        self.refresh_working_tree()?;
        Ok(discarded)
    }

    pub fn commit(&mut self, message: &str, author: &str) -> Result<Commit> {
        self.commit_at(message, author, Utc::now())
    }

    /// Commits the staging area with an explicit timestamp. Staging, history
    /// and the branch head either all change or none do.
    pub fn commit_at(
        &mut self,
        message: &str,
        author: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<Commit> {
        if let Head::Branch(name) = &self.head {
            self.branches.get(name)?;
        }

        let parent_id = self.head_commit().cloned();
        let branch = self
            .current_branch()
            .unwrap_or(DETACHED_LABEL)
            .to_string();

        let history = &mut self.history;
        let commit = self.staging.drain_for_commit(|resolved| {
            let changes = resolved
                .into_iter()
                .map(|(path, staged)| (path, staged.to_change()))
                .collect();
            history.commit(
                CommitDraft {
                    message: message.to_string(),
                    author: author.to_string(),
                    parent_id,
                    branch,
                    changes,
                },
                timestamp,
            )
        })?;

        match &mut self.head {
            Head::Branch(name) => self.branches.set_head(name, commit.id.clone())?,
            Head::Detached(id) => *id = commit.id.clone(),
        }
        self.refresh_working_tree()?;
        Ok(commit)
    }

    /// Switches HEAD to a branch (optionally creating it at the current head)
    /// or, failing that, detaches HEAD at a commit. Staged entries are dropped.
    pub fn checkout(&mut self, target: &str, create: bool) -> Result<CheckoutSummary> {
        let (head, detached) = if create {
            let from = self.head_commit().cloned();
            self.branches.create(target, from)?;
            (Head::Branch(target.to_string()), false)
        } else if self.branches.contains(target) {
            (Head::Branch(target.to_string()), false)
        } else {
            let commit = self
                .history
                .resolve(target)
                .map_err(|_| Error::BranchNotFound(target.to_string()))?;
            (Head::Detached(commit.id.clone()), true)
        };

        let head_commit = match &head {
            Head::Branch(name) => self.branches.head(name)?.cloned(),
            Head::Detached(id) => Some(id.clone()),
        };
        let tree = match &head_commit {
            Some(id) => self.history.materialize(id)?,
            None => BTreeMap::new(),
        };

        let discarded = self.staging.clear();
        if discarded > 0 {
            warn!(
                repository = %self.name,
                discarded,
                "checkout discarded staged changes"
            );
        }
        info!(repository = %self.name, to = target, detached, "checked out");

        self.head = head;
        self.working_tree = tree;

        Ok(CheckoutSummary {
            target: target.to_string(),
            created: create,
            detached,
            head: head_commit,
            discarded,
            files: self.working_tree.len(),
        })
    }

    pub fn create_branch(&mut self, name: &str) -> Result<Branch> {
        let from = self.head_commit().cloned();
        Ok(self.branches.create(name, from)?.clone())
    }

    pub fn delete_branch(&mut self, name: &str) -> Result<Branch> {
        if self.current_branch() == Some(name) {
            return Err(Error::InvalidOperation(format!(
                "cannot delete the current branch '{name}'"
            )));
        }
        let removed = self.branches.delete(name)?;
        info!(repository = %self.name, branch = name, "deleted branch");
        Ok(removed)
    }

    pub fn branches(&self) -> &[Branch] {
        self.branches.list()
    }

    pub fn branch_head(&self, name: &str) -> Result<Option<&CommitId>> {
        self.branches.head(name)
    }

    pub fn status(&self) -> StatusReport {
        StatusReport {
            repository: self.name.clone(),
            head: self.head.clone(),
            head_commit: self.head_commit().cloned(),
            staged: self.staging.entries().cloned().collect(),
            pending: self.staging.resolve().into_values().collect(),
            working_tree: self.working_tree.keys().cloned().collect(),
        }
    }

    /// Commits reachable from HEAD, newest first.
    pub fn log(&self, limit: Option<usize>) -> Result<Vec<Commit>> {
        let Some(head) = self.head_commit() else {
            return Ok(Vec::new());
        };
        Ok(self
            .history
            .history_from(head)?
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    /// A commit with its per-file diff. Defaults to the HEAD commit.
    pub fn show(&self, target: Option<&str>) -> Result<CommitDetail> {
        let commit = match target {
            Some(prefix) => self.history.resolve(prefix)?,
            None => {
                let head = self
                    .head_commit()
                    .ok_or_else(|| Error::CommitNotFound(DETACHED_LABEL.to_string()))?;
                self.history.get(head)?
            }
        };

        Ok(CommitDetail {
            diffs: self.history.diff(&commit.id)?,
            commit: commit.clone(),
        })
    }

    pub fn materialize(&self, id: &str) -> Result<BTreeMap<String, String>> {
        self.history.materialize(id)
    }

    /// Commits reachable from `source` but not from `target`, newest first,
    /// together with the paths they touch.
    pub fn unique_commits(
        &self,
        source: &str,
        target: &str,
    ) -> Result<(Vec<CommitId>, BTreeSet<String>)> {
        let source_head = self.branches.head(source)?.cloned();
        let target_head = self.branches.head(target)?.cloned();

        let Some(source_head) = source_head else {
            return Ok((Vec::new(), BTreeSet::new()));
        };
        let reachable_from_target: BTreeSet<&str> = match &target_head {
            Some(id) => self
                .history
                .history_from(id)?
                .map(|commit| commit.id.as_str())
                .collect(),
            None => BTreeSet::new(),
        };

        let mut commits = Vec::new();
        let mut files = BTreeSet::new();
        for commit in self.history.history_from(&source_head)? {
            if reachable_from_target.contains(commit.id.as_str()) {
                continue;
            }
            commits.push(commit.id.clone());
            files.extend(commit.changes.keys().cloned());
        }
        Ok((commits, files))
    }

    /// Checks that `target` can fast-forward to `source` without moving it.
    pub fn can_fast_forward(&self, target: &str, source: &str) -> Result<CommitId> {
        let source_head = self.branches.head(source)?.cloned().ok_or_else(|| {
            Error::InvalidOperation(format!("branch '{source}' has no commits"))
        })?;

        if let Some(target_head) = self.branches.head(target)? {
            if !self.history.is_ancestor(target_head, &source_head)? {
                return Err(Error::InvalidOperation(format!(
                    "'{target}' has diverged from '{source}'; only fast-forward merges are supported"
                )));
            }
        }
        Ok(source_head)
    }

    /// Moves `target` up to the head of `source`.
    pub fn fast_forward(&mut self, target: &str, source: &str) -> Result<CommitId> {
        let new_head = self.can_fast_forward(target, source)?;
        self.branches.set_head(target, new_head.clone())?;
        info!(
            repository = %self.name,
            branch = target,
            from = source,
            head = %new_head,
            "fast-forwarded branch"
        );

        if self.current_branch() == Some(target) {
            self.refresh_working_tree()?;
        }
        Ok(new_head)
    }

    /// Working tree = snapshot at HEAD with the pending staged changes on top.
    fn refresh_working_tree(&mut self) -> Result<()> {
        let mut tree = self.tree_at_head()?;
        for (path, staged) in self.staging.resolve() {
            if staged.status == FileStatus::Deleted {
                tree.remove(&path);
            } else {
                tree.insert(path, staged.content);
            }
        }
        debug!(repository = %self.name, files = tree.len(), "refreshed working tree");
        self.working_tree = tree;
        Ok(())
    }
}
