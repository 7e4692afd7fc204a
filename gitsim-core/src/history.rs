//! Append-only, content-addressed commit history.
//!
//! Commits are stored by id and linked through `parent_id`. Full snapshots are
//! never stored; [`CommitHistory::materialize`] folds per-commit changes from
//! the root forward.

use crate::diff::FileDiff;
use crate::error::{Error, Result};
use crate::models::{Change, Commit, CommitId};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// Shortest prefix accepted by [`CommitHistory::resolve`].
pub const MIN_PREFIX_LEN: usize = 4;

#[derive(Debug, Default, Clone)]
pub struct CommitHistory {
    commits: HashMap<CommitId, Commit>,
    order: Vec<CommitId>,
}

/// Everything a commit records except its id and timestamp.
#[derive(Debug, Clone)]
pub struct CommitDraft {
    pub message: String,
    pub author: String,
    pub parent_id: Option<CommitId>,
    pub branch: String,
    pub changes: BTreeMap<String, Change>,
}

impl CommitHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Records a new commit. An identical commit that already exists is
    /// returned unchanged rather than appended twice.
    pub fn commit(&mut self, draft: CommitDraft, timestamp: DateTime<Utc>) -> Result<Commit> {
        if draft.changes.is_empty() {
            return Err(Error::NothingStaged);
        }
        if let Some(parent) = &draft.parent_id {
            if !self.commits.contains_key(parent) {
                return Err(Error::CommitNotFound(parent.clone()));
            }
        }

        let commit = Commit::new(
            draft.message,
            draft.author,
            timestamp,
            draft.parent_id,
            draft.branch,
            draft.changes,
        );

        // The branch label is not hashed, so the same node may be re-created
        // from another branch.
        if let Some(existing) = self.commits.get(&commit.id) {
            if existing.parent_id == commit.parent_id
                && existing.message == commit.message
                && existing.author == commit.author
                && existing.timestamp == commit.timestamp
                && existing.changes == commit.changes
            {
                debug!(id = %commit.id, "identical commit already recorded");
                return Ok(existing.clone());
            }
            return Err(Error::InvalidOperation(format!(
                "commit id collision on {}",
                commit.id
            )));
        }

        info!(
            id = %commit.id,
            branch = %commit.branch,
            files = commit.changes.len(),
            "recorded commit"
        );
        self.order.push(commit.id.clone());
        self.commits.insert(commit.id.clone(), commit.clone());
        Ok(commit)
    }

    pub fn get(&self, id: &str) -> Result<&Commit> {
        self.commits
            .get(id)
            .ok_or_else(|| Error::CommitNotFound(id.to_string()))
    }

    /// Looks a commit up by full id or by a unique prefix.
    pub fn resolve(&self, prefix: &str) -> Result<&Commit> {
        if let Some(commit) = self.commits.get(prefix) {
            return Ok(commit);
        }
        if prefix.len() < MIN_PREFIX_LEN {
            return Err(Error::CommitNotFound(prefix.to_string()));
        }

        let mut matches = self.order.iter().filter(|id| id.starts_with(prefix));
        match (matches.next(), matches.next()) {
            (Some(id), None) => self.get(id),
            _ => Err(Error::CommitNotFound(prefix.to_string())),
        }
    }

    /// Walks parent links from `id` back to the root. Every call starts a new
    /// walk.
    pub fn history_from(&self, id: &str) -> Result<Ancestry<'_>> {
        let start = self.get(id)?;
        Ok(Ancestry {
            history: self,
            next: Some(start),
        })
    }

    /// Whether `ancestor` is reachable from `descendant`. A commit counts as
    /// its own ancestor.
    pub fn is_ancestor(&self, ancestor: &str, descendant: &str) -> Result<bool> {
        Ok(self
            .history_from(descendant)?
            .any(|commit| commit.id == ancestor))
    }

    /// Full path to content snapshot as of `id`.
    pub fn materialize(&self, id: &str) -> Result<BTreeMap<String, String>> {
        let mut lineage: Vec<&Commit> = self.history_from(id)?.collect();
        lineage.reverse();

        let mut tree = BTreeMap::new();
        for commit in lineage {
            for (path, change) in &commit.changes {
                if change.is_deletion() {
                    tree.remove(path);
                } else {
                    tree.insert(path.clone(), change.content.clone());
                }
            }
        }
        Ok(tree)
    }

    /// Line diffs for every path `id` touched, against its parent's snapshot.
    pub fn diff(&self, id: &str) -> Result<Vec<FileDiff>> {
        let commit = self.get(id)?;
        let before = match &commit.parent_id {
            Some(parent) => self.materialize(parent)?,
            None => BTreeMap::new(),
        };

        Ok(commit
            .changes
            .iter()
            .map(|(path, change)| {
                let old = before.get(path).map(String::as_str);
                let new = (!change.is_deletion()).then_some(change.content.as_str());
                FileDiff::from_contents(path, change.status, old, new)
            })
            .collect())
    }
}

/// Lazy walk over a chain of parent links.
pub struct Ancestry<'a> {
    history: &'a CommitHistory,
    next: Option<&'a Commit>,
}

impl<'a> Iterator for Ancestry<'a> {
    type Item = &'a Commit;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current
            .parent_id
            .as_deref()
            .and_then(|parent| self.history.commits.get(parent));
        Some(current)
    }
}
